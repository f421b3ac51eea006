//! The matching state for one `(base, quote, tick_size)` triple (spec §2,
//! §3). Pairs a [`TickIndex`] with a dense `tick -> LevelQueue` map for
//! each side, the way the teacher pairs a `SkipMap<u128, Arc<PriceLevel>>`
//! per side inside `OrderBook<T>` — generalised here to the spec's
//! integer tick lattice rather than a raw scaled price key.

pub mod error;
pub mod events;
mod level_queue;
mod matching;
mod order_index;
mod tick_index;

pub use error::BookError;
pub use events::BookEvent;
pub use matching::PlaceResult;
pub use order_index::TerminalStatus;

use crate::clock::Clock;
use crate::ledger::Ledger;
use crate::types::{AssetId, Base, BookId, BookSide, OrderHash, OrderSeq, Quote, UserId};
use level_queue::LevelQueue;
use order_index::OrderIndex;
use std::collections::HashMap;
use std::sync::Arc;
use tick_index::TickIndex;

/// Immutable per-book trading-pair configuration (spec §2, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PairConfig {
    /// Base-side asset.
    pub base_asset: AssetId,
    /// Quote-side asset.
    pub quote_asset: AssetId,
    /// Minimum price increment; every accepted price must be a positive
    /// multiple of this.
    pub tick_size: Quote,
}

/// Best-of-book summary for one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestQuote {
    /// Price at the best tick.
    pub price: Quote,
    /// Aggregate base resting at that tick.
    pub total_base: Base,
}

/// Aggregate snapshot of one price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PriceLevelInfo {
    /// Aggregate base resting at the level.
    pub total_base: Base,
    /// Number of live orders at the level.
    pub order_count: usize,
}

/// Current disposition of an order, live or terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    /// Still resting in a queue.
    Live,
    /// Left the book in a terminal state.
    Terminal(TerminalStatus),
}

/// Status-query response for `get_order_info` (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderInfo {
    /// Current status.
    pub status: OrderStatus,
    /// Base filled so far (final once terminal).
    pub filled_base: Base,
    /// Epoch seconds the order was accepted.
    pub created_at: u64,
}

/// Full detail for a live order (spec §6); `exists` is `false` and the
/// rest of the fields are meaningless if the hash isn't currently live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderDetails {
    /// `true` if the hash currently has a live node.
    pub exists: bool,
    /// Resting side.
    pub side: BookSide,
    /// Resting price.
    pub price: Quote,
    /// Base units still unfilled.
    pub remaining_base: Base,
    /// Order owner.
    pub maker: UserId,
}

/// One tick's aggregate, for depth snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthLevel {
    /// Price at this tick.
    pub price: Quote,
    /// Aggregate base resting at this tick.
    pub total_base: Base,
}

/// The matching state for one trading pair.
///
/// Per spec §5, a `Book` is mutated single-threaded and cooperatively:
/// external callers must serialise their calls into it (typically by
/// holding it behind a mutex or routing all access through one
/// `Gateway` task). Nothing inside `Book` does its own locking.
#[derive(Debug)]
pub struct Book {
    pub(crate) book_id: BookId,
    pub(crate) config: PairConfig,
    pub(crate) ledger: Ledger,
    pub(crate) clock: Arc<dyn Clock>,

    pub(crate) bid_index: TickIndex,
    pub(crate) ask_index: TickIndex,
    pub(crate) bid_levels: HashMap<u32, LevelQueue>,
    pub(crate) ask_levels: HashMap<u32, LevelQueue>,

    pub(crate) order_index: OrderIndex,
    pub(crate) next_order_id: OrderSeq,
}

impl Book {
    /// Create a new, empty book. `ledger` must already have both assets
    /// registered as supported and this book authorised as an executor
    /// (the [`crate::registry::Registry`] does both at creation time).
    #[must_use]
    pub fn new(book_id: BookId, config: PairConfig, ledger: Ledger, clock: Arc<dyn Clock>) -> Self {
        Self {
            book_id,
            config,
            ledger,
            clock,
            bid_index: TickIndex::new(),
            ask_index: TickIndex::new(),
            bid_levels: HashMap::new(),
            ask_levels: HashMap::new(),
            order_index: OrderIndex::new(),
            next_order_id: 1,
        }
    }

    /// This book's identity, included in every order hash.
    #[must_use]
    pub fn book_id(&self) -> BookId {
        self.book_id
    }

    /// This book's immutable pair configuration.
    #[must_use]
    pub fn config(&self) -> PairConfig {
        self.config
    }

    fn index(&self, side: BookSide) -> &TickIndex {
        match side {
            BookSide::Bid => &self.bid_index,
            BookSide::Ask => &self.ask_index,
        }
    }

    fn levels(&self, side: BookSide) -> &HashMap<u32, LevelQueue> {
        match side {
            BookSide::Bid => &self.bid_levels,
            BookSide::Ask => &self.ask_levels,
        }
    }

    pub(crate) fn index_mut(&mut self, side: BookSide) -> &mut TickIndex {
        match side {
            BookSide::Bid => &mut self.bid_index,
            BookSide::Ask => &mut self.ask_index,
        }
    }

    pub(crate) fn levels_mut(&mut self, side: BookSide) -> &mut HashMap<u32, LevelQueue> {
        match side {
            BookSide::Bid => &mut self.bid_levels,
            BookSide::Ask => &mut self.ask_levels,
        }
    }

    fn tick_to_price(&self, tick: u32) -> Quote {
        tick as Quote * self.config.tick_size
    }

    /// Highest bid tick with positive aggregate, or `None`.
    #[must_use]
    pub fn get_best_bid(&self) -> Option<BestQuote> {
        let tick = self.bid_index.last_nonzero_in(0, self.bid_index.len() as u32)?;
        Some(BestQuote {
            price: self.tick_to_price(tick),
            total_base: self.bid_index.get(tick),
        })
    }

    /// Lowest ask tick with positive aggregate, or `None`.
    #[must_use]
    pub fn get_best_ask(&self) -> Option<BestQuote> {
        let tick = self.ask_index.first_nonzero_in(0, self.ask_index.len() as u32)?;
        Some(BestQuote {
            price: self.tick_to_price(tick),
            total_base: self.ask_index.get(tick),
        })
    }

    /// Best ask minus best bid, in price units; `None` if either side is
    /// empty.
    #[must_use]
    pub fn spread(&self) -> Option<Quote> {
        let bid = self.get_best_bid()?;
        let ask = self.get_best_ask()?;
        Some(ask.price.saturating_sub(bid.price))
    }

    /// Aggregate and order count at an exact price, searching both sides.
    #[must_use]
    pub fn get_price_level(&self, price: Quote) -> PriceLevelInfo {
        let Some(tick) = self.price_to_tick(price) else {
            return PriceLevelInfo::default();
        };
        for side in [BookSide::Bid, BookSide::Ask] {
            if let Some(queue) = self.levels(side).get(&tick) {
                if !queue.is_empty() {
                    return PriceLevelInfo {
                        total_base: queue.total_base_amount(),
                        order_count: queue.len(),
                    };
                }
            }
        }
        PriceLevelInfo::default()
    }

    /// Status and fill progress for a (live or terminal) order hash.
    #[must_use]
    pub fn get_order_info(&self, hash: OrderHash) -> Option<OrderInfo> {
        let record = self.order_index.record(hash)?;
        let status = match record.final_status {
            Some(terminal) => OrderStatus::Terminal(terminal),
            None => OrderStatus::Live,
        };
        let filled_base = match self.order_index.locate(hash) {
            Some(locator) => {
                let remaining = self
                    .levels(locator.side)
                    .get(&locator.tick)
                    .and_then(|q| q.get(locator.order_id))
                    .map(|n| n.remaining_base)
                    .unwrap_or(0);
                record.initial_base - remaining
            }
            None => record.final_filled_base,
        };
        Some(OrderInfo {
            status,
            filled_base,
            created_at: record.created_at,
        })
    }

    /// Full live detail for an order hash.
    #[must_use]
    pub fn get_order_details(&self, hash: OrderHash) -> OrderDetails {
        let Some(locator) = self.order_index.locate(hash) else {
            return OrderDetails {
                exists: false,
                side: BookSide::Bid,
                price: 0,
                remaining_base: 0,
                maker: UserId::ZERO,
            };
        };
        let remaining_base = self
            .levels(locator.side)
            .get(&locator.tick)
            .and_then(|q| q.get(locator.order_id))
            .map(|n| n.remaining_base)
            .unwrap_or(0);
        let maker = self
            .order_index
            .record(hash)
            .map(|r| r.maker)
            .unwrap_or(UserId::ZERO);
        OrderDetails {
            exists: true,
            side: locator.side,
            price: self.tick_to_price(locator.tick),
            remaining_base,
            maker,
        }
    }

    /// All order hashes ever submitted by `user`.
    #[must_use]
    pub fn get_user_orders(&self, user: UserId) -> Vec<OrderHash> {
        self.order_index.user_orders(user)
    }

    /// Per-tick aggregates across `[start_price, end_price]` on both sides.
    #[must_use]
    pub fn get_depth(&self, start_price: Quote, end_price: Quote) -> (Vec<DepthLevel>, Vec<DepthLevel>) {
        let lo = self.price_to_tick_floor(start_price);
        let hi = self.price_to_tick_ceil(end_price).saturating_add(1);
        let bids = self.depth_side(BookSide::Bid, lo, hi);
        let asks = self.depth_side(BookSide::Ask, lo, hi);
        (bids, asks)
    }

    fn depth_side(&self, side: BookSide, lo: u32, hi: u32) -> Vec<DepthLevel> {
        let index = self.index(side);
        let mut out = Vec::new();
        let mut t = lo;
        while let Some(found) = index.first_nonzero_in(t, hi) {
            out.push(DepthLevel {
                price: self.tick_to_price(found),
                total_base: index.get(found),
            });
            t = found + 1;
        }
        out
    }

    fn price_to_tick(&self, price: Quote) -> Option<u32> {
        if price == 0 || price % self.config.tick_size != 0 {
            return None;
        }
        let tick = price / self.config.tick_size;
        u32::try_from(tick).ok()
    }

    fn price_to_tick_floor(&self, price: Quote) -> u32 {
        (price / self.config.tick_size).try_into().unwrap_or(u32::MAX)
    }

    fn price_to_tick_ceil(&self, price: Quote) -> u32 {
        let tick_size = self.config.tick_size;
        (price.div_ceil(tick_size)).try_into().unwrap_or(u32::MAX)
    }
}
