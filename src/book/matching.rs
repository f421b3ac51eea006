//! Sweep, residual-rest, cancellation, and expiry eviction (spec §4.4,
//! §4.5). This is the hot path; it mirrors the shape of the teacher's own
//! `match_order` sweep — walk price levels best-to-worst, drain or
//! partially consume the head, advance — generalised from a raw scaled
//! price key to the tick-index lattice the rest of this crate uses.

use super::error::BookError;
use super::events::BookEvent;
use super::level_queue::OrderNode;
use super::order_index::{Locator, TerminalStatus};
use super::Book;
use crate::order::Order;
use crate::types::{ceil_quote, floor_quote, Base, BookSide, OrderHash, OrderSeq, Quote, Side, UserId};

/// Result of a successful [`Book::place`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceResult {
    /// Canonical hash of the accepted order.
    pub order_hash: OrderHash,
    /// Base units matched during this placement.
    pub filled_base: Base,
    /// Base units resting after this placement (0 if fully filled).
    pub residual_base: Base,
    /// Domain events raised, in execution order.
    pub events: Vec<BookEvent>,
}

impl Book {
    fn executor_id(&self) -> UserId {
        UserId(self.book_id.0)
    }

    /// `true` if `expiry != 0 && now > expiry` (spec §4.5).
    fn is_expired(expiry: u64, now: u64) -> bool {
        expiry != 0 && now > expiry
    }

    fn resolve_tick(&self, price: Quote) -> Result<u32, BookError> {
        if price == 0 || price % self.config.tick_size != 0 {
            return Err(BookError::InvalidPrice {
                price,
                tick_size: self.config.tick_size,
            });
        }
        let tick_u128 = price / self.config.tick_size;
        let tick = u32::try_from(tick_u128).map_err(|_| BookError::TickOutOfRange {
            tick: u32::MAX,
            max_tick: crate::types::MAX_TICK_INDEX,
        })?;
        if tick == 0 || tick > crate::types::MAX_TICK_INDEX {
            return Err(BookError::TickOutOfRange {
                tick,
                max_tick: crate::types::MAX_TICK_INDEX,
            });
        }
        Ok(tick)
    }

    /// Accept a new order: validate, lock funds, sweep, rest the residual.
    ///
    /// `order_hash` must already be the canonical hash of `order` (computed
    /// by the caller, typically [`crate::gateway::Gateway`], via
    /// [`crate::order::hash_order`]) — the book treats it as an opaque,
    /// content-addressed identity and never recomputes it.
    pub fn place(&mut self, order: &Order, order_hash: OrderHash) -> Result<PlaceResult, BookError> {
        let now = self.clock.now();

        if order.book_address != self.book_id {
            return Err(BookError::PairMismatch);
        }
        if order.base_amount == 0 {
            return Err(BookError::ZeroAmount);
        }
        if Self::is_expired(order.expiry, now) {
            return Err(BookError::ExpiredOnSubmit {
                expiry: order.expiry,
                now,
            });
        }
        if self.order_index.is_live(order_hash) {
            return Err(BookError::DuplicateHash { hash: order_hash });
        }
        let t0 = self.resolve_tick(order.price)?;

        let lock_asset = match order.side {
            Side::SellBase => order.base_asset,
            Side::BuyBase => order.quote_asset,
        };
        let lock_amount: Quote = match order.side {
            Side::SellBase => order.base_amount as Quote,
            Side::BuyBase => {
                let amount = ceil_quote(order.base_amount, order.price);
                if amount == 0 {
                    return Err(BookError::QuoteRoundsToZero {
                        base: order.base_amount,
                        price: order.price,
                    });
                }
                amount
            }
        };
        self.ledger
            .lock(self.executor_id(), order.maker, lock_asset, lock_amount)?;

        let mut events = Vec::new();
        let mut remaining = order.base_amount;
        let mut taker_quote_spent: Quote = 0;

        // Bounds narrow, one-way, whenever a level yields no progress (every
        // resting order there is the taker's own) — otherwise the sweep
        // would re-pick that exact tick forever, since its aggregate never
        // drops to zero. `bid_hi` is the exclusive upper bound for the bid
        // scan (descending); `ask_lo` is the inclusive lower bound for the
        // ask scan (ascending).
        let mut bid_hi = crate::types::MAX_TICK_INDEX + 1;
        let mut ask_lo = 0u32;

        loop {
            if remaining == 0 {
                break;
            }
            let next_tick = match order.side {
                Side::SellBase => self.bid_index.last_nonzero_in(t0, bid_hi),
                Side::BuyBase => self.ask_index.first_nonzero_in(ask_lo, t0 + 1),
            };
            let Some(tick) = next_tick else { break };
            let opposite_side = match order.side {
                Side::SellBase => BookSide::Bid,
                Side::BuyBase => BookSide::Ask,
            };
            match self.fill_at_level(opposite_side, tick, order.maker, order.side, remaining, &mut events) {
                Ok((rem, spent, progressed)) => {
                    remaining = rem;
                    taker_quote_spent += spent;
                    if !progressed {
                        match order.side {
                            Side::SellBase => bid_hi = tick,
                            Side::BuyBase => ask_lo = tick + 1,
                        }
                    }
                }
                Err(e) => {
                    // Fills already executed this call (and any prior calls)
                    // are settled and stay settled — only the still-unmatched
                    // slice of the reservation, which will now never back a
                    // resting node, is returned to the maker.
                    let consumed = match order.side {
                        Side::SellBase => (order.base_amount - remaining) as Quote,
                        Side::BuyBase => taker_quote_spent,
                    };
                    let refund = lock_amount.saturating_sub(consumed);
                    if refund > 0 {
                        let _ = self
                            .ledger
                            .unlock(self.executor_id(), order.maker, lock_asset, refund);
                    }
                    return Err(e);
                }
            }
        }

        let filled = order.base_amount - remaining;

        if remaining > 0 {
            let order_id = self.next_order_id;
            self.next_order_id += 1;
            let resting_side = order.side.resting_side();
            let node = OrderNode::new(order_id, order_hash, order.maker, remaining, order.expiry);
            self.levels_mut(resting_side)
                .entry(t0)
                .or_default()
                .enqueue(node);
            let total = self.levels(resting_side).get(&t0).unwrap().total_base_amount();
            self.index_mut(resting_side).update(t0, total);
            self.order_index.insert(
                order_hash,
                order.maker,
                Locator {
                    side: resting_side,
                    tick: t0,
                    order_id,
                },
                order.base_amount,
                now,
            );
            events.push(BookEvent::OrderPlaced {
                hash: order_hash,
                maker: order.maker,
                order_id,
                remaining_base: remaining,
            });
        } else if order.side == Side::BuyBase {
            let refund = lock_amount.saturating_sub(taker_quote_spent);
            if refund > 0 {
                self.ledger
                    .unlock(self.executor_id(), order.maker, order.quote_asset, refund)?;
            }
        }

        Ok(PlaceResult {
            order_hash,
            filled_base: filled,
            residual_base: remaining,
            events,
        })
    }

    /// Walk the FIFO at `(opposite_side, tick)` against a taker with
    /// `remaining` base left, returning `(remaining_after, quote_spent,
    /// progressed)` — `progressed` is `false` if every resting order
    /// encountered was the taker's own (self-trade skip) and nothing at
    /// this level was filled or evicted; the caller must then treat this
    /// tick as exhausted for the rest of the sweep, since its aggregate
    /// stays nonzero.
    fn fill_at_level(
        &mut self,
        opposite_side: BookSide,
        tick: u32,
        taker: UserId,
        taker_side: Side,
        mut remaining: Base,
        events: &mut Vec<BookEvent>,
    ) -> Result<(Base, Quote, bool), BookError> {
        let now = self.clock.now();
        let snapshot: Vec<OrderSeq> = {
            let queue = self.levels(opposite_side).get(&tick);
            queue.map(|q| q.iter().map(|n| n.order_id).collect()).unwrap_or_default()
        };
        let maker_price = self.tick_to_price(tick);
        let mut quote_spent: Quote = 0;
        let mut progressed = false;

        for id in snapshot {
            if remaining == 0 {
                break;
            }
            let Some(node) = self
                .levels(opposite_side)
                .get(&tick)
                .and_then(|q| q.get(id))
            else {
                continue;
            };
            let maker = node.maker;
            let maker_hash = node.order_hash;
            let maker_remaining = node.remaining_base;
            let maker_expiry = node.expiry;

            if maker == taker {
                continue;
            }

            if Self::is_expired(maker_expiry, now) {
                self.evict_expired(opposite_side, tick, id, maker, maker_hash, events);
                progressed = true;
                continue;
            }

            let fill_base = remaining.min(maker_remaining);
            let quote = floor_quote(fill_base, maker_price);
            if quote == 0 {
                return Err(BookError::QuoteRoundsToZero {
                    base: fill_base,
                    price: maker_price,
                });
            }

            let (base_asset, quote_asset) = self.base_quote_assets();
            match taker_side {
                Side::BuyBase => {
                    self.ledger
                        .transfer_locked(self.executor_id(), maker, taker, base_asset, fill_base as Quote)?;
                    self.ledger
                        .transfer_locked(self.executor_id(), taker, maker, quote_asset, quote)?;
                }
                Side::SellBase => {
                    self.ledger
                        .transfer_locked(self.executor_id(), taker, maker, base_asset, fill_base as Quote)?;
                    self.ledger
                        .transfer_locked(self.executor_id(), maker, taker, quote_asset, quote)?;
                }
            }

            remaining -= fill_base;
            quote_spent += quote;
            progressed = true;
            let maker_after = maker_remaining - fill_base;
            let is_final_for_maker = maker_after == 0;

            events.push(BookEvent::OrderFilled {
                hash: maker_hash,
                maker,
                taker,
                fill_base,
                quote,
                price: maker_price,
                is_final_for_maker,
            });

            if is_final_for_maker {
                if let Some(queue) = self.levels_mut(opposite_side).get_mut(&tick) {
                    queue.remove(id);
                    let total = queue.total_base_amount();
                    self.index_mut(opposite_side).update(tick, total);
                }
                let total_filled = self
                    .order_index
                    .record(maker_hash)
                    .map(|r| r.initial_base)
                    .unwrap_or(maker_remaining);
                self.order_index
                    .retire(maker_hash, TerminalStatus::Filled, total_filled);
            } else {
                if let Some(queue) = self.levels_mut(opposite_side).get_mut(&tick) {
                    queue.decrement(id, fill_base);
                    let total = queue.total_base_amount();
                    self.index_mut(opposite_side).update(tick, total);
                }
                break;
            }
        }

        Ok((remaining, quote_spent, progressed))
    }

    fn evict_expired(
        &mut self,
        side: BookSide,
        tick: u32,
        id: OrderSeq,
        maker: UserId,
        maker_hash: OrderHash,
        events: &mut Vec<BookEvent>,
    ) {
        let (asset, refund, filled_so_far) = {
            let Some(queue) = self.levels_mut(side).get_mut(&tick) else {
                return;
            };
            let Some(node) = queue.remove(id) else {
                return;
            };
            let total = queue.total_base_amount();
            self.index_mut(side).update(tick, total);
            let asset = match side {
                BookSide::Bid => self.config.quote_asset,
                BookSide::Ask => self.config.base_asset,
            };
            let refund_amount: Quote = match side {
                BookSide::Bid => ceil_quote(node.remaining_base, self.tick_to_price(tick)),
                BookSide::Ask => node.remaining_base as Quote,
            };
            let filled_so_far = self
                .order_index
                .record(maker_hash)
                .map(|r| r.initial_base - node.remaining_base)
                .unwrap_or(0);
            (asset, refund_amount, filled_so_far)
        };
        if refund > 0 {
            // best-effort: an expired maker's refund failing would otherwise
            // abort the *taker's* placement for a problem that is entirely
            // the maker's; the eviction itself still proceeds.
            let _ = self
                .ledger
                .unlock(self.executor_id(), maker, asset, refund);
        }
        self.order_index
            .retire(maker_hash, TerminalStatus::Expired, filled_so_far);
        events.push(BookEvent::OrderExpired {
            hash: maker_hash,
            maker,
            order_id: id,
        });
    }

    fn base_quote_assets(&self) -> (crate::types::AssetId, crate::types::AssetId) {
        (self.config.base_asset, self.config.quote_asset)
    }

    /// Remove a live order by hash. Requires `caller == maker`. Emits
    /// `OrderCancelled` (or `OrderExpired`, if the order's expiry had
    /// already passed) on success.
    pub fn cancel_by_hash(&mut self, hash: OrderHash, caller: UserId) -> Result<Vec<BookEvent>, BookError> {
        let locator = self
            .order_index
            .locate(hash)
            .ok_or(BookError::OrderNotFound { hash })?;
        let record = self.order_index.record(hash).expect("live hash has a record");
        if record.maker != caller {
            return Err(BookError::NotMaker {
                hash,
                maker: record.maker,
                caller,
            });
        }
        let mut events = Vec::new();
        self.remove_and_refund(locator, hash, &mut events)?;
        Ok(events)
    }

    fn remove_and_refund(
        &mut self,
        locator: Locator,
        hash: OrderHash,
        events: &mut Vec<BookEvent>,
    ) -> Result<(), BookError> {
        let now = self.clock.now();
        let Locator { side, tick, order_id } = locator;
        let node = {
            let queue = self.levels_mut(side).get_mut(&tick).expect("locator points at live queue");
            let node = queue.remove(order_id).expect("locator points at live node");
            let total = queue.total_base_amount();
            self.index_mut(side).update(tick, total);
            node
        };

        let asset = match side {
            BookSide::Bid => self.config.quote_asset,
            BookSide::Ask => self.config.base_asset,
        };
        let refund: Quote = match side {
            BookSide::Bid => ceil_quote(node.remaining_base, self.tick_to_price(tick)),
            BookSide::Ask => node.remaining_base as Quote,
        };
        if refund > 0 {
            self.ledger
                .unlock(self.executor_id(), node.maker, asset, refund)?;
        }

        let filled_so_far = {
            let record = self.order_index.record(hash).expect("record exists");
            record.initial_base - node.remaining_base
        };
        let status = if Self::is_expired(node.expiry, now) {
            TerminalStatus::Expired
        } else {
            TerminalStatus::Cancelled
        };
        self.order_index.retire(hash, status, filled_so_far);
        events.push(match status {
            TerminalStatus::Expired => BookEvent::OrderExpired {
                hash,
                maker: node.maker,
                order_id,
            },
            _ => BookEvent::OrderCancelled {
                hash,
                maker: node.maker,
                order_id,
            },
        });
        Ok(())
    }

    /// Actively evict up to `max` expired orders resting at `tick`, on
    /// both sides. Returns the number actually evicted and the
    /// `OrderExpired` events raised, one per eviction.
    pub fn cleanup_expired(&mut self, tick: u32, max: usize) -> (usize, Vec<BookEvent>) {
        let now = self.clock.now();
        let mut cleaned = 0usize;
        let mut events = Vec::new();
        for side in [BookSide::Bid, BookSide::Ask] {
            if cleaned >= max {
                break;
            }
            let candidates: Vec<(OrderSeq, OrderHash)> = self
                .levels(side)
                .get(&tick)
                .map(|q| {
                    q.iter()
                        .filter(|n| Self::is_expired(n.expiry, now))
                        .map(|n| (n.order_id, n.order_hash))
                        .collect()
                })
                .unwrap_or_default();
            for (id, hash) in candidates {
                if cleaned >= max {
                    break;
                }
                let locator = Locator { side, tick, order_id: id };
                if self.remove_and_refund(locator, hash, &mut events).is_ok() {
                    cleaned += 1;
                }
            }
        }
        (cleaned, events)
    }
}
