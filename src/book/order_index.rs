//! Hash-keyed order lookup and per-user enumeration (spec §3, §4).

use crate::types::{Base, BookSide, OrderHash, OrderSeq, UserId};
use std::collections::HashMap;

/// Locator for a live order: which queue it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locator {
    /// Side of the book.
    pub side: BookSide,
    /// Tick the order rests at.
    pub tick: u32,
    /// Book-local node id, for queue linkage.
    pub order_id: OrderSeq,
}

/// Terminal status an order settles into once it leaves the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TerminalStatus {
    /// Fully matched.
    Filled,
    /// Removed by its maker (or a third party with a valid signature).
    Cancelled,
    /// Evicted because its expiry had passed.
    Expired,
}

/// Bookkeeping record for one order hash, live or terminal.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    /// Order owner.
    pub maker: UserId,
    /// `base_amount` at acceptance time.
    pub initial_base: Base,
    /// Epoch seconds the order was accepted.
    pub created_at: u64,
    /// Set once the order leaves the book for the last time.
    pub final_status: Option<TerminalStatus>,
    /// Valid once `final_status` is set.
    pub final_filled_base: Base,
}

/// Maps order hashes to their live locator and user-facing status history.
#[derive(Debug, Default)]
pub struct OrderIndex {
    by_hash: HashMap<OrderHash, Locator>,
    by_id: HashMap<OrderSeq, (BookSide, u32)>,
    by_user: HashMap<UserId, Vec<OrderHash>>,
    records: HashMap<OrderHash, OrderRecord>,
}

impl OrderIndex {
    /// An empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly-accepted live order.
    pub fn insert(
        &mut self,
        hash: OrderHash,
        maker: UserId,
        locator: Locator,
        initial_base: Base,
        created_at: u64,
    ) {
        self.by_hash.insert(hash, locator);
        self.by_id
            .insert(locator.order_id, (locator.side, locator.tick));
        self.by_user.entry(maker).or_default().push(hash);
        self.records.insert(
            hash,
            OrderRecord {
                maker,
                initial_base,
                created_at,
                final_status: None,
                final_filled_base: 0,
            },
        );
    }

    /// Locator for a currently-live order hash.
    #[must_use]
    pub fn locate(&self, hash: OrderHash) -> Option<Locator> {
        self.by_hash.get(&hash).copied()
    }

    /// `(side, tick)` for a live book-local id — used when a sweep only
    /// has the queue node in hand and needs to find its hash.
    #[must_use]
    pub fn locate_by_id(&self, id: OrderSeq) -> Option<(BookSide, u32)> {
        self.by_id.get(&id).copied()
    }

    /// All order hashes ever submitted by `user`, live or terminal.
    #[must_use]
    pub fn user_orders(&self, user: UserId) -> Vec<OrderHash> {
        self.by_user.get(&user).cloned().unwrap_or_default()
    }

    /// Full status record for a hash, live or terminal.
    #[must_use]
    pub fn record(&self, hash: OrderHash) -> Option<&OrderRecord> {
        self.records.get(&hash)
    }

    /// `true` if `hash` currently has a live node in some queue.
    #[must_use]
    pub fn is_live(&self, hash: OrderHash) -> bool {
        self.by_hash.contains_key(&hash)
    }

    /// Remove an order from the live index and set its terminal status.
    /// The queue-side removal (unlinking the node) is the caller's job;
    /// this only updates bookkeeping.
    pub fn retire(&mut self, hash: OrderHash, status: TerminalStatus, filled_base: Base) {
        if let Some(locator) = self.by_hash.remove(&hash) {
            self.by_id.remove(&locator.order_id);
        }
        if let Some(record) = self.records.get_mut(&hash) {
            record.final_status = Some(status);
            record.final_filled_base = filled_base;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(n: u8) -> OrderHash {
        OrderHash([n; 32])
    }
    fn user(n: u8) -> UserId {
        UserId([n; 20])
    }

    #[test]
    fn insert_then_locate_round_trips() {
        let mut idx = OrderIndex::new();
        let locator = Locator {
            side: BookSide::Ask,
            tick: 5,
            order_id: 1,
        };
        idx.insert(hash(1), user(1), locator, 10, 1000);
        assert_eq!(idx.locate(hash(1)), Some(locator));
        assert_eq!(idx.locate_by_id(1), Some((BookSide::Ask, 5)));
        assert_eq!(idx.user_orders(user(1)), vec![hash(1)]);
        assert!(idx.is_live(hash(1)));
    }

    #[test]
    fn retire_clears_liveness_but_keeps_record() {
        let mut idx = OrderIndex::new();
        let locator = Locator {
            side: BookSide::Ask,
            tick: 5,
            order_id: 1,
        };
        idx.insert(hash(1), user(1), locator, 10, 1000);
        idx.retire(hash(1), TerminalStatus::Filled, 10);

        assert!(!idx.is_live(hash(1)));
        assert_eq!(idx.locate(hash(1)), None);
        assert_eq!(idx.locate_by_id(1), None);
        let record = idx.record(hash(1)).unwrap();
        assert_eq!(record.final_status, Some(TerminalStatus::Filled));
        assert_eq!(record.final_filled_base, 10);
        // user_orders enumeration survives retirement, for history queries
        assert_eq!(idx.user_orders(user(1)), vec![hash(1)]);
    }
}
