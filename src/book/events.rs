//! Domain events emitted by a [`super::Book`], in execution order (spec §6).
//!
//! These are kept distinct from `tracing` spans/events (spec §9's open
//! question (b) — a production system should not interleave debug-quality
//! log lines with the domain event stream). Callers that want a durable
//! event log should subscribe to a [`BookEvent`] sink; `tracing` is for
//! operational visibility only.

use crate::types::{Base, OrderHash, OrderSeq, Quote, UserId};

/// One domain event raised by a book operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookEvent {
    /// A residual (or wholly new) order now rests in the book.
    OrderPlaced {
        /// Order identity.
        hash: OrderHash,
        /// Order owner.
        maker: UserId,
        /// Book-local queue id.
        order_id: OrderSeq,
        /// Base amount resting.
        remaining_base: Base,
    },
    /// One match between a resting maker and the incoming taker.
    OrderFilled {
        /// Maker's order hash.
        hash: OrderHash,
        /// Resting side's owner.
        maker: UserId,
        /// Incoming side's owner.
        taker: UserId,
        /// Base units exchanged.
        fill_base: Base,
        /// Quote units exchanged (`floor`, maker's price).
        quote: Quote,
        /// Price the fill settled at (always the maker's).
        price: Quote,
        /// `true` if this fill fully consumed the maker's node.
        is_final_for_maker: bool,
    },
    /// A live order was removed by its maker (or a valid signed third
    /// party) before being filled or expiring.
    OrderCancelled {
        /// Order identity.
        hash: OrderHash,
        /// Order owner.
        maker: UserId,
        /// Book-local queue id.
        order_id: OrderSeq,
    },
    /// A live order was evicted because its expiry had passed.
    OrderExpired {
        /// Order identity.
        hash: OrderHash,
        /// Order owner.
        maker: UserId,
        /// Book-local queue id.
        order_id: OrderSeq,
    },
}
