//! Book / matching-engine error types.

use crate::ledger::LedgerError;
use crate::types::{Base, OrderHash, Quote, UserId};
use std::fmt;

/// Errors surfaced by [`super::Book`] operations.
///
/// Follows the same manual `Display` + `std::error::Error` convention as
/// [`crate::ledger::LedgerError`], composing lower-layer ledger failures
/// via `From` the way `orderbook::error::OrderBookError` wraps
/// `PriceLevelError`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BookError {
    /// The order's `book_address` doesn't match this book's identity.
    PairMismatch,
    /// `base_amount` was zero.
    ZeroAmount,
    /// Price was zero, or not a positive multiple of the book's tick size.
    InvalidPrice {
        /// The rejected price.
        price: Quote,
        /// The book's tick size.
        tick_size: Quote,
    },
    /// Price's tick index exceeds the bitmap's capacity.
    TickOutOfRange {
        /// Resolved tick index.
        tick: u32,
        /// Inclusive upper bound.
        max_tick: u32,
    },
    /// The order's `expiry` was already in the past at submission time.
    ExpiredOnSubmit {
        /// Submitted expiry, epoch seconds.
        expiry: u64,
        /// Engine time at submission.
        now: u64,
    },
    /// An order with this hash is already live.
    DuplicateHash {
        /// The colliding hash.
        hash: OrderHash,
    },
    /// A fill (or the up-front lock) would round its quote amount to zero.
    QuoteRoundsToZero {
        /// Base amount that produced a zero quote.
        base: Base,
        /// Price used in the computation.
        price: Quote,
    },
    /// No live order exists for this hash.
    OrderNotFound {
        /// The hash that was looked up.
        hash: OrderHash,
    },
    /// `caller` is not the order's maker and so may not cancel it.
    NotMaker {
        /// Hash of the order.
        hash: OrderHash,
        /// The order's actual maker.
        maker: UserId,
        /// The caller that attempted the cancellation.
        caller: UserId,
    },
    /// A settlement call into the ledger failed; the placement or
    /// cancellation that triggered it is aborted in its entirety (spec §7).
    Settlement(LedgerError),
}

impl fmt::Display for BookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookError::PairMismatch => write!(f, "order's book_address does not match this book"),
            BookError::ZeroAmount => write!(f, "base_amount must be non-zero"),
            BookError::InvalidPrice { price, tick_size } => {
                write!(f, "price {price} is not a positive multiple of tick size {tick_size}")
            }
            BookError::TickOutOfRange { tick, max_tick } => {
                write!(f, "tick {tick} exceeds maximum tick index {max_tick}")
            }
            BookError::ExpiredOnSubmit { expiry, now } => {
                write!(f, "order already expired: expiry={expiry}, now={now}")
            }
            BookError::DuplicateHash { hash } => write!(f, "order hash already live: {hash}"),
            BookError::QuoteRoundsToZero { base, price } => write!(
                f,
                "quote amount rounds to zero for base {base} at price {price}"
            ),
            BookError::OrderNotFound { hash } => write!(f, "no live order for hash {hash}"),
            BookError::NotMaker {
                hash,
                maker,
                caller,
            } => write!(
                f,
                "caller {caller} is not the maker of order {hash} (maker is {maker})"
            ),
            BookError::Settlement(inner) => write!(f, "settlement failed: {inner}"),
        }
    }
}

impl std::error::Error for BookError {}

impl From<LedgerError> for BookError {
    fn from(inner: LedgerError) -> Self {
        BookError::Settlement(inner)
    }
}
