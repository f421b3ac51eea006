//! Gateway error types.

use crate::book::BookError;
use crate::types::{AssetId, BookId, Quote, UserId};
use std::fmt;

/// Errors surfaced by [`super::Gateway`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GatewayError {
    /// No book is registered for the resolved `(base, quote, tick_size)`.
    BookNotFound {
        /// Canonical base asset.
        base: AssetId,
        /// Canonical quote asset.
        quote: AssetId,
        /// Requested tick size.
        tick_size: Quote,
    },
    /// An order named a `book_address` with no registered book.
    BookNotFoundById {
        /// The unresolved book identity.
        book_id: BookId,
    },
    /// The order's `(base_asset, quote_asset)` don't match the resolved
    /// book's configured pair.
    BookMismatch,
    /// Neither does the caller equal the maker, nor did the supplied
    /// signature recover to the maker.
    SignatureInvalid,
    /// `order.nonce` was smaller than the maker's next expected nonce.
    NonceNotMonotonic {
        /// Maker whose nonce was rejected.
        maker: UserId,
        /// The nonce the gateway expected (or greater).
        expected: u64,
        /// The nonce actually submitted.
        got: u64,
    },
    /// The underlying book rejected the order or cancellation.
    Book(BookError),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::BookNotFound {
                base,
                quote,
                tick_size,
            } => write!(
                f,
                "no book for pair ({base}, {quote}) at tick size {tick_size}"
            ),
            GatewayError::BookNotFoundById { book_id } => {
                write!(f, "no book registered for book_address {book_id}")
            }
            GatewayError::BookMismatch => {
                write!(f, "order's (base_asset, quote_asset) do not match the resolved book")
            }
            GatewayError::SignatureInvalid => write!(f, "signature does not recover to maker"),
            GatewayError::NonceNotMonotonic {
                maker,
                expected,
                got,
            } => write!(
                f,
                "nonce not monotonic for {maker}: expected >= {expected}, got {got}"
            ),
            GatewayError::Book(inner) => write!(f, "{inner}"),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<BookError> for GatewayError {
    fn from(inner: BookError) -> Self {
        GatewayError::Book(inner)
    }
}
