//! Factory/Registry: owns the set of [`Book`]s, keyed by canonical pair
//! triple (spec §4.7). Grounded in the teacher's `BookManagerStd<T>`
//! (`orderbook::manager`) — a shared map of books keyed by identity —
//! generalised from a symbol string key to the spec's canonicalised
//! `(base, quote, tick_size)` triple, and from `HashMap` to `DashMap`
//! since a registry, unlike one `Book`, is a resource genuinely shared
//! and mutated from multiple external callers concurrently.

use crate::book::{Book, PairConfig};
use crate::clock::Clock;
use crate::ledger::Ledger;
use crate::types::{AssetId, BookId, Quote, UserId};
use dashmap::DashMap;
use sha3::{Digest, Keccak256};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Errors raised while creating or looking up books.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    /// One or both assets are not registered as supported on the ledger.
    AssetNotSupported {
        /// The offending asset.
        asset: AssetId,
    },
    /// A book already exists for this canonical triple.
    AlreadyExists {
        /// The colliding canonical key.
        base: AssetId,
        /// The colliding canonical key.
        quote: AssetId,
        /// The colliding tick size.
        tick_size: Quote,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::AssetNotSupported { asset } => {
                write!(f, "asset not supported by ledger: {asset}")
            }
            RegistryError::AlreadyExists {
                base,
                quote,
                tick_size,
            } => write!(
                f,
                "book already exists for ({base}, {quote}) at tick size {tick_size}"
            ),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Canonicalise an unordered asset pair: `(min, max)` by byte value.
#[must_use]
pub fn canonical_pair(a: AssetId, b: AssetId) -> (AssetId, AssetId) {
    if a.0 <= b.0 {
        (a, b)
    } else {
        (b, a)
    }
}

fn derive_book_id(base: AssetId, quote: AssetId, tick_size: Quote) -> BookId {
    let mut buf = Vec::with_capacity(72);
    buf.extend_from_slice(base.as_bytes());
    buf.extend_from_slice(quote.as_bytes());
    buf.extend_from_slice(&tick_size.to_be_bytes());
    let digest = Keccak256::digest(&buf);
    BookId::from_slice(&digest[0..20]).expect("keccak256 digest has at least 20 bytes")
}

/// Owns every [`Book`] in the exchange, keyed by its canonical triple.
///
/// Each `Book` is wrapped in its own `Mutex`, matching the single-threaded
/// cooperative access model of spec §5: the registry only ever needs to
/// hand out exclusive access to one book at a time, never lock more than
/// one simultaneously.
#[derive(Debug, Clone)]
pub struct Registry {
    ledger: Ledger,
    clock: Arc<dyn Clock>,
    books: Arc<DashMap<(AssetId, AssetId, Quote), Arc<Mutex<Book>>>>,
    by_id: Arc<DashMap<BookId, (AssetId, AssetId, Quote)>>,
}

impl Registry {
    /// A registry with no books yet, sharing `ledger` across any future
    /// ones it creates.
    #[must_use]
    pub fn new(ledger: Ledger, clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger,
            clock,
            books: Arc::new(DashMap::new()),
            by_id: Arc::new(DashMap::new()),
        }
    }

    /// Create a book for `(a, b, tick_size)`. Requires both assets to be
    /// ledger-supported and no existing book for the canonical triple;
    /// registers the new book as an authorised ledger executor.
    pub fn create_book(
        &self,
        a: AssetId,
        b: AssetId,
        tick_size: Quote,
    ) -> Result<BookId, RegistryError> {
        let (base, quote) = canonical_pair(a, b);
        if !self.ledger.is_supported(base) {
            return Err(RegistryError::AssetNotSupported { asset: base });
        }
        if !self.ledger.is_supported(quote) {
            return Err(RegistryError::AssetNotSupported { asset: quote });
        }
        let key = (base, quote, tick_size);
        if self.books.contains_key(&key) {
            return Err(RegistryError::AlreadyExists {
                base,
                quote,
                tick_size,
            });
        }

        let book_id = derive_book_id(base, quote, tick_size);
        let config = PairConfig {
            base_asset: base,
            quote_asset: quote,
            tick_size,
        };
        let book = Book::new(book_id, config, self.ledger.clone(), self.clock.clone());
        self.ledger.authorize_executor(UserId(book_id.0));
        self.books.insert(key, Arc::new(Mutex::new(book)));
        self.by_id.insert(book_id, key);
        info!("registry: created book {book_id} for ({base}, {quote}) @ tick {tick_size}");
        Ok(book_id)
    }

    /// Look up a book by its canonical triple.
    #[must_use]
    pub fn get(&self, a: AssetId, b: AssetId, tick_size: Quote) -> Option<Arc<Mutex<Book>>> {
        let (base, quote) = canonical_pair(a, b);
        self.books.get(&(base, quote, tick_size)).map(|e| e.value().clone())
    }

    /// Look up a book directly by its identity, as carried on an
    /// [`crate::order::Order`]'s `book_address` field.
    #[must_use]
    pub fn get_by_id(&self, book_id: BookId) -> Option<Arc<Mutex<Book>>> {
        let key = *self.by_id.get(&book_id)?;
        self.books.get(&key).map(|e| e.value().clone())
    }

    /// Remove a book's registration. The ledger's executor authorisation
    /// for it is left intact (revoking it retroactively would orphan any
    /// resting orders' locked funds); callers that truly want to retire a
    /// book should drain it via cancellation first.
    pub fn remove(&self, a: AssetId, b: AssetId, tick_size: Quote) -> bool {
        let (base, quote) = canonical_pair(a, b);
        let key = (base, quote, tick_size);
        let removed = self.books.remove(&key).is_some();
        if removed {
            self.by_id.retain(|_, v| *v != key);
            warn!("registry: removed book registration for ({base}, {quote}) @ tick {tick_size}");
        }
        removed
    }
}
