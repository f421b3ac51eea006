//! Validates, authenticates, and routes signed orders to their `Book`
//! (spec §4.6). The one component that talks to external callers.

mod error;
mod nonce;
pub mod signature;

pub use error::GatewayError;
pub use nonce::NonceTracker;
pub use signature::SignatureBytes;

use crate::book::PlaceResult;
use crate::order::{hash_order, DomainSeparator, Order};
use crate::registry::Registry;
use crate::types::{AssetId, OrderHash, Quote, UserId};
use tracing::trace;

/// Outcome of a successful `place_limit_order` call (spec §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOutcome {
    /// Canonical hash of the accepted order.
    pub hash: OrderHash,
    /// Base units matched immediately.
    pub filled_base: u64,
}

/// Routes authenticated order flow into the [`Registry`]'s books.
#[derive(Debug, Clone)]
pub struct Gateway {
    domain: DomainSeparator,
    registry: Registry,
    nonces: std::sync::Arc<NonceTracker>,
}

impl Gateway {
    /// Create a gateway over `registry`, signing orders under `domain`.
    #[must_use]
    pub fn new(domain: DomainSeparator, registry: Registry) -> Self {
        Self {
            domain,
            registry,
            nonces: std::sync::Arc::new(NonceTracker::new()),
        }
    }

    /// The canonical hash `order` would be assigned.
    #[must_use]
    pub fn hash_order(&self, order: &Order) -> OrderHash {
        hash_order(order, &self.domain)
    }

    /// The next nonce `user` is expected to submit.
    #[must_use]
    pub fn get_user_nonce(&self, user: UserId) -> u64 {
        self.nonces.next_nonce(user)
    }

    fn authenticate(
        &self,
        hash: OrderHash,
        maker: UserId,
        caller: UserId,
        signature: Option<SignatureBytes>,
    ) -> Result<(), GatewayError> {
        if caller == maker {
            return Ok(());
        }
        match signature {
            Some(sig) if signature::verify(&hash, &sig, maker) => Ok(()),
            _ => Err(GatewayError::SignatureInvalid),
        }
    }

    /// Resolve the book an already-hashed, already-authenticated `order`
    /// names via its `book_address`, and confirm its configured pair
    /// actually matches the order's `(base_asset, quote_asset)`.
    fn resolve_book_for_order(
        &self,
        order: &Order,
    ) -> Result<std::sync::Arc<std::sync::Mutex<crate::book::Book>>, GatewayError> {
        let book = self
            .registry
            .get_by_id(order.book_address)
            .ok_or(GatewayError::BookNotFoundById {
                book_id: order.book_address,
            })?;
        {
            let guard = book.lock().expect("book mutex poisoned");
            let config = guard.config();
            if config.base_asset != order.base_asset || config.quote_asset != order.quote_asset {
                return Err(GatewayError::BookMismatch);
            }
        }
        Ok(book)
    }

    /// Resolve a book by its canonical `(base, quote, tick_size)` triple;
    /// used by callers that address a book without an `Order` in hand.
    fn resolve_book_by_pair(
        &self,
        base: AssetId,
        quote: AssetId,
        tick_size: Quote,
    ) -> Result<std::sync::Arc<std::sync::Mutex<crate::book::Book>>, GatewayError> {
        self.registry
            .get(base, quote, tick_size)
            .ok_or(GatewayError::BookNotFound {
                base,
                quote,
                tick_size,
            })
    }

    /// Accept one signed limit order: authenticate, enforce nonce
    /// monotonicity, resolve the book, and place it.
    pub fn place_limit_order(
        &self,
        caller: UserId,
        order: Order,
        signature: Option<SignatureBytes>,
    ) -> Result<PlaceOutcome, GatewayError> {
        let hash = self.hash_order(&order);
        self.authenticate(hash, order.maker, caller, signature)?;
        self.nonces.check_and_advance(order.maker, order.nonce)?;

        let book = self.resolve_book_for_order(&order)?;
        trace!("gateway: placing order {hash} for maker {}", order.maker);
        let mut guard = book.lock().expect("book mutex poisoned");
        let result: PlaceResult = guard.place(&order, hash)?;
        Ok(PlaceOutcome {
            hash: result.order_hash,
            filled_base: result.filled_base,
        })
    }

    /// Batch variant of [`Self::place_limit_order`]; each item's
    /// success/failure is independent (spec §4.6).
    pub fn batch_place_limit_orders(
        &self,
        caller: UserId,
        orders: Vec<(Order, Option<SignatureBytes>)>,
    ) -> Vec<Result<PlaceOutcome, GatewayError>> {
        orders
            .into_iter()
            .map(|(order, sig)| self.place_limit_order(caller, order, sig))
            .collect()
    }

    /// Cancel by full order tuple (enables signed cancel-by-third-party).
    pub fn cancel_order(
        &self,
        caller: UserId,
        order: Order,
        signature: Option<SignatureBytes>,
    ) -> Result<(), GatewayError> {
        let hash = self.hash_order(&order);
        self.authenticate(hash, order.maker, caller, signature)?;
        let book = self.resolve_book_for_order(&order)?;
        let mut guard = book.lock().expect("book mutex poisoned");
        let events = guard.cancel_by_hash(hash, order.maker)?;
        trace!("gateway: cancelled order {hash}, {} event(s)", events.len());
        Ok(())
    }

    /// Cancel by hash alone; maker-only (`caller` must equal the live
    /// order's maker — enforced at the book).
    pub fn cancel_order_by_hash(
        &self,
        caller: UserId,
        base: AssetId,
        quote: AssetId,
        tick_size: Quote,
        hash: OrderHash,
    ) -> Result<(), GatewayError> {
        let book = self.resolve_book_by_pair(base, quote, tick_size)?;
        let mut guard = book.lock().expect("book mutex poisoned");
        let events = guard.cancel_by_hash(hash, caller)?;
        trace!("gateway: cancelled order {hash}, {} event(s)", events.len());
        Ok(())
    }

    /// Batch variant of [`Self::cancel_order`].
    pub fn batch_cancel_orders(
        &self,
        caller: UserId,
        orders: Vec<(Order, Option<SignatureBytes>)>,
    ) -> Vec<Result<(), GatewayError>> {
        orders
            .into_iter()
            .map(|(order, sig)| self.cancel_order(caller, order, sig))
            .collect()
    }

    /// Actively evict up to `max` expired orders at `(book, tick)`.
    pub fn cleanup_expired_orders(
        &self,
        base: AssetId,
        quote: AssetId,
        tick_size: Quote,
        tick: u32,
        max: usize,
    ) -> Result<usize, GatewayError> {
        let book = self.resolve_book_by_pair(base, quote, tick_size)?;
        let mut guard = book.lock().expect("book mutex poisoned");
        let (cleaned, events) = guard.cleanup_expired(tick, max);
        trace!("gateway: cleaned {cleaned} expired order(s), {} event(s)", events.len());
        Ok(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::ledger::Ledger;
    use crate::registry::Registry;
    use crate::types::{AssetId, BookId, Side, PRICE_SCALE};

    fn asset(n: u8) -> AssetId {
        AssetId([n; 20])
    }

    fn user(n: u8) -> UserId {
        UserId([n; 20])
    }

    fn setup() -> (Gateway, BookId) {
        let ledger = Ledger::new();
        ledger.add_supported_asset(asset(1));
        ledger.add_supported_asset(asset(2));
        ledger.deposit(user(1), asset(1), 1_000).unwrap();
        ledger.deposit(user(2), asset(2), 1_000_000).unwrap();

        let registry = Registry::new(ledger, FixedClock::new(1_000));
        let book_id = registry
            .create_book(asset(1), asset(2), PRICE_SCALE)
            .unwrap();
        let domain = DomainSeparator {
            name: "clob",
            version: 1,
            chain_id: 1,
            gateway: UserId::ZERO,
        };
        (Gateway::new(domain, registry), book_id)
    }

    fn order(maker: UserId, book_id: BookId, side: Side, base_amount: u64, price: Quote) -> Order {
        Order {
            maker,
            base_asset: asset(1),
            quote_asset: asset(2),
            book_address: book_id,
            base_amount,
            price,
            side,
            expiry: 0,
            nonce: 0,
        }
    }

    #[test]
    fn place_resolves_book_from_order_address() {
        let (gateway, book_id) = setup();
        let sell = order(user(1), book_id, Side::SellBase, 100, PRICE_SCALE);
        let outcome = gateway.place_limit_order(user(1), sell, None).unwrap();
        assert_eq!(outcome.filled_base, 0);
    }

    #[test]
    fn place_rejects_unknown_book_address() {
        let (gateway, _book_id) = setup();
        let bogus = order(user(1), BookId([0xff; 20]), Side::SellBase, 100, PRICE_SCALE);
        let err = gateway.place_limit_order(user(1), bogus, None).unwrap_err();
        assert_eq!(
            err,
            GatewayError::BookNotFoundById {
                book_id: BookId([0xff; 20])
            }
        );
    }

    #[test]
    fn place_rejects_pair_mismatch_against_resolved_book() {
        let (gateway, book_id) = setup();
        let mut mismatched = order(user(1), book_id, Side::SellBase, 100, PRICE_SCALE);
        mismatched.base_asset = asset(9);
        let err = gateway
            .place_limit_order(user(1), mismatched, None)
            .unwrap_err();
        assert_eq!(err, GatewayError::BookMismatch);
    }

    #[test]
    fn self_place_requires_no_signature() {
        let (gateway, book_id) = setup();
        let sell = order(user(1), book_id, Side::SellBase, 50, PRICE_SCALE);
        assert!(gateway.place_limit_order(user(1), sell, None).is_ok());
    }

    #[test]
    fn third_party_caller_without_valid_signature_is_rejected() {
        let (gateway, book_id) = setup();
        let sell = order(user(1), book_id, Side::SellBase, 50, PRICE_SCALE);
        let err = gateway
            .place_limit_order(user(2), sell, None)
            .unwrap_err();
        assert_eq!(err, GatewayError::SignatureInvalid);
    }

    #[test]
    fn replayed_nonce_is_rejected() {
        let (gateway, book_id) = setup();
        let first = order(user(1), book_id, Side::SellBase, 10, PRICE_SCALE);
        gateway.place_limit_order(user(1), first, None).unwrap();

        let replay = order(user(1), book_id, Side::SellBase, 10, PRICE_SCALE);
        let err = gateway.place_limit_order(user(1), replay, None).unwrap_err();
        assert_eq!(
            err,
            GatewayError::NonceNotMonotonic {
                maker: user(1),
                expected: 1,
                got: 0,
            }
        );
    }

    #[test]
    fn cancel_by_order_tuple_removes_resting_order() {
        let (gateway, book_id) = setup();
        let sell = order(user(1), book_id, Side::SellBase, 50, PRICE_SCALE);
        gateway.place_limit_order(user(1), sell, None).unwrap();
        assert!(gateway.cancel_order(user(1), sell, None).is_ok());
    }

    #[test]
    fn cancel_by_hash_resolves_book_by_pair() {
        let (gateway, book_id) = setup();
        let sell = order(user(1), book_id, Side::SellBase, 50, PRICE_SCALE);
        let hash = gateway.hash_order(&sell);
        gateway.place_limit_order(user(1), sell, None).unwrap();
        gateway
            .cancel_order_by_hash(user(1), asset(1), asset(2), PRICE_SCALE, hash)
            .unwrap();
    }

    #[test]
    fn batch_place_is_independent_per_item() {
        let (gateway, book_id) = setup();
        let good = order(user(1), book_id, Side::SellBase, 50, PRICE_SCALE);
        let mut bad = order(user(1), BookId([0xaa; 20]), Side::SellBase, 50, PRICE_SCALE);
        bad.nonce = 1;
        let results = gateway.batch_place_limit_orders(user(1), vec![(good, None), (bad, None)]);
        assert!(results[0].is_ok());
        assert_eq!(
            results[1],
            Err(GatewayError::BookNotFoundById {
                book_id: BookId([0xaa; 20])
            })
        );
    }
}
