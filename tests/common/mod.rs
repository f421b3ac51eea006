use clob_core::prelude::*;
use std::sync::Arc;

pub fn asset(n: u8) -> AssetId {
    AssetId([n; 20])
}

pub fn user(n: u8) -> UserId {
    UserId([n; 20])
}

pub const BASE: u8 = 1;
pub const QUOTE: u8 = 2;

/// A ledger with `BASE`/`QUOTE` supported and every named user funded
/// generously in both, ready to back a freshly created book.
pub fn funded_ledger(users: &[u8]) -> Ledger {
    let ledger = Ledger::new();
    ledger.add_supported_asset(asset(BASE));
    ledger.add_supported_asset(asset(QUOTE));
    for &n in users {
        ledger.deposit(user(n), asset(BASE), 1_000_000).unwrap();
        ledger.deposit(user(n), asset(QUOTE), 1_000_000_000).unwrap();
    }
    ledger
}

/// A standalone book over `(BASE, QUOTE)` at `tick_size`, authorised as
/// an executor on `ledger`, ticking from `FixedClock::new(now)`.
pub fn book(ledger: &Ledger, tick_size: Quote, now: u64) -> (Book, Arc<FixedClock>) {
    let clock = FixedClock::new(now);
    let book_id = BookId([0xAB; 20]);
    ledger.authorize_executor(UserId(book_id.0));
    let config = PairConfig {
        base_asset: asset(BASE),
        quote_asset: asset(QUOTE),
        tick_size,
    };
    (
        Book::new(book_id, config, ledger.clone(), clock.clone()),
        clock,
    )
}

pub fn order(maker: UserId, book_id: BookId, side: Side, base_amount: u64, price: Quote, expiry: u64) -> Order {
    Order {
        maker,
        base_asset: asset(BASE),
        quote_asset: asset(QUOTE),
        book_address: book_id,
        base_amount,
        price,
        side,
        expiry,
        nonce: 0,
    }
}

pub fn domain() -> DomainSeparator {
    DomainSeparator {
        name: "clob",
        version: 1,
        chain_id: 1,
        gateway: UserId::ZERO,
    }
}
