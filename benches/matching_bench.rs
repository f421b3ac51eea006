use clob_core::prelude::*;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use std::sync::Arc;

fn asset(n: u8) -> AssetId {
    AssetId([n; 20])
}

fn user(n: u8) -> UserId {
    UserId([n; 20])
}

fn bench_domain() -> DomainSeparator {
    DomainSeparator {
        name: "bench",
        version: 1,
        chain_id: 1,
        gateway: UserId::ZERO,
    }
}

fn new_book() -> (Book, Ledger) {
    let ledger = Ledger::new();
    ledger.add_supported_asset(asset(1));
    ledger.add_supported_asset(asset(2));
    for n in 0..=255u8 {
        ledger.deposit(user(n), asset(1), 1_000_000_000).unwrap();
        ledger.deposit(user(n), asset(2), 1_000_000_000_000).unwrap();
    }
    let clock = FixedClock::new(1_000);
    let book_id = BookId([0xAB; 20]);
    ledger.authorize_executor(UserId(book_id.0));
    let config = PairConfig {
        base_asset: asset(1),
        quote_asset: asset(2),
        tick_size: PRICE_SCALE,
    };
    let book = Book::new(book_id, config, ledger.clone(), clock);
    (book, ledger)
}

/// `depth` resting asks, cycled across up to `MAX_TICK_INDEX` distinct
/// ticks so levels stack orders once `depth` exceeds the tick count,
/// each from a distinct maker so the taker never skips a self-trade.
fn book_with_stacked_levels(depth: u64) -> (Book, Ledger) {
    const TICK_CAP: u64 = 20_000;
    let (mut book, ledger) = new_book();
    let domain = bench_domain();
    for i in 0..depth {
        let maker = user((i % 200) as u8);
        let tick = (i % TICK_CAP) + 1;
        let order = Order {
            maker,
            base_asset: asset(1),
            quote_asset: asset(2),
            book_address: book.book_id(),
            base_amount: 10,
            price: tick as Quote * PRICE_SCALE,
            side: Side::SellBase,
            expiry: 0,
            nonce: i,
        };
        let hash = hash_order(&order, &domain);
        book.place(&order, hash).unwrap();
    }
    (book, ledger)
}

/// One resting ask per tick, `1..=depth` — a ladder a single sweep can
/// walk top to bottom.
fn book_with_tick_ladder(depth: u64) -> (Book, Ledger) {
    let (mut book, ledger) = new_book();
    let domain = bench_domain();
    for tick in 1..=depth {
        let maker = user((tick % 200) as u8);
        let order = Order {
            maker,
            base_asset: asset(1),
            quote_asset: asset(2),
            book_address: book.book_id(),
            base_amount: 10,
            price: tick as Quote * PRICE_SCALE,
            side: Side::SellBase,
            expiry: 0,
            nonce: tick,
        };
        let hash = hash_order(&order, &domain);
        book.place(&order, hash).unwrap();
    }
    (book, ledger)
}

/// Placing a fresh resting order into a book whose opposite side is
/// empty: no sweep, pure insertion into the price-level queue and tick
/// index.
fn bench_resting_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("Book - resting insert");
    for &depth in &[0u64, 1_000, 10_000, 50_000] {
        group.bench_with_input(BenchmarkId::new("place_resting_ask", depth), &depth, |b, &depth| {
            b.iter_with_setup(
                || book_with_stacked_levels(depth),
                |(mut book, _ledger)| {
                    let order = Order {
                        maker: user(253),
                        base_asset: asset(1),
                        quote_asset: asset(2),
                        book_address: book.book_id(),
                        base_amount: 10,
                        price: PRICE_SCALE * 2,
                        side: Side::SellBase,
                        expiry: 0,
                        nonce: u64::MAX,
                    };
                    let hash = hash_order(&order, &bench_domain());
                    black_box(book.place(&order, hash).unwrap());
                },
            );
        });
    }
    group.finish();
}

/// A taker that sweeps across `depth` resting price levels in one call —
/// the matching engine's hot path.
fn bench_sweep_across_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("Book - sweeping match");
    for &depth in &[10u64, 100, 1_000] {
        group.bench_with_input(BenchmarkId::new("buy_sweeps_all_asks", depth), &depth, |b, &depth| {
            b.iter_with_setup(
                || book_with_tick_ladder(depth),
                |(mut book, _ledger)| {
                    let order = Order {
                        maker: user(254),
                        base_asset: asset(1),
                        quote_asset: asset(2),
                        book_address: book.book_id(),
                        base_amount: 10 * depth,
                        price: depth as Quote * PRICE_SCALE,
                        side: Side::BuyBase,
                        expiry: 0,
                        nonce: u64::MAX,
                    };
                    let hash = hash_order(&order, &bench_domain());
                    black_box(book.place(&order, hash).unwrap());
                },
            );
        });
    }
    group.finish();
}

/// Registry book lookup by canonical pair — the shape of traffic a
/// running gateway actually sees on every order.
fn bench_registry_lookup(c: &mut Criterion) {
    let ledger = Ledger::new();
    ledger.add_supported_asset(asset(1));
    ledger.add_supported_asset(asset(2));
    let registry = Registry::new(ledger, FixedClock::new(1_000));
    registry
        .create_book(asset(1), asset(2), PRICE_SCALE)
        .unwrap();
    let registry = Arc::new(registry);

    c.bench_function("Registry - get by canonical pair", |b| {
        b.iter(|| black_box(registry.get(asset(1), asset(2), PRICE_SCALE).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_resting_insert,
    bench_sweep_across_levels,
    bench_registry_lookup,
);
criterion_main!(benches);
