//! The six literal end-to-end scenarios from the matching engine's
//! behavioural spec, with the exact values they name: `PRICE_SCALE =
//! 10^18`, `tick_size = 1`, 6-decimal base.

mod common;

use clob_core::prelude::*;
use common::*;

fn scaled(n: u64) -> Quote {
    n as Quote * PRICE_SCALE
}

/// S1. Single crossing fill with partial residual and taker refund.
#[test]
fn s1_single_crossing_fill() {
    let ledger = funded_ledger(&[1, 2]);
    let (mut book, _clock) = book(&ledger, PRICE_SCALE, 1_000);
    let d = domain();

    let alice_sell = order(user(1), book.book_id(), Side::SellBase, 100, scaled(2), 0);
    let hash = clob_core::hash_order(&alice_sell, &d);
    let r1 = book.place(&alice_sell, hash).unwrap();
    assert_eq!(r1.filled_base, 0);
    assert_eq!(r1.residual_base, 100);

    let bob_buy = order(user(2), book.book_id(), Side::BuyBase, 60, scaled(3), 0);
    let hash2 = clob_core::hash_order(&bob_buy, &d);
    let r2 = book.place(&bob_buy, hash2).unwrap();

    assert_eq!(r2.filled_base, 60);
    assert_eq!(r2.residual_base, 0);

    // Alice received 60 * 2 = 120 quote; Bob received 60 base.
    assert_eq!(ledger.get_available_balance(user(1), asset(QUOTE)), 1_000_000_000 + 120);
    assert_eq!(ledger.get_available_balance(user(2), asset(BASE)), 1_000_000 + 60);

    // Bob locked ceil(60*3)=180, spent 120, refunded 60.
    assert_eq!(ledger.get_locked_balance(user(2), asset(QUOTE)), 0);

    let best_ask = book.get_best_ask().unwrap();
    assert_eq!(best_ask.price, scaled(2));
    assert_eq!(best_ask.total_base, 40);
    assert!(book.get_best_bid().is_none());
}

/// S2. FIFO ordering within one price level.
#[test]
fn s2_fifo_at_a_price_level() {
    let ledger = funded_ledger(&[1, 2, 3]);
    let (mut book, _clock) = book(&ledger, PRICE_SCALE, 1_000);
    let d = domain();

    let alice = order(user(1), book.book_id(), Side::SellBase, 10, scaled(5), 0);
    let alice_hash = clob_core::hash_order(&alice, &d);
    book.place(&alice, alice_hash).unwrap();

    let bob = order(user(2), book.book_id(), Side::SellBase, 10, scaled(5), 0);
    let bob_hash = clob_core::hash_order(&bob, &d);
    book.place(&bob, bob_hash).unwrap();

    let carol = order(user(3), book.book_id(), Side::BuyBase, 15, scaled(5), 0);
    let carol_hash = clob_core::hash_order(&carol, &d);
    let result = book.place(&carol, carol_hash).unwrap();

    assert_eq!(result.filled_base, 15);
    assert_eq!(result.residual_base, 0);

    let fills: Vec<_> = result
        .events
        .iter()
        .filter_map(|e| match e {
            BookEvent::OrderFilled { hash, fill_base, price, .. } => Some((*hash, *fill_base, *price)),
            _ => None,
        })
        .collect();
    assert_eq!(fills, vec![(alice_hash, 10, scaled(5)), (bob_hash, 5, scaled(5))]);

    assert_eq!(
        book.get_order_info(alice_hash).unwrap().status,
        OrderStatus::Terminal(TerminalStatus::Filled)
    );
    let bob_details = book.get_order_details(bob_hash);
    assert!(bob_details.exists);
    assert_eq!(bob_details.remaining_base, 5);
}

/// S3. Self-trade is a skip, not a fill; both orders end up resting.
#[test]
fn s3_self_trade_skip() {
    let ledger = funded_ledger(&[1]);
    let (mut book, _clock) = book(&ledger, PRICE_SCALE, 1_000);
    let d = domain();

    let sell = order(user(1), book.book_id(), Side::SellBase, 10, scaled(5), 0);
    let sell_hash = clob_core::hash_order(&sell, &d);
    book.place(&sell, sell_hash).unwrap();

    let mut buy = order(user(1), book.book_id(), Side::BuyBase, 10, scaled(5), 0);
    buy.nonce = 1;
    let buy_hash = clob_core::hash_order(&buy, &d);
    let result = book.place(&buy, buy_hash).unwrap();

    assert_eq!(result.filled_base, 0);
    assert_eq!(result.residual_base, 10);

    assert_eq!(book.get_best_ask().unwrap().price, scaled(5));
    assert_eq!(book.get_best_ask().unwrap().total_base, 10);
    assert_eq!(book.get_best_bid().unwrap().price, scaled(5));
    assert_eq!(book.get_best_bid().unwrap().total_base, 10);
}

/// S4. A taker's sweep evicts an expired maker instead of matching it.
#[test]
fn s4_expired_maker_evicted_by_sweep() {
    let ledger = funded_ledger(&[1, 2]);
    let (mut book, clock) = book(&ledger, PRICE_SCALE, 100);
    let d = domain();

    let alice = order(user(1), book.book_id(), Side::SellBase, 10, scaled(5), 150);
    let alice_hash = clob_core::hash_order(&alice, &d);
    book.place(&alice, alice_hash).unwrap();
    let locked_before = ledger.get_locked_balance(user(1), asset(BASE));
    assert_eq!(locked_before, 10);

    clock.set(200);
    let bob = order(user(2), book.book_id(), Side::BuyBase, 10, scaled(5), 0);
    let bob_hash = clob_core::hash_order(&bob, &d);
    let result = book.place(&bob, bob_hash).unwrap();

    assert_eq!(result.filled_base, 0);
    assert_eq!(result.residual_base, 10);
    assert!(result
        .events
        .iter()
        .any(|e| matches!(e, BookEvent::OrderExpired { hash, .. } if *hash == alice_hash)));

    assert_eq!(ledger.get_locked_balance(user(1), asset(BASE)), 0);
    let info = book.get_order_info(alice_hash).unwrap();
    assert_eq!(info.status, OrderStatus::Terminal(TerminalStatus::Expired));
    assert_eq!(info.filled_base, 0);

    assert_eq!(book.get_best_bid().unwrap().price, scaled(5));
}

/// S5. Price improvement: the taker settles at the maker's price, not
/// its own limit, and is refunded the difference.
#[test]
fn s5_price_improvement() {
    let ledger = funded_ledger(&[1, 2]);
    let (mut book, _clock) = book(&ledger, PRICE_SCALE, 1_000);
    let d = domain();

    let alice = order(user(1), book.book_id(), Side::SellBase, 5, scaled(10), 0);
    let alice_hash = clob_core::hash_order(&alice, &d);
    book.place(&alice, alice_hash).unwrap();

    let bob = order(user(2), book.book_id(), Side::BuyBase, 5, scaled(12), 0);
    let bob_hash = clob_core::hash_order(&bob, &d);
    let result = book.place(&bob, bob_hash).unwrap();

    assert_eq!(result.filled_base, 5);
    let fill = result
        .events
        .iter()
        .find_map(|e| match e {
            BookEvent::OrderFilled { price, quote, .. } => Some((*price, *quote)),
            _ => None,
        })
        .unwrap();
    assert_eq!(fill, (scaled(10), 50));
    // locked ceil(5*12)=60, spent 50, refunded 10 -> nothing left locked.
    assert_eq!(ledger.get_locked_balance(user(2), asset(QUOTE)), 0);
}

/// S6. Cancel by hash fully unwinds the resting order.
#[test]
fn s6_cancel_by_hash() {
    let ledger = funded_ledger(&[1]);
    let (mut book, _clock) = book(&ledger, PRICE_SCALE, 1_000);
    let d = domain();

    let alice = order(user(1), book.book_id(), Side::SellBase, 7, scaled(3), 0);
    let alice_hash = clob_core::hash_order(&alice, &d);
    book.place(&alice, alice_hash).unwrap();
    assert_eq!(ledger.get_locked_balance(user(1), asset(BASE)), 7);

    book.cancel_by_hash(alice_hash, user(1)).unwrap();

    assert!(book.get_best_ask().is_none());
    assert_eq!(ledger.get_locked_balance(user(1), asset(BASE)), 0);
    assert_eq!(ledger.get_available_balance(user(1), asset(BASE)), 1_000_000);
    let info = book.get_order_info(alice_hash).unwrap();
    assert_eq!(info.status, OrderStatus::Terminal(TerminalStatus::Cancelled));
    assert_eq!(info.filled_base, 0);
}
