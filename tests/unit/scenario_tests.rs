//! End-to-end scenarios against the public engine surface, with literal
//! balance and status outcomes. Fee rates are maker 10 bps / taker 20 bps
//! unless a scenario says otherwise; the pair uses 18 base decimals and a
//! 6-decimal quote.

use crate::common::*;
use clob_engine::prelude::*;

#[test]
fn scenario_simple_full_match() {
    let (engine, ledger) = engine_with_fees(10, 20);
    let pair = pair();

    // Maker sells 10 base @ 100 quote; taker lifts it all
    fund_base(&ledger, ALICE, 10);
    fund_quote(&ledger, BOB, 1_002_000_000);

    let ask = engine
        .place_limit(ALICE, &pair, false, price(100), base(10))
        .unwrap();
    let bid = engine
        .place_limit(BOB, &pair, true, price(100), base(10))
        .unwrap();

    // quote_amount = 1000 quote; maker fee 10 bps = 1 quote,
    // taker fee 20 bps = 2 quote
    assert_eq!(ledger.balance_of(ALICE, &pair.quote), 999_000_000);
    assert_eq!(ledger.balance_of(ALICE, &pair.base), 0);
    assert_eq!(ledger.balance_of(BOB, &pair.base), base(10));
    assert_eq!(ledger.balance_of(BOB, &pair.quote), 0);
    assert_eq!(ledger.balance_of(FEE_SINK, &pair.quote), 3_000_000);

    assert_eq!(engine.order(ask).unwrap().status, OrderStatus::Filled);
    assert_eq!(engine.order(bid).unwrap().status, OrderStatus::Filled);
    assert_eq!(engine.book(&pair).unwrap().best_ask(), None);
    assert_eq!(engine.book(&pair).unwrap().best_bid(), None);
}

#[test]
fn scenario_partial_fill_with_rest() {
    let (engine, ledger) = engine_with_fees(10, 20);
    let pair = pair();
    fund_base(&ledger, ALICE, 5);
    fund_quote(&ledger, BOB, quote(1_000));

    let ask = engine
        .place_limit(ALICE, &pair, false, price(100), base(5))
        .unwrap();
    let bid = engine
        .place_limit(BOB, &pair, true, price(100), base(10))
        .unwrap();

    assert_eq!(engine.order(ask).unwrap().status, OrderStatus::Filled);

    let taker = engine.order(bid).unwrap();
    assert_eq!(taker.status, OrderStatus::PartiallyFilled);
    assert_eq!(taker.filled_quantity, base(5));
    assert_eq!(taker.remaining(), base(5));

    // The remainder rests at 100 on the bid side
    let book = engine.book(&pair).unwrap();
    assert_eq!(book.best_bid(), Some(price(100)));
    assert_eq!(book.quantity_at(price(100), Side::Buy), base(5));
}

#[test]
fn scenario_multi_level_market_sweep_by_budget() {
    let (engine, ledger) = engine_with_fees(10, 20);
    let pair = pair();
    fund_base(&ledger, ALICE, 5);
    fund_base(&ledger, BOB, 5);
    fund_quote(&ledger, CARL, quote(900));

    let first = engine
        .place_limit(ALICE, &pair, false, price(100), base(5))
        .unwrap();
    let second = engine
        .place_limit(BOB, &pair, false, price(105), base(5))
        .unwrap();

    // Budget buys 5 @ 100 (500 quote) then 3 @ 105 (315 quote), exactly
    // exhausting 815; taker fees ride on top of the spent amount
    let taker = engine
        .place_market(CARL, &pair, true, 0, Some(quote(815)))
        .unwrap();

    assert_eq!(engine.order(first).unwrap().status, OrderStatus::Filled);
    let partial = engine.order(second).unwrap();
    assert_eq!(partial.status, OrderStatus::PartiallyFilled);
    assert_eq!(partial.remaining(), base(2));

    let closed = engine.order(taker).unwrap();
    assert_eq!(closed.status, OrderStatus::Filled);
    assert_eq!(closed.quantity, base(8));
    assert_eq!(closed.filled_quantity, base(8));

    // Taker paid 815 quote plus 20 bps on each settlement
    let taker_fees = 1_000_000 + 630_000;
    assert_eq!(
        ledger.balance_of(CARL, &pair.quote),
        quote(900) - quote(815) - taker_fees
    );
    assert_eq!(ledger.balance_of(CARL, &pair.base), base(8));

    // Makers net their proceeds minus 10 bps
    assert_eq!(ledger.balance_of(ALICE, &pair.quote), 500_000_000 - 500_000);
    assert_eq!(ledger.balance_of(BOB, &pair.quote), 315_000_000 - 315_000);
    assert_eq!(
        ledger.balance_of(FEE_SINK, &pair.quote),
        500_000 + 315_000 + taker_fees
    );
}

#[test]
fn scenario_self_trade_skip() {
    let (engine, ledger, events) = recording_engine(10, 20);
    let pair = pair();
    fund_base(&ledger, ALICE, 5);
    fund_quote(&ledger, ALICE, quote(1_000));

    let ask = engine
        .place_limit(ALICE, &pair, false, price(100), base(5))
        .unwrap();
    events.lock().unwrap().clear();

    let bid = engine
        .place_limit(ALICE, &pair, true, price(100), base(5))
        .unwrap();

    // No settlement was produced; both orders remain OPEN and resting
    assert!(!event_names(&events).contains(&"OrderMatched"));
    assert!(!event_names(&events).contains(&"SettlementProcessed"));
    assert_eq!(engine.order(ask).unwrap().status, OrderStatus::Open);
    assert_eq!(engine.order(bid).unwrap().status, OrderStatus::Open);

    let book = engine.book(&pair).unwrap();
    assert_eq!(book.quantity_at(price(100), Side::Sell), base(5));
    assert_eq!(book.quantity_at(price(100), Side::Buy), base(5));
    assert_eq!(ledger.balance_of(ALICE, &pair.base), base(5));
    assert_eq!(ledger.balance_of(ALICE, &pair.quote), quote(1_000));
}

#[test]
fn scenario_fok_insufficient_depth_aborts() {
    let (engine, ledger, events) = recording_engine(10, 20);
    let pair = pair();
    fund_base(&ledger, ALICE, 5);
    fund_quote(&ledger, BOB, quote(2_000));

    engine
        .place_limit(ALICE, &pair, false, price(100), base(5))
        .unwrap();
    events.lock().unwrap().clear();

    let err = engine
        .place_fok(BOB, &pair, true, price(100), base(10))
        .unwrap_err();
    assert!(matches!(err, EngineError::FokNotFillable { .. }));

    // Nothing is observable: no events, no order, no movement
    assert!(events.lock().unwrap().is_empty());
    assert!(engine.orders_of(BOB).is_empty());
    assert_eq!(ledger.balance_of(BOB, &pair.quote), quote(2_000));
    assert_eq!(ledger.balance_of(ALICE, &pair.base), base(5));
    assert_eq!(
        engine.book(&pair).unwrap().quantity_at(price(100), Side::Sell),
        base(5)
    );
}

#[test]
fn scenario_cancel_lifecycle() {
    let (engine, _ledger, events) = recording_engine(10, 20);
    let pair = pair();

    let bid = engine
        .place_limit(ALICE, &pair, true, price(100), base(10))
        .unwrap();
    events.lock().unwrap().clear();

    engine.cancel(ALICE, bid).unwrap();
    let order = engine.order(bid).unwrap();
    assert_eq!(order.status, OrderStatus::Canceled);
    assert_eq!(engine.book(&pair).unwrap().best_bid(), None);
    assert_eq!(
        event_names(&events),
        vec!["OrderStatusUpdated", "OrderCanceled"]
    );

    // A second cancel and a foreign cancel both fail
    assert!(matches!(
        engine.cancel(ALICE, bid),
        Err(EngineError::NotCancellable { .. })
    ));
    let other = engine
        .place_limit(BOB, &pair, true, price(100), base(10))
        .unwrap();
    assert!(matches!(
        engine.cancel(ALICE, other),
        Err(EngineError::NotOwner { .. })
    ));
}

#[test]
fn scenario_conservation_across_mixed_flow() {
    let (engine, ledger) = engine_with_fees(10, 20);
    let pair = pair();
    let traders = [ALICE, BOB, CARL];
    for trader in traders {
        fund_base(&ledger, trader, 100);
        fund_quote(&ledger, trader, quote(100_000));
    }
    let total_base: u128 = base(300);
    let total_quote: u128 = quote(300_000);

    engine
        .place_limit(ALICE, &pair, false, price(100), base(10))
        .unwrap();
    engine
        .place_limit(BOB, &pair, false, price(101), base(7))
        .unwrap();
    engine
        .place_limit(CARL, &pair, true, price(101), base(12))
        .unwrap();
    engine
        .place_market(ALICE, &pair, true, 0, Some(quote(300)))
        .unwrap();
    engine
        .place_ioc(BOB, &pair, false, price(95), base(20))
        .unwrap();

    let held_base: u128 = traders
        .iter()
        .map(|t| ledger.balance_of(*t, &pair.base))
        .sum();
    let held_quote: u128 = traders
        .iter()
        .map(|t| ledger.balance_of(*t, &pair.quote))
        .sum::<u128>()
        + ledger.balance_of(FEE_SINK, &pair.quote);

    assert_eq!(held_base, total_base);
    assert_eq!(held_quote, total_quote);
}
