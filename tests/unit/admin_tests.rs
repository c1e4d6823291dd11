//! Administrative configuration through the facade.

use crate::common::*;
use clob_engine::prelude::*;

#[test]
fn fee_rate_change_applies_to_later_settlements() {
    let (engine, ledger) = engine_with_fees(0, 0);
    let pair = pair();
    fund_base(&ledger, ALICE, 20);
    fund_quote(&ledger, BOB, quote(5_000));

    // First trade at zero fees
    engine
        .place_limit(ALICE, &pair, false, price(100), base(10))
        .unwrap();
    engine
        .place_limit(BOB, &pair, true, price(100), base(10))
        .unwrap();
    assert_eq!(ledger.balance_of(FEE_SINK, &pair.quote), 0);

    // Second trade after raising rates to 10/20 bps
    engine.set_fee_rates(ADMIN, 10, 20).unwrap();
    engine
        .place_limit(ALICE, &pair, false, price(100), base(10))
        .unwrap();
    engine
        .place_limit(BOB, &pair, true, price(100), base(10))
        .unwrap();
    assert_eq!(ledger.balance_of(FEE_SINK, &pair.quote), 3_000_000);
}

#[test]
fn fee_recipient_change_redirects_fees() {
    let (engine, ledger) = engine_with_fees(10, 20);
    let pair = pair();
    fund_base(&ledger, ALICE, 10);
    fund_quote(&ledger, BOB, quote(2_000));

    engine.set_fee_recipient(ADMIN, CARL).unwrap();
    assert_eq!(engine.fee_recipient(), CARL);

    engine
        .place_limit(ALICE, &pair, false, price(100), base(10))
        .unwrap();
    engine
        .place_limit(BOB, &pair, true, price(100), base(10))
        .unwrap();

    assert_eq!(ledger.balance_of(FEE_SINK, &pair.quote), 0);
    assert_eq!(ledger.balance_of(CARL, &pair.quote), 3_000_000);
}

#[test]
fn added_pair_becomes_tradable() {
    let (engine, ledger) = engine_with_fees(0, 0);
    let btc_usdc = Pair::new("BTC", "USDC");

    assert!(matches!(
        engine.place_limit(ALICE, &btc_usdc, true, 50_000_000_000, 100_000_000),
        Err(EngineError::UnsupportedPair { .. })
    ));

    engine
        .add_pair(ADMIN, PairConfig::new(btc_usdc.clone(), 8))
        .unwrap();
    assert!(engine.supported_pairs().contains(&btc_usdc));

    ledger
        .deposit(ALICE, &btc_usdc.base, 100_000_000)
        .unwrap();
    let ask = engine
        .place_limit(ALICE, &btc_usdc, false, 50_000_000_000, 100_000_000)
        .unwrap();
    assert_eq!(engine.order(ask).unwrap().status, OrderStatus::Open);
}

#[test]
fn revoked_admin_loses_the_capability() {
    let (engine, _ledger) = engine_with_fees(0, 0);

    engine.add_admin(ADMIN, ALICE).unwrap();
    engine.set_fee_rates(ALICE, 1, 1).unwrap();

    engine.remove_admin(ADMIN, ALICE).unwrap();
    assert!(matches!(
        engine.set_fee_rates(ALICE, 2, 2),
        Err(EngineError::Unauthorized { .. })
    ));

    // Transfer hands the capability over entirely
    engine.transfer_admin(ADMIN, BOB).unwrap();
    assert!(matches!(
        engine.set_fee_rates(ADMIN, 3, 3),
        Err(EngineError::Unauthorized { .. })
    ));
    engine.set_fee_rates(BOB, 3, 3).unwrap();
    assert_eq!(engine.fee_schedule(), FeeSchedule::new(3, 3));
}
