//! Event-ordering guarantees: creation precedes matching, every settlement
//! precedes the terminal status updates of its legs, and aborted calls emit
//! nothing.

use crate::common::*;
use clob_engine::prelude::*;

#[test]
fn resting_placement_emits_created_then_placed() {
    let (engine, _ledger, events) = recording_engine(10, 20);
    events.lock().unwrap().clear();

    engine
        .place_limit(ALICE, &pair(), true, price(100), base(1))
        .unwrap();

    assert_eq!(event_names(&events), vec!["OrderCreated", "OrderPlaced"]);
}

#[test]
fn full_match_event_sequence() {
    let (engine, ledger, events) = recording_engine(10, 20);
    let pair = pair();
    fund_base(&ledger, ALICE, 10);
    fund_quote(&ledger, BOB, quote(2_000));

    engine
        .place_limit(ALICE, &pair, false, price(100), base(10))
        .unwrap();
    events.lock().unwrap().clear();

    engine
        .place_limit(BOB, &pair, true, price(100), base(10))
        .unwrap();

    assert_eq!(
        event_names(&events),
        vec![
            "OrderCreated",
            "OrderPlaced",
            "OrderMatched",
            "SettlementProcessed",
            "OrderStatusUpdated", // maker leg
            "OrderStatusUpdated", // taker leg
        ]
    );
}

#[test]
fn multi_settlement_sequence_interleaves_per_settlement() {
    let (engine, ledger, events) = recording_engine(0, 0);
    let pair = pair();
    fund_base(&ledger, ALICE, 5);
    fund_base(&ledger, BOB, 5);
    fund_quote(&ledger, CARL, quote(2_000));

    engine
        .place_limit(ALICE, &pair, false, price(100), base(5))
        .unwrap();
    engine
        .place_limit(BOB, &pair, false, price(101), base(5))
        .unwrap();
    events.lock().unwrap().clear();

    engine
        .place_limit(CARL, &pair, true, price(101), base(10))
        .unwrap();

    assert_eq!(
        event_names(&events),
        vec![
            "OrderCreated",
            "OrderPlaced",
            "OrderMatched",
            "SettlementProcessed",
            "OrderStatusUpdated",
            "OrderStatusUpdated",
            "OrderMatched",
            "SettlementProcessed",
            "OrderStatusUpdated",
            "OrderStatusUpdated",
        ]
    );

    // Each OrderMatched precedes its SettlementProcessed, and both legs'
    // terminal updates come after the settlement that produced them
    let recorded = events.lock().unwrap();
    let statuses: Vec<_> = recorded
        .iter()
        .filter_map(|event| match event {
            EngineEvent::OrderStatusUpdated {
                order_id, status, ..
            } => Some((*order_id, *status)),
            _ => None,
        })
        .collect();
    assert_eq!(statuses.len(), 4);
    // Taker ends FILLED after the final settlement
    assert_eq!(statuses[3].1, OrderStatus::Filled);
}

#[test]
fn ioc_remainder_cancel_is_last() {
    let (engine, ledger, events) = recording_engine(0, 0);
    let pair = pair();
    fund_base(&ledger, ALICE, 4);
    fund_quote(&ledger, BOB, quote(1_000));

    engine
        .place_limit(ALICE, &pair, false, price(100), base(4))
        .unwrap();
    events.lock().unwrap().clear();

    engine
        .place_ioc(BOB, &pair, true, price(100), base(10))
        .unwrap();

    let names = event_names(&events);
    assert_eq!(names.first(), Some(&"OrderCreated"));
    // The cancel of the unfilled remainder is the final status update
    assert_eq!(names.last(), Some(&"OrderStatusUpdated"));
    let recorded = events.lock().unwrap();
    match recorded.last().unwrap() {
        EngineEvent::OrderStatusUpdated {
            status,
            filled_quantity,
            ..
        } => {
            assert_eq!(*status, OrderStatus::Canceled);
            assert_eq!(*filled_quantity, base(4));
        }
        other => panic!("expected OrderStatusUpdated, got {other:?}"),
    }
}

#[test]
fn failed_call_emits_nothing() {
    let (engine, _ledger, events) = recording_engine(0, 0);
    let pair = pair();
    events.lock().unwrap().clear();

    // Unfunded crossing order fails at settlement
    engine
        .place_limit(ALICE, &pair, false, price(100), base(5))
        .unwrap();
    events.lock().unwrap().clear();
    let _ = engine
        .place_limit(BOB, &pair, true, price(100), base(5))
        .unwrap_err();

    assert!(events.lock().unwrap().is_empty());
}

#[test]
fn admin_operations_emit_their_events() {
    let (engine, _ledger, events) = recording_engine(0, 0);
    events.lock().unwrap().clear();

    engine.set_fee_rates(ADMIN, 5, 9).unwrap();
    engine.set_fee_recipient(ADMIN, BOB).unwrap();
    engine.add_admin(ADMIN, ALICE).unwrap();

    assert_eq!(
        event_names(&events),
        vec!["FeeRateUpdated", "FeeRecipientUpdated", "AdminAdded"]
    );
    let recorded = events.lock().unwrap();
    assert_eq!(
        recorded[0],
        EngineEvent::FeeRateUpdated {
            maker_fee_bps: 5,
            taker_fee_bps: 9,
        }
    );
}
