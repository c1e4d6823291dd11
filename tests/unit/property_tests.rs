//! Property tests: engine invariants under random order flow.
//!
//! The market uses zero base decimals so quantities and quote amounts stay
//! in small integers; conservation is checked against the exact funded
//! totals.

use clob_engine::prelude::*;
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

const ADMIN: TraderId = TraderId(1);
const FEE_SINK: TraderId = TraderId(99);
const TRADERS: [TraderId; 3] = [TraderId(2), TraderId(3), TraderId(4)];
const BASE_PER_TRADER: u128 = 1_000_000;
const QUOTE_PER_TRADER: u128 = 1_000_000_000;

fn simple_market() -> (Engine, Arc<InMemoryLedger>, Pair, Arc<Mutex<Vec<EngineEvent>>>) {
    let pair = Pair::new("AAA", "BBB");
    let ledger = Arc::new(InMemoryLedger::new());
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let engine = Engine::with_event_listener(
        EngineConfig::new(FeeSchedule::new(10, 20), FEE_SINK, ADMIN),
        ledger.clone(),
        Arc::new(move |event| sink.lock().unwrap().push(event.clone())),
    );
    engine
        .add_pair(ADMIN, PairConfig::new(pair.clone(), 0))
        .unwrap();
    for trader in TRADERS {
        ledger.deposit(trader, &pair.base, BASE_PER_TRADER).unwrap();
        ledger
            .deposit(trader, &pair.quote, QUOTE_PER_TRADER)
            .unwrap();
    }
    (engine, ledger, pair, events)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn invariants_hold_under_random_limit_flow(
        ops in proptest::collection::vec(
            (any::<bool>(), 1u128..=20, 1u128..=10, 0usize..3),
            1..40,
        )
    ) {
        let (engine, ledger, pair, events) = simple_market();

        for (is_buy, px, qty, trader_index) in ops {
            let trader = TRADERS[trader_index];
            let result = engine.place_limit(trader, &pair, is_buy, px, qty);
            prop_assert!(result.is_ok(), "funded limit order failed: {:?}", result);

            // Deterministically sprinkle cancels through the flow
            if px % 5 == 0 {
                if let Some(order_id) = engine.orders_of(trader).last().copied() {
                    let _ = engine.cancel(trader, order_id);
                }
            }
        }

        let book = engine.book(&pair).unwrap();

        // Per-order lifecycle invariants
        for trader in TRADERS {
            for order_id in engine.orders_of(trader) {
                let order = engine.order(order_id).unwrap();
                prop_assert!(order.filled_quantity <= order.quantity);
                prop_assert_eq!(
                    order.status == OrderStatus::Filled,
                    order.filled_quantity == order.quantity,
                    "status/filled correlation broken for {}", order_id
                );
                if book.contains(order_id) {
                    prop_assert!(!order.status.is_terminal());
                }
            }
        }

        // Level aggregates equal the sum of their orders' remainders
        let snapshot = engine.snapshot();
        for book_snapshot in &snapshot.books {
            for (levels, side) in [
                (&book_snapshot.bids, Side::Buy),
                (&book_snapshot.asks, Side::Sell),
            ] {
                for level in levels {
                    let resting: u128 = level
                        .order_ids
                        .iter()
                        .map(|id| engine.order(*id).unwrap().remaining())
                        .sum();
                    prop_assert_eq!(book.quantity_at(level.price, side), resting);
                }
            }
        }

        // Settlements never pair a trader with itself and always execute
        // at the maker's limit price
        for event in events.lock().unwrap().iter() {
            if let EngineEvent::OrderMatched {
                maker_order_id,
                taker_order_id,
                price,
                quantity,
            } = event
            {
                let maker = engine.order(*maker_order_id).unwrap();
                let taker = engine.order(*taker_order_id).unwrap();
                prop_assert!(*quantity > 0);
                prop_assert_ne!(maker.trader, taker.trader);
                prop_assert_eq!(*price, maker.price);
            }
        }

        // Conservation: base and quote are only ever moved, never minted
        let held_base: u128 = TRADERS
            .iter()
            .map(|t| ledger.balance_of(*t, &pair.base))
            .sum();
        let held_quote: u128 = TRADERS
            .iter()
            .map(|t| ledger.balance_of(*t, &pair.quote))
            .sum::<u128>()
            + ledger.balance_of(FEE_SINK, &pair.quote);
        prop_assert_eq!(held_base, 3 * BASE_PER_TRADER);
        prop_assert_eq!(held_quote, 3 * QUOTE_PER_TRADER);
    }

    #[test]
    fn snapshot_restore_is_lossless(
        ops in proptest::collection::vec(
            (any::<bool>(), 1u128..=10, 1u128..=5, 0usize..3),
            1..20,
        )
    ) {
        let (engine, ledger, pair, _events) = simple_market();
        for (is_buy, px, qty, trader_index) in ops {
            let _ = engine.place_limit(TRADERS[trader_index], &pair, is_buy, px, qty);
        }

        let snapshot = engine.snapshot();
        let restored = Engine::restore(snapshot.clone(), ledger, None).unwrap();
        let recaptured = restored.snapshot();

        prop_assert_eq!(snapshot.orders, recaptured.orders);
        prop_assert_eq!(snapshot.books, recaptured.books);
        prop_assert_eq!(snapshot.pairs, recaptured.pairs);
        prop_assert_eq!(
            snapshot.processed_settlements,
            recaptured.processed_settlements
        );
    }
}
