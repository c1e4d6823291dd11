//! Shared fixtures for the integration suite.

use clob_engine::prelude::*;
use std::sync::{Arc, Mutex};

pub const ADMIN: TraderId = TraderId(1);
pub const ALICE: TraderId = TraderId(2);
pub const BOB: TraderId = TraderId(3);
pub const CARL: TraderId = TraderId(4);
pub const FEE_SINK: TraderId = TraderId(99);

pub const BASE_DECIMALS: u32 = 18;
pub const QUOTE_DECIMALS: u32 = 6;

pub fn pair() -> Pair {
    Pair::new("ETH", "USDC")
}

/// `n` whole base assets in fixed-point units.
pub fn base(n: u64) -> u128 {
    n as u128 * 10u128.pow(BASE_DECIMALS)
}

/// `n` whole quote assets in fixed-point units.
pub fn quote(n: u64) -> u128 {
    n as u128 * 10u128.pow(QUOTE_DECIMALS)
}

/// A price of `n` whole quote per whole base.
pub fn price(n: u64) -> u128 {
    quote(n)
}

pub fn engine_with_fees(maker_bps: u32, taker_bps: u32) -> (Engine, Arc<InMemoryLedger>) {
    let ledger = Arc::new(InMemoryLedger::new());
    let engine = Engine::new(
        EngineConfig::new(FeeSchedule::new(maker_bps, taker_bps), FEE_SINK, ADMIN),
        ledger.clone(),
    );
    engine
        .add_pair(ADMIN, PairConfig::new(pair(), BASE_DECIMALS))
        .unwrap();
    (engine, ledger)
}

/// Engine that records every committed event.
pub fn recording_engine(
    maker_bps: u32,
    taker_bps: u32,
) -> (Engine, Arc<InMemoryLedger>, Arc<Mutex<Vec<EngineEvent>>>) {
    let ledger = Arc::new(InMemoryLedger::new());
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let engine = Engine::with_event_listener(
        EngineConfig::new(FeeSchedule::new(maker_bps, taker_bps), FEE_SINK, ADMIN),
        ledger.clone(),
        Arc::new(move |event| sink.lock().unwrap().push(event.clone())),
    );
    engine
        .add_pair(ADMIN, PairConfig::new(pair(), BASE_DECIMALS))
        .unwrap();
    (engine, ledger, events)
}

pub fn fund_base(ledger: &InMemoryLedger, trader: TraderId, whole: u64) {
    ledger.deposit(trader, &pair().base, base(whole)).unwrap();
}

pub fn fund_quote(ledger: &InMemoryLedger, trader: TraderId, units: u128) {
    ledger.deposit(trader, &pair().quote, units).unwrap();
}

/// Names of the recorded events, in commit order.
pub fn event_names(events: &Mutex<Vec<EngineEvent>>) -> Vec<&'static str> {
    events.lock().unwrap().iter().map(|e| e.name()).collect()
}
