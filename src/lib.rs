//! # Deterministic CLOB Matching and Settlement Engine
//!
//! A central limit order book (CLOB) trading engine core written in Rust.
//! The crate provides deterministic price-time priority matching, maker/taker
//! fee settlement, and atomic per-order transactions for spot market pairs.
//!
//! ## Key Features
//!
//! - **Strict price-time priority**: resting liquidity is matched best price
//!   first, and within a price level in arrival order. Settlements always
//!   execute at the maker's resting price.
//!
//! - **Four order kinds**: limit (rest the remainder), market (never rests,
//!   optionally funded by a quote budget), immediate-or-cancel, and canonical
//!   fill-or-kill (fully fill or no observable effect).
//!
//! - **Atomic settlement**: every placement runs as one unit of commit.
//!   Asset movement, fee collection, status updates, and event emission
//!   either all happen or none do; failures unwind an internal journal.
//!
//! - **Self-trade prevention**: the engine never produces a settlement with
//!   the same trader on both sides. Same-trader resting orders are skipped in
//!   place and the walk continues in FIFO order.
//!
//! - **Authoritative order registry**: one store owns every order ever
//!   created and enforces the one-way status lifecycle
//!   (`OPEN -> PARTIALLY_FILLED -> FILLED`, with `CANCELED` reachable from
//!   the non-terminal states).
//!
//! - **Pluggable custody**: settlement consumes a minimal [`AssetTransfer`]
//!   capability; the engine never holds custody between settlements.
//!   [`InMemoryLedger`] is the reference implementation.
//!
//! ## Design Goals
//!
//! 1. **Determinism**: the same sequence of calls always produces the same
//!    order ids, fills, fees, and events.
//! 2. **Correctness**: lifecycle invariants are enforced in exactly one
//!    place (the registry) and every failure path is rollback-tested.
//! 3. **Observability**: committed calls emit a stable event stream
//!    (created, placed, matched, settled, status updates) that can be routed
//!    off the hot path with [`EventRouterStd`] or [`EventRouterTokio`].
//! 4. **Embeddability**: the engine is a plain library with interior
//!    mutability; hosts share it behind `Arc` and serialize calls per pair.
//!
//! ## Concurrency Model
//!
//! Scheduling is single-threaded cooperative per pair: the engine executes
//! one order end-to-end before the next begins, and there are no suspension
//! points inside the matching + settlement critical section. The internal
//! structures (skip lists, concurrent maps, atomics) let a host keep
//! read-only views (depth, best bid/ask, order lookups) cheap while a
//! writer runs elsewhere.
//!
//! ## Usage
//!
//! ```
//! use clob_engine::prelude::*;
//! use std::sync::Arc;
//!
//! let ledger = Arc::new(InMemoryLedger::new());
//! let admin = TraderId(1);
//! let engine = Engine::new(
//!     EngineConfig::new(FeeSchedule::zero_fee(), TraderId(99), admin),
//!     ledger.clone(),
//! );
//!
//! // Authorize an ETH/USDC market with 6 base decimals
//! let pair = Pair::new("ETH", "USDC");
//! engine
//!     .add_pair(admin, PairConfig::new(pair.clone(), 6))
//!     .unwrap();
//!
//! // A maker rests 5 ETH at 100 USDC, then a taker lifts it
//! let (maker, taker) = (TraderId(2), TraderId(3));
//! ledger.deposit(maker, &pair.base, 5_000_000).unwrap();
//! ledger.deposit(taker, &pair.quote, 500).unwrap();
//!
//! let ask = engine
//!     .place_limit(maker, &pair, false, 100, 5_000_000)
//!     .unwrap();
//! let bid = engine
//!     .place_limit(taker, &pair, true, 100, 5_000_000)
//!     .unwrap();
//!
//! assert_eq!(engine.order(ask).unwrap().status, OrderStatus::Filled);
//! assert_eq!(engine.order(bid).unwrap().status, OrderStatus::Filled);
//! assert_eq!(ledger.balance_of(taker, &pair.base), 5_000_000);
//! assert_eq!(ledger.balance_of(maker, &pair.quote), 500);
//! ```
//!
//! ## Status
//!
//! The engine core (registry, book, vault, facade) is feature-complete.
//! Persistence and transport are host concerns: the engine emits events and
//! offers checksum-validated snapshots ([`SnapshotPackage`]), durability is
//! up to the embedder.

pub mod engine;

pub mod prelude;
mod utils;

pub use engine::{
    AssetId, AssetTransfer, Book, ENGINE_SNAPSHOT_FORMAT_VERSION, Engine, EngineConfig,
    EngineError, EngineEvent, EngineSnapshot, EventListener, EventMask, EventRouterStd,
    EventRouterTokio, FeeSchedule, InMemoryLedger, MAX_FEE_BPS, Order, OrderId, OrderKind,
    OrderRegistry, OrderStatus, Pair, PairConfig, PriceLevel, Settlement, SettlementReceipt, Side,
    SnapshotPackage, TraderId, TransferError, Vault,
};
pub use engine::{BookSnapshot, LevelSnapshot};
pub use utils::current_time_millis;
