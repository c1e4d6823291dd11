//! Prelude module that re-exports commonly used types and traits.
//!
//! This module provides a convenient way to import the most commonly used
//! types, traits, and functions from the clob-engine crate. Instead of
//! importing each type individually, you can use:
//!
//! ```rust
//! use clob_engine::prelude::*;
//! ```
//!
//! This will import all the essential types needed for working with the
//! engine.

// Facade and configuration
pub use crate::engine::{Engine, EngineConfig};

// Core components
pub use crate::engine::{Book, OrderRegistry, Vault};

// Vocabulary types
pub use crate::engine::{
    AssetId, Order, OrderId, OrderKind, OrderStatus, Pair, PairConfig, Side, TraderId,
};

// Fees and settlement
pub use crate::engine::{FeeSchedule, MAX_FEE_BPS, Settlement, SettlementReceipt};

// Asset capability
pub use crate::engine::{AssetTransfer, InMemoryLedger, TransferError};

// Events and routing
pub use crate::engine::{
    EngineEvent, EventListener, EventMask, EventRouterStd, EventRouterTokio,
};

// Errors
pub use crate::engine::EngineError;

// Snapshots
pub use crate::engine::{
    ENGINE_SNAPSHOT_FORMAT_VERSION, EngineSnapshot, SnapshotPackage,
};

// Utility functions
pub use crate::utils::current_time_millis;
