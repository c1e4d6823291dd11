//! Engine state snapshot with checksum-validated packaging.
//!
//! The snapshot captures the engine's logical persisted state: the order
//! table, the supported-pair set, the fee configuration, the admin set, the
//! processed-settlement set, and both sides of every book as price-keyed
//! FIFO id lists. [`SnapshotPackage`] wraps a snapshot with a format version
//! and a SHA-256 checksum for integrity-checked interchange.

use crate::engine::error::EngineError;
use crate::engine::fees::FeeSchedule;
use crate::engine::order::Order;
use crate::engine::types::{OrderId, Pair, PairConfig, TraderId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One price level: its price and resting order ids in FIFO order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    /// The level's price key.
    pub price: u128,
    /// Resting order ids in arrival order.
    pub order_ids: Vec<OrderId>,
}

/// Both sides of one pair's book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSnapshot {
    /// The pair this book trades.
    pub pair: Pair,
    /// Bid levels, best (highest) first.
    pub bids: Vec<LevelSnapshot>,
    /// Ask levels, best (lowest) first.
    pub asks: Vec<LevelSnapshot>,
}

/// The engine's complete logical state at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Capture timestamp in milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Every order on record, ordered by id.
    pub orders: Vec<Order>,
    /// The supported-pair set.
    pub pairs: Vec<PairConfig>,
    /// The admin principal set.
    pub admins: Vec<TraderId>,
    /// Active fee schedule.
    pub fee_schedule: FeeSchedule,
    /// Active fee recipient.
    pub fee_recipient: TraderId,
    /// Replay-protection keys of settled `(taker, maker)` pairs.
    pub processed_settlements: Vec<(OrderId, OrderId)>,
    /// Resting state of every book.
    pub books: Vec<BookSnapshot>,
}

/// Format version used for checksum-enabled engine snapshots.
pub const ENGINE_SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Wrapper that provides checksum validation for [`EngineSnapshot`]
/// instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotPackage {
    /// Version of the snapshot schema for forward compatibility.
    pub version: u32,
    /// Snapshot payload.
    pub snapshot: EngineSnapshot,
    /// Hex-encoded SHA-256 checksum of the serialized snapshot.
    pub checksum: String,
}

impl SnapshotPackage {
    /// Creates a new package, computing the checksum of the snapshot
    /// contents.
    pub fn new(snapshot: EngineSnapshot) -> Result<Self, EngineError> {
        let checksum = Self::compute_checksum(&snapshot)?;
        Ok(Self {
            version: ENGINE_SNAPSHOT_FORMAT_VERSION,
            snapshot,
            checksum,
        })
    }

    /// Serializes the package to JSON.
    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string(self).map_err(|error| EngineError::SerializationError {
            message: error.to_string(),
        })
    }

    /// Deserializes a package from JSON.
    pub fn from_json(data: &str) -> Result<Self, EngineError> {
        serde_json::from_str(data).map_err(|error| EngineError::DeserializationError {
            message: error.to_string(),
        })
    }

    /// Validates the version and checksum.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.version != ENGINE_SNAPSHOT_FORMAT_VERSION {
            return Err(EngineError::InvalidSnapshot {
                message: format!(
                    "unsupported snapshot version: {} (expected {})",
                    self.version, ENGINE_SNAPSHOT_FORMAT_VERSION
                ),
            });
        }

        let computed = Self::compute_checksum(&self.snapshot)?;
        if computed != self.checksum {
            return Err(EngineError::ChecksumMismatch {
                expected: self.checksum.clone(),
                actual: computed,
            });
        }
        Ok(())
    }

    /// Consumes the package and returns the validated snapshot.
    pub fn into_snapshot(self) -> Result<EngineSnapshot, EngineError> {
        self.validate()?;
        Ok(self.snapshot)
    }

    fn compute_checksum(snapshot: &EngineSnapshot) -> Result<String, EngineError> {
        let payload =
            serde_json::to_vec(snapshot).map_err(|error| EngineError::SerializationError {
                message: error.to_string(),
            })?;

        let mut hasher = Sha256::new();
        hasher.update(payload);
        let checksum_bytes = hasher.finalize();
        Ok(checksum_bytes
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect::<String>())
    }
}
