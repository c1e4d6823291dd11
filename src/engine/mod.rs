//! CLOB engine core: order registry, book, settlement vault, and facade.

mod assets;
mod book;
mod error;
mod events;
mod facade;
mod fees;
mod journal;
mod level;
mod matching;
mod order;
mod registry;
mod router;
mod settlement;
mod snapshot;
mod types;
mod vault;

#[cfg(test)]
mod tests;

pub use assets::{AssetTransfer, InMemoryLedger, TransferError};
pub use book::Book;
pub use error::EngineError;
pub use events::{EngineEvent, EventListener, EventMask};
pub use facade::{Engine, EngineConfig};
pub use fees::{FeeSchedule, MAX_FEE_BPS};
pub use level::PriceLevel;
pub use order::Order;
pub use registry::OrderRegistry;
pub use router::{EventRouterStd, EventRouterTokio};
pub use settlement::{Settlement, SettlementReceipt};
pub use snapshot::{
    BookSnapshot, ENGINE_SNAPSHOT_FORMAT_VERSION, EngineSnapshot, LevelSnapshot, SnapshotPackage,
};
pub use types::{AssetId, OrderId, OrderKind, OrderStatus, Pair, PairConfig, Side, TraderId};
pub use vault::Vault;
