//! Engine error types

use crate::engine::assets::TransferError;
use crate::engine::types::{AssetId, OrderId, OrderStatus, TraderId};
use std::fmt;

/// Errors surfaced by the engine.
///
/// Any error raised inside a facade call aborts the whole call: staged state
/// is unwound and no events are observable.
#[derive(Debug)]
#[non_exhaustive]
pub enum EngineError {
    /// The caller does not hold the required admin capability.
    Unauthorized {
        /// The principal that attempted the operation.
        principal: TraderId,
    },

    /// The pair is not in the supported-pair allow-list.
    UnsupportedPair {
        /// Base asset of the rejected pair.
        base: AssetId,
        /// Quote asset of the rejected pair.
        quote: AssetId,
    },

    /// The order arguments are invalid (zero price or quantity, argument
    /// mismatch for the order kind, or arithmetic overflow).
    InvalidOrder {
        /// Description of the violation.
        message: String,
    },

    /// Order not found in the registry.
    OrderNotFound(OrderId),

    /// Cancel attempted by a principal other than the order's trader.
    NotOwner {
        /// The order that was targeted.
        order_id: OrderId,
        /// The principal that attempted the cancel.
        caller: TraderId,
    },

    /// Cancel attempted on an order in a terminal state.
    NotCancellable {
        /// The order that was targeted.
        order_id: OrderId,
        /// Its current (terminal) status.
        status: OrderStatus,
    },

    /// Status update rejected: regression from a terminal state, a
    /// filled-quantity regression, or an over-fill.
    InvalidTransition {
        /// The order whose update was rejected.
        order_id: OrderId,
        /// Status before the attempted update.
        from: OrderStatus,
        /// Status the update tried to reach.
        to: OrderStatus,
    },

    /// The `(taker, maker)` settlement pair was already processed.
    AlreadyProcessed {
        /// Taker leg of the replayed settlement.
        taker_order_id: OrderId,
        /// Maker leg of the replayed settlement.
        maker_order_id: OrderId,
    },

    /// The asset-transfer capability failed (insufficient balance).
    InsufficientAssets(TransferError),

    /// A fill-or-kill order could not be fully filled.
    FokNotFillable {
        /// The rejected order.
        order_id: OrderId,
        /// Quantity the order demanded.
        requested: u128,
        /// Quantity the book could have supplied at acceptable prices.
        available: u128,
    },

    /// Error while serializing snapshot data.
    SerializationError {
        /// Underlying error message.
        message: String,
    },

    /// Error while deserializing snapshot data.
    DeserializationError {
        /// Underlying error message.
        message: String,
    },

    /// Snapshot integrity check failed.
    ChecksumMismatch {
        /// Expected checksum value.
        expected: String,
        /// Actual checksum value.
        actual: String,
    },

    /// Snapshot content is structurally invalid or has an unsupported version.
    InvalidSnapshot {
        /// Description of the problem.
        message: String,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Unauthorized { principal } => {
                write!(f, "unauthorized: {principal} lacks the admin capability")
            }
            EngineError::UnsupportedPair { base, quote } => {
                write!(f, "unsupported pair: {base}/{quote}")
            }
            EngineError::InvalidOrder { message } => write!(f, "invalid order: {message}"),
            EngineError::OrderNotFound(id) => write!(f, "order not found: {id}"),
            EngineError::NotOwner { order_id, caller } => {
                write!(f, "not owner: {caller} does not own {order_id}")
            }
            EngineError::NotCancellable { order_id, status } => {
                write!(f, "not cancellable: {order_id} is {status}")
            }
            EngineError::InvalidTransition { order_id, from, to } => {
                write!(f, "invalid transition for {order_id}: {from} -> {to}")
            }
            EngineError::AlreadyProcessed {
                taker_order_id,
                maker_order_id,
            } => {
                write!(
                    f,
                    "settlement already processed: taker {taker_order_id}, maker {maker_order_id}"
                )
            }
            EngineError::InsufficientAssets(err) => write!(f, "insufficient assets: {err}"),
            EngineError::FokNotFillable {
                order_id,
                requested,
                available,
            } => {
                write!(
                    f,
                    "fill-or-kill not fillable: {order_id} requested {requested}, available {available}"
                )
            }
            EngineError::SerializationError { message } => {
                write!(f, "serialization error: {message}")
            }
            EngineError::DeserializationError { message } => {
                write!(f, "deserialization error: {message}")
            }
            EngineError::ChecksumMismatch { expected, actual } => {
                write!(
                    f,
                    "checksum mismatch: expected {expected}, but computed {actual}"
                )
            }
            EngineError::InvalidSnapshot { message } => {
                write!(f, "invalid snapshot: {message}")
            }
        }
    }
}

impl std::error::Error for EngineError {}

impl From<TransferError> for EngineError {
    fn from(err: TransferError) -> Self {
        EngineError::InsufficientAssets(err)
    }
}
