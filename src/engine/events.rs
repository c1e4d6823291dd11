//! Engine events and listener plumbing.
//!
//! Every facade call buffers its events and flushes them to the configured
//! listener only when the call commits. A failed call therefore emits
//! nothing, which is what makes the per-order transaction atomic from an
//! observer's point of view.

use crate::engine::types::{AssetId, OrderId, OrderKind, OrderStatus, TraderId};
use bitflags::bitflags;
use serde::Serialize;
use std::sync::Arc;

/// Events emitted by the engine, in the order defined by the per-call
/// protocol: `OrderCreated`, `OrderPlaced`, then per settlement
/// `OrderMatched`, `SettlementProcessed` and the two status updates, then
/// any post-condition events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EngineEvent {
    /// A new order exists in the registry.
    OrderCreated {
        /// Id assigned by the registry.
        order_id: OrderId,
        /// Owner of the order.
        trader: TraderId,
        /// Base asset of the pair.
        base: AssetId,
        /// Quote asset of the pair.
        quote: AssetId,
        /// Limit price (zero for market orders).
        price: u128,
        /// Total quantity (zero for quote-funded market buys).
        quantity: u128,
        /// Buy or sell.
        is_buy: bool,
        /// Order kind.
        order_type: OrderKind,
    },

    /// The facade accepted the order for matching.
    OrderPlaced {
        /// The accepted order.
        order_id: OrderId,
        /// Owner of the order.
        trader: TraderId,
        /// Buy or sell.
        is_buy: bool,
        /// Limit price (zero for market orders).
        price: u128,
        /// Total quantity (zero for quote-funded market buys).
        quantity: u128,
    },

    /// The matching walk produced a fill.
    OrderMatched {
        /// Resting side of the match.
        maker_order_id: OrderId,
        /// Aggressing side of the match.
        taker_order_id: OrderId,
        /// Execution price (always the maker's price).
        price: u128,
        /// Executed quantity in base units.
        quantity: u128,
    },

    /// The vault moved assets and fees for one settlement.
    SettlementProcessed {
        /// Aggressing side of the settlement.
        taker_order_id: OrderId,
        /// Resting side of the settlement.
        maker_order_id: OrderId,
        /// Executed quantity in base units.
        quantity: u128,
        /// Execution price.
        price: u128,
        /// Fee charged to the maker, in quote units.
        maker_fee: u128,
        /// Fee charged to the taker, in quote units.
        taker_fee: u128,
    },

    /// An order advanced its status or filled quantity.
    OrderStatusUpdated {
        /// The updated order.
        order_id: OrderId,
        /// New status.
        status: OrderStatus,
        /// New filled quantity.
        filled_quantity: u128,
    },

    /// An order was canceled by its trader.
    OrderCanceled {
        /// The canceled order.
        order_id: OrderId,
        /// Owner of the order.
        trader: TraderId,
    },

    /// The fee schedule changed.
    FeeRateUpdated {
        /// New maker rate in basis points.
        maker_fee_bps: u32,
        /// New taker rate in basis points.
        taker_fee_bps: u32,
    },

    /// The fee recipient changed.
    FeeRecipientUpdated {
        /// New fee recipient.
        recipient: TraderId,
    },

    /// A pair joined the supported set.
    PairAdded {
        /// Base asset of the new pair.
        base: AssetId,
        /// Quote asset of the new pair.
        quote: AssetId,
        /// Fixed-point decimals of the base asset.
        base_decimals: u32,
    },

    /// A principal joined the admin set.
    AdminAdded {
        /// The new admin.
        principal: TraderId,
    },

    /// A principal left the admin set.
    AdminRemoved {
        /// The removed admin.
        principal: TraderId,
    },
}

impl EngineEvent {
    /// Stable event name, used by the router's log lines.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::OrderCreated { .. } => "OrderCreated",
            EngineEvent::OrderPlaced { .. } => "OrderPlaced",
            EngineEvent::OrderMatched { .. } => "OrderMatched",
            EngineEvent::SettlementProcessed { .. } => "SettlementProcessed",
            EngineEvent::OrderStatusUpdated { .. } => "OrderStatusUpdated",
            EngineEvent::OrderCanceled { .. } => "OrderCanceled",
            EngineEvent::FeeRateUpdated { .. } => "FeeRateUpdated",
            EngineEvent::FeeRecipientUpdated { .. } => "FeeRecipientUpdated",
            EngineEvent::PairAdded { .. } => "PairAdded",
            EngineEvent::AdminAdded { .. } => "AdminAdded",
            EngineEvent::AdminRemoved { .. } => "AdminRemoved",
        }
    }

    /// The subscription-mask bit matching this event.
    #[must_use]
    pub fn mask(&self) -> EventMask {
        match self {
            EngineEvent::OrderCreated { .. } => EventMask::ORDER_CREATED,
            EngineEvent::OrderPlaced { .. } => EventMask::ORDER_PLACED,
            EngineEvent::OrderMatched { .. } => EventMask::ORDER_MATCHED,
            EngineEvent::SettlementProcessed { .. } => EventMask::SETTLEMENT_PROCESSED,
            EngineEvent::OrderStatusUpdated { .. } => EventMask::ORDER_STATUS_UPDATED,
            EngineEvent::OrderCanceled { .. } => EventMask::ORDER_CANCELED,
            EngineEvent::FeeRateUpdated { .. }
            | EngineEvent::FeeRecipientUpdated { .. }
            | EngineEvent::PairAdded { .. }
            | EngineEvent::AdminAdded { .. }
            | EngineEvent::AdminRemoved { .. } => EventMask::ADMIN,
        }
    }
}

/// Listener invoked with every committed event, in commit order.
pub type EventListener = Arc<dyn Fn(&EngineEvent) + Send + Sync>;

/// Per-call event staging buffer. Flushed to the listener on commit,
/// dropped on abort.
pub(crate) type EventBuffer = Vec<EngineEvent>;

bitflags! {
    /// Subscription mask for event routing.
    ///
    /// Combine bits to select which events a router forwards:
    ///
    /// ```
    /// use clob_engine::EventMask;
    ///
    /// let trades_only = EventMask::ORDER_MATCHED | EventMask::SETTLEMENT_PROCESSED;
    /// assert!(trades_only.contains(EventMask::ORDER_MATCHED));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    pub struct EventMask: u32 {
        /// `OrderCreated` events.
        const ORDER_CREATED = 1 << 0;

        /// `OrderPlaced` events.
        const ORDER_PLACED = 1 << 1;

        /// `OrderMatched` events.
        const ORDER_MATCHED = 1 << 2;

        /// `SettlementProcessed` events.
        const SETTLEMENT_PROCESSED = 1 << 3;

        /// `OrderStatusUpdated` events.
        const ORDER_STATUS_UPDATED = 1 << 4;

        /// `OrderCanceled` events.
        const ORDER_CANCELED = 1 << 5;

        /// Configuration events (fees, pairs, admin set).
        const ADMIN = 1 << 6;

        /// Every event.
        const ALL = Self::ORDER_CREATED.bits() | Self::ORDER_PLACED.bits()
                  | Self::ORDER_MATCHED.bits() | Self::SETTLEMENT_PROCESSED.bits()
                  | Self::ORDER_STATUS_UPDATED.bits() | Self::ORDER_CANCELED.bits()
                  | Self::ADMIN.bits();
    }
}
