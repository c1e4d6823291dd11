//! The order entity owned by the registry.

use crate::engine::types::{OrderId, OrderKind, OrderStatus, Pair, Side, TraderId};
use serde::{Deserialize, Serialize};

/// A single order as recorded by the [`crate::OrderRegistry`].
///
/// Orders are created exactly once and never deleted. The only mutations are
/// advancing `filled_quantity` and `status` through the registry, both of
/// which are monotonic: `filled_quantity` never regresses and terminal
/// statuses are immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Monotonically increasing identifier assigned by the registry.
    pub id: OrderId,
    /// Owner of the order.
    pub trader: TraderId,
    /// The market pair this order trades.
    pub pair: Pair,
    /// Buy or sell of the base asset.
    pub side: Side,
    /// Order kind (LIMIT, MARKET, IOC, FOK).
    pub kind: OrderKind,
    /// Limit price in quote fixed-point units per whole base asset.
    /// Zero for market orders.
    pub price: u128,
    /// Total quantity in base fixed-point units. Zero for market buys
    /// funded purely by a quote budget.
    pub quantity: u128,
    /// Quantity executed so far, in base fixed-point units.
    pub filled_quantity: u128,
    /// Quote budget for quote-funded market buys.
    pub quote_budget: Option<u128>,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Creation timestamp in milliseconds since the Unix epoch.
    pub created_at: u64,
}

impl Order {
    /// Quantity still unexecuted (`quantity - filled_quantity`).
    #[must_use]
    #[inline]
    pub fn remaining(&self) -> u128 {
        self.quantity.saturating_sub(self.filled_quantity)
    }

    /// Whether the order is in a terminal state.
    #[must_use]
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether this is a market buy funded purely by a quote budget.
    ///
    /// Such orders carry `quantity == 0` until the engine closes them, at
    /// which point `quantity` is set to the executed amount so the
    /// `FILLED <=> filled_quantity == quantity` correlation holds.
    #[must_use]
    #[inline]
    pub fn is_quote_funded(&self) -> bool {
        self.quantity == 0 && self.quote_budget.is_some()
    }
}
