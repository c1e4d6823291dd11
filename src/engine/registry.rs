//! Authoritative order store and status transitions.
//!
//! The registry uniquely owns every order ever created. The book and the
//! vault hold ids only and route every mutation through here, which is what
//! enforces the monotonic lifecycle in one place. Mutating methods are
//! `pub(crate)`: external callers get the read-only surface, the facade is
//! the only public write path.

use crate::engine::error::EngineError;
use crate::engine::events::{EngineEvent, EventBuffer};
use crate::engine::order::Order;
use crate::engine::types::{OrderId, OrderKind, OrderStatus, Pair, Side, TraderId};
use crate::utils::current_time_millis;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// The authoritative record of every order.
#[derive(Debug)]
pub struct OrderRegistry {
    orders: DashMap<OrderId, Order>,
    trader_index: DashMap<TraderId, Vec<OrderId>>,
    next_order_id: AtomicU64,
}

impl OrderRegistry {
    /// Create an empty registry. Ids start at 1.
    pub fn new() -> Self {
        Self {
            orders: DashMap::new(),
            trader_index: DashMap::new(),
            next_order_id: AtomicU64::new(1),
        }
    }

    /// Rebuild a registry from previously persisted orders.
    ///
    /// The id counter resumes past the highest restored id so newly created
    /// orders keep the monotonic sequence.
    pub(crate) fn from_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let registry = Self::new();
        let mut max_id = 0u64;
        for order in orders {
            max_id = max_id.max(order.id.0);
            registry
                .trader_index
                .entry(order.trader)
                .or_default()
                .push(order.id);
            registry.orders.insert(order.id, order);
        }
        registry.next_order_id.store(max_id + 1, Ordering::Relaxed);
        registry
    }

    /// Read-only view of an order.
    ///
    /// # Errors
    /// Returns [`EngineError::OrderNotFound`] for unknown ids.
    pub fn get(&self, order_id: OrderId) -> Result<Order, EngineError> {
        self.orders
            .get(&order_id)
            .map(|entry| entry.value().clone())
            .ok_or(EngineError::OrderNotFound(order_id))
    }

    /// Ids of every order ever created by `trader`, in creation order.
    #[must_use]
    pub fn orders_of(&self, trader: TraderId) -> Vec<OrderId> {
        self.trader_index
            .get(&trader)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Total number of orders on record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether no orders are on record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// All orders on record, unordered.
    pub(crate) fn all_orders(&self) -> Vec<Order> {
        self.orders
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Create a new order with status OPEN and zero filled quantity.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn create(
        &self,
        trader: TraderId,
        pair: Pair,
        side: Side,
        kind: OrderKind,
        price: u128,
        quantity: u128,
        quote_budget: Option<u128>,
        events: &mut EventBuffer,
    ) -> OrderId {
        let order_id = OrderId(self.next_order_id.fetch_add(1, Ordering::Relaxed));
        let order = Order {
            id: order_id,
            trader,
            pair: pair.clone(),
            side,
            kind,
            price,
            quantity,
            filled_quantity: 0,
            quote_budget,
            status: OrderStatus::Open,
            created_at: current_time_millis(),
        };
        trace!(
            "Creating order {} {} {} {} {} qty {}",
            order_id, trader, pair, kind, side, quantity
        );

        self.trader_index.entry(trader).or_default().push(order_id);
        self.orders.insert(order_id, order);

        events.push(EngineEvent::OrderCreated {
            order_id,
            trader,
            base: pair.base,
            quote: pair.quote,
            price,
            quantity,
            is_buy: side.is_buy(),
            order_type: kind,
        });
        order_id
    }

    /// Advance an order's status and filled quantity.
    ///
    /// Enforces the one-way lifecycle: terminal states are immutable,
    /// `filled_quantity` never regresses and never exceeds `quantity`
    /// (except for quote-funded market buys, whose quantity is discovered
    /// at close).
    pub(crate) fn update_status(
        &self,
        order_id: OrderId,
        new_status: OrderStatus,
        new_filled: u128,
        events: &mut EventBuffer,
    ) -> Result<(), EngineError> {
        let mut entry = self
            .orders
            .get_mut(&order_id)
            .ok_or(EngineError::OrderNotFound(order_id))?;
        let order = entry.value_mut();

        let rejected = EngineError::InvalidTransition {
            order_id,
            from: order.status,
            to: new_status,
        };
        if order.status.is_terminal() || new_status == OrderStatus::Open {
            return Err(rejected);
        }
        if new_filled < order.filled_quantity {
            return Err(rejected);
        }
        if !order.is_quote_funded() {
            if new_filled > order.quantity {
                return Err(rejected);
            }
            if new_status == OrderStatus::Filled && new_filled != order.quantity {
                return Err(rejected);
            }
        }

        order.status = new_status;
        order.filled_quantity = new_filled;
        trace!("Order {} -> {} filled {}", order_id, new_status, new_filled);
        drop(entry);

        events.push(EngineEvent::OrderStatusUpdated {
            order_id,
            status: new_status,
            filled_quantity: new_filled,
        });
        Ok(())
    }

    /// Transition an OPEN or PARTIALLY_FILLED order to CANCELED,
    /// preserving its filled quantity.
    pub(crate) fn cancel(
        &self,
        order_id: OrderId,
        events: &mut EventBuffer,
    ) -> Result<(), EngineError> {
        let order = self.get(order_id)?;
        if order.is_terminal() {
            return Err(EngineError::NotCancellable {
                order_id,
                status: order.status,
            });
        }
        self.update_status(
            order_id,
            OrderStatus::Canceled,
            order.filled_quantity,
            events,
        )
    }

    /// Close a quote-funded market buy: fix `quantity` at the executed
    /// amount and mark FILLED, or CANCELED when nothing executed.
    pub(crate) fn close_funded(
        &self,
        order_id: OrderId,
        events: &mut EventBuffer,
    ) -> Result<(), EngineError> {
        let (status, filled) = {
            let mut entry = self
                .orders
                .get_mut(&order_id)
                .ok_or(EngineError::OrderNotFound(order_id))?;
            let order = entry.value_mut();
            if !order.is_quote_funded() || order.status.is_terminal() {
                return Err(EngineError::InvalidTransition {
                    order_id,
                    from: order.status,
                    to: OrderStatus::Filled,
                });
            }
            if order.filled_quantity > 0 {
                order.quantity = order.filled_quantity;
                order.status = OrderStatus::Filled;
            } else {
                order.status = OrderStatus::Canceled;
            }
            (order.status, order.filled_quantity)
        };

        events.push(EngineEvent::OrderStatusUpdated {
            order_id,
            status,
            filled_quantity: filled,
        });
        Ok(())
    }

    /// Restore an order to a journaled state. Rollback path only: bypasses
    /// the monotonicity checks and emits nothing.
    pub(crate) fn revert(
        &self,
        order_id: OrderId,
        status: OrderStatus,
        filled_quantity: u128,
        quantity: u128,
    ) {
        if let Some(mut entry) = self.orders.get_mut(&order_id) {
            let order = entry.value_mut();
            order.status = status;
            order.filled_quantity = filled_quantity;
            order.quantity = quantity;
        }
    }

    /// Remove a staged order during rollback of an aborted call. The id is
    /// not reused; gaps in the sequence are harmless.
    pub(crate) fn expunge(&self, order_id: OrderId) {
        if let Some((_, order)) = self.orders.remove(&order_id) {
            if let Some(mut entry) = self.trader_index.get_mut(&order.trader) {
                entry.value_mut().retain(|id| *id != order_id);
            }
        }
    }
}

impl Default for OrderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
