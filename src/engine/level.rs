//! Per-price FIFO queue of resting orders.

use crate::engine::types::OrderId;
use crossbeam::atomic::AtomicCell;
use std::collections::VecDeque;
use std::sync::RwLock;

/// A single price level on one side of the book.
///
/// Holds order ids in strict arrival order and maintains the aggregate
/// resting quantity (`sum of quantity - filled_quantity` over its orders).
/// The registry owns the orders themselves; the level only sequences ids.
#[derive(Debug)]
pub struct PriceLevel {
    price: u128,
    orders: RwLock<VecDeque<OrderId>>,
    total_quantity: AtomicCell<u128>,
}

impl PriceLevel {
    /// Create an empty level at `price`.
    pub(crate) fn new(price: u128) -> Self {
        Self {
            price,
            orders: RwLock::new(VecDeque::new()),
            total_quantity: AtomicCell::new(0),
        }
    }

    /// The price this level is keyed by.
    #[must_use]
    #[inline]
    pub fn price(&self) -> u128 {
        self.price
    }

    /// Number of resting orders at this level.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.read_orders().len()
    }

    /// Aggregate resting quantity at this level.
    #[must_use]
    #[inline]
    pub fn total_quantity(&self) -> u128 {
        self.total_quantity.load()
    }

    /// Whether no orders rest at this level.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read_orders().is_empty()
    }

    /// Snapshot of the resting order ids in FIFO order.
    #[must_use]
    pub fn order_ids(&self) -> Vec<OrderId> {
        self.read_orders().iter().copied().collect()
    }

    /// Append an order at the FIFO tail with its current remaining quantity.
    pub(crate) fn push_back(&self, order_id: OrderId, remaining: u128) {
        self.write_orders().push_back(order_id);
        self.add_quantity(remaining);
    }

    /// Remove an order wherever it sits in the queue, subtracting its
    /// remaining quantity from the aggregate. Returns `false` if the order
    /// was not at this level.
    pub(crate) fn remove(&self, order_id: OrderId, remaining: u128) -> bool {
        let mut orders = self.write_orders();
        let Some(position) = orders.iter().position(|id| *id == order_id) else {
            return false;
        };
        orders.remove(position);
        drop(orders);
        self.sub_quantity(remaining);
        true
    }

    /// Reduce the aggregate by a partial fill without disturbing FIFO order.
    pub(crate) fn reduce(&self, quantity: u128) {
        self.sub_quantity(quantity);
    }

    fn add_quantity(&self, quantity: u128) {
        let current = self.total_quantity.load();
        self.total_quantity
            .store(current.saturating_add(quantity));
    }

    fn sub_quantity(&self, quantity: u128) {
        let current = self.total_quantity.load();
        self.total_quantity
            .store(current.saturating_sub(quantity));
    }

    fn read_orders(&self) -> std::sync::RwLockReadGuard<'_, VecDeque<OrderId>> {
        self.orders.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_orders(&self) -> std::sync::RwLockWriteGuard<'_, VecDeque<OrderId>> {
        self.orders.write().unwrap_or_else(|e| e.into_inner())
    }
}
