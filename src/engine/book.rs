//! Book sides, resting-order management, and read views.

use crate::engine::error::EngineError;
use crate::engine::level::PriceLevel;
use crate::engine::order::Order;
use crate::engine::registry::OrderRegistry;
use crate::engine::types::{OrderId, Pair, Side};
use crossbeam::atomic::AtomicCell;
use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::trace;

/// Price-ordered resting liquidity for one market pair.
///
/// Both sides are concurrent ordered maps (skip lists) keyed by price, with
/// a FIFO [`PriceLevel`] per key. The skip list keeps prices sorted, so
/// best-price discovery is O(1) (`front`/`back`) and the matching walk never
/// sorts. Orders are held by id only; the registry stays authoritative.
pub struct Book {
    pair: Pair,
    registry: Arc<OrderRegistry>,

    /// Bid side (buy orders); best bid is the highest key.
    pub(super) bids: SkipMap<u128, Arc<PriceLevel>>,

    /// Ask side (sell orders); best ask is the lowest key.
    pub(super) asks: SkipMap<u128, Arc<PriceLevel>>,

    /// Order id -> (price, side) for O(1) removal lookups.
    pub(super) order_locations: DashMap<OrderId, (u128, Side)>,

    /// Price of the most recent committed fill.
    pub(super) last_trade_price: AtomicCell<u128>,

    /// Whether any fill has been committed yet.
    pub(super) has_traded: AtomicBool,
}

impl Book {
    /// Create an empty book for `pair`, reading orders through `registry`.
    pub(crate) fn new(pair: Pair, registry: Arc<OrderRegistry>) -> Self {
        Self {
            pair,
            registry,
            bids: SkipMap::new(),
            asks: SkipMap::new(),
            order_locations: DashMap::new(),
            last_trade_price: AtomicCell::new(0),
            has_traded: AtomicBool::new(false),
        }
    }

    /// The pair this book trades.
    #[must_use]
    pub fn pair(&self) -> &Pair {
        &self.pair
    }

    pub(crate) fn registry(&self) -> &Arc<OrderRegistry> {
        &self.registry
    }

    /// Highest resting bid price, if any.
    #[must_use]
    pub fn best_bid(&self) -> Option<u128> {
        self.bids.back().map(|entry| *entry.key())
    }

    /// Lowest resting ask price, if any.
    #[must_use]
    pub fn best_ask(&self) -> Option<u128> {
        self.asks.front().map(|entry| *entry.key())
    }

    /// Aggregate resting quantity at `price` on `side`.
    #[must_use]
    pub fn quantity_at(&self, price: u128, side: Side) -> u128 {
        let levels = self.side_levels(side);
        levels
            .get(&price)
            .map(|entry| entry.value().total_quantity())
            .unwrap_or(0)
    }

    /// Best-first ladder of `(price, quantity)` for up to `max_levels`
    /// levels on `side`.
    #[must_use]
    pub fn depth(&self, side: Side, max_levels: usize) -> Vec<(u128, u128)> {
        let levels = self.side_levels(side);
        let iter: Box<dyn Iterator<Item = _>> = match side {
            Side::Buy => Box::new(levels.iter().rev()),
            Side::Sell => Box::new(levels.iter()),
        };
        iter.take(max_levels)
            .map(|entry| (*entry.key(), entry.value().total_quantity()))
            .collect()
    }

    /// Price of the most recent fill, if any fill has occurred.
    #[must_use]
    pub fn last_trade_price(&self) -> Option<u128> {
        if self.has_traded.load(Ordering::Relaxed) {
            Some(self.last_trade_price.load())
        } else {
            None
        }
    }

    /// Number of orders currently resting in this book.
    #[must_use]
    pub fn resting_orders(&self) -> usize {
        self.order_locations.len()
    }

    /// Whether `order_id` currently rests in this book.
    #[must_use]
    pub fn contains(&self, order_id: OrderId) -> bool {
        self.order_locations.contains_key(&order_id)
    }

    /// Rest an order at its price level, appended to the FIFO tail.
    pub(crate) fn insert(&self, order: &Order) -> Result<(), EngineError> {
        if order.is_terminal() {
            return Err(EngineError::InvalidOrder {
                message: format!("cannot rest terminal order {}", order.id),
            });
        }
        if order.price == 0 {
            return Err(EngineError::InvalidOrder {
                message: format!("cannot rest order {} without a price", order.id),
            });
        }

        let levels = self.side_levels(order.side);
        let level = levels
            .get_or_insert(order.price, Arc::new(PriceLevel::new(order.price)))
            .value()
            .clone();
        level.push_back(order.id, order.remaining());
        self.order_locations
            .insert(order.id, (order.price, order.side));
        trace!(
            "Resting order {} {} {} @ {} (remaining {})",
            order.id,
            self.pair,
            order.side,
            order.price,
            order.remaining()
        );
        Ok(())
    }

    /// Remove a terminal (CANCELED or FILLED) order from its level. Deletes
    /// the level when it empties so it never appears in best-price
    /// discovery.
    pub(crate) fn remove(&self, order: &Order) -> Result<(), EngineError> {
        if !order.is_terminal() {
            return Err(EngineError::InvalidOrder {
                message: format!("cannot remove live order {} from the book", order.id),
            });
        }
        let (price, side) = self
            .order_locations
            .remove(&order.id)
            .map(|(_, location)| location)
            .ok_or(EngineError::OrderNotFound(order.id))?;

        let levels = self.side_levels(side);
        if let Some(entry) = levels.get(&price) {
            let level = entry.value();
            level.remove(order.id, order.remaining());
            if level.is_empty() {
                levels.remove(&price);
            }
        }
        trace!("Removed order {} from {} @ {}", order.id, side, price);
        Ok(())
    }

    /// Commit a fill against a resting maker after its settlement
    /// succeeded: shrink the level aggregate and, when the maker is fully
    /// filled, drop it from the book in the same step.
    pub(crate) fn commit_fill(&self, maker_id: OrderId, quantity: u128) -> Result<(), EngineError> {
        let (price, side) = self
            .order_locations
            .get(&maker_id)
            .map(|entry| *entry.value())
            .ok_or(EngineError::OrderNotFound(maker_id))?;

        let levels = self.side_levels(side);
        let Some(entry) = levels.get(&price) else {
            return Err(EngineError::OrderNotFound(maker_id));
        };
        let level = entry.value().clone();
        level.reduce(quantity);

        let maker = self.registry.get(maker_id)?;
        if maker.remaining() == 0 {
            level.remove(maker_id, 0);
            self.order_locations.remove(&maker_id);
            if level.is_empty() {
                levels.remove(&price);
            }
        }

        self.last_trade_price.store(price);
        self.has_traded.store(true, Ordering::Relaxed);
        Ok(())
    }

    pub(super) fn side_levels(&self, side: Side) -> &SkipMap<u128, Arc<PriceLevel>> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    /// Snapshot one side as best-first `(price, FIFO ids)` pairs.
    pub(crate) fn side_level_ids(&self, side: Side) -> Vec<(u128, Vec<OrderId>)> {
        let levels = self.side_levels(side);
        let iter: Box<dyn Iterator<Item = _>> = match side {
            Side::Buy => Box::new(levels.iter().rev()),
            Side::Sell => Box::new(levels.iter()),
        };
        iter.map(|entry| (*entry.key(), entry.value().order_ids()))
            .collect()
    }
}
