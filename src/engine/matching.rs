//! Matching planner: the price-time priority walk that turns an incoming
//! order into a list of settlements.
//!
//! Planning is pure: the walk reads the book and the registry but mutates
//! neither. The facade applies the plan only after every settlement has
//! cleared the vault, which is what keeps the whole call atomic: an
//! aborted call leaves the book exactly as the walk found it.

use crate::engine::book::Book;
use crate::engine::error::EngineError;
use crate::engine::order::Order;
use crate::engine::settlement::Settlement;
use crate::engine::types::{OrderKind, Side};
use tracing::trace;

/// Outcome of one planning walk.
#[derive(Debug, Clone, Default)]
pub(crate) struct MatchPlan {
    /// Planned settlements in execution order.
    pub settlements: Vec<Settlement>,
    /// Total base quantity the plan executes.
    pub executed: u128,
    /// Total quote value the plan exchanges.
    pub quote_spent: u128,
}

impl Book {
    /// Walk the opposite side best-first and plan the fills for `taker`.
    ///
    /// Strict price-time priority: levels are visited best price first and
    /// orders within a level in arrival order. Resting orders owned by the
    /// taker's trader are skipped and left in place (self-trade
    /// prevention); the walk continues with the next order in FIFO order.
    ///
    /// Termination: the taker quantity is exhausted, the price stops
    /// crossing the limit, the quote budget can no longer buy a non-zero
    /// amount, or the side runs out of liquidity.
    ///
    /// Settlements are recorded at the maker's resting price.
    pub(crate) fn plan_match(
        &self,
        taker: &Order,
        base_unit: u128,
    ) -> Result<MatchPlan, EngineError> {
        let mut plan = MatchPlan::default();

        let limit_price = match taker.kind {
            OrderKind::Limit | OrderKind::Ioc | OrderKind::Fok => Some(taker.price),
            OrderKind::Market => None,
        };
        let quote_funded = taker.is_quote_funded();
        let mut taker_remaining = if quote_funded {
            u128::MAX
        } else {
            taker.remaining()
        };
        let mut budget_left = taker.quote_budget;

        let opposite = self.side_levels(taker.side.opposite());
        // Skip list order is ascending by price: walk asks forward for a
        // buy, bids backward for a sell, so the best level always comes
        // first.
        let price_iter: Box<dyn Iterator<Item = _>> = match taker.side {
            Side::Buy => Box::new(opposite.iter()),
            Side::Sell => Box::new(opposite.iter().rev()),
        };

        'levels: for entry in price_iter {
            if taker_remaining == 0 {
                break;
            }
            let price = *entry.key();
            if let Some(limit) = limit_price {
                match taker.side {
                    Side::Buy if price > limit => break,
                    Side::Sell if price < limit => break,
                    _ => {}
                }
            }

            for maker_id in entry.value().order_ids() {
                if taker_remaining == 0 {
                    break 'levels;
                }
                let maker = self.registry().get(maker_id)?;
                if maker.trader == taker.trader {
                    trace!(
                        "Skipping self-trade: taker {} vs resting {} ({})",
                        taker.id, maker_id, maker.trader
                    );
                    continue;
                }

                let mut fill = taker_remaining.min(maker.remaining());
                if let Some(budget) = budget_left {
                    let affordable = budget
                        .checked_mul(base_unit)
                        .map(|scaled| scaled / price)
                        .ok_or_else(|| EngineError::InvalidOrder {
                            message: "quote budget overflows".to_string(),
                        })?;
                    fill = fill.min(affordable);
                }
                if fill == 0 {
                    // Budget exhausted below one sellable unit
                    break 'levels;
                }

                let quote_amount = mul_div(fill, price, base_unit)?;
                if quote_funded && quote_amount == 0 {
                    // Residual budget rounds to zero quote; stop rather
                    // than exchange base for nothing
                    break 'levels;
                }
                if let Some(budget) = &mut budget_left {
                    *budget -= quote_amount;
                }

                plan.settlements.push(Settlement {
                    taker_order_id: taker.id,
                    maker_order_id: maker_id,
                    price,
                    quantity: fill,
                });
                plan.executed = plan.executed.saturating_add(fill);
                plan.quote_spent = plan.quote_spent.saturating_add(quote_amount);
                if !quote_funded {
                    taker_remaining -= fill;
                }
            }
        }

        trace!(
            "Planned {} settlements for taker {} (executed {}, quote {})",
            plan.settlements.len(),
            taker.id,
            plan.executed,
            plan.quote_spent
        );
        Ok(plan)
    }
}

/// `value * mul / div` with overflow surfaced as an invalid-order error.
pub(crate) fn mul_div(value: u128, mul: u128, div: u128) -> Result<u128, EngineError> {
    value
        .checked_mul(mul)
        .map(|product| product / div)
        .ok_or_else(|| EngineError::InvalidOrder {
            message: "quote amount overflows".to_string(),
        })
}
