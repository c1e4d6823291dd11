//! Settlement engine: fee arithmetic, asset movement, status updates, and
//! replay protection.

use crate::engine::assets::AssetTransfer;
use crate::engine::error::EngineError;
use crate::engine::events::{EngineEvent, EventBuffer};
use crate::engine::fees::FeeSchedule;
use crate::engine::journal::{JournalEntry, TxJournal};
use crate::engine::matching::mul_div;
use crate::engine::order::Order;
use crate::engine::registry::OrderRegistry;
use crate::engine::settlement::{Settlement, SettlementReceipt, TxIdGenerator};
use crate::engine::types::{AssetId, OrderId, OrderStatus, PairConfig, Side, TraderId};
use crossbeam::atomic::AtomicCell;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::trace;

/// Translates settlements into asset movements and status updates.
///
/// Per settlement the vault moves the base asset from seller to buyer, the
/// full quote amount from buyer to seller, and one fee from each side to the
/// fee recipient, so the maker nets `quote_amount - maker_fee` and the
/// taker is debited `quote_amount + taker_fee`. Every movement and status
/// change is journaled; the enclosing facade call unwinds the journal if any
/// later step fails.
pub struct Vault {
    registry: Arc<OrderRegistry>,
    assets: Arc<dyn AssetTransfer>,
    fee_schedule: AtomicCell<FeeSchedule>,
    fee_recipient: AtomicCell<TraderId>,
    processed: DashMap<(OrderId, OrderId), ()>,
    tx_ids: TxIdGenerator,
}

impl Vault {
    pub(crate) fn new(
        registry: Arc<OrderRegistry>,
        assets: Arc<dyn AssetTransfer>,
        fee_schedule: FeeSchedule,
        fee_recipient: TraderId,
    ) -> Self {
        Self {
            registry,
            assets,
            fee_schedule: AtomicCell::new(fee_schedule),
            fee_recipient: AtomicCell::new(fee_recipient),
            processed: DashMap::new(),
            tx_ids: TxIdGenerator::new(),
        }
    }

    /// The active fee schedule.
    #[must_use]
    pub fn fee_schedule(&self) -> FeeSchedule {
        self.fee_schedule.load()
    }

    /// The active fee recipient.
    #[must_use]
    pub fn fee_recipient(&self) -> TraderId {
        self.fee_recipient.load()
    }

    pub(crate) fn set_fee_schedule(&self, schedule: FeeSchedule) {
        self.fee_schedule.store(schedule);
    }

    pub(crate) fn set_fee_recipient(&self, recipient: TraderId) {
        self.fee_recipient.store(recipient);
    }

    pub(crate) fn assets(&self) -> &dyn AssetTransfer {
        self.assets.as_ref()
    }

    /// Whether the `(taker, maker)` pair has already been settled.
    #[must_use]
    pub fn is_processed(&self, taker_order_id: OrderId, maker_order_id: OrderId) -> bool {
        self.processed
            .contains_key(&(taker_order_id, maker_order_id))
    }

    /// Keys of every processed settlement, for persistence.
    pub(crate) fn processed_keys(&self) -> Vec<(OrderId, OrderId)> {
        self.processed.iter().map(|entry| *entry.key()).collect()
    }

    pub(crate) fn mark_processed(&self, key: (OrderId, OrderId)) {
        self.processed.insert(key, ());
    }

    pub(crate) fn unmark(&self, taker_order_id: OrderId, maker_order_id: OrderId) {
        self.processed.remove(&(taker_order_id, maker_order_id));
    }

    /// Quote value of a settlement: `quantity * price / 10^base_decimals`,
    /// truncating.
    pub(crate) fn quote_amount(
        config: &PairConfig,
        settlement: &Settlement,
    ) -> Result<u128, EngineError> {
        mul_div(settlement.quantity, settlement.price, config.base_unit())
    }

    /// Compute `(maker_fee, taker_fee)` for a settlement without touching
    /// any state.
    pub fn calculate_fees(
        &self,
        config: &PairConfig,
        settlement: &Settlement,
    ) -> Result<(u128, u128), EngineError> {
        let quote_amount = Self::quote_amount(config, settlement)?;
        let schedule = self.fee_schedule();
        Ok((
            schedule.calculate_fee(quote_amount, true),
            schedule.calculate_fee(quote_amount, false),
        ))
    }

    /// Settle one match: move assets and fees, then advance both legs'
    /// status through the registry.
    ///
    /// # Errors
    /// - [`EngineError::AlreadyProcessed`] when the `(taker, maker)` pair
    ///   was settled before.
    /// - [`EngineError::InsufficientAssets`] when a transfer fails.
    /// - [`EngineError::InvalidTransition`] when a status update is
    ///   rejected.
    ///
    /// Partially applied work is left in the journal for the caller to
    /// unwind.
    pub(crate) fn settle(
        &self,
        config: &PairConfig,
        settlement: &Settlement,
        journal: &mut TxJournal,
        events: &mut EventBuffer,
    ) -> Result<SettlementReceipt, EngineError> {
        if settlement.quantity == 0 {
            return Err(EngineError::InvalidOrder {
                message: "settlement quantity must be positive".to_string(),
            });
        }
        let key = settlement.key();
        if self.processed.contains_key(&key) {
            return Err(EngineError::AlreadyProcessed {
                taker_order_id: settlement.taker_order_id,
                maker_order_id: settlement.maker_order_id,
            });
        }

        let taker = self.registry.get(settlement.taker_order_id)?;
        let maker = self.registry.get(settlement.maker_order_id)?;

        let quote_amount = Self::quote_amount(config, settlement)?;
        let schedule = self.fee_schedule();
        let maker_fee = schedule.calculate_fee(quote_amount, true);
        let taker_fee = schedule.calculate_fee(quote_amount, false);
        let recipient = self.fee_recipient();

        let (buyer, seller) = match taker.side {
            Side::Buy => (&taker, &maker),
            Side::Sell => (&maker, &taker),
        };

        self.mark_processed(key);
        journal.record(JournalEntry::SettlementMarked {
            taker_order_id: settlement.taker_order_id,
            maker_order_id: settlement.maker_order_id,
        });

        events.push(EngineEvent::OrderMatched {
            maker_order_id: maker.id,
            taker_order_id: taker.id,
            price: settlement.price,
            quantity: settlement.quantity,
        });

        let pair = &config.pair;
        self.move_asset(
            &pair.base,
            seller.trader,
            buyer.trader,
            settlement.quantity,
            journal,
        )?;
        self.move_asset(&pair.quote, buyer.trader, seller.trader, quote_amount, journal)?;
        self.move_asset(&pair.quote, taker.trader, recipient, taker_fee, journal)?;
        self.move_asset(&pair.quote, maker.trader, recipient, maker_fee, journal)?;

        events.push(EngineEvent::SettlementProcessed {
            taker_order_id: taker.id,
            maker_order_id: maker.id,
            quantity: settlement.quantity,
            price: settlement.price,
            maker_fee,
            taker_fee,
        });

        self.advance_leg(&maker, settlement.quantity, journal, events)?;
        self.advance_leg(&taker, settlement.quantity, journal, events)?;

        let receipt = SettlementReceipt {
            transaction_id: self.tx_ids.next(),
            settlement: *settlement,
            quote_amount,
            maker_fee,
            taker_fee,
        };
        trace!(
            "Settled {} x {} @ {} (taker {}, maker {}, fees {}/{})",
            settlement.quantity,
            pair,
            settlement.price,
            taker.id,
            maker.id,
            maker_fee,
            taker_fee
        );
        Ok(receipt)
    }

    /// Settle a list of matches as one unit. The caller must unwind the
    /// journal on error; on success every settlement has been applied.
    pub(crate) fn settle_batch(
        &self,
        config: &PairConfig,
        settlements: &[Settlement],
        journal: &mut TxJournal,
        events: &mut EventBuffer,
    ) -> Result<Vec<SettlementReceipt>, EngineError> {
        let mut receipts = Vec::with_capacity(settlements.len());
        for settlement in settlements {
            receipts.push(self.settle(config, settlement, journal, events)?);
        }
        Ok(receipts)
    }

    fn move_asset(
        &self,
        asset: &AssetId,
        from: TraderId,
        to: TraderId,
        amount: u128,
        journal: &mut TxJournal,
    ) -> Result<(), EngineError> {
        if amount == 0 {
            return Ok(());
        }
        self.assets.transfer(asset, from, to, amount)?;
        journal.record(JournalEntry::AssetMoved {
            asset: asset.clone(),
            from,
            to,
            amount,
        });
        Ok(())
    }

    fn advance_leg(
        &self,
        order: &Order,
        fill: u128,
        journal: &mut TxJournal,
        events: &mut EventBuffer,
    ) -> Result<(), EngineError> {
        let new_filled = order.filled_quantity.saturating_add(fill);
        let new_status = if !order.is_quote_funded() && new_filled == order.quantity {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        journal.record(JournalEntry::StatusChanged {
            order_id: order.id,
            prev_status: order.status,
            prev_filled: order.filled_quantity,
            prev_quantity: order.quantity,
        });
        self.registry
            .update_status(order.id, new_status, new_filled, events)
    }
}
