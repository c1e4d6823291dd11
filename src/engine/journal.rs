//! Per-call undo journal backing the stage -> validate -> commit discipline.
//!
//! Every mutation a facade call performs before its commit point is recorded
//! here. When any step fails, [`TxJournal::rollback`] unwinds the entries in
//! LIFO order: applied asset moves are reversed, order states restored,
//! replay-set marks removed, and the staged order creation expunged.

use crate::engine::assets::AssetTransfer;
use crate::engine::registry::OrderRegistry;
use crate::engine::types::{AssetId, OrderId, OrderStatus, TraderId};
use crate::engine::vault::Vault;
use tracing::error;

#[derive(Debug)]
pub(crate) enum JournalEntry {
    /// An order was created in this call.
    OrderCreated { order_id: OrderId },

    /// An order's lifecycle fields changed; previous values retained.
    StatusChanged {
        order_id: OrderId,
        prev_status: OrderStatus,
        prev_filled: u128,
        prev_quantity: u128,
    },

    /// An asset transfer was applied.
    AssetMoved {
        asset: AssetId,
        from: TraderId,
        to: TraderId,
        amount: u128,
    },

    /// A settlement key was added to the replay-protection set.
    SettlementMarked {
        taker_order_id: OrderId,
        maker_order_id: OrderId,
    },
}

/// Undo log for one facade call.
#[derive(Debug, Default)]
pub(crate) struct TxJournal {
    entries: Vec<JournalEntry>,
}

impl TxJournal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, entry: JournalEntry) {
        self.entries.push(entry);
    }

    /// Unwind every recorded mutation, most recent first.
    pub(crate) fn rollback(
        self,
        registry: &OrderRegistry,
        assets: &dyn AssetTransfer,
        vault: &Vault,
    ) {
        for entry in self.entries.into_iter().rev() {
            match entry {
                JournalEntry::AssetMoved {
                    asset,
                    from,
                    to,
                    amount,
                } => {
                    // The funds just arrived at `to`, so the reverse move
                    // cannot lack balance with a conforming capability. A
                    // foreign capability failing here is unrecoverable;
                    // log and keep unwinding.
                    if let Err(err) = assets.transfer(&asset, to, from, amount) {
                        error!(
                            "rollback transfer failed: {} {} {} -> {}: {}",
                            amount, asset, to, from, err
                        );
                    }
                }
                JournalEntry::StatusChanged {
                    order_id,
                    prev_status,
                    prev_filled,
                    prev_quantity,
                } => {
                    registry.revert(order_id, prev_status, prev_filled, prev_quantity);
                }
                JournalEntry::SettlementMarked {
                    taker_order_id,
                    maker_order_id,
                } => {
                    vault.unmark(taker_order_id, maker_order_id);
                }
                JournalEntry::OrderCreated { order_id } => {
                    registry.expunge(order_id);
                }
            }
        }
    }
}
