//! Settlement records produced by matching and receipts produced by the vault.

use crate::engine::types::OrderId;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// One match produced by the book's planning walk.
///
/// Settlements are transient: they exist between matching and settlement and
/// are never persisted afterwards. The `(taker_order_id, maker_order_id)`
/// pair identifies a settlement for replay protection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Settlement {
    /// Aggressing side of the match.
    pub taker_order_id: OrderId,
    /// Resting side of the match.
    pub maker_order_id: OrderId,
    /// Execution price; always the maker's resting price.
    pub price: u128,
    /// Executed quantity in base fixed-point units.
    pub quantity: u128,
}

impl Settlement {
    /// The replay-protection key of this settlement.
    #[must_use]
    #[inline]
    pub fn key(&self) -> (OrderId, OrderId) {
        (self.taker_order_id, self.maker_order_id)
    }
}

/// Outcome of settling one [`Settlement`] through the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementReceipt {
    /// Deterministic transaction id for this settlement.
    pub transaction_id: Uuid,
    /// The settled match.
    pub settlement: Settlement,
    /// Quote value exchanged (`quantity * price / 10^base_decimals`).
    pub quote_amount: u128,
    /// Fee charged to the maker, in quote units.
    pub maker_fee: u128,
    /// Fee charged to the taker, in quote units.
    pub taker_fee: u128,
}

/// Generator of deterministic per-vault transaction ids: UUIDv5 over a
/// random per-instance namespace and a local counter.
#[derive(Debug)]
pub(crate) struct TxIdGenerator {
    namespace: Uuid,
    counter: AtomicU64,
}

impl TxIdGenerator {
    pub(crate) fn new() -> Self {
        Self {
            namespace: Uuid::new_v4(),
            counter: AtomicU64::new(1),
        }
    }

    pub(crate) fn next(&self) -> Uuid {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        Uuid::new_v5(&self.namespace, &seq.to_be_bytes())
    }
}
