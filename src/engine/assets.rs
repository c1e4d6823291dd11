//! The asset-transfer capability consumed by the vault.
//!
//! The engine never holds custody between settlements; every movement is a
//! direct maker <-> taker <-> fee-recipient transfer through this capability.
//! Hosts plug in their own custody layer; [`InMemoryLedger`] is the reference
//! implementation used by the test suite and by embedders that keep balances
//! in process.

use crate::engine::types::{AssetId, TraderId};
use dashmap::DashMap;
use thiserror::Error;

/// Failure modes of the transfer capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// The sender does not hold enough of the asset.
    #[error("{trader} holds {available} {asset}, needs {required}")]
    InsufficientBalance {
        /// The debited principal.
        trader: TraderId,
        /// The asset being moved.
        asset: AssetId,
        /// Balance currently held.
        available: u128,
        /// Amount the transfer required.
        required: u128,
    },

    /// The receiving balance would overflow.
    #[error("transfer of {amount} {asset} overflows the receiving balance")]
    BalanceOverflow {
        /// The asset being moved.
        asset: AssetId,
        /// Amount of the rejected transfer.
        amount: u128,
    },
}

/// Minimal asset capability: move `amount` of `asset` from one principal to
/// another, atomically. A transfer either fully applies or fails with no
/// effect.
pub trait AssetTransfer: Send + Sync {
    /// Move `amount` of `asset` from `from` to `to`.
    fn transfer(
        &self,
        asset: &AssetId,
        from: TraderId,
        to: TraderId,
        amount: u128,
    ) -> Result<(), TransferError>;
}

/// In-memory balance ledger implementing [`AssetTransfer`].
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    balances: DashMap<(TraderId, AssetId), u128>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` of `asset` to `trader`.
    pub fn deposit(
        &self,
        trader: TraderId,
        asset: &AssetId,
        amount: u128,
    ) -> Result<(), TransferError> {
        let mut entry = self.balances.entry((trader, asset.clone())).or_insert(0);
        let current = *entry;
        *entry = current
            .checked_add(amount)
            .ok_or_else(|| TransferError::BalanceOverflow {
                asset: asset.clone(),
                amount,
            })?;
        Ok(())
    }

    /// Balance of `asset` held by `trader`.
    #[must_use]
    pub fn balance_of(&self, trader: TraderId, asset: &AssetId) -> u128 {
        self.balances
            .get(&(trader, asset.clone()))
            .map(|entry| *entry.value())
            .unwrap_or(0)
    }
}

impl AssetTransfer for InMemoryLedger {
    fn transfer(
        &self,
        asset: &AssetId,
        from: TraderId,
        to: TraderId,
        amount: u128,
    ) -> Result<(), TransferError> {
        if amount == 0 || from == to {
            return Ok(());
        }

        let available = self.balance_of(from, asset);
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                trader: from,
                asset: asset.clone(),
                available,
                required: amount,
            });
        }

        let receiving = self.balance_of(to, asset);
        let credited = receiving
            .checked_add(amount)
            .ok_or_else(|| TransferError::BalanceOverflow {
                asset: asset.clone(),
                amount,
            })?;

        self.balances
            .insert((from, asset.clone()), available - amount);
        self.balances.insert((to, asset.clone()), credited);
        Ok(())
    }
}
