//! Custodial ledger: per-`(user, asset)` free/locked balance accounting.
//!
//! All trading operations settle through this module (spec §4.1). The
//! ledger is the one trust boundary the matching engine crosses — per
//! spec §9, every call into it should be treated as a reentrancy hazard,
//! which is why `Book`/`Matching` complete their in-memory mutations
//! before calling in here (see `book::matching`).

mod error;
mod timelock;

pub use error::LedgerError;
pub use timelock::{AdminAction, Timelock, TimelockError};

use crate::types::{AssetId, Quote, UserId};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{trace, warn};

/// Free/locked balance pair for one `(user, asset)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Balance {
    /// Withdrawable / lockable balance.
    pub free: Quote,
    /// Reserved balance backing live orders.
    pub locked: Quote,
}

impl Balance {
    /// `free + locked`.
    #[must_use]
    pub fn total(&self) -> Quote {
        self.free.saturating_add(self.locked)
    }
}

/// Ledger events, emitted in execution order (spec §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    /// External funds credited to `user`'s free balance.
    Deposited {
        /// Depositing account.
        user: UserId,
        /// Asset deposited.
        asset: AssetId,
        /// Amount deposited.
        amount: Quote,
    },
    /// Free funds debited and assumed transferred out externally.
    Withdrawn {
        /// Withdrawing account.
        user: UserId,
        /// Asset withdrawn.
        asset: AssetId,
        /// Amount withdrawn.
        amount: Quote,
    },
    /// Funds moved from free to locked.
    BalanceLocked {
        /// Account whose funds were locked.
        user: UserId,
        /// Asset locked.
        asset: AssetId,
        /// Amount locked.
        amount: Quote,
    },
    /// Funds moved from locked back to free.
    BalanceUnlocked {
        /// Account whose funds were unlocked.
        user: UserId,
        /// Asset unlocked.
        asset: AssetId,
        /// Amount unlocked.
        amount: Quote,
    },
    /// Locked funds moved from one account's `locked` to another's `free`.
    TransferExecuted {
        /// Source account.
        from: UserId,
        /// Destination account.
        to: UserId,
        /// Asset transferred.
        asset: AssetId,
        /// Amount transferred.
        amount: Quote,
    },
}

/// The custodial ledger. Cheaply cloneable (all state lives behind
/// `Arc`-backed concurrent maps), so it can be shared across every `Book`
/// a `Registry` creates, the way `orderbook-rs`'s `DashMap`-based
/// `order_locations` is shared within a single `OrderBook`.
#[derive(Debug, Clone)]
pub struct Ledger {
    balances: std::sync::Arc<DashMap<(UserId, AssetId), Balance>>,
    supported_assets: std::sync::Arc<DashMap<AssetId, ()>>,
    executors: std::sync::Arc<DashMap<UserId, ()>>,
    paused: std::sync::Arc<AtomicBool>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Create an empty ledger: no supported assets, no executors, unpaused.
    #[must_use]
    pub fn new() -> Self {
        Self {
            balances: std::sync::Arc::new(DashMap::new()),
            supported_assets: std::sync::Arc::new(DashMap::new()),
            executors: std::sync::Arc::new(DashMap::new()),
            paused: std::sync::Arc::new(AtomicBool::new(false)),
        }
    }

    fn check_unpaused(&self) -> Result<(), LedgerError> {
        if self.paused.load(Ordering::SeqCst) {
            return Err(LedgerError::Paused);
        }
        Ok(())
    }

    fn check_supported(&self, asset: AssetId) -> Result<(), LedgerError> {
        if self.supported_assets.contains_key(&asset) {
            Ok(())
        } else {
            Err(LedgerError::AssetNotSupported { asset })
        }
    }

    fn check_executor(&self, caller: UserId) -> Result<(), LedgerError> {
        if self.executors.contains_key(&caller) {
            Ok(())
        } else {
            Err(LedgerError::NotAuthorized { caller })
        }
    }

    /// Register `asset` as tradeable/depositable. Admin operation.
    pub fn add_supported_asset(&self, asset: AssetId) {
        self.supported_assets.insert(asset, ());
        trace!("ledger: added supported asset {asset}");
    }

    /// Deregister `asset`. Existing balances are left untouched; no new
    /// deposits/locks are accepted for it afterwards.
    pub fn remove_supported_asset(&self, asset: AssetId) {
        self.supported_assets.remove(&asset);
        trace!("ledger: removed supported asset {asset}");
    }

    /// `true` if `asset` is currently supported.
    #[must_use]
    pub fn is_supported(&self, asset: AssetId) -> bool {
        self.supported_assets.contains_key(&asset)
    }

    /// Grant `caller` the executor capability: it may call `lock`, `unlock`,
    /// and `transfer_locked`. A `Registry` authorises each `Book` it creates
    /// (spec §4.7).
    pub fn authorize_executor(&self, caller: UserId) {
        self.executors.insert(caller, ());
        trace!("ledger: authorized executor {caller}");
    }

    /// Revoke a previously granted executor capability.
    pub fn revoke_executor(&self, caller: UserId) {
        self.executors.remove(&caller);
    }

    /// Halt all mutating operations. Read-only balance queries still work.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
        warn!("ledger paused");
    }

    /// Resume mutating operations.
    pub fn unpause(&self) {
        self.paused.store(false, Ordering::SeqCst);
        trace!("ledger unpaused");
    }

    /// `true` if the ledger is currently paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// `free + locked` for `(user, asset)`.
    #[must_use]
    pub fn get_total_balance(&self, user: UserId, asset: AssetId) -> Quote {
        self.balances
            .get(&(user, asset))
            .map(|b| b.total())
            .unwrap_or_default()
    }

    /// `free` balance for `(user, asset)`.
    #[must_use]
    pub fn get_available_balance(&self, user: UserId, asset: AssetId) -> Quote {
        self.balances
            .get(&(user, asset))
            .map(|b| b.free)
            .unwrap_or_default()
    }

    /// `locked` balance for `(user, asset)`.
    #[must_use]
    pub fn get_locked_balance(&self, user: UserId, asset: AssetId) -> Quote {
        self.balances
            .get(&(user, asset))
            .map(|b| b.locked)
            .unwrap_or_default()
    }

    /// Credit `amount` of `asset` to `user`'s free balance.
    ///
    /// Represents the ledger side of an external asset-system deposit that
    /// has already completed (spec §4.1 — out of scope here, assumed
    /// measured by before/after delta at the boundary).
    pub fn deposit(
        &self,
        user: UserId,
        asset: AssetId,
        amount: Quote,
    ) -> Result<LedgerEvent, LedgerError> {
        self.check_unpaused()?;
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        self.check_supported(asset)?;
        self.balances
            .entry((user, asset))
            .or_default()
            .free += amount;
        trace!("ledger: deposit {amount} {asset} to {user}");
        Ok(LedgerEvent::Deposited {
            user,
            asset,
            amount,
        })
    }

    /// Multiple deposits; each item's success/failure is independent
    /// (spec §6's batch semantics).
    pub fn batch_deposit(
        &self,
        items: &[(UserId, AssetId, Quote)],
    ) -> Vec<Result<LedgerEvent, LedgerError>> {
        items
            .iter()
            .map(|&(user, asset, amount)| self.deposit(user, asset, amount))
            .collect()
    }

    /// Debit `amount` of `asset` from `user`'s free balance.
    pub fn withdraw(
        &self,
        user: UserId,
        asset: AssetId,
        amount: Quote,
    ) -> Result<LedgerEvent, LedgerError> {
        self.check_unpaused()?;
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let mut entry = self.balances.entry((user, asset)).or_default();
        if entry.free < amount {
            return Err(LedgerError::InsufficientFree {
                user,
                asset,
                requested: amount,
                available: entry.free,
            });
        }
        entry.free -= amount;
        trace!("ledger: withdraw {amount} {asset} from {user}");
        Ok(LedgerEvent::Withdrawn {
            user,
            asset,
            amount,
        })
    }

    /// Multiple withdrawals; each item's success/failure is independent.
    pub fn batch_withdraw(
        &self,
        items: &[(UserId, AssetId, Quote)],
    ) -> Vec<Result<LedgerEvent, LedgerError>> {
        items
            .iter()
            .map(|&(user, asset, amount)| self.withdraw(user, asset, amount))
            .collect()
    }

    /// Move `amount` of `asset` from `user`'s free to locked balance.
    /// Executor-only (spec §4.1).
    pub fn lock(
        &self,
        caller: UserId,
        user: UserId,
        asset: AssetId,
        amount: Quote,
    ) -> Result<LedgerEvent, LedgerError> {
        self.check_unpaused()?;
        self.check_executor(caller)?;
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let mut entry = self.balances.entry((user, asset)).or_default();
        if entry.free < amount {
            return Err(LedgerError::InsufficientFree {
                user,
                asset,
                requested: amount,
                available: entry.free,
            });
        }
        entry.free -= amount;
        entry.locked += amount;
        trace!("ledger: locked {amount} {asset} for {user}");
        Ok(LedgerEvent::BalanceLocked {
            user,
            asset,
            amount,
        })
    }

    /// Move `amount` of `asset` from `user`'s locked back to free balance.
    /// Executor-only.
    pub fn unlock(
        &self,
        caller: UserId,
        user: UserId,
        asset: AssetId,
        amount: Quote,
    ) -> Result<LedgerEvent, LedgerError> {
        self.check_unpaused()?;
        self.check_executor(caller)?;
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let mut entry = self.balances.entry((user, asset)).or_default();
        if entry.locked < amount {
            return Err(LedgerError::InsufficientLocked {
                user,
                asset,
                requested: amount,
                available: entry.locked,
            });
        }
        entry.locked -= amount;
        entry.free += amount;
        trace!("ledger: unlocked {amount} {asset} for {user}");
        Ok(LedgerEvent::BalanceUnlocked {
            user,
            asset,
            amount,
        })
    }

    /// Settlement primitive: move `amount` of `asset` from `from`'s locked
    /// balance directly to `to`'s free balance. Executor-only (spec §4.1).
    pub fn transfer_locked(
        &self,
        caller: UserId,
        from: UserId,
        to: UserId,
        asset: AssetId,
        amount: Quote,
    ) -> Result<LedgerEvent, LedgerError> {
        self.check_unpaused()?;
        self.check_executor(caller)?;
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        {
            let mut from_entry = self.balances.entry((from, asset)).or_default();
            if from_entry.locked < amount {
                return Err(LedgerError::InsufficientLocked {
                    user: from,
                    asset,
                    requested: amount,
                    available: from_entry.locked,
                });
            }
            from_entry.locked -= amount;
        }
        self.balances.entry((to, asset)).or_default().free += amount;
        trace!("ledger: transferred {amount} {asset} from {from} to {to}");
        Ok(LedgerEvent::TransferExecuted {
            from,
            to,
            asset,
            amount,
        })
    }
}
