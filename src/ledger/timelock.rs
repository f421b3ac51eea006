//! Timelocked admin operations (spec §6): `propose -> wait(delay) -> execute`
//! for every sensitive [`super::Ledger`] mutation (supported-asset
//! registration, executor authorisation, pause/unpause). Reference delay
//! is 2 days; callers configure it via `admin_timelock_delay` in
//! [`crate::config::GatewayConfig`].

use super::Ledger;
use crate::types::{AssetId, UserId};
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// One sensitive mutation, staged for delayed execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    /// Register an asset as tradeable/depositable.
    AddSupportedAsset(AssetId),
    /// Deregister an asset.
    RemoveSupportedAsset(AssetId),
    /// Grant the executor capability to `caller`.
    AuthorizeExecutor(UserId),
    /// Revoke the executor capability from `caller`.
    RevokeExecutor(UserId),
    /// Halt all mutating ledger operations.
    Pause,
    /// Resume mutating ledger operations.
    Unpause,
}

impl AdminAction {
    fn apply(self, ledger: &Ledger) {
        match self {
            AdminAction::AddSupportedAsset(asset) => ledger.add_supported_asset(asset),
            AdminAction::RemoveSupportedAsset(asset) => ledger.remove_supported_asset(asset),
            AdminAction::AuthorizeExecutor(caller) => ledger.authorize_executor(caller),
            AdminAction::RevokeExecutor(caller) => ledger.revoke_executor(caller),
            AdminAction::Pause => ledger.pause(),
            AdminAction::Unpause => ledger.unpause(),
        }
    }
}

/// Errors raised while proposing, executing, or cancelling a timelocked
/// action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TimelockError {
    /// No pending proposal with this id.
    NotFound {
        /// The missing proposal id.
        id: u64,
    },
    /// `now` has not yet reached the proposal's `ready_at`.
    NotReady {
        /// The proposal id.
        id: u64,
        /// Epoch seconds at which it becomes executable.
        ready_at: u64,
        /// Epoch seconds at the attempted execution.
        now: u64,
    },
}

impl fmt::Display for TimelockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimelockError::NotFound { id } => write!(f, "no pending timelock proposal {id}"),
            TimelockError::NotReady { id, ready_at, now } => {
                write!(f, "timelock proposal {id} not ready until {ready_at} (now {now})")
            }
        }
    }
}

impl std::error::Error for TimelockError {}

/// Queues [`AdminAction`]s for delayed execution against one [`Ledger`].
#[derive(Debug, Clone)]
pub struct Timelock {
    delay_secs: u64,
    next_id: Arc<AtomicU64>,
    pending: Arc<DashMap<u64, (AdminAction, u64)>>,
}

impl Timelock {
    /// A timelock enforcing `delay_secs` between proposal and execution.
    #[must_use]
    pub fn new(delay_secs: u64) -> Self {
        Self {
            delay_secs,
            next_id: Arc::new(AtomicU64::new(1)),
            pending: Arc::new(DashMap::new()),
        }
    }

    /// The configured delay.
    #[must_use]
    pub fn delay_secs(&self) -> u64 {
        self.delay_secs
    }

    /// Stage `action`, executable once `now + delay_secs` has passed.
    /// Returns the proposal id.
    pub fn propose(&self, action: AdminAction, now: u64) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let ready_at = now.saturating_add(self.delay_secs);
        self.pending.insert(id, (action, ready_at));
        info!("timelock: proposed {action:?} as #{id}, ready at {ready_at}");
        id
    }

    /// Epoch seconds at which proposal `id` becomes executable.
    #[must_use]
    pub fn ready_at(&self, id: u64) -> Option<u64> {
        self.pending.get(&id).map(|e| e.value().1)
    }

    /// Apply proposal `id` to `ledger` if its delay has elapsed, consuming
    /// it. Returns the action applied.
    pub fn execute(&self, id: u64, now: u64, ledger: &Ledger) -> Result<AdminAction, TimelockError> {
        let (action, ready_at) = self
            .pending
            .get(&id)
            .map(|e| *e.value())
            .ok_or(TimelockError::NotFound { id })?;
        if now < ready_at {
            return Err(TimelockError::NotReady { id, ready_at, now });
        }
        self.pending.remove(&id);
        action.apply(ledger);
        info!("timelock: executed proposal #{id}: {action:?}");
        Ok(action)
    }

    /// Withdraw a proposal before it executes. `false` if no such
    /// pending proposal exists.
    pub fn cancel(&self, id: u64) -> bool {
        let removed = self.pending.remove(&id).is_some();
        if removed {
            warn!("timelock: cancelled proposal #{id}");
        }
        removed
    }

    /// Number of proposals awaiting execution.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;

    fn asset(n: u8) -> AssetId {
        AssetId([n; 20])
    }

    #[test]
    fn execute_before_delay_elapses_is_rejected() {
        let ledger = Ledger::new();
        let timelock = Timelock::new(172_800);
        let id = timelock.propose(AdminAction::AddSupportedAsset(asset(1)), 1_000);
        let err = timelock.execute(id, 1_500, &ledger).unwrap_err();
        assert_eq!(
            err,
            TimelockError::NotReady {
                id,
                ready_at: 1_000 + 172_800,
                now: 1_500,
            }
        );
        assert!(!ledger.is_supported(asset(1)));
    }

    #[test]
    fn execute_after_delay_applies_action_once() {
        let ledger = Ledger::new();
        let timelock = Timelock::new(100);
        let id = timelock.propose(AdminAction::AddSupportedAsset(asset(1)), 1_000);
        timelock.execute(id, 1_100, &ledger).unwrap();
        assert!(ledger.is_supported(asset(1)));

        let err = timelock.execute(id, 2_000, &ledger).unwrap_err();
        assert_eq!(err, TimelockError::NotFound { id });
    }

    #[test]
    fn cancel_prevents_execution() {
        let ledger = Ledger::new();
        let timelock = Timelock::new(100);
        let id = timelock.propose(AdminAction::Pause, 1_000);
        assert!(timelock.cancel(id));
        let err = timelock.execute(id, 2_000, &ledger).unwrap_err();
        assert_eq!(err, TimelockError::NotFound { id });
        assert!(!ledger.is_paused());
    }

    #[test]
    fn pending_count_tracks_outstanding_proposals() {
        let timelock = Timelock::new(100);
        assert_eq!(timelock.pending_count(), 0);
        let id = timelock.propose(AdminAction::Pause, 0);
        assert_eq!(timelock.pending_count(), 1);
        timelock.cancel(id);
        assert_eq!(timelock.pending_count(), 0);
    }
}
