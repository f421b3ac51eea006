//! Per-maker monotonic nonce tracking (spec §4.6).

use super::error::GatewayError;
use crate::types::UserId;
use dashmap::DashMap;

/// Tracks `next_nonce[maker]` across all makers known to a gateway.
#[derive(Debug, Default)]
pub struct NonceTracker {
    next: DashMap<UserId, u64>,
}

impl NonceTracker {
    /// An empty tracker; every maker's next expected nonce starts at `0`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The next nonce `maker` is expected to submit.
    #[must_use]
    pub fn next_nonce(&self, maker: UserId) -> u64 {
        self.next.get(&maker).map(|v| *v).unwrap_or(0)
    }

    /// Accept `nonce` iff `nonce >= next_nonce(maker)`, then advance to
    /// `nonce + 1`. Rejects without mutating state otherwise.
    pub fn check_and_advance(&self, maker: UserId, nonce: u64) -> Result<(), GatewayError> {
        let mut entry = self.next.entry(maker).or_insert(0);
        if nonce < *entry {
            return Err(GatewayError::NonceNotMonotonic {
                maker,
                expected: *entry,
                got: nonce,
            });
        }
        *entry = nonce + 1;
        Ok(())
    }
}
