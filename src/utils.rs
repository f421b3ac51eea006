//! Small free functions shared across modules.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in whole seconds since the Unix epoch.
///
/// Used as the default [`crate::clock::SystemClock`] source. Tests that need
/// deterministic time should inject [`crate::clock::FixedClock`] instead of
/// calling this directly.
pub fn current_time_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
