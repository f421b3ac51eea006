//! Deterministic time source injected into the matching engine.
//!
//! Spec §2 calls for a "Clock/RNG: deterministic sources injected for
//! testability". The engine never reads the wall clock directly; every
//! `Book` and `Gateway` holds a `Arc<dyn Clock>` and asks it for `now()`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::utils::current_time_secs;

/// A source of the current time, in epoch seconds.
///
/// Orders carry `expiry` as epoch seconds (§3), so the engine only ever
/// needs second resolution.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current time, in whole seconds since the Unix epoch.
    fn now(&self) -> u64;
}

/// The production clock: reads the OS wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        current_time_secs()
    }
}

/// A clock that returns a caller-controlled value, for deterministic tests.
///
/// Mirrors the teacher's pattern of injecting `current_time_millis()`-style
/// sources, generalized to a settable value so scenario tests (spec §8's
/// expiry boundary cases) can advance time by exactly one second.
#[derive(Debug, Default)]
pub struct FixedClock {
    now: AtomicU64,
}

impl FixedClock {
    /// Create a fixed clock starting at `now`.
    pub fn new(now: u64) -> Arc<Self> {
        Arc::new(Self {
            now: AtomicU64::new(now),
        })
    }

    /// Advance the clock by `secs` seconds.
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    /// Set the clock to an absolute value.
    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
