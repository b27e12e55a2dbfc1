//! # Accrual Clock
//!
//! Interest accrual is a pure function of stored state and "now", so the
//! ledger takes its notion of time from an injected [`Clock`] rather than
//! calling the OS directly. Every mutating operation samples the clock
//! exactly once and uses that single value for all settlement inside the
//! call — two settlements at the same instant accrue nothing twice.
//!
//! Production code uses [`SystemClock`]. Tests and simulations use
//! [`ManualClock`], which only moves when told to.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// A monotonic source of "now" in whole seconds.
///
/// Implementations must be non-decreasing across calls; the ledger relies
/// on this for its accrual invariants and defends against small regressions
/// with saturating elapsed-time arithmetic.
pub trait Clock: Send + Sync {
    /// Current time in seconds. The epoch is arbitrary but fixed.
    fn now(&self) -> u64;
}

/// Wall-clock seconds since the Unix epoch.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        // Negative timestamps (pre-1970) cannot occur on a sane host;
        // clamp rather than wrap if they somehow do.
        Utc::now().timestamp().max(0) as u64
    }
}

/// A clock that advances only when explicitly told to.
///
/// Interior mutability via an atomic so that a test can hold one
/// `Arc<ManualClock>`, hand a clone to the ledger, and advance time
/// between operations.
#[derive(Debug, Default)]
pub struct ManualClock {
    seconds: AtomicU64,
}

impl ManualClock {
    /// Creates a manual clock starting at the given second.
    pub fn starting_at(seconds: u64) -> Self {
        Self {
            seconds: AtomicU64::new(seconds),
        }
    }

    /// Moves the clock forward by `delta` seconds.
    pub fn advance(&self, delta: u64) {
        self.seconds.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.seconds.load(Ordering::SeqCst)
    }
}
