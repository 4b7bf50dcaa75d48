//! Wall clock abstraction
//!
//! Expiry and lease deadlines are absolute epoch milliseconds so they survive
//! a snapshot round-trip. Engines never read the system time directly; they
//! ask a [`Clock`], which lets tests move time forward deterministically.

use crate::EpochMillis;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Source of the current time
pub trait Clock: Debug + Send + Sync {
    /// Current time in milliseconds since the UNIX epoch
    fn now_ms(&self) -> EpochMillis;
}

/// System wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now_ms(&self) -> EpochMillis {
        // Pre-epoch clocks clamp to zero rather than wrapping.
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

/// Manually driven clock for tests and simulations
#[derive(Debug, Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
    /// Create a clock frozen at `start` ms
    pub const fn new(start: EpochMillis) -> Self {
        Self(AtomicU64::new(start))
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        self.0.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    /// Jump to an absolute time
    pub fn set(&self, at: EpochMillis) {
        self.0.store(at, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now_ms(&self) -> EpochMillis {
        self.0.load(Ordering::SeqCst)
    }
}

/// Add a millisecond duration to an instant, saturating at `u64::MAX`
#[inline]
pub fn deadline_after(now: EpochMillis, after: Duration) -> EpochMillis {
    let millis = u64::try_from(after.as_millis()).unwrap_or(u64::MAX);
    now.saturating_add(millis)
}
