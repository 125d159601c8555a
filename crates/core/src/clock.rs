//! Wall-clock sources
//!
//! The engine never calls `Timestamp::now()` directly; it asks a `Clock`.
//! Production code uses `SystemClock`, tests drive TTL expiry with
//! `ManualClock`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::contract::Timestamp;

/// A source of timestamps for creation dates, sequence keys and expiry checks
pub trait Clock: Send + Sync + 'static {
    /// The current time
    fn now(&self) -> Timestamp;
}

/// Clock backed by `std::time::SystemTime`
///
/// Susceptible to NTP adjustments; the sequencer tolerates backward steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicU64,
}

impl ManualClock {
    /// Start at the given time
    pub fn new(start: Timestamp) -> Self {
        Self {
            millis: AtomicU64::new(start.as_millis()),
        }
    }

    /// Jump to an absolute time (may go backwards)
    pub fn set(&self, now: Timestamp) {
        self.millis.store(now.as_millis(), Ordering::SeqCst);
    }

    /// Move forward by `by`
    pub fn advance(&self, by: Duration) {
        self.millis
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.millis.load(Ordering::SeqCst))
    }
}
