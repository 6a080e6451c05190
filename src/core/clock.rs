//! Injectable clock source for rate limiting
//!
//! The token bucket must measure elapsed time against a monotonic clock so
//! wall-clock adjustments (NTP steps, manual changes) cannot corrupt its
//! refill accounting. The clock is a trait so tests can advance virtual time
//! without real waits.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Clock abstraction: reports time elapsed since the clock was created.
pub trait Clock: Send + Sync {
    fn elapsed(&self) -> Duration;
}

/// Production clock backed by `std::time::Instant`
#[derive(Debug)]
pub struct MonotonicClock {
    started: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Manually advanced clock for tests
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance virtual time by `delta`
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        *self.now.lock().unwrap()
    }
}
