//! Token bucket rate limiter for registry publish requests
//!
//! crates.io allows a burst of publishes and then refills slowly (one new
//! publish slot roughly every minute). The bucket accumulates fractional
//! tokens over elapsed time, capped at capacity, and never blocks: callers
//! ask how long to wait and do the sleeping themselves.

use crate::core::clock::{Clock, MonotonicClock};
use std::time::Duration;

/// Token bucket tracking available publish permits over time.
///
/// # Examples
///
/// ```
/// use fork_publisher::core::TokenBucket;
/// use std::time::Duration;
///
/// let mut bucket = TokenBucket::new(30, Duration::from_secs(61));
/// assert!(bucket.try_consume());
/// ```
pub struct TokenBucket {
    capacity: u32,
    tokens: f64,
    refill_period: Duration,
    last_refill: Duration,
    clock: Box<dyn Clock>,
}

impl TokenBucket {
    /// Create a bucket that starts full, using the monotonic system clock.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of tokens (burst size), at least 1
    /// * `refill_period` - Time to generate one token
    pub fn new(capacity: u32, refill_period: Duration) -> Self {
        Self::with_clock(capacity, refill_period, Box::new(MonotonicClock::new()))
    }

    /// Create a bucket with an injected clock (used by tests to simulate
    /// elapsed time without real waits).
    pub fn with_clock(capacity: u32, refill_period: Duration, clock: Box<dyn Clock>) -> Self {
        debug_assert!(capacity >= 1);
        let last_refill = clock.elapsed();

        Self {
            capacity,
            tokens: capacity as f64,
            refill_period,
            last_refill,
            clock,
        }
    }

    /// Refill tokens based on time elapsed since the last refill, then
    /// consume one if at least one full token is available.
    ///
    /// Returns false (leaving state unchanged apart from the refill) when no
    /// full token has accumulated yet.
    pub fn try_consume(&mut self) -> bool {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            return true;
        }
        false
    }

    /// Time until the next full token is available.
    ///
    /// Zero when a token is already available. Callers should sleep this
    /// long plus a safety margin before retrying `try_consume`.
    pub fn time_until_next_token(&mut self) -> Duration {
        self.refill();
        if self.tokens >= 1.0 {
            return Duration::ZERO;
        }

        let deficit = 1.0 - self.tokens;
        Duration::from_secs_f64(deficit * self.refill_period.as_secs_f64())
    }

    /// Tokens currently available (fractional)
    pub fn available(&self) -> f64 {
        self.tokens
    }

    fn refill(&mut self) {
        let now = self.clock.elapsed();
        let elapsed = now.saturating_sub(self.last_refill);
        if elapsed.is_zero() {
            return;
        }

        let new_tokens = elapsed.as_secs_f64() / self.refill_period.as_secs_f64();
        self.tokens = (self.tokens + new_tokens).min(self.capacity as f64);
        self.last_refill = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use std::sync::Arc;

    const REFILL: Duration = Duration::from_secs(61);

    struct SharedClock(Arc<ManualClock>);

    impl Clock for SharedClock {
        fn elapsed(&self) -> Duration {
            self.0.elapsed()
        }
    }

    fn bucket_with_manual_clock(capacity: u32) -> (TokenBucket, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let bucket =
            TokenBucket::with_clock(capacity, REFILL, Box::new(SharedClock(clock.clone())));
        (bucket, clock)
    }

    #[test]
    fn test_starts_full() {
        let (mut bucket, _clock) = bucket_with_manual_clock(30);

        for _ in 0..30 {
            assert!(bucket.try_consume());
        }
        assert!(!bucket.try_consume());
    }

    #[test]
    fn test_wait_after_exhaustion_is_one_refill_period() {
        let (mut bucket, _clock) = bucket_with_manual_clock(30);

        for _ in 0..30 {
            assert!(bucket.try_consume());
        }

        let wait = bucket.time_until_next_token();
        let diff = wait.as_secs_f64() - REFILL.as_secs_f64();
        assert!(diff.abs() < 0.001, "expected ~61s, got {:?}", wait);
    }

    #[test]
    fn test_one_refill_period_yields_exactly_one_token() {
        let (mut bucket, clock) = bucket_with_manual_clock(30);

        for _ in 0..30 {
            assert!(bucket.try_consume());
        }

        clock.advance(REFILL);
        assert!(bucket.try_consume());
        assert!(!bucket.try_consume());
    }

    #[test]
    fn test_fractional_refill_accumulates() {
        let (mut bucket, clock) = bucket_with_manual_clock(1);

        assert!(bucket.try_consume());

        // Half a period: still not enough for a full token
        clock.advance(REFILL / 2);
        assert!(!bucket.try_consume());

        let wait = bucket.time_until_next_token();
        let expected = REFILL.as_secs_f64() / 2.0;
        assert!((wait.as_secs_f64() - expected).abs() < 0.001);

        // The other half completes the token
        clock.advance(REFILL / 2);
        assert!(bucket.try_consume());
    }

    #[test]
    fn test_refill_caps_at_capacity() {
        let (mut bucket, clock) = bucket_with_manual_clock(30);

        // A very long idle period must not exceed the burst capacity
        clock.advance(REFILL * 1000);
        bucket.try_consume();
        assert!(bucket.available() <= 30.0);

        let mut consumed = 1;
        while bucket.try_consume() {
            consumed += 1;
        }
        assert_eq!(consumed, 30);
    }

    #[test]
    fn test_tokens_never_observed_outside_bounds() {
        let (mut bucket, clock) = bucket_with_manual_clock(30);

        for step in 0..100 {
            if step % 3 == 0 {
                clock.advance(Duration::from_secs(20));
            }
            bucket.try_consume();
            let tokens = bucket.available();
            assert!((0.0..=30.0).contains(&tokens), "tokens = {}", tokens);
        }
    }

    #[test]
    fn test_no_wait_when_token_available() {
        let (mut bucket, _clock) = bucket_with_manual_clock(5);
        assert_eq!(bucket.time_until_next_token(), Duration::ZERO);
    }

    #[test]
    fn test_failed_consume_leaves_count_unchanged() {
        let (mut bucket, _clock) = bucket_with_manual_clock(1);

        assert!(bucket.try_consume());
        let before = bucket.available();
        assert!(!bucket.try_consume());
        assert_eq!(bucket.available(), before);
    }
}
