//! Exponential backoff scheduling for reconnect attempts.
//!
//! [`RetryStrategy`] turns an attempt number into a retry delay or a
//! give-up signal. It performs no I/O and keeps no hidden state beyond
//! a monotonic attempt counter; for a fixed policy and attempt number
//! the computed delay is a pure function.
//!
//! The strategy is owned exclusively by the transport worker task, so
//! the counter is a plain `u32` with no synchronization.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// RetryPolicy
// ============================================================================

/// Immutable reconnect policy.
///
/// The n-th retry (1-based) is delayed by
/// `min(min_delay * backoff_factor^n, max_delay)`. After `max_retries`
/// scheduled retries the strategy gives up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of reconnect attempts before giving up.
    pub max_retries: u32,

    /// Exponential growth factor between consecutive delays.
    pub backoff_factor: u32,

    /// Base delay; the first retry waits `min_delay * backoff_factor`.
    pub min_delay: Duration,

    /// Upper clamp applied to every computed delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    /// Default policy: 10 retries, factor 2, 1 s base, 8 s cap.
    fn default() -> Self {
        Self {
            max_retries: 10,
            backoff_factor: 2,
            min_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(8000),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy from explicit values.
    #[inline]
    #[must_use]
    pub const fn new(
        max_retries: u32,
        backoff_factor: u32,
        min_delay: Duration,
        max_delay: Duration,
    ) -> Self {
        Self {
            max_retries,
            backoff_factor,
            min_delay,
            max_delay,
        }
    }

    /// Computes the delay for the n-th retry (1-based), clamped to
    /// `max_delay`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = u64::from(self.backoff_factor).saturating_pow(attempt);
        let millis = (self.min_delay.as_millis() as u64).saturating_mul(factor);
        Duration::from_millis(millis).min(self.max_delay)
    }
}

// ============================================================================
// RetryStrategy
// ============================================================================

/// Stateful backoff scheduler: policy plus a monotonic attempt counter.
///
/// The counter is reset to zero on every successful open and incremented
/// once per scheduled retry via [`mark_attempted`].
///
/// [`mark_attempted`]: RetryStrategy::mark_attempted
#[derive(Debug)]
pub struct RetryStrategy {
    /// Retries scheduled since the last reset.
    attempt: u32,

    /// Immutable backoff policy.
    policy: RetryPolicy,
}

impl RetryStrategy {
    /// Creates a strategy with the given policy and a fresh counter.
    #[inline]
    #[must_use]
    pub const fn new(policy: RetryPolicy) -> Self {
        Self { attempt: 0, policy }
    }

    /// Returns the delay before the next reconnect attempt, or `None`
    /// once the retry budget is exhausted.
    ///
    /// Callers pair this with [`mark_attempted`] once the retry is
    /// actually scheduled, so the n-th call since the last reset yields
    /// `min(min_delay * factor^n, max_delay)`.
    ///
    /// [`mark_attempted`]: RetryStrategy::mark_attempted
    #[must_use]
    pub fn next_delay(&self) -> Option<Duration> {
        if self.attempt >= self.policy.max_retries {
            return None;
        }
        Some(self.policy.delay_for_attempt(self.attempt + 1))
    }

    /// Records that a retry was scheduled.
    #[inline]
    pub fn mark_attempted(&mut self) {
        self.attempt += 1;
    }

    /// Resets the attempt counter; called on every successful open.
    #[inline]
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Retries scheduled since the last reset.
    #[inline]
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    fn default_strategy() -> RetryStrategy {
        RetryStrategy::new(RetryPolicy::default())
    }

    #[test]
    fn test_default_policy_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 10);
        assert_eq!(policy.backoff_factor, 2);
        assert_eq!(policy.min_delay, Duration::from_millis(1000));
        assert_eq!(policy.max_delay, Duration::from_millis(8000));
    }

    #[test]
    fn test_first_delay_is_min_times_factor() {
        let strategy = default_strategy();
        assert_eq!(strategy.next_delay(), Some(Duration::from_millis(2000)));
    }

    #[test]
    fn test_delay_sequence_with_clamp() {
        let mut strategy = default_strategy();
        let mut delays = Vec::new();
        while let Some(delay) = strategy.next_delay() {
            delays.push(delay.as_millis() as u64);
            strategy.mark_attempted();
        }
        // delay(4) would be 16000, clamped to the 8000 cap.
        assert_eq!(
            delays,
            vec![2000, 4000, 8000, 8000, 8000, 8000, 8000, 8000, 8000, 8000]
        );
    }

    #[test]
    fn test_gives_up_after_max_retries() {
        let mut strategy = default_strategy();
        for _ in 0..10 {
            assert!(strategy.next_delay().is_some());
            strategy.mark_attempted();
        }
        assert_eq!(strategy.attempt(), 10);
        assert_eq!(strategy.next_delay(), None);
    }

    #[test]
    fn test_reset_restarts_sequence() {
        let mut strategy = default_strategy();
        for _ in 0..3 {
            strategy.mark_attempted();
        }
        assert_eq!(strategy.next_delay(), Some(Duration::from_millis(8000)));

        strategy.reset();
        assert_eq!(strategy.attempt(), 0);
        // Back to delay(1), not delay(4).
        assert_eq!(strategy.next_delay(), Some(Duration::from_millis(2000)));
    }

    #[test]
    fn test_zero_retries_gives_up_immediately() {
        let policy = RetryPolicy::new(0, 2, Duration::from_millis(100), Duration::from_secs(1));
        let strategy = RetryStrategy::new(policy);
        assert_eq!(strategy.next_delay(), None);
    }

    #[test]
    fn test_delay_for_attempt_saturates() {
        let policy = RetryPolicy::new(100, 10, Duration::from_secs(10), Duration::from_secs(30));
        // 10 * 10^80 overflows u64; result must still clamp to max_delay.
        assert_eq!(policy.delay_for_attempt(80), Duration::from_secs(30));
    }

    proptest! {
        #[test]
        fn prop_delays_clamped_to_max(
            max_retries in 1u32..32,
            factor in 1u32..8,
            min_ms in 1u64..5_000,
            max_ms in 1u64..60_000,
        ) {
            let policy = RetryPolicy::new(
                max_retries,
                factor,
                Duration::from_millis(min_ms),
                Duration::from_millis(max_ms),
            );
            for n in 1..=max_retries {
                prop_assert!(policy.delay_for_attempt(n) <= policy.max_delay);
            }
        }

        #[test]
        fn prop_delays_non_decreasing(
            max_retries in 1u32..32,
            factor in 1u32..8,
            min_ms in 1u64..5_000,
            max_ms in 1u64..60_000,
        ) {
            let policy = RetryPolicy::new(
                max_retries,
                factor,
                Duration::from_millis(min_ms),
                Duration::from_millis(max_ms),
            );
            let mut previous = Duration::ZERO;
            for n in 1..=max_retries {
                let delay = policy.delay_for_attempt(n);
                prop_assert!(delay >= previous);
                previous = delay;
            }
        }

        #[test]
        fn prop_exactly_max_retries_scheduled(max_retries in 0u32..64) {
            let policy = RetryPolicy::new(
                max_retries,
                2,
                Duration::from_millis(100),
                Duration::from_secs(8),
            );
            let mut strategy = RetryStrategy::new(policy);
            let mut scheduled = 0u32;
            while strategy.next_delay().is_some() {
                strategy.mark_attempted();
                scheduled += 1;
            }
            prop_assert_eq!(scheduled, max_retries);
        }
    }
}
