//! Bounded exponential-backoff policy for re-watching a workflow run.
//!
//! One policy governs every reconnect site. Retrying is only allowed while
//! the owning Web is still in a non-terminal state, so a finished or
//! vanished run never causes a reconnect loop.

use std::time::Duration;

/// Tunable parameters for the backoff strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    /// Delay before the first reconnection attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
    /// Attempts allowed before giving up.
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(3_000),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    /// Policy with the given initial delay and attempt budget, keeping the
    /// default multiplier and cap.
    pub fn new(initial_delay: Duration, max_attempts: u32) -> Self {
        Self {
            initial_delay,
            max_attempts,
            ..Default::default()
        }
    }

    /// Grow `current` by the multiplier, clamped to [`Self::max_delay`].
    pub fn next_delay(&self, current: Duration) -> Duration {
        let next_ms = (current.as_millis() as f64 * self.multiplier) as u64;
        Duration::from_millis(next_ms).min(self.max_delay)
    }

    /// Delay to wait before the given 1-based attempt.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let mut delay = self.initial_delay.min(self.max_delay);
        for _ in 1..attempt {
            delay = self.next_delay(delay);
        }
        delay
    }

    /// Whether attempt number `attempt` (1-based) may run.
    ///
    /// `non_terminal` must reflect the Web's persisted status at the time
    /// of the decision.
    pub fn should_retry(&self, attempt: u32, non_terminal: bool) -> bool {
        non_terminal && attempt >= 1 && attempt <= self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_delay_doubles() {
        let policy = ReconnectPolicy::default();
        assert_eq!(
            policy.next_delay(Duration::from_secs(3)),
            Duration::from_secs(6)
        );
    }

    #[test]
    fn next_delay_clamps_at_max() {
        let policy = ReconnectPolicy {
            max_delay: Duration::from_secs(10),
            ..Default::default()
        };
        assert_eq!(
            policy.next_delay(Duration::from_secs(8)),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn full_backoff_sequence() {
        let policy = ReconnectPolicy::default();
        let expected_ms = [3_000, 6_000, 12_000, 24_000, 30_000, 30_000];

        for (i, &ms) in expected_ms.iter().enumerate() {
            assert_eq!(
                policy.delay_for_attempt(i as u32 + 1),
                Duration::from_millis(ms)
            );
        }
    }

    #[test]
    fn retries_stop_after_budget() {
        let policy = ReconnectPolicy::new(Duration::from_millis(10), 2);
        assert!(policy.should_retry(1, true));
        assert!(policy.should_retry(2, true));
        assert!(!policy.should_retry(3, true));
    }

    #[test]
    fn terminal_state_never_retries() {
        let policy = ReconnectPolicy::default();
        assert!(!policy.should_retry(1, false));
    }
}
