//! Retry policy with exponential backoff and jitter.

use std::time::Duration;

use rand::Rng;

use crate::context::RetryPredicate;
use crate::error::TransportError;

/// Upper bound on the exponent, so huge attempt budgets cannot overflow.
const MAX_EXPONENT: u32 = 16;

/// Backoff and retry classification for the transport's attempt loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Base delay.
    pub base_delay: Duration,
    /// Whether to add uniform jitter in `[0, base)`.
    pub jitter: bool,
}

impl RetryPolicy {
    /// Creates a jittered policy with the given base delay.
    pub fn new(base_delay: Duration) -> Self {
        Self {
            base_delay,
            jitter: true,
        }
    }

    /// Disables jitter.
    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    /// Deterministic part of the delay before `attempt` (1-based).
    ///
    /// Attempt 1 has no delay; attempt n waits `base * 2^(n-2)`.
    pub fn floor_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let exponent = (attempt - 2).min(MAX_EXPONENT);
        self.base_delay.saturating_mul(1 << exponent)
    }

    /// Full delay before `attempt`, in `[floor, floor + base)`.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        let floor = self.floor_before(attempt);
        if floor.is_zero() || !self.jitter || self.base_delay.is_zero() {
            return floor;
        }

        let base_ms = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX);
        let jitter_ms = rand::thread_rng().gen_range(0..base_ms);
        floor.saturating_add(Duration::from_millis(jitter_ms))
    }

    /// Returns true if `error` should be retried.
    pub fn should_retry(&self, error: &TransportError, predicate: Option<&RetryPredicate>) -> bool {
        if matches!(error, TransportError::Cancelled) {
            return false;
        }
        error.is_retryable() || predicate.is_some_and(|p| p(error))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_first_attempt_has_no_delay() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_before(1), Duration::ZERO);
        assert_eq!(policy.delay_before(0), Duration::ZERO);
    }

    #[test]
    fn test_delay_within_jitter_window() {
        let base = Duration::from_millis(500);
        let policy = RetryPolicy::new(base);
        for attempt in 2..=6 {
            let floor = base * 2u32.pow(attempt - 2);
            for _ in 0..50 {
                let delay = policy.delay_before(attempt);
                assert!(delay >= floor, "attempt {attempt}: {delay:?} < {floor:?}");
                assert!(delay < floor + base, "attempt {attempt}: {delay:?} too large");
            }
        }
    }

    #[test]
    fn test_without_jitter_is_exact() {
        let policy = RetryPolicy::new(Duration::from_millis(100)).without_jitter();
        assert_eq!(policy.delay_before(2), Duration::from_millis(100));
        assert_eq!(policy.delay_before(3), Duration::from_millis(200));
        assert_eq!(policy.delay_before(4), Duration::from_millis(400));
    }

    #[test]
    fn test_custom_predicate_extends_default_set() {
        let policy = RetryPolicy::default();
        let not_found = TransportError::http_status(404, "");
        assert!(!policy.should_retry(&not_found, None));

        let predicate: RetryPredicate = Arc::new(|e: &TransportError| e.status() == Some(404));
        assert!(policy.should_retry(&not_found, Some(&predicate)));

        let always: RetryPredicate = Arc::new(|_: &TransportError| true);
        assert!(!policy.should_retry(&TransportError::Cancelled, Some(&always)));
    }
}
