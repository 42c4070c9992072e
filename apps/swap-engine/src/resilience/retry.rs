//! Retry policy with exponential backoff for venue calls.
//!
//! Pure policy: no I/O, no sleeping. The execution service asks it whether
//! to retry and how long to wait, then does the waiting itself.
//!
//! # Defaults
//!
//! | Reason | Max retries | Base delay |
//! |--------|-------------|------------|
//! | `NETWORK_ERROR` | 5 | 2s |
//! | `TIMEOUT` | 3 | 1s |
//! | `SERVER_ERROR` | 3 | 5s |
//!
//! Delay at attempt `n` is `base_delay(reason) * backoff_multiplier^n`,
//! clamped to `max_delay` (60s by default).
//!
//! # Example
//!
//! ```rust,ignore
//! use swap_engine::resilience::{RetryReason, RetryStrategy};
//!
//! let strategy = RetryStrategy::default();
//! assert!(strategy.should_retry(4, RetryReason::NetworkError));
//! assert!(!strategy.should_retry(5, RetryReason::NetworkError));
//! let delay = strategy.get_delay(1, RetryReason::Timeout); // 2s
//! ```

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Classification of a retryable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RetryReason {
    /// Connection-level failure.
    NetworkError,
    /// Venue did not answer in time.
    Timeout,
    /// Venue-side error.
    ServerError,
}

impl RetryReason {
    /// All reasons.
    pub const ALL: [Self; 3] = [Self::NetworkError, Self::Timeout, Self::ServerError];

    /// Lowercase label used for metric labels.
    #[must_use]
    pub const fn as_label(&self) -> &'static str {
        match self {
            Self::NetworkError => "network_error",
            Self::Timeout => "timeout",
            Self::ServerError => "server_error",
        }
    }
}

impl fmt::Display for RetryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkError => write!(f, "NETWORK_ERROR"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::ServerError => write!(f, "SERVER_ERROR"),
        }
    }
}

/// Per-reason override of the default policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonPolicy {
    /// Overrides the default max retries.
    pub max_retries: Option<u32>,
    /// Overrides the default base delay.
    pub base_delay: Option<Duration>,
}

impl ReasonPolicy {
    /// Override both fields.
    #[must_use]
    pub const fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries: Some(max_retries),
            base_delay: Some(base_delay),
        }
    }
}

/// Retry policy for venue calls.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryStrategy {
    max_retries: u32,
    base_delay: Duration,
    backoff_multiplier: f64,
    max_delay: Duration,
    overrides: HashMap<RetryReason, ReasonPolicy>,
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1), 2.0, Duration::from_secs(60))
            .with_override(
                RetryReason::NetworkError,
                ReasonPolicy::new(5, Duration::from_secs(2)),
            )
            .with_override(
                RetryReason::Timeout,
                ReasonPolicy::new(3, Duration::from_secs(1)),
            )
            .with_override(
                RetryReason::ServerError,
                ReasonPolicy::new(3, Duration::from_secs(5)),
            )
    }
}

impl RetryStrategy {
    /// Create a strategy with no per-reason overrides.
    #[must_use]
    pub fn new(
        max_retries: u32,
        base_delay: Duration,
        backoff_multiplier: f64,
        max_delay: Duration,
    ) -> Self {
        Self {
            max_retries,
            base_delay,
            backoff_multiplier,
            max_delay,
            overrides: HashMap::new(),
        }
    }

    /// Set the override for one reason, replacing any previous one.
    #[must_use]
    pub fn with_override(mut self, reason: RetryReason, policy: ReasonPolicy) -> Self {
        self.overrides.insert(reason, policy);
        self
    }

    /// Max retries for a reason.
    #[must_use]
    pub fn max_retries(&self, reason: RetryReason) -> u32 {
        self.overrides
            .get(&reason)
            .and_then(|policy| policy.max_retries)
            .unwrap_or(self.max_retries)
    }

    /// Base delay for a reason.
    #[must_use]
    pub fn base_delay(&self, reason: RetryReason) -> Duration {
        self.overrides
            .get(&reason)
            .and_then(|policy| policy.base_delay)
            .unwrap_or(self.base_delay)
    }

    /// Upper bound on any delay.
    #[must_use]
    pub const fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Whether zero-based `attempt` may be retried.
    #[must_use]
    pub fn should_retry(&self, attempt: u32, reason: RetryReason) -> bool {
        attempt < self.max_retries(reason)
    }

    /// Delay before retrying after zero-based `attempt`.
    ///
    /// Never exceeds `max_delay`.
    #[must_use]
    pub fn get_delay(&self, attempt: u32, reason: RetryReason) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.base_delay(reason).as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let capped = secs.min(self.max_delay.as_secs_f64());

        Duration::try_from_secs_f64(capped)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    fn strategy() -> RetryStrategy {
        RetryStrategy::new(3, Duration::from_secs(1), 2.0, Duration::from_secs(10))
            .with_override(
                RetryReason::NetworkError,
                ReasonPolicy::new(5, Duration::from_secs(2)),
            )
            .with_override(
                RetryReason::ServerError,
                ReasonPolicy {
                    max_retries: None,
                    base_delay: Some(Duration::from_secs(5)),
                },
            )
    }

    #[test_case(RetryReason::Timeout, 0, true)]
    #[test_case(RetryReason::Timeout, 2, true)]
    #[test_case(RetryReason::Timeout, 3, false)]
    #[test_case(RetryReason::NetworkError, 4, true)]
    #[test_case(RetryReason::NetworkError, 5, false)]
    #[test_case(RetryReason::ServerError, 2, true ; "server falls back to default count")]
    #[test_case(RetryReason::ServerError, 3, false ; "server exhausted at default count")]
    fn test_should_retry(reason: RetryReason, attempt: u32, expected: bool) {
        assert_eq!(strategy().should_retry(attempt, reason), expected);
    }

    #[test_case(0, 1.0)]
    #[test_case(1, 2.0)]
    #[test_case(2, 4.0)]
    #[test_case(3, 8.0)]
    #[test_case(10, 10.0 ; "clamped to max delay")]
    fn test_backoff_sequence(attempt: u32, expected_secs: f64) {
        let delay = strategy().get_delay(attempt, RetryReason::Timeout);
        assert!((delay.as_secs_f64() - expected_secs).abs() < 1e-9);
    }

    #[test]
    fn test_per_reason_base_delay() {
        let strategy = strategy();
        assert_eq!(
            strategy.get_delay(0, RetryReason::NetworkError),
            Duration::from_secs(2)
        );
        assert_eq!(
            strategy.get_delay(0, RetryReason::ServerError),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_default_overrides() {
        let strategy = RetryStrategy::default();
        assert_eq!(strategy.max_retries(RetryReason::NetworkError), 5);
        assert_eq!(strategy.max_retries(RetryReason::Timeout), 3);
        assert_eq!(strategy.max_retries(RetryReason::ServerError), 3);
        assert_eq!(strategy.base_delay(RetryReason::ServerError), Duration::from_secs(5));
        assert_eq!(strategy.max_delay(), Duration::from_secs(60));
    }

    #[test]
    fn test_huge_attempt_does_not_overflow() {
        let strategy = RetryStrategy::default();
        assert_eq!(
            strategy.get_delay(u32::MAX, RetryReason::ServerError),
            Duration::from_secs(60)
        );
    }

    #[test]
    fn test_reason_labels() {
        assert_eq!(RetryReason::NetworkError.to_string(), "NETWORK_ERROR");
        assert_eq!(RetryReason::ServerError.as_label(), "server_error");
        let json = serde_json::to_string(&RetryReason::Timeout).unwrap();
        assert_eq!(json, "\"TIMEOUT\"");
    }

    proptest! {
        #[test]
        fn delay_never_exceeds_max(
            attempt in 0u32..10_000,
            base_ms in 0u64..120_000,
            multiplier in 1.0f64..10.0,
            max_ms in 1u64..600_000,
        ) {
            let strategy = RetryStrategy::new(
                3,
                Duration::from_millis(base_ms),
                multiplier,
                Duration::from_millis(max_ms),
            );
            for reason in RetryReason::ALL {
                prop_assert!(strategy.get_delay(attempt, reason) <= Duration::from_millis(max_ms));
            }
        }
    }
}
