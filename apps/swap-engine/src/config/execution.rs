//! Swap execution and retry configuration.

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::domain::order::DEFAULT_MAX_SLIPPAGE;
use crate::resilience::{ReasonPolicy, RetryReason, RetryStrategy};

/// Execution configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Slippage used when a swap does not specify one.
    #[serde(default = "default_max_slippage")]
    pub default_max_slippage: f64,
    /// Per-attempt venue timeout in seconds.
    #[serde(default = "default_order_timeout")]
    pub order_timeout_secs: u64,
    /// Retry policy.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            default_max_slippage: default_max_slippage(),
            order_timeout_secs: default_order_timeout(),
            retry: RetryConfig::default(),
        }
    }
}

impl ExecutionConfig {
    /// Default slippage as a decimal.
    #[must_use]
    pub fn max_slippage(&self) -> Decimal {
        Decimal::from_f64(self.default_max_slippage).unwrap_or(DEFAULT_MAX_SLIPPAGE)
    }

    /// Per-attempt venue timeout.
    #[must_use]
    pub const fn order_timeout(&self) -> Duration {
        Duration::from_secs(self.order_timeout_secs)
    }
}

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Default max retries.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Default base delay in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Exponential backoff multiplier.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Upper bound on any delay in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Per-reason overrides.
    #[serde(default)]
    pub overrides: RetryOverrides,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_delay_ms: default_max_delay_ms(),
            overrides: RetryOverrides::default(),
        }
    }
}

/// Per-reason retry overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryOverrides {
    /// Connection failures.
    #[serde(default)]
    pub network_error: Option<ReasonOverride>,
    /// Timeouts.
    #[serde(default)]
    pub timeout: Option<ReasonOverride>,
    /// Venue-side errors.
    #[serde(default)]
    pub server_error: Option<ReasonOverride>,
}

impl Default for RetryOverrides {
    fn default() -> Self {
        Self {
            network_error: Some(ReasonOverride::new(5, 2000)),
            timeout: Some(ReasonOverride::new(3, 1000)),
            server_error: Some(ReasonOverride::new(3, 5000)),
        }
    }
}

impl RetryOverrides {
    fn get(&self, reason: RetryReason) -> Option<&ReasonOverride> {
        match reason {
            RetryReason::NetworkError => self.network_error.as_ref(),
            RetryReason::Timeout => self.timeout.as_ref(),
            RetryReason::ServerError => self.server_error.as_ref(),
        }
    }
}

/// Override for one retry reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonOverride {
    /// Max retries for this reason.
    #[serde(default)]
    pub max_retries: Option<u32>,
    /// Base delay for this reason in milliseconds.
    #[serde(default)]
    pub base_delay_ms: Option<u64>,
}

impl ReasonOverride {
    const fn new(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            max_retries: Some(max_retries),
            base_delay_ms: Some(base_delay_ms),
        }
    }
}

impl RetryConfig {
    /// Base delay.
    #[must_use]
    pub const fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Maximum delay.
    #[must_use]
    pub const fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Build the retry strategy.
    #[must_use]
    pub fn to_strategy(&self) -> RetryStrategy {
        RetryReason::ALL.into_iter().fold(
            RetryStrategy::new(
                self.max_retries,
                self.base_delay(),
                self.backoff_multiplier,
                self.max_delay(),
            ),
            |strategy, reason| match self.overrides.get(reason) {
                Some(o) => strategy.with_override(
                    reason,
                    ReasonPolicy {
                        max_retries: o.max_retries,
                        base_delay: o.base_delay_ms.map(Duration::from_millis),
                    },
                ),
                None => strategy,
            },
        )
    }
}

const fn default_max_slippage() -> f64 {
    0.05
}

const fn default_order_timeout() -> u64 {
    30
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_base_delay_ms() -> u64 {
    1000
}

const fn default_backoff_multiplier() -> f64 {
    2.0
}

const fn default_max_delay_ms() -> u64 {
    60_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn default_strategy_matches_builtin_default() {
        assert_eq!(RetryConfig::default().to_strategy(), RetryStrategy::default());
    }

    #[test]
    fn partial_override_falls_back_to_default() {
        let config = RetryConfig {
            overrides: RetryOverrides {
                network_error: Some(ReasonOverride {
                    max_retries: None,
                    base_delay_ms: Some(250),
                }),
                timeout: None,
                server_error: None,
            },
            ..RetryConfig::default()
        };
        let strategy = config.to_strategy();

        assert_eq!(strategy.max_retries(RetryReason::NetworkError), 3);
        assert_eq!(
            strategy.base_delay(RetryReason::NetworkError),
            Duration::from_millis(250)
        );
        assert_eq!(strategy.base_delay(RetryReason::Timeout), Duration::from_secs(1));
    }

    #[test]
    fn slippage_and_timeout_conversions() {
        let config = ExecutionConfig::default();
        assert_eq!(config.max_slippage(), dec!(0.05));
        assert_eq!(config.order_timeout(), Duration::from_secs(30));
    }
}
