//! Configuration module for the swap engine.
//!
//! Provides configuration loading, validation, and environment variable
//! interpolation for the venue, execution, circuit breaker, audit and
//! observability settings.
//!
//! # Usage
//!
//! ```rust,ignore
//! use swap_engine::config::{Config, load_config};
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("custom/config.yaml"))?;
//!
//! println!("breaker threshold: {}", config.circuit_breaker.failure_threshold);
//! ```

mod audit;
mod circuit_breaker;
mod execution;
mod observability;
mod venue;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use audit::AuditConfig;
pub use circuit_breaker::CircuitBreakerSettings;
pub use execution::{ExecutionConfig, ReasonOverride, RetryConfig, RetryOverrides};
pub use observability::{LoggingConfig, ObservabilityConfig};
pub use venue::{HttpVenueConfig, SimulatedVenueConfig, VenueConfig, VenueKind};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "SWAP_ENGINE_CONFIG";

/// Config file used when neither an explicit path nor the env var is set.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Venue adapter selection.
    #[serde(default)]
    pub venue: VenueConfig,
    /// Swap execution and retry policy.
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Circuit breaker configuration.
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerSettings,
    /// Audit log configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Resolve the config path: explicit argument, then `SWAP_ENGINE_CONFIG`,
/// then `config.yaml`.
#[must_use]
pub fn resolve_config_path(path: Option<&str>) -> String {
    path.map(str::to_string)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().filter(|p| !p.is_empty()))
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. See [`resolve_config_path`].
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = resolve_config_path(path);

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let execution = &config.execution;
    if !(0.0..=1.0).contains(&execution.default_max_slippage) {
        return Err(invalid(
            "execution.default_max_slippage must be between 0.0 and 1.0",
        ));
    }
    if execution.order_timeout_secs == 0 {
        return Err(invalid("execution.order_timeout_secs must be positive"));
    }

    let retry = &execution.retry;
    if !retry.backoff_multiplier.is_finite() || retry.backoff_multiplier < 1.0 {
        return Err(invalid("execution.retry.backoff_multiplier must be >= 1.0"));
    }
    if retry.max_delay_ms < retry.base_delay_ms {
        return Err(invalid(
            "execution.retry.max_delay_ms must be >= base_delay_ms",
        ));
    }

    if config.circuit_breaker.failure_threshold == 0 {
        return Err(invalid("circuit_breaker.failure_threshold must be positive"));
    }

    match config.venue.kind {
        VenueKind::Http => {
            if config.venue.http.base_url.trim().is_empty() {
                return Err(invalid("venue.http.base_url is required for the http venue"));
            }
            if config.venue.http.request_timeout_secs == 0 {
                return Err(invalid("venue.http.request_timeout_secs must be positive"));
            }
        }
        VenueKind::Simulated => {
            let sim = &config.venue.simulated;
            let rates = [sim.fill_rate, sim.partial_fill_rate];
            if rates.iter().any(|r| !(0.0..=1.0).contains(r)) {
                return Err(invalid(
                    "venue.simulated fill rates must be between 0.0 and 1.0",
                ));
            }
            if sim.fill_rate + sim.partial_fill_rate > 1.0 {
                return Err(invalid(
                    "venue.simulated fill_rate + partial_fill_rate must not exceed 1.0",
                ));
            }
            if !sim.base_price.is_finite() || sim.base_price <= 0.0 {
                return Err(invalid("venue.simulated.base_price must be positive"));
            }
            if !(0.0..0.5).contains(&sim.price_jitter) {
                return Err(invalid(
                    "venue.simulated.price_jitter must be in [0.0, 0.5)",
                ));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.venue.kind, VenueKind::Simulated);
        assert_eq!(config.circuit_breaker.failure_threshold, 5);
        assert_eq!(config.circuit_breaker.recovery_timeout_secs, 300);
        assert_eq!(config.execution.order_timeout_secs, 30);
        assert_eq!(config.audit.export_limit, 1000);
        assert_eq!(config.observability.logging.format, "json");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_minimal_config() {
        let config = match load_config_from_string("{}") {
            Ok(c) => c,
            Err(e) => panic!("should load minimal config: {e}"),
        };
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_full_config() {
        let yaml = r#"
venue:
  kind: http
  http:
    base_url: "http://localhost:8000"
    api_key: secret
    request_timeout_secs: 10
execution:
  default_max_slippage: 0.02
  order_timeout_secs: 15
  retry:
    max_retries: 2
    base_delay_ms: 500
    backoff_multiplier: 3.0
    max_delay_ms: 20000
    overrides:
      network_error:
        max_retries: 6
circuit_breaker:
  failure_threshold: 3
  recovery_timeout_secs: 60
audit:
  export_limit: 50
observability:
  logging:
    level: debug
    format: pretty
  metrics:
    enabled: true
    listen_addr: "127.0.0.1:9100"
"#;

        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load full config: {e}"),
        };
        assert_eq!(config.venue.kind, VenueKind::Http);
        assert_eq!(config.venue.http.api_key.as_deref(), Some("secret"));
        assert_eq!(config.execution.retry.max_retries, 2);
        assert_eq!(
            config.execution.retry.overrides.network_error,
            Some(ReasonOverride {
                max_retries: Some(6),
                base_delay_ms: None,
            })
        );
        assert!(config.execution.retry.overrides.timeout.is_none());
        assert_eq!(config.circuit_breaker.failure_threshold, 3);
        assert_eq!(config.audit.export_limit, 50);
        assert!(config.observability.metrics.enabled);
        assert_eq!(config.observability.logging.level, "debug");
    }

    #[test]
    fn test_env_var_with_default_when_missing() {
        let input = "kind: ${SWAP_ENGINE_TEST_NONEXISTENT_VAR:-simulated}";
        assert_eq!(interpolate_env_vars(input), "kind: simulated");
    }

    #[test]
    #[expect(clippy::literal_string_with_formatting_args)] // ${...} is env var syntax, not format args
    fn test_env_var_with_default_uses_existing() {
        // PATH should always exist
        let input = "path: ${PATH:-default}";
        let result = interpolate_env_vars(input);

        assert_ne!(result, "path: default");
        assert!(result.starts_with("path: "));
    }

    #[test]
    fn test_env_var_without_default_becomes_empty() {
        let input = "api_key: ${SWAP_ENGINE_TEST_UNLIKELY_TO_EXIST}";
        assert_eq!(interpolate_env_vars(input), "api_key: ");
    }

    #[test]
    fn test_validation_zero_threshold() {
        let yaml = "circuit_breaker:\n  failure_threshold: 0\n";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for zero threshold");
        };
        assert!(err.to_string().contains("failure_threshold"));
    }

    #[test]
    fn test_validation_backoff_multiplier() {
        let yaml = "execution:\n  retry:\n    backoff_multiplier: 0.5\n";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for shrinking backoff");
        };
        assert!(err.to_string().contains("backoff_multiplier"));
    }

    #[test]
    fn test_validation_max_delay_below_base() {
        let yaml = "execution:\n  retry:\n    base_delay_ms: 5000\n    max_delay_ms: 1000\n";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for max_delay below base_delay");
        };
        assert!(err.to_string().contains("max_delay_ms"));
    }

    #[test]
    fn test_validation_slippage_range() {
        let yaml = "execution:\n  default_max_slippage: 1.5\n";
        assert!(load_config_from_string(yaml).is_err());
    }

    #[test]
    fn test_validation_zero_order_timeout() {
        let yaml = "execution:\n  order_timeout_secs: 0\n";
        assert!(load_config_from_string(yaml).is_err());
    }

    #[test]
    fn test_validation_http_requires_base_url() {
        let yaml = "venue:\n  kind: http\n";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for missing base_url");
        };
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_validation_simulated_rates() {
        let yaml = "venue:\n  simulated:\n    fill_rate: 0.8\n    partial_fill_rate: 0.3\n";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for rates above 1.0");
        };
        assert!(err.to_string().contains("must not exceed"));
    }

    #[test]
    fn test_invalid_yaml() {
        let result = load_config_from_string("venue: [unclosed");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_resolve_config_path_prefers_explicit() {
        assert_eq!(resolve_config_path(Some("custom.yaml")), "custom.yaml");
    }

    #[test]
    fn test_missing_file() {
        let result = load_config(Some("/nonexistent/swap-engine/config.yaml"));
        let Err(ConfigError::ReadError { path, .. }) = result else {
            panic!("expected read error");
        };
        assert!(path.contains("nonexistent"));
    }
}
