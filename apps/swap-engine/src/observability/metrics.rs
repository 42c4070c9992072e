//! Prometheus metrics for the swap engine.
//!
//! Recording functions are no-ops until [`init_metrics`] installs a recorder,
//! so the library can be used without an exporter.
//!
//! # Example
//!
//! ```ignore
//! use swap_engine::observability::{init_metrics, MetricsConfig};
//!
//! let config = MetricsConfig::default();
//! init_metrics(&config)?;
//!
//! record_swap_execution("filled", 0.42);
//! ```

use std::net::SocketAddr;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde::{Deserialize, Serialize};

/// Configuration for the metrics exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Whether to start the exporter.
    #[serde(default)]
    pub enabled: bool,
    /// Address to bind the metrics HTTP listener.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    /// Histogram buckets for swap and order latency (in seconds).
    #[serde(default = "default_latency_buckets")]
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: default_listen_addr(),
            latency_buckets: default_latency_buckets(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 9090))
}

// Venue round trips span milliseconds to minutes once backoff kicks in
fn default_latency_buckets() -> Vec<f64> {
    vec![
        0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0,
    ]
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`.
///
/// # Errors
///
/// Returns an error if the metrics exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.latency_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Swap Execution Metrics
// ============================================================================

/// Record a finished swap.
///
/// # Arguments
///
/// * `status` - Terminal status label (e.g., "filled", "failed")
/// * `duration_seconds` - Wall time of the swap in seconds
pub fn record_swap_execution(status: &str, duration_seconds: f64) {
    counter!(
        "swap_executions_total",
        "status" => status.to_string()
    )
    .increment(1);

    histogram!("swap_execution_duration_seconds").record(duration_seconds);
}

/// Record one venue call attempt.
///
/// # Arguments
///
/// * `side` - Order side ("buy" or "sell")
pub fn record_order_attempt(side: &str) {
    counter!(
        "order_attempts_total",
        "side" => side.to_string()
    )
    .increment(1);
}

/// Record a scheduled retry.
///
/// # Arguments
///
/// * `reason` - Retry reason label (e.g., `"network_error"`)
pub fn record_order_retry(reason: &str) {
    counter!(
        "order_retries_total",
        "reason" => reason.to_string()
    )
    .increment(1);
}

// ============================================================================
// Circuit Breaker Metrics
// ============================================================================

/// Update circuit breaker state gauge.
///
/// # Arguments
///
/// * `service` - Breaker name (e.g., "venue")
/// * `state` - Numeric state (0=closed, 1=open, 2=`half_open`)
pub fn record_circuit_breaker_state(service: &str, state: f64) {
    gauge!(
        "circuit_breaker_state",
        "service" => service.to_string()
    )
    .set(state);
}

/// Record a swap rejected because the circuit was open.
///
/// # Arguments
///
/// * `service` - Breaker name
pub fn record_circuit_breaker_rejected(service: &str) {
    counter!(
        "circuit_breaker_rejections_total",
        "service" => service.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MetricsConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.listen_addr.port(), 9090);
        assert!(config.latency_buckets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_config_deserializes_addr_from_string() {
        let config: MetricsConfig =
            serde_yaml_bw::from_str("enabled: true\nlisten_addr: \"127.0.0.1:9191\"\n").unwrap();
        assert!(config.enabled);
        assert_eq!(config.listen_addr.port(), 9191);
        assert_eq!(config.latency_buckets, default_latency_buckets());
    }

    #[test]
    fn test_recording_without_exporter_is_noop() {
        record_swap_execution("filled", 0.5);
        record_order_attempt("sell");
        record_order_retry("timeout");
        record_circuit_breaker_state("venue", 1.0);
        record_circuit_breaker_rejected("venue");
    }
}
