//! Observability module for metrics and logging.
//!
//! Prometheus metrics export and `tracing` subscriber setup.

mod metrics;
mod tracing;

pub use self::metrics::{
    MetricsConfig, MetricsError, init_metrics, record_circuit_breaker_rejected,
    record_circuit_breaker_state, record_order_attempt, record_order_retry,
    record_swap_execution,
};
pub use self::tracing::{TracingError, env_filter, init_tracing};
