//! Resilience patterns for venue calls.
//!
//! Result-code classification, retry policy and the process-wide circuit
//! breaker.

pub mod classifier;
mod circuit_breaker;
mod retry;

pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerMetrics, CircuitBreakerState,
};
pub use classifier::classify;
pub use retry::{ReasonPolicy, RetryReason, RetryStrategy};
