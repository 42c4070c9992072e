//! Execution counters and the metrics snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::domain::execution::ExecutionStatus;
use crate::resilience::CircuitBreakerState;

/// Monotonic counters updated once per swap.
#[derive(Debug, Default)]
pub struct ExecutionCounters {
    total: AtomicU64,
    successful: AtomicU64,
    failed: AtomicU64,
    retries: AtomicU64,
}

impl ExecutionCounters {
    /// Count one finished swap. FILLED and PARTIAL_FILL count as successful.
    pub fn record_execution(&self, status: ExecutionStatus) {
        self.total.fetch_add(1, Ordering::Relaxed);
        if status.is_success() {
            self.successful.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Count one scheduled retry.
    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Current `(total, successful, failed, retries)`.
    #[must_use]
    pub fn load(&self) -> (u64, u64, u64, u64) {
        (
            self.total.load(Ordering::Relaxed),
            self.successful.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed),
            self.retries.load(Ordering::Relaxed),
        )
    }
}

/// Point-in-time view of the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Swaps that ran to a terminal result, rejected requests included.
    pub total_executions: u64,
    /// Swaps that ended FILLED or PARTIAL_FILL.
    pub successful_executions: u64,
    /// Swaps that ended FAILED.
    pub failed_executions: u64,
    /// Retries scheduled across all legs.
    pub retry_count: u64,
    /// `successful / total * 100`, zero before the first swap.
    pub success_rate: f64,
    /// Current breaker state.
    pub circuit_breaker_state: CircuitBreakerState,
    /// Current breaker failure count.
    pub circuit_breaker_failures: u32,
    /// Times the breaker has opened.
    pub circuit_breaker_trips: u64,
    /// Decisions with a cached result.
    pub cached_executions: usize,
    /// Events in the audit log.
    pub audit_events: usize,
}

/// Percentage of successful swaps, `0.0` when nothing has run.
#[must_use]
pub fn success_rate(successful: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        successful as f64 / total as f64 * 100.0
    }
}
