//! Audit events recorded by the execution service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Kind of audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// Swap accepted and started.
    ExecutionStart,
    /// Repeated decision ID answered from the cache.
    ExecutionIdempotent,
    /// Swap failed validation.
    ExecutionRejected,
    /// Swap refused by the circuit breaker.
    ExecutionCircuitOpen,
    /// Venue call about to be made.
    OrderAttempt,
    /// Leg fully filled.
    OrderSuccess,
    /// Leg partially filled.
    OrderPartialFill,
    /// Retry scheduled after a retryable failure.
    OrderRetry,
    /// Venue call timed out.
    OrderTimeout,
    /// Leg failed.
    OrderError,
    /// Leg permanently rejected.
    OrderRejected,
    /// Both legs filled.
    ExecutionSuccess,
    /// Swap failed.
    ExecutionFailed,
    /// Swap partially filled.
    ExecutionPartialFailure,
    /// Swap reached its terminal state.
    ExecutionComplete,
}

impl AuditEventType {
    /// Snake-case name of the event.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ExecutionStart => "execution_start",
            Self::ExecutionIdempotent => "execution_idempotent",
            Self::ExecutionRejected => "execution_rejected",
            Self::ExecutionCircuitOpen => "execution_circuit_open",
            Self::OrderAttempt => "order_attempt",
            Self::OrderSuccess => "order_success",
            Self::OrderPartialFill => "order_partial_fill",
            Self::OrderRetry => "order_retry",
            Self::OrderTimeout => "order_timeout",
            Self::OrderError => "order_error",
            Self::OrderRejected => "order_rejected",
            Self::ExecutionSuccess => "execution_success",
            Self::ExecutionFailed => "execution_failed",
            Self::ExecutionPartialFailure => "execution_partial_failure",
            Self::ExecutionComplete => "execution_complete",
        }
    }
}

impl fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the append-only audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event kind.
    pub event_type: AuditEventType,
    /// Free-form event details.
    pub details: Map<String, Value>,
    /// When the event was recorded.
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    /// Create an event stamped now.
    #[must_use]
    pub fn now(event_type: AuditEventType, details: Map<String, Value>) -> Self {
        Self {
            event_type,
            details,
            timestamp: Utc::now(),
        }
    }

    /// The `execution_id` detail, if present.
    #[must_use]
    pub fn execution_id(&self) -> Option<&str> {
        self.details.get("execution_id").and_then(Value::as_str)
    }
}
