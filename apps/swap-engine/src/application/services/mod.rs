//! Application Services
//!
//! The swap execution service and the in-process state it owns: the
//! idempotency registry, the audit log and the execution counters.

mod audit_log;
mod execution_metrics;
mod execution_service;
mod idempotency;

pub use audit_log::{AuditExportError, AuditLog};
pub use execution_metrics::{ExecutionCounters, MetricsSnapshot, success_rate};
pub use execution_service::{ExecutionService, VENUE_BREAKER};
pub use idempotency::{ExecutionSlot, IdempotencyRegistry};
