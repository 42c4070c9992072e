//! Shared Domain Types
//!
//! Identifiers shared by orders, executions and audit events.

mod identifiers;

pub use identifiers::{DecisionId, ExecutionId, OrderId};
