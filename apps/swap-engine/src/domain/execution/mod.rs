//! Swap executions: the request, the aggregate result and its audit trail.

mod audit;
mod result;
mod status;
mod swap_request;

pub use audit::{AuditEvent, AuditEventType};
pub use result::ExecutionResult;
pub use status::ExecutionStatus;
pub use swap_request::SwapRequest;
