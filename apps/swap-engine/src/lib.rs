// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Swap Engine - Rust Core Library
//!
//! Resilient execution of two-leg swaps: sell one instrument, then buy its
//! paired instrument with the proceeds, against an unreliable venue.
//!
//! # Architecture (Clean Architecture + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Requests, results and identifiers, free of I/O
//!   - `order`: `OrderRequest`, `OrderResult` and the venue wire request
//!   - `execution`: `SwapRequest`, `ExecutionResult`, status and audit events
//!   - `shared`: Decision, execution and order IDs
//!
//! - **Resilience**: Failure handling policies
//!   - `classifier`: Venue result codes to retry reasons
//!   - `RetryStrategy`: Per-reason retry budgets and exponential backoff
//!   - `CircuitBreaker`: Process-wide venue breaker
//!
//! - **Application**: Orchestration
//!   - `ports`: `VenueAdapter` interface
//!   - `services`: `ExecutionService` with idempotency, audit log and metrics
//!
//! - **Infrastructure**: Adapters
//!   - `venue`: Simulated venue and HTTP gateway client
//!
//! - **Config / Observability**: YAML configuration, `tracing` and Prometheus
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rust_decimal_macros::dec;
//! use swap_engine::{ExecutionService, SimulatedVenue, SwapRequest};
//!
//! let service = ExecutionService::new(Arc::new(SimulatedVenue::always_fill()));
//! let result = service
//!     .execute_swap(SwapRequest::new("decision-1", "ITSA3", "ITSA4", dec!(1000)))
//!     .await;
//! assert!(result.is_filled());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core types with no external dependencies.
pub mod domain;

/// Application layer - Ports and the execution service.
pub mod application;

/// Infrastructure layer - Venue adapters.
pub mod infrastructure;

// =============================================================================
// Cross-cutting Modules
// =============================================================================

/// Configuration loading and validation.
pub mod config;

/// Structured execution errors.
pub mod error;

/// Metrics and logging setup.
pub mod observability;

/// Retry, classification and circuit breaking.
pub mod resilience;

// =============================================================================
// Re-exports
// =============================================================================

pub use application::ports::{VenueAdapter, VenueError, VenueResponse};
pub use application::services::{AuditExportError, ExecutionService, MetricsSnapshot};
pub use config::{Config, ConfigError, load_config, load_config_from_string};
pub use domain::execution::{
    AuditEvent, AuditEventType, ExecutionResult, ExecutionStatus, SwapRequest,
};
pub use domain::order::{OrderRequest, OrderResult, OrderSide, OrderType};
pub use domain::shared::{DecisionId, ExecutionId, OrderId};
pub use error::{ErrorCode, ExecutionError};
pub use infrastructure::venue::{HttpVenue, SimulatedOutcome, SimulatedVenue, build_venue};
pub use resilience::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerState, RetryReason, RetryStrategy,
};
