//! Application Layer
//!
//! Orchestrates domain logic against the outside world. It defines:
//!
//! - **Ports**: Interfaces for interacting with external systems
//! - **Services**: The swap execution service and its in-process state

pub mod ports;
pub mod services;

pub use ports::{VenueAdapter, VenueError, VenueResponse};
pub use services::{ExecutionService, MetricsSnapshot};
