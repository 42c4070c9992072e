//! Infrastructure Layer
//!
//! Adapters implementing the ports defined in the application layer.
//!
//! - **Driven Adapters (Outbound)**
//!   - `venue/`: execution venue adapters (simulated, HTTP gateway)

pub mod venue;

pub use venue::{HttpVenue, SimulatedOutcome, SimulatedVenue, build_venue};
