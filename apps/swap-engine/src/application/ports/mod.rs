//! Application Ports
//!
//! Driven (outbound) interfaces the application uses to reach external
//! systems. The venue is the only one.

mod venue_port;

#[cfg(test)]
pub use venue_port::MockVenueAdapter;
pub use venue_port::{VenueAdapter, VenueError, VenueResponse};
