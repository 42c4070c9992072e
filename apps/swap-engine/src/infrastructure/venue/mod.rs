//! Venue adapters.
//!
//! One [`VenueAdapter`] port, two implementations, picked by configuration:
//!
//! - [`SimulatedVenue`]: in-process simulator with scripted or random outcomes
//! - [`HttpVenue`]: JSON over HTTP to a gateway in front of the terminal

mod http;
mod simulated;

use std::sync::Arc;

pub use http::{API_KEY_HEADER, HttpVenue};
pub use simulated::{SimulatedOutcome, SimulatedVenue};

use crate::application::ports::{VenueAdapter, VenueError};
use crate::config::{VenueConfig, VenueKind};

/// Build the configured venue adapter.
pub fn build_venue(config: &VenueConfig) -> Result<Arc<dyn VenueAdapter>, VenueError> {
    let venue: Arc<dyn VenueAdapter> = match config.kind {
        VenueKind::Simulated => Arc::new(SimulatedVenue::new(config.simulated.clone())),
        VenueKind::Http => Arc::new(HttpVenue::from_config(&config.http)?),
    };

    tracing::info!(venue = venue.name(), "Venue adapter ready");
    Ok(venue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpVenueConfig;

    #[test]
    fn builds_simulated_by_default() {
        let venue = build_venue(&VenueConfig::default()).unwrap();
        assert_eq!(venue.name(), "simulated");
    }

    #[test]
    fn builds_http_when_configured() {
        let config = VenueConfig {
            kind: VenueKind::Http,
            http: HttpVenueConfig {
                base_url: "http://localhost:8000".to_string(),
                ..HttpVenueConfig::default()
            },
            ..VenueConfig::default()
        };
        let venue = build_venue(&config).unwrap();
        assert_eq!(venue.name(), "http");
    }
}
