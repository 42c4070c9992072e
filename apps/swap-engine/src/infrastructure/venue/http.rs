//! HTTP venue adapter.
//!
//! Posts the wire request as JSON to `{base_url}/order_send` on a gateway in
//! front of the trading terminal. No retries here: the execution service
//! owns the retry policy.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::application::ports::{VenueAdapter, VenueError, VenueResponse};
use crate::config::HttpVenueConfig;
use crate::domain::order::WireRequest;

/// Header carrying the gateway API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

const ORDER_SEND_PATH: &str = "/order_send";

/// Venue adapter talking to an HTTP gateway.
#[derive(Debug, Clone)]
pub struct HttpVenue {
    client: Client,
    order_url: String,
    api_key: Option<String>,
}

impl HttpVenue {
    /// Create a new HTTP venue.
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, VenueError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VenueError::Connection {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            order_url: format!("{}{ORDER_SEND_PATH}", base_url.trim_end_matches('/')),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    /// Create an HTTP venue from config.
    pub fn from_config(config: &HttpVenueConfig) -> Result<Self, VenueError> {
        Self::new(
            &config.base_url,
            config.api_key.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Full URL orders are posted to.
    #[must_use]
    pub fn order_url(&self) -> &str {
        &self.order_url
    }
}

fn transport_error(err: &reqwest::Error) -> VenueError {
    if err.is_timeout() {
        VenueError::Timeout {
            message: err.to_string(),
        }
    } else {
        VenueError::Connection {
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl VenueAdapter for HttpVenue {
    async fn submit(&self, request: &WireRequest) -> Result<VenueResponse, VenueError> {
        let mut builder = self.client.post(&self.order_url).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }

        let response = builder.send().await.map_err(|e| transport_error(&e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| transport_error(&e))?;

        if status.is_server_error() {
            return Err(VenueError::Server {
                message: format!("{status}: {body}"),
            });
        }
        if status.is_client_error() {
            return Err(VenueError::InvalidRequest {
                message: format!("{status}: {body}"),
            });
        }

        serde_json::from_str(&body).map_err(|e| VenueError::InvalidResponse {
            message: e.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
