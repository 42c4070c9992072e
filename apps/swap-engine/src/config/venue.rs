//! Execution venue selection and adapter settings.

use serde::{Deserialize, Serialize};

/// Which venue adapter to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VenueKind {
    /// In-process simulator.
    #[default]
    Simulated,
    /// HTTP gateway in front of the trading terminal.
    Http,
}

/// Venue configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct VenueConfig {
    /// Adapter to use.
    #[serde(default)]
    pub kind: VenueKind,
    /// Simulator settings.
    #[serde(default)]
    pub simulated: SimulatedVenueConfig,
    /// HTTP gateway settings.
    #[serde(default)]
    pub http: HttpVenueConfig,
}

/// Simulated venue settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedVenueConfig {
    /// Probability of a full fill.
    #[serde(default = "default_fill_rate")]
    pub fill_rate: f64,
    /// Probability of a partial fill.
    #[serde(default)]
    pub partial_fill_rate: f64,
    /// Reference fill price.
    #[serde(default = "default_base_price")]
    pub base_price: f64,
    /// Maximum relative deviation of fill prices from `base_price`.
    #[serde(default = "default_price_jitter")]
    pub price_jitter: f64,
    /// Simulated round-trip latency in milliseconds.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
    /// RNG seed for reproducible runs.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulatedVenueConfig {
    fn default() -> Self {
        Self {
            fill_rate: default_fill_rate(),
            partial_fill_rate: 0.0,
            base_price: default_base_price(),
            price_jitter: default_price_jitter(),
            latency_ms: default_latency_ms(),
            seed: None,
        }
    }
}

/// HTTP gateway settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpVenueConfig {
    /// Gateway base URL.
    #[serde(default)]
    pub base_url: String,
    /// API key sent as `X-API-Key`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for HttpVenueConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

const fn default_fill_rate() -> f64 {
    0.95
}

const fn default_base_price() -> f64 {
    10.0
}

const fn default_price_jitter() -> f64 {
    0.005
}

const fn default_latency_ms() -> u64 {
    50
}

const fn default_request_timeout() -> u64 {
    30
}
