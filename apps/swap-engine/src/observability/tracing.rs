//! Structured logging setup.
//!
//! `RUST_LOG` takes precedence over the configured level.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Error type for logging setup.
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    /// A global subscriber is already installed.
    #[error("tracing subscriber already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Build the filter from `RUST_LOG`, falling back to the configured level.
#[must_use]
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global `tracing` subscriber.
///
/// `format` selects `json`, `pretty` or `compact`; anything else uses the
/// default human-readable format.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TracingError> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_target(config.include_target);

    let result = match config.format.as_str() {
        "json" => builder.json().try_init(),
        "pretty" => builder.pretty().try_init(),
        "compact" => builder.compact().try_init(),
        _ => builder.try_init(),
    };
    result.map_err(|e| TracingError::AlreadyInitialized(e.to_string()))
}
