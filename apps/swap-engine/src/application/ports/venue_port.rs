//! Venue Port (Driven Port)
//!
//! Interface for submitting orders to the execution venue.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::order::WireRequest;
use crate::error::ErrorCode;
use crate::resilience::RetryReason;
use crate::resilience::classifier;

/// Venue answer to one order submission.
///
/// Accepts both the engine's field names and the terminal's native ones
/// (`order`, `deal`, `volume`, `price`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueResponse {
    /// Result code.
    pub retcode: u32,
    /// Venue order ticket.
    #[serde(default, alias = "order")]
    pub order_id: Option<u64>,
    /// Venue deal ticket.
    #[serde(default, alias = "deal")]
    pub deal_id: Option<u64>,
    /// Filled volume.
    #[serde(default, alias = "volume")]
    pub filled_volume: Option<f64>,
    /// Fill price.
    #[serde(default, alias = "price")]
    pub fill_price: Option<f64>,
    /// Venue comment.
    #[serde(default)]
    pub comment: String,
}

impl VenueResponse {
    /// A fill response.
    #[must_use]
    pub fn filled(retcode: u32, order_id: u64, volume: f64, price: f64) -> Self {
        Self {
            retcode,
            order_id: Some(order_id),
            deal_id: Some(order_id),
            filled_volume: Some(volume),
            fill_price: Some(price),
            comment: classifier::describe(retcode).to_string(),
        }
    }

    /// A response carrying only a result code.
    #[must_use]
    pub fn code(retcode: u32) -> Self {
        Self {
            retcode,
            order_id: None,
            deal_id: None,
            filled_volume: None,
            fill_price: None,
            comment: classifier::describe(retcode).to_string(),
        }
    }

    /// Whether the order reached the book.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        classifier::is_success(self.retcode)
    }
}

/// Venue port error (transport level).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VenueError {
    /// Could not connect.
    #[error("Venue connection error: {message}")]
    Connection {
        /// Error details.
        message: String,
    },

    /// Call timed out.
    #[error("Venue timeout: {message}")]
    Timeout {
        /// Error details.
        message: String,
    },

    /// Venue-side failure.
    #[error("Venue server error: {message}")]
    Server {
        /// Error details.
        message: String,
    },

    /// Venue refused the request as malformed.
    #[error("Invalid venue request: {message}")]
    InvalidRequest {
        /// Error details.
        message: String,
    },

    /// Venue answered with something unparseable.
    #[error("Invalid venue response: {message}")]
    InvalidResponse {
        /// Error details.
        message: String,
    },
}

impl VenueError {
    /// Retry reason for this error, `None` when permanent.
    #[must_use]
    pub const fn retry_reason(&self) -> Option<RetryReason> {
        match self {
            Self::Connection { .. } => Some(RetryReason::NetworkError),
            Self::Timeout { .. } => Some(RetryReason::Timeout),
            Self::Server { .. } => Some(RetryReason::ServerError),
            Self::InvalidRequest { .. } | Self::InvalidResponse { .. } => None,
        }
    }

    /// Error code reported when this error ends a leg.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Timeout { .. } => ErrorCode::VenueTimeout,
            _ => ErrorCode::VenueUnavailable,
        }
    }
}

/// Port for venue interactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VenueAdapter: Send + Sync {
    /// Submit an order.
    ///
    /// `Ok` carries any venue answer, including rejections; `Err` means the
    /// venue could not be asked or its answer could not be read.
    async fn submit(&self, request: &WireRequest) -> Result<VenueResponse, VenueError>;

    /// Adapter name for logging.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::classifier::retcode;

    #[test]
    fn response_accepts_terminal_field_names() {
        let json = r#"{"retcode":10009,"order":42,"deal":43,"volume":100.0,"price":10.5,"comment":"Request executed"}"#;
        let response: VenueResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.order_id, Some(42));
        assert_eq!(response.deal_id, Some(43));
        assert_eq!(response.filled_volume, Some(100.0));
        assert_eq!(response.fill_price, Some(10.5));
        assert!(response.is_success());
    }

    #[test]
    fn response_optional_fields_default() {
        let response: VenueResponse = serde_json::from_str(r#"{"retcode":10014}"#).unwrap();
        assert_eq!(response.retcode, retcode::INVALID_VOLUME);
        assert!(response.order_id.is_none());
        assert!(response.filled_volume.is_none());
        assert!(response.comment.is_empty());
        assert!(!response.is_success());
    }

    #[test]
    fn venue_error_retry_reasons() {
        let connection = VenueError::Connection { message: "refused".into() };
        let timeout = VenueError::Timeout { message: "slow".into() };
        let server = VenueError::Server { message: "503".into() };
        let invalid = VenueError::InvalidRequest { message: "400".into() };
        let garbage = VenueError::InvalidResponse { message: "eof".into() };

        assert_eq!(connection.retry_reason(), Some(RetryReason::NetworkError));
        assert_eq!(timeout.retry_reason(), Some(RetryReason::Timeout));
        assert_eq!(server.retry_reason(), Some(RetryReason::ServerError));
        assert_eq!(invalid.retry_reason(), None);
        assert_eq!(garbage.retry_reason(), None);
        assert_eq!(timeout.error_code(), ErrorCode::VenueTimeout);
        assert_eq!(garbage.error_code(), ErrorCode::VenueUnavailable);
    }
}
