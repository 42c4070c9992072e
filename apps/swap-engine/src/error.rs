//! Structured errors carried in execution results.
//!
//! `execute_swap` never returns `Err`: every failure is reported through the
//! `status` and `error_details` of the result. [`ExecutionError`] is the value
//! stored in `error_details`.
//!
//! | Code | Raised when |
//! |------|-------------|
//! | `INVALID_REQUEST` | Empty symbol or non-positive quantity |
//! | `CIRCUIT_OPEN` | Circuit breaker refused the swap |
//! | `ORDER_REJECTED` | Venue returned a permanent result code |
//! | `RETRIES_EXHAUSTED` | Retryable failure outlasted its retry budget |
//! | `VENUE_UNAVAILABLE` | Non-retryable transport failure |
//! | `VENUE_TIMEOUT` | Attempt exceeded the order timeout |
//! | `SELL_LEG_FAILED` | Sell leg did not fill, buy leg skipped |
//! | `BUY_LEG_FAILED` | Sell leg filled, buy leg did not |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for the swap engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Invalid swap parameters.
    InvalidRequest,
    /// Circuit breaker is open.
    CircuitOpen,
    /// Order rejected by the venue.
    OrderRejected,
    /// Retry budget exhausted.
    RetriesExhausted,
    /// Venue could not be reached or answered unusably.
    VenueUnavailable,
    /// Venue call timed out.
    VenueTimeout,
    /// Sell leg failed.
    SellLegFailed,
    /// Buy leg failed after the sell leg filled.
    BuyLegFailed,
}

impl ErrorCode {
    /// Get the error reason string.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::CircuitOpen => "CIRCUIT_OPEN",
            Self::OrderRejected => "ORDER_REJECTED",
            Self::RetriesExhausted => "RETRIES_EXHAUSTED",
            Self::VenueUnavailable => "VENUE_UNAVAILABLE",
            Self::VenueTimeout => "VENUE_TIMEOUT",
            Self::SellLegFailed => "SELL_LEG_FAILED",
            Self::BuyLegFailed => "BUY_LEG_FAILED",
        }
    }

    /// Whether the failure happened before any order reached the venue.
    #[must_use]
    pub const fn is_pre_trade(&self) -> bool {
        matches!(self, Self::InvalidRequest | Self::CircuitOpen)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// A structured error with context.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub struct ExecutionError {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    context: BTreeMap<String, String>,
}

impl ExecutionError {
    /// Create a new execution error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: BTreeMap::new(),
        }
    }

    /// Add context to the error.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Get the error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Get the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the context.
    #[must_use]
    pub const fn context(&self) -> &BTreeMap<String, String> {
        &self.context
    }
}

impl std::fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.reason(), self.message)
    }
}

/// Convenience constructors for common errors.
impl ExecutionError {
    /// Invalid swap parameters.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Circuit breaker refused the swap.
    #[must_use]
    pub fn circuit_open() -> Self {
        Self::new(
            ErrorCode::CircuitOpen,
            "circuit breaker is open, venue not contacted",
        )
    }

    /// Venue rejected an order with a permanent code.
    #[must_use]
    pub fn order_rejected(order_id: &str, retcode: u32, comment: &str) -> Self {
        Self::new(
            ErrorCode::OrderRejected,
            format!("venue rejected order (retcode {retcode}): {comment}"),
        )
        .with_context("order_id", order_id)
        .with_context("retcode", retcode)
    }

    /// A leg failed; wraps the leg's own error.
    #[must_use]
    pub fn leg_failed(code: ErrorCode, leg_error: Option<&Self>) -> Self {
        let leg = match code {
            ErrorCode::BuyLegFailed => "buy",
            _ => "sell",
        };
        let mut error = match leg_error {
            Some(inner) => Self::new(code, format!("{leg} leg failed: {}", inner.message)),
            None => Self::new(code, format!("{leg} leg failed")),
        };
        if let Some(inner) = leg_error {
            error = error.with_context("leg_error_code", inner.code);
            for (key, value) in &inner.context {
                error.context.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorCode::CircuitOpen).unwrap();
        assert_eq!(json, "\"CIRCUIT_OPEN\"");
        assert_eq!(ErrorCode::RetriesExhausted.to_string(), "RETRIES_EXHAUSTED");
    }

    #[test]
    fn execution_error_creation() {
        let error = ExecutionError::new(ErrorCode::InvalidRequest, "Bad request")
            .with_context("field", "quantity")
            .with_context("value", 0);

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.message(), "Bad request");
        assert_eq!(error.context().len(), 2);
        assert_eq!(error.context()["value"], "0");
    }

    #[test]
    fn circuit_open_mentions_breaker() {
        let error = ExecutionError::circuit_open();
        assert!(error.message().contains("circuit breaker"));
        assert!(error.code().is_pre_trade());
    }

    #[test]
    fn order_rejected_carries_retcode() {
        let error = ExecutionError::order_rejected("ord-1", 10014, "invalid volume");
        assert_eq!(error.code(), ErrorCode::OrderRejected);
        assert_eq!(error.context()["retcode"], "10014");
        assert!(error.to_string().starts_with("[ORDER_REJECTED]"));
    }

    #[test]
    fn leg_failed_keeps_inner_context() {
        let inner = ExecutionError::order_rejected("ord-9", 10019, "no money");
        let error = ExecutionError::leg_failed(ErrorCode::BuyLegFailed, Some(&inner));

        assert_eq!(error.code(), ErrorCode::BuyLegFailed);
        assert!(error.message().starts_with("buy leg failed"));
        assert_eq!(error.context()["order_id"], "ord-9");
        assert_eq!(error.context()["leg_error_code"], "ORDER_REJECTED");
    }

    #[test]
    fn serde_skips_empty_context() {
        let json = serde_json::to_value(ExecutionError::circuit_open()).unwrap();
        assert_eq!(json["code"], "CIRCUIT_OPEN");
        assert!(json.get("context").is_none());
    }
}
