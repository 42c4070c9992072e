//! Terminal outcome of one order leg.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::execution::ExecutionStatus;
use crate::domain::shared::OrderId;
use crate::error::ExecutionError;

/// Result of driving one order through the venue, retries included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResult {
    /// Engine order ID.
    pub order_id: OrderId,
    /// Terminal status.
    pub status: ExecutionStatus,
    /// Filled quantity, never above the requested quantity.
    pub filled_quantity: Decimal,
    /// Average fill price (zero when nothing filled).
    pub avg_fill_price: Decimal,
    /// Wall time from first attempt to terminal outcome.
    pub execution_time: Duration,
    /// Retries consumed (attempts minus one).
    pub retries_used: u32,
    /// Failure detail for REJECTED/FAILED.
    pub error_details: Option<ExecutionError>,
    /// Venue-assigned order ticket.
    pub venue_order_id: Option<u64>,
    /// Venue-assigned deal ticket.
    pub venue_deal_id: Option<u64>,
    /// When the first attempt started.
    pub submitted_at: DateTime<Utc>,
    /// When the terminal outcome was reached.
    pub completed_at: DateTime<Utc>,
}

impl OrderResult {
    /// Whether anything was filled.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Filled quantity times average price.
    #[must_use]
    pub fn notional(&self) -> Decimal {
        self.filled_quantity * self.avg_fill_price
    }
}
