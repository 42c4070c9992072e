//! Aggregate outcome of one swap.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AuditEvent, ExecutionStatus};
use crate::domain::order::OrderResult;
use crate::domain::shared::{DecisionId, ExecutionId};
use crate::error::{ErrorCode, ExecutionError};

/// Outcome of `execute_swap`, stored verbatim in the idempotency cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Idempotency key.
    pub decision_id: DecisionId,
    /// Unique ID of the execution that produced this result.
    pub execution_id: ExecutionId,
    /// Aggregate status.
    pub status: ExecutionStatus,
    /// Sell leg, absent when no order was sent.
    pub sell_order: Option<OrderResult>,
    /// Buy leg, absent when the sell leg failed or no order was sent.
    pub buy_order: Option<OrderResult>,
    /// Sum of filled notional across both legs.
    pub total_filled_value: Decimal,
    /// Sell notional minus buy notional.
    pub net_proceeds: Decimal,
    /// Retries consumed across both legs.
    pub retry_count: u32,
    /// Wall time of the whole swap.
    pub execution_duration: Duration,
    /// Audit events recorded for this execution, in order.
    pub audit_trail: Vec<AuditEvent>,
    /// Failure detail when the swap did not fully fill.
    pub error_details: Option<ExecutionError>,
    /// When the result was produced.
    pub completed_at: DateTime<Utc>,
}

impl ExecutionResult {
    /// A FAILED result for a swap that never reached the venue.
    #[must_use]
    pub fn not_executed(
        decision_id: DecisionId,
        execution_id: ExecutionId,
        error: ExecutionError,
        execution_duration: Duration,
        audit_trail: Vec<AuditEvent>,
    ) -> Self {
        Self {
            decision_id,
            execution_id,
            status: ExecutionStatus::Failed,
            sell_order: None,
            buy_order: None,
            total_filled_value: Decimal::ZERO,
            net_proceeds: Decimal::ZERO,
            retry_count: 0,
            execution_duration,
            audit_trail,
            error_details: Some(error),
            completed_at: Utc::now(),
        }
    }

    /// Build the aggregate result from the leg outcomes.
    #[must_use]
    pub fn from_legs(
        decision_id: DecisionId,
        execution_id: ExecutionId,
        sell_order: OrderResult,
        buy_order: Option<OrderResult>,
        execution_duration: Duration,
    ) -> Self {
        let status = ExecutionStatus::aggregate(
            sell_order.status,
            buy_order.as_ref().map(|order| order.status),
        );
        let sell_value = sell_order.notional();
        let buy_value = buy_order.as_ref().map_or(Decimal::ZERO, OrderResult::notional);
        let retry_count =
            sell_order.retries_used + buy_order.as_ref().map_or(0, |order| order.retries_used);

        let error_details = if sell_order.status.is_failure() {
            Some(ExecutionError::leg_failed(
                ErrorCode::SellLegFailed,
                sell_order.error_details.as_ref(),
            ))
        } else {
            match &buy_order {
                Some(buy) if buy.status.is_failure() => Some(ExecutionError::leg_failed(
                    ErrorCode::BuyLegFailed,
                    buy.error_details.as_ref(),
                )),
                _ => None,
            }
        };

        Self {
            decision_id,
            execution_id,
            status,
            sell_order: Some(sell_order),
            buy_order,
            total_filled_value: sell_value + buy_value,
            net_proceeds: sell_value - buy_value,
            retry_count,
            execution_duration,
            audit_trail: Vec::new(),
            error_details,
            completed_at: Utc::now(),
        }
    }

    /// Whether the swap fully filled.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.status == ExecutionStatus::Filled
    }
}
