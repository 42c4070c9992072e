//! Caller input to `execute_swap`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::DecisionId;
use crate::error::ExecutionError;

/// A request to exchange `quantity` of `sell_symbol` for `buy_symbol`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    /// Idempotency key.
    pub decision_id: DecisionId,
    /// Symbol sold first.
    pub sell_symbol: String,
    /// Symbol bought with the proceeds.
    pub buy_symbol: String,
    /// Shares to sell.
    pub quantity: Decimal,
    /// Maximum slippage; the service default applies when unset.
    pub max_slippage: Option<Decimal>,
}

impl SwapRequest {
    /// Create a swap request using the service's default slippage.
    #[must_use]
    pub fn new(
        decision_id: impl Into<DecisionId>,
        sell_symbol: impl Into<String>,
        buy_symbol: impl Into<String>,
        quantity: Decimal,
    ) -> Self {
        Self {
            decision_id: decision_id.into(),
            sell_symbol: sell_symbol.into(),
            buy_symbol: buy_symbol.into(),
            quantity,
            max_slippage: None,
        }
    }

    /// Override the maximum slippage.
    #[must_use]
    pub const fn with_max_slippage(mut self, max_slippage: Decimal) -> Self {
        self.max_slippage = Some(max_slippage);
        self
    }

    /// Check the request can be sent to a venue at all.
    pub fn validate(&self) -> Result<(), ExecutionError> {
        if self.decision_id.as_str().trim().is_empty() {
            return Err(ExecutionError::invalid_request("decision_id must not be empty"));
        }
        if self.sell_symbol.trim().is_empty() || self.buy_symbol.trim().is_empty() {
            return Err(ExecutionError::invalid_request("symbols must not be empty")
                .with_context("sell_symbol", &self.sell_symbol)
                .with_context("buy_symbol", &self.buy_symbol));
        }
        if self.quantity <= Decimal::ZERO {
            return Err(ExecutionError::invalid_request("quantity must be positive")
                .with_context("quantity", self.quantity));
        }
        if let Some(slippage) = self.max_slippage.filter(|s| *s < Decimal::ZERO) {
            return Err(ExecutionError::invalid_request("max_slippage must not be negative")
                .with_context("max_slippage", slippage));
        }
        Ok(())
    }
}
