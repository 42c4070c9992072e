//! Terminal status shared by legs and swaps.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal status of an order leg or a whole swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    /// Fully filled.
    Filled,
    /// Filled below the requested quantity.
    PartialFill,
    /// Permanently refused by the venue.
    Rejected,
    /// Failed for any other reason.
    Failed,
}

impl ExecutionStatus {
    /// FILLED or PARTIAL_FILL.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Filled | Self::PartialFill)
    }

    /// REJECTED or FAILED.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Lowercase label used for metric labels.
    #[must_use]
    pub const fn as_label(&self) -> &'static str {
        match self {
            Self::Filled => "filled",
            Self::PartialFill => "partial_fill",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }

    /// Combine the two leg outcomes into the swap outcome.
    ///
    /// FILLED only when both legs filled; any failed or rejected leg fails
    /// the swap; a missing buy leg counts as failed.
    #[must_use]
    pub const fn aggregate(sell: Self, buy: Option<Self>) -> Self {
        match (sell, buy) {
            (Self::Filled, Some(Self::Filled)) => Self::Filled,
            (Self::Rejected | Self::Failed, _)
            | (_, Some(Self::Rejected | Self::Failed) | None) => Self::Failed,
            _ => Self::PartialFill,
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filled => write!(f, "FILLED"),
            Self::PartialFill => write!(f, "PARTIAL_FILL"),
            Self::Rejected => write!(f, "REJECTED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(ExecutionStatus::Filled, Some(ExecutionStatus::Filled), ExecutionStatus::Filled ; "both filled")]
    #[test_case(ExecutionStatus::Filled, Some(ExecutionStatus::PartialFill), ExecutionStatus::PartialFill ; "buy partial")]
    #[test_case(ExecutionStatus::PartialFill, Some(ExecutionStatus::Filled), ExecutionStatus::PartialFill ; "sell partial")]
    #[test_case(ExecutionStatus::Filled, Some(ExecutionStatus::Rejected), ExecutionStatus::Failed ; "buy rejected")]
    #[test_case(ExecutionStatus::Filled, Some(ExecutionStatus::Failed), ExecutionStatus::Failed ; "buy failed")]
    #[test_case(ExecutionStatus::Failed, None, ExecutionStatus::Failed ; "sell failed")]
    #[test_case(ExecutionStatus::Rejected, None, ExecutionStatus::Failed ; "sell rejected")]
    fn aggregate_legs(sell: ExecutionStatus, buy: Option<ExecutionStatus>, expected: ExecutionStatus) {
        assert_eq!(ExecutionStatus::aggregate(sell, buy), expected);
    }

    #[test]
    fn serde_and_display_agree() {
        let json = serde_json::to_string(&ExecutionStatus::PartialFill).unwrap();
        assert_eq!(json, "\"PARTIAL_FILL\"");
        assert_eq!(ExecutionStatus::PartialFill.to_string(), "PARTIAL_FILL");
    }
}
