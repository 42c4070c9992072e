//! Strongly-typed identifiers for swap executions.
//!
//! These prevent mixing up decision, execution and order IDs.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::order::OrderSide;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// First `n` characters, safe on multi-byte input.
            #[must_use]
            pub fn short(&self, n: usize) -> String {
                self.0.chars().take(n).collect()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(
    DecisionId,
    "Caller-supplied idempotency key for one trading decision."
);
define_id!(
    ExecutionId,
    "Identifier for one concrete attempt to carry out a decision."
);
define_id!(OrderId, "Engine-assigned identifier for one leg of a swap.");

fn hex_suffix(len: usize) -> String {
    uuid::Uuid::new_v4().simple().to_string()[..len].to_string()
}

impl ExecutionId {
    /// Generate a fresh execution ID for a decision.
    ///
    /// Format: `exec_{decision[..8]}_{YYYYmmdd_HHMMSS}_{8 hex}`.
    #[must_use]
    pub fn for_decision(decision_id: &DecisionId) -> Self {
        Self(format!(
            "exec_{}_{}_{}",
            decision_id.short(8),
            Utc::now().format("%Y%m%d_%H%M%S"),
            hex_suffix(8)
        ))
    }
}

impl OrderId {
    /// Generate an order ID for one leg of an execution.
    ///
    /// Format: `order_{execution_id}_{SIDE}_{6 hex}`.
    #[must_use]
    pub fn for_leg(execution_id: &ExecutionId, side: OrderSide) -> Self {
        Self(format!("order_{execution_id}_{side}_{}", hex_suffix(6)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_id_new_and_display() {
        let id = DecisionId::new("decision_001");
        assert_eq!(id.as_str(), "decision_001");
        assert_eq!(format!("{id}"), "decision_001");
    }

    #[test]
    fn execution_id_embeds_decision_prefix() {
        let decision = DecisionId::new("decision_001");
        let id = ExecutionId::for_decision(&decision);

        let format = regex::Regex::new(r"^exec_decision_\d{8}_\d{6}_[0-9a-f]{8}$").unwrap();
        assert!(format.is_match(id.as_str()), "unexpected id {id}");
    }

    #[test]
    fn execution_id_is_unique_per_call() {
        let decision = DecisionId::new("d1");
        let a = ExecutionId::for_decision(&decision);
        let b = ExecutionId::for_decision(&decision);
        assert_ne!(a, b);
    }

    #[test]
    fn order_id_carries_execution_and_side() {
        let execution = ExecutionId::new("exec_d1_20250829_120000_abcdef12");
        let id = OrderId::for_leg(&execution, OrderSide::Sell);

        assert!(id.as_str().starts_with("order_exec_d1_20250829_120000_abcdef12_SELL_"));
        assert_eq!(id.as_str().len(), "order_".len() + execution.as_str().len() + 6 + 6);
    }

    #[test]
    fn short_is_char_boundary_safe() {
        let id = DecisionId::new("décision-ação");
        assert_eq!(id.short(3), "déc");
        assert_eq!(DecisionId::new("ab").short(8), "ab");
    }

    #[test]
    fn from_conversions() {
        let id: DecisionId = "d-1".into();
        assert_eq!(id.as_str(), "d-1");

        let id: OrderId = String::from("o-1").into();
        assert_eq!(id.into_inner(), "o-1");
    }
}
