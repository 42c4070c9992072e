//! Exactly-once registry of swap results keyed by decision ID.
//!
//! Each decision gets one [`OnceCell`]. The first caller runs the swap inside
//! `get_or_init`; concurrent callers with the same decision ID wait on the
//! same cell and receive the same result.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::OnceCell;

use crate::domain::execution::ExecutionResult;
use crate::domain::shared::DecisionId;

/// Slot holding the single result for one decision.
pub type ExecutionSlot = Arc<OnceCell<ExecutionResult>>;

/// In-process idempotency registry.
///
/// Entries live for the lifetime of the process.
#[derive(Debug, Default)]
pub struct IdempotencyRegistry {
    slots: RwLock<HashMap<DecisionId, ExecutionSlot>>,
}

impl IdempotencyRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the slot for a decision, inserting an empty one atomically.
    pub fn slot(&self, decision_id: &DecisionId) -> ExecutionSlot {
        let existing = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(decision_id)
            .cloned();
        if let Some(slot) = existing {
            return slot;
        }

        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(decision_id.clone()).or_default())
    }

    /// Completed result for a decision, if any.
    #[must_use]
    pub fn get(&self, decision_id: &DecisionId) -> Option<ExecutionResult> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(decision_id)
            .and_then(|slot| slot.get().cloned())
    }

    /// Number of completed results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    /// Whether no result has completed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
