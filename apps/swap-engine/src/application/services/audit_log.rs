//! Append-only, in-process audit log.

use std::path::Path;
use std::sync::{PoisonError, RwLock};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::execution::{AuditEvent, AuditEventType};

/// Errors from exporting the audit log.
#[derive(Debug, Error)]
pub enum AuditExportError {
    /// Export file could not be written.
    #[error("failed to write audit export: {0}")]
    Io(#[from] std::io::Error),

    /// Export document could not be serialized.
    #[error("failed to serialize audit export: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Turn a `json!` object literal into event details.
///
/// Non-object values are stored under a single `value` key.
pub(crate) fn details(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

/// Ordered log of [`AuditEvent`]s.
///
/// Every recorded event is also emitted as a structured `tracing` event on
/// the `swap_engine::audit` target.
#[derive(Debug, Default)]
pub struct AuditLog {
    events: RwLock<Vec<AuditEvent>>,
}

impl AuditLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event stamped now and return a copy of it.
    pub fn record(&self, event_type: AuditEventType, details: Map<String, Value>) -> AuditEvent {
        let event = AuditEvent::now(event_type, details);
        let rendered = Value::Object(event.details.clone());

        tracing::info!(
            target: "swap_engine::audit",
            event_type = %event.event_type,
            execution_id = event.execution_id().unwrap_or_default(),
            details = %rendered,
            "Audit event"
        );

        self.events
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
        event
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every event, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<AuditEvent> {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Events whose `execution_id` detail matches, oldest first.
    #[must_use]
    pub fn for_execution(&self, execution_id: &str) -> Vec<AuditEvent> {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|event| event.execution_id() == Some(execution_id))
            .cloned()
            .collect()
    }

    /// The most recent `limit` events, oldest first.
    #[must_use]
    pub fn tail(&self, limit: usize) -> Vec<AuditEvent> {
        let events = self.events.read().unwrap_or_else(PoisonError::into_inner);
        let start = events.len().saturating_sub(limit);
        events[start..].to_vec()
    }

    /// Write a JSON document to `path`, replacing any existing file.
    pub(crate) fn write_json(path: &Path, document: &Value) -> Result<(), AuditExportError> {
        let body = serde_json::to_vec_pretty(document)?;
        std::fs::write(path, body)?;
        Ok(())
    }
}
