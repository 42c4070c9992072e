//! Audit log export configuration.

use serde::{Deserialize, Serialize};

/// Audit configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Most recent events written by an export.
    #[serde(default = "default_export_limit")]
    pub export_limit: usize,
    /// Where the binary writes the export on exit.
    #[serde(default = "default_export_path")]
    pub export_path: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            export_limit: default_export_limit(),
            export_path: default_export_path(),
        }
    }
}

const fn default_export_limit() -> usize {
    1000
}

fn default_export_path() -> String {
    "audit_log.json".to_string()
}
