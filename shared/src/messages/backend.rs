//! Storage backend diagnostics

use serde::{Deserialize, Serialize};

/// Result of a storage connection check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Backend kind: `workbook`, `sheets` or `memory`
    pub backend: String,
    /// Directory, spreadsheet id or other location of the data
    pub target: String,
    /// Document title when the backend reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}
