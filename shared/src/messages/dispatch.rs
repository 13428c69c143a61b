//! Dispatch requests and their outcomes

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{timestamp, DispatchBatch, MaterialType, RecordId};

/// One selected group: a material type and the record ids chosen from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSelection {
    pub material_type: MaterialType,
    pub record_ids: Vec<RecordId>,
}

/// Request to dispatch a set of selected groups as one batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub selection: Vec<GroupSelection>,
    pub authorized_by: String,
    #[serde(with = "timestamp::lenient")]
    pub dispatched_at: NaiveDateTime,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Why a selected record was left out of a dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NotFound,
    AlreadyDispatched,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotFound => write!(f, "not found"),
            SkipReason::AlreadyDispatched => write!(f, "already dispatched"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub record_id: RecordId,
    pub reason: SkipReason,
}

/// Result of a successful dispatch
///
/// `skipped` is non-empty on partial success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub batch: DispatchBatch,
    pub skipped: Vec<SkippedRecord>,
}

impl DispatchOutcome {
    pub fn is_partial(&self) -> bool {
        !self.skipped.is_empty()
    }
}
