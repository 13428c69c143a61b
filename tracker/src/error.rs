//! Tracker-specific error types

use shared::{RecordId, SharedError, SkippedRecord};
use thiserror::Error;

use crate::core::validation::ValidationErrors;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Nothing to dispatch: none of the selected records is active")]
    NothingToDispatch { skipped: Vec<SkippedRecord> },

    #[error("Dispatch conflict: {message}")]
    Conflict { message: String },

    #[error("Record not found: {record_id}")]
    RecordNotFound { record_id: RecordId },

    #[error("Persistence operation '{operation}' failed: {message}")]
    Persistence { operation: String, message: String },

    #[error("Authentication rejected by {backend}")]
    Authentication { backend: String },

    #[error("Invalid row {row} in sheet '{sheet}': {message}")]
    RowParse { sheet: String, row: usize, message: String },

    #[error("Configuration error: {field}")]
    Configuration { field: String },

    #[error("Tracker service is not running")]
    ServiceStopped,

    #[error("Shared component error: {0}")]
    Shared(#[from] SharedError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl TrackerError {
    /// Configuration error naming the offending field or variable
    pub fn config(field: impl Into<String>) -> Self {
        Self::Configuration { field: field.into() }
    }

    pub fn persistence(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Persistence {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict { message: message.into() }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Storage-side failures: the request was fine but the backend was not
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Self::Persistence { .. }
                | Self::Authentication { .. }
                | Self::RowParse { .. }
                | Self::Io(_)
                | Self::Csv(_)
                | Self::Http(_)
        )
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::NothingToDispatch { .. } | Self::Conflict { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound { .. })
    }

    /// Short machine-readable name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NothingToDispatch { .. } => "nothing_to_dispatch",
            Self::Conflict { .. } => "conflict",
            Self::RecordNotFound { .. } => "not_found",
            Self::Persistence { .. } | Self::Io(_) | Self::Csv(_) | Self::Http(_) => "persistence",
            Self::Authentication { .. } => "authentication",
            Self::RowParse { .. } => "row_parse",
            Self::Configuration { .. } => "configuration",
            Self::ServiceStopped => "service_stopped",
            Self::Shared(_) => "invalid_input",
            Self::Json(_) => "serialization",
        }
    }
}

impl From<ValidationErrors> for TrackerError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;
