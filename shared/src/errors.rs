//! Shared error types for the EcoTrak workspace

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SharedError {
    #[error("Invalid material type: '{input}'")]
    InvalidMaterialType { input: String },

    #[error("Invalid record state: '{input}'")]
    InvalidRecordState { input: String },

    #[error("Invalid timestamp: '{input}'")]
    InvalidTimestamp { input: String },

    #[error("Invalid identifier: '{input}'")]
    InvalidId { input: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
