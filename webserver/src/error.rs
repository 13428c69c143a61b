//! WebServer-specific error types
//!
//! Tracker errors are wrapped and rendered as JSON:
//! `{"status": "error", "kind": ..., "message": ..., "details": ...}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Value};
use thiserror::Error;
use tracker::TrackerError;

#[derive(Error, Debug)]
pub enum WebServerError {
    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error("Invalid request: {details}")]
    InvalidRequest { details: String },

    #[error("Server startup error: {0}")]
    ServerStartup(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl WebServerError {
    pub fn invalid_request(details: impl Into<String>) -> Self {
        Self::InvalidRequest { details: details.into() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Tracker(err) => match err {
                TrackerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                TrackerError::NothingToDispatch { .. } | TrackerError::Conflict { .. } => StatusCode::CONFLICT,
                TrackerError::RecordNotFound { .. } => StatusCode::NOT_FOUND,
                err if err.is_persistence() => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::ServerStartup(_) | Self::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Tracker(err) => err.kind(),
            Self::InvalidRequest { .. } => "invalid_request",
            Self::ServerStartup(_) | Self::IoError(_) => "internal",
        }
    }

    /// Structured detail for the client: invalid fields or skipped records
    fn details(&self) -> Value {
        match self {
            Self::Tracker(TrackerError::Validation(errors)) => json!(errors),
            Self::Tracker(TrackerError::NothingToDispatch { skipped }) => json!({ "skipped": skipped }),
            Self::Tracker(TrackerError::RecordNotFound { record_id }) => json!({ "record_id": record_id }),
            _ => Value::Null,
        }
    }
}

impl IntoResponse for WebServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "status": "error",
            "kind": self.kind(),
            "message": self.to_string(),
            "details": self.details(),
        });
        (status, Json(body)).into_response()
    }
}

pub type WebServerResult<T> = Result<T, WebServerError>;
