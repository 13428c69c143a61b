//! Input validation for registrations and dispatch requests
//!
//! Validation collects every invalid field instead of stopping at the first one,
//! so front-ends can highlight all of them at once.

use chrono::NaiveDateTime;
use serde::Serialize;
use shared::{normalize_notes, DispatchRequest, MaterialType, NewRecord, Record, RecordId, RecordState};
use std::fmt;

/// A single invalid field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Field-level validation failures
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|error| error.field == field)
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// A validated registration still waiting for its identifier
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    pub material_type: MaterialType,
    pub weight_kg: f64,
    pub registered_at: NaiveDateTime,
    pub registered_by: String,
    pub notes: Option<String>,
}

impl RecordDraft {
    pub fn into_record(self, id: RecordId) -> Record {
        Record {
            id,
            material_type: self.material_type,
            weight_kg: self.weight_kg,
            registered_at: self.registered_at,
            registered_by: self.registered_by,
            state: RecordState::Active,
            notes: self.notes,
        }
    }
}

/// Validate a registration; `now` fills a missing registration time
pub fn validate_new_record(input: NewRecord, now: NaiveDateTime) -> Result<RecordDraft, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let material_type = input.material_type.parse::<MaterialType>();
    if material_type.is_err() {
        errors.push("material_type", "is required");
    }

    if !input.weight_kg.is_finite() || input.weight_kg <= 0.0 {
        errors.push("weight_kg", "must be a number greater than zero");
    }

    let registered_by = input.registered_by.trim().to_string();
    if registered_by.is_empty() {
        errors.push("registered_by", "is required");
    }

    match material_type {
        Ok(material_type) if errors.is_empty() => Ok(RecordDraft {
            material_type,
            weight_kg: input.weight_kg,
            registered_at: input.registered_at.unwrap_or(now),
            registered_by,
            notes: normalize_notes(input.notes),
        }),
        _ => Err(errors),
    }
}

/// Validate the shape of a dispatch request before any record is resolved
pub fn validate_dispatch_request(request: &DispatchRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if request.selection.iter().all(|group| group.record_ids.is_empty()) {
        errors.push("selection", "must contain at least one record");
    }
    if request.authorized_by.trim().is_empty() {
        errors.push("authorized_by", "is required");
    }

    errors.into_result()
}
