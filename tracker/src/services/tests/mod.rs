//! Service-specific tests
//!
//! Each adapter has its own test file; shared builders live in `common`.


// Common test utilities for services
#[cfg(test)]
pub mod common {
    use shared::{parse_timestamp, DispatchEntry, DispatchId, MaterialType, Record, RecordId, RecordState};

    pub fn record(id: u64, material_type: MaterialType, weight_kg: f64, person: &str) -> Record {
        Record {
            id: RecordId(id),
            material_type,
            weight_kg,
            registered_at: parse_timestamp("2024-03-01T09:30:00").expect("valid timestamp"),
            registered_by: person.to_string(),
            state: RecordState::Active,
            notes: None,
        }
    }

    pub fn entry(dispatch_id: u64, record: &Record, authorized_by: &str) -> DispatchEntry {
        DispatchEntry {
            dispatch_id: DispatchId(dispatch_id),
            record_id: record.id,
            material_type: record.material_type.clone(),
            weight_kg: record.weight_kg,
            dispatched_at: parse_timestamp("2024-03-05T16:00:00").expect("valid timestamp"),
            authorized_by: authorized_by.to_string(),
            notes: Some("truck 2".to_string()),
        }
    }
}
