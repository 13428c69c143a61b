//! Test fixtures and data for tracker tests

use chrono::NaiveDateTime;
use shared::{parse_timestamp, GroupSelection, MaterialType, NewRecord, Record, RecordId, RecordState};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    /// People used across scenarios
    pub const OPERATOR: &'static str = "Rosa";
    pub const SECOND_OPERATOR: &'static str = "Pedro";
    pub const SUPERVISOR: &'static str = "Supervisor";

    pub const REGISTERED_AT: &'static str = "2024-03-01T09:30:00";
    pub const DISPATCHED_AT: &'static str = "2024-03-05T16:00:00";

    /// Floating-point tolerance for weight sums
    pub const EPSILON: f64 = 1e-9;

    pub fn registered_at() -> NaiveDateTime {
        parse_timestamp(Self::REGISTERED_AT).unwrap()
    }

    pub fn dispatched_at() -> NaiveDateTime {
        parse_timestamp(Self::DISPATCHED_AT).unwrap()
    }

    /// Registration input with the standard operator
    pub fn new_record(material_type: &str, weight_kg: f64) -> NewRecord {
        NewRecord {
            material_type: material_type.to_string(),
            weight_kg,
            registered_at: Some(Self::registered_at()),
            registered_by: Self::OPERATOR.to_string(),
            notes: None,
        }
    }

    /// A stored record, as an adapter would return it
    pub fn record(id: u64, material_type: MaterialType, weight_kg: f64, state: RecordState) -> Record {
        Record {
            id: RecordId(id),
            material_type,
            weight_kg,
            registered_at: Self::registered_at(),
            registered_by: Self::OPERATOR.to_string(),
            state,
            notes: None,
        }
    }

    /// Plastic 2.5 kg and Glass 3.2 kg, both active
    pub fn scenario_a() -> Vec<NewRecord> {
        vec![Self::new_record("Plastic", 2.5), Self::new_record("Glass", 3.2)]
    }

    /// Two plastic records of 2.5 and 23.0 kg
    pub fn scenario_d() -> Vec<NewRecord> {
        vec![Self::new_record("Plastic", 2.5), Self::new_record("Plastic", 23.0)]
    }

    /// A mixed intake: several types, two operators
    pub fn mixed_intake() -> Vec<NewRecord> {
        let mut records = vec![
            Self::new_record("Plastic", 2.5),
            Self::new_record("Cardboard", 10.0),
            Self::new_record("Glass", 3.2),
            Self::new_record("Plastic", 1.25),
            Self::new_record("Metal", 0.75),
        ];
        records[3].registered_by = Self::SECOND_OPERATOR.to_string();
        records
    }

    pub fn selection(material_type: MaterialType, ids: &[u64]) -> GroupSelection {
        GroupSelection {
            material_type,
            record_ids: ids.iter().copied().map(RecordId).collect(),
        }
    }
}
