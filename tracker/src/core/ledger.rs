//! Conversion between dispatch batches and their persisted rows
//!
//! Storage keeps one denormalized entry per (batch, record) pair. Batches are
//! rebuilt from those entries on load.

use serde::{Deserialize, Serialize};
use shared::{DispatchBatch, DispatchEntry, DispatchId, MaterialGroup, Record, RecordId};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

/// Weight written to each persisted dispatch entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightMode {
    /// Each record's own weight
    #[default]
    Exact,
    /// Group total divided by group count, rounded to 2 decimals (legacy sheet layout)
    GroupAverage,
}

impl FromStr for WeightMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(WeightMode::Exact),
            "average" | "group_average" => Ok(WeightMode::GroupAverage),
            other => Err(format!("Unknown weight mode: {other}")),
        }
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Denormalize a batch into one entry per record, in group order
pub fn entries_for_batch(batch: &DispatchBatch, records: &[Record], mode: WeightMode) -> Vec<DispatchEntry> {
    let weights: HashMap<RecordId, f64> = records.iter().map(|record| (record.id, record.weight_kg)).collect();
    let weights = &weights;

    batch
        .groups
        .iter()
        .flat_map(|group| {
            let average = if group.count > 0 {
                round_to(group.total_weight_kg / group.count as f64, 2)
            } else {
                0.0
            };

            group.record_ids.iter().map(move |record_id| {
                let weight_kg = match mode {
                    WeightMode::Exact => weights.get(record_id).copied().unwrap_or(average),
                    WeightMode::GroupAverage => average,
                };
                DispatchEntry {
                    dispatch_id: batch.dispatch_id,
                    record_id: *record_id,
                    material_type: group.material_type.clone(),
                    weight_kg,
                    dispatched_at: batch.dispatched_at,
                    authorized_by: batch.authorized_by.clone(),
                    notes: batch.notes.clone(),
                }
            })
        })
        .collect::<Vec<_>>()
}

/// Rebuild batches from persisted entries
///
/// Batches come out in order of first appearance of their id; groups inside a
/// batch in order of first appearance of their material type. A group's weight
/// uses the record's own weight when the record is known and the entry weight
/// otherwise; people come from the known records. Repeated (batch, record)
/// rows are folded.
pub fn regroup_entries(entries: &[DispatchEntry], records: &[Record]) -> Vec<DispatchBatch> {
    let by_id: HashMap<RecordId, &Record> = records.iter().map(|record| (record.id, record)).collect();
    let mut seen: HashSet<(DispatchId, RecordId)> = HashSet::new();
    let mut batches: Vec<DispatchBatch> = Vec::new();

    for entry in entries {
        if !seen.insert((entry.dispatch_id, entry.record_id)) {
            continue;
        }

        let position = match batches.iter().position(|batch| batch.dispatch_id == entry.dispatch_id) {
            Some(position) => position,
            None => {
                batches.push(DispatchBatch {
                    dispatch_id: entry.dispatch_id,
                    dispatched_at: entry.dispatched_at,
                    authorized_by: entry.authorized_by.clone(),
                    record_count: 0,
                    groups: Vec::new(),
                    notes: entry.notes.clone(),
                });
                batches.len() - 1
            }
        };
        let batch = &mut batches[position];

        let group_position = match batch
            .groups
            .iter()
            .position(|group| group.material_type == entry.material_type)
        {
            Some(position) => position,
            None => {
                batch.groups.push(MaterialGroup::new(entry.material_type.clone()));
                batch.groups.len() - 1
            }
        };
        let group = &mut batch.groups[group_position];

        let known = by_id.get(&entry.record_id);
        group.count += 1;
        group.total_weight_kg += known.map(|record| record.weight_kg).unwrap_or(entry.weight_kg);
        group.record_ids.push(entry.record_id);
        if let Some(record) = known {
            if !group.people.iter().any(|person| person == &record.registered_by) {
                group.people.push(record.registered_by.clone());
            }
        }
        batch.record_count += 1;
    }

    batches
}
