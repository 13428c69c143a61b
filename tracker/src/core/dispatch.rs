//! Dispatch processor
//!
//! A dispatch is planned against a read-only store, then applied. Applying
//! re-checks that every planned record is still active, so a plan computed
//! before an await point cannot double-dispatch a record.

use shared::{
    normalize_notes, DispatchBatch, DispatchOutcome, DispatchRequest, Record, RecordId, SkipReason, SkippedRecord,
};
use std::collections::HashSet;

use crate::core::grouping::group_by_type;
use crate::core::store::RecordStore;
use crate::core::validation::validate_dispatch_request;
use crate::error::{TrackerError, TrackerResult};

/// A validated dispatch that has not been applied yet
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchPlan {
    pub batch: DispatchBatch,
    pub skipped: Vec<SkippedRecord>,
}

impl DispatchPlan {
    pub fn record_ids(&self) -> Vec<RecordId> {
        self.batch.record_ids().collect()
    }
}

/// Resolve a request into a plan without touching the store
///
/// Ids are taken in selection order and repeated ids are folded. Unknown or
/// already dispatched ids are reported in `skipped`. The declared material type
/// of each selected group is advisory; groups are rebuilt from the records.
pub fn plan_dispatch(store: &RecordStore, request: &DispatchRequest) -> TrackerResult<DispatchPlan> {
    validate_dispatch_request(request)?;

    let mut seen: HashSet<RecordId> = HashSet::new();
    let mut touched: Vec<&Record> = Vec::new();
    let mut skipped: Vec<SkippedRecord> = Vec::new();

    for record_id in request.selection.iter().flat_map(|group| group.record_ids.iter().copied()) {
        if !seen.insert(record_id) {
            continue;
        }
        match store.get(record_id) {
            None => skipped.push(SkippedRecord {
                record_id,
                reason: SkipReason::NotFound,
            }),
            Some(record) if !record.is_active() => skipped.push(SkippedRecord {
                record_id,
                reason: SkipReason::AlreadyDispatched,
            }),
            Some(record) => touched.push(record),
        }
    }

    if touched.is_empty() {
        return Err(TrackerError::NothingToDispatch { skipped });
    }

    let batch = DispatchBatch {
        dispatch_id: store.next_dispatch_id()?,
        dispatched_at: request.dispatched_at,
        authorized_by: request.authorized_by.trim().to_string(),
        record_count: touched.len(),
        groups: group_by_type(touched).into_groups(),
        notes: normalize_notes(request.notes.clone()),
    };

    Ok(DispatchPlan { batch, skipped })
}

/// Apply a plan: flip every planned record to Dispatched and append the batch
///
/// Nothing changes when any planned record is no longer active or the batch id
/// has been taken in the meantime.
pub fn apply_dispatch(store: &mut RecordStore, plan: DispatchPlan) -> TrackerResult<DispatchOutcome> {
    if plan.batch.dispatch_id != store.next_dispatch_id()? {
        return Err(TrackerError::conflict(format!(
            "dispatch id {} is no longer the next id",
            plan.batch.dispatch_id
        )));
    }

    let record_ids = plan.record_ids();
    for record_id in &record_ids {
        match store.get(*record_id) {
            Some(record) if record.is_active() => {}
            Some(_) => {
                return Err(TrackerError::conflict(format!("record {record_id} was dispatched concurrently")));
            }
            None => return Err(TrackerError::RecordNotFound { record_id: *record_id }),
        }
    }

    for record_id in &record_ids {
        store.mark_dispatched(*record_id);
    }
    store.push_batch(plan.batch.clone());

    Ok(DispatchOutcome {
        batch: plan.batch,
        skipped: plan.skipped,
    })
}
