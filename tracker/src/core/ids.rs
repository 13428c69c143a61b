//! Sequential identifier assignment
//!
//! Records and dispatch batches are numbered independently as `max + 1`, so ids
//! stay unique even when rows were deleted by hand from a sheet.

use shared::{DispatchBatch, DispatchId, Record, RecordId};

use crate::error::{TrackerError, TrackerResult};

/// `max(ids) + 1`, or 1 for an empty sequence; `None` once `u64::MAX` is taken
pub fn next_id<I>(ids: I) -> Option<u64>
where
    I: IntoIterator<Item = u64>,
{
    ids.into_iter().max().unwrap_or(0).checked_add(1)
}

pub fn next_record_id(records: &[Record]) -> TrackerResult<RecordId> {
    next_id(records.iter().map(|record| record.id.value()))
        .map(RecordId)
        .ok_or_else(|| TrackerError::conflict("record identifiers are exhausted"))
}

pub fn next_dispatch_id(batches: &[DispatchBatch]) -> TrackerResult<DispatchId> {
    next_id(batches.iter().map(|batch| batch.dispatch_id.value()))
        .map(DispatchId)
        .ok_or_else(|| TrackerError::conflict("dispatch identifiers are exhausted"))
}
