//! Record store: the owned collection of records and the dispatch ledger
//!
//! Nothing outside the store mutates records. A record only changes state
//! through `apply_dispatch`, and only from Active to Dispatched.

use chrono::NaiveDateTime;
use shared::{
    DispatchBatch, DispatchId, DispatchOutcome, DispatchRequest, NewRecord, Record, RecordId, RecordQuery, RecordState,
    Stats, TypeSummary,
};

use crate::core::dispatch::{self, DispatchPlan};
use crate::core::grouping::{group_active_by_type, GroupedRecords};
use crate::core::{ids, query, report, validation};
use crate::error::{TrackerError, TrackerResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordStore {
    records: Vec<Record>,
    batches: Vec<DispatchBatch>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from loaded records and batches
    pub fn from_parts(records: Vec<Record>, batches: Vec<DispatchBatch>) -> Self {
        Self { records, batches }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// The dispatch ledger, oldest first
    pub fn batches(&self) -> &[DispatchBatch] {
        &self.batches
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn batch(&self, id: DispatchId) -> Option<&DispatchBatch> {
        self.batches.iter().find(|batch| batch.dispatch_id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn next_record_id(&self) -> TrackerResult<RecordId> {
        ids::next_record_id(&self.records)
    }

    pub fn next_dispatch_id(&self) -> TrackerResult<DispatchId> {
        ids::next_dispatch_id(&self.batches)
    }

    /// Validate a registration and assign its id without storing it
    pub fn prepare_record(&self, input: NewRecord, now: NaiveDateTime) -> TrackerResult<Record> {
        let draft = validation::validate_new_record(input, now)?;
        Ok(draft.into_record(self.next_record_id()?))
    }

    /// Store a record produced by `prepare_record`
    pub fn commit_record(&mut self, record: Record) -> TrackerResult<Record> {
        if self.get(record.id).is_some() {
            return Err(TrackerError::conflict(format!("record id {} is already taken", record.id)));
        }
        self.records.push(record.clone());
        Ok(record)
    }

    /// Validate, assign an id and store in one step
    pub fn register(&mut self, input: NewRecord, now: NaiveDateTime) -> TrackerResult<Record> {
        let record = self.prepare_record(input, now)?;
        self.commit_record(record)
    }

    /// Active records grouped by material type
    pub fn active_groups(&self) -> GroupedRecords {
        group_active_by_type(&self.records)
    }

    pub fn active_records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|record| record.is_active())
    }

    pub fn plan_dispatch(&self, request: &DispatchRequest) -> TrackerResult<DispatchPlan> {
        dispatch::plan_dispatch(self, request)
    }

    pub fn apply_dispatch(&mut self, plan: DispatchPlan) -> TrackerResult<DispatchOutcome> {
        dispatch::apply_dispatch(self, plan)
    }

    /// Plan and apply in one step
    pub fn process_dispatch(&mut self, request: &DispatchRequest) -> TrackerResult<DispatchOutcome> {
        let plan = self.plan_dispatch(request)?;
        self.apply_dispatch(plan)
    }

    pub fn query(&self, query: &RecordQuery) -> Vec<Record> {
        query::filter_records(&self.records, query)
    }

    pub fn stats(&self) -> Stats {
        report::compute_stats(&self.records, &self.batches)
    }

    pub fn type_summary(&self) -> TypeSummary {
        report::type_summary(&self.records)
    }

    pub(crate) fn mark_dispatched(&mut self, id: RecordId) {
        if let Some(record) = self.records.iter_mut().find(|record| record.id == id) {
            record.state = RecordState::Dispatched;
        }
    }

    pub(crate) fn push_batch(&mut self, batch: DispatchBatch) {
        self.batches.push(batch);
    }
}
