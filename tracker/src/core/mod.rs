//! Core tracking logic, free of I/O
//!
//! - `store`: the owned record collection and dispatch ledger
//! - `grouping`: partition of records by material type
//! - `dispatch`: plan/apply of dispatch batches
//! - `ids`: sequential identifier assignment
//! - `ledger`: batches to persisted entries and back
//! - `query`, `report`: listings and summaries
//! - `validation`: field-level input checks

pub mod dispatch;
pub mod grouping;
pub mod ids;
pub mod ledger;
pub mod query;
pub mod report;
pub mod store;
pub mod validation;

pub use dispatch::{apply_dispatch, plan_dispatch, DispatchPlan};
pub use grouping::{group_active_by_type, group_by_type, GroupedRecords};
pub use ids::next_id;
pub use ledger::{entries_for_batch, regroup_entries, WeightMode};
pub use store::RecordStore;
pub use validation::{FieldError, ValidationErrors};
