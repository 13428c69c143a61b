//! Request and response types shared by the tracker core and its front-ends
//!
//! - `backend`: storage connection diagnostics
//! - `dispatch`: dispatch requests, outcomes and skip reasons
//! - `query`: record listing filters
//! - `report`: dashboard statistics and the per-type summary

pub mod backend;
pub mod dispatch;
pub mod query;
pub mod report;

pub use backend::ConnectionInfo;
pub use dispatch::{DispatchOutcome, DispatchRequest, GroupSelection, SkipReason, SkippedRecord};
pub use query::{RecordQuery, SortKey, SortOrder};
pub use report::{Stats, TypeSummary, TypeSummaryRow, TypeSummaryTotals};
