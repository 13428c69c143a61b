//! Shared types for the EcoTrak recycling tracker
//!
//! Domain types (records, dispatch batches, material groups), the request and
//! response messages exchanged with the front-ends, and process-aware logging.

pub mod errors;
pub mod logging;
pub mod messages;
pub mod types;

pub use errors::*;
pub use types::*;

pub use messages::{
    ConnectionInfo, DispatchOutcome, DispatchRequest, GroupSelection, RecordQuery, SkipReason, SkippedRecord, SortKey, SortOrder,
    Stats, TypeSummary, TypeSummaryRow, TypeSummaryTotals,
};
