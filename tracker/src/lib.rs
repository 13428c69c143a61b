//! EcoTrak tracker library
//!
//! Owns recyclable-material intake records and the dispatch ledger. The
//! `Tracker` is the single writer; front-ends (the `ecotrak` CLI and the
//! webserver) talk to it through a `TrackerHandle`. Storage sits behind the
//! `PersistenceAdapter` trait with workbook, Sheets API and memory backends.

pub mod config;
pub mod core;
pub mod error;
pub mod services;
pub mod traits;
pub mod tracker;

// Re-export commonly used types
pub use crate::config::{BackendArgs, BackendConfig, BackendKind, TrackerConfig};
pub use crate::core::{RecordStore, ValidationErrors, WeightMode};
pub use crate::error::{TrackerError, TrackerResult};
pub use crate::tracker::{LoadSummary, Tracker, TrackerHandle};
pub use crate::traits::PersistenceAdapter;
