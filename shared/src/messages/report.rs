//! Dashboard statistics and per-type report rows

use serde::{Deserialize, Serialize};

use crate::types::MaterialType;

/// Dashboard counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_records: usize,
    pub active_records: usize,
    pub dispatched_records: usize,
    pub total_weight_kg: f64,
    pub average_weight_kg: f64,
    pub dispatch_count: usize,
    /// Dispatched records over all records, in percent
    pub dispatch_rate_pct: f64,
}

/// One row of the per-type summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSummaryRow {
    pub material_type: MaterialType,
    pub total_records: usize,
    pub total_weight_kg: f64,
    pub active_records: usize,
    pub dispatched_records: usize,
    /// Share of the overall weight, in percent rounded to one decimal
    pub weight_share_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeSummaryTotals {
    pub total_records: usize,
    pub total_weight_kg: f64,
    pub active_records: usize,
    pub dispatched_records: usize,
}

/// Per-type summary with a totals row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeSummary {
    pub rows: Vec<TypeSummaryRow>,
    pub totals: TypeSummaryTotals,
}
