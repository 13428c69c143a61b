//! Dashboard statistics and the per-type summary

use shared::{DispatchBatch, MaterialType, Record, Stats, TypeSummary, TypeSummaryRow, TypeSummaryTotals};

use crate::core::ledger::round_to;

pub fn compute_stats(records: &[Record], batches: &[DispatchBatch]) -> Stats {
    let total_records = records.len();
    let active_records = records.iter().filter(|record| record.is_active()).count();
    let dispatched_records = total_records - active_records;
    let total_weight_kg: f64 = records.iter().map(|record| record.weight_kg).sum();

    let (average_weight_kg, dispatch_rate_pct) = if total_records > 0 {
        (
            total_weight_kg / total_records as f64,
            round_to(dispatched_records as f64 / total_records as f64 * 100.0, 1),
        )
    } else {
        (0.0, 0.0)
    };

    Stats {
        total_records,
        active_records,
        dispatched_records,
        total_weight_kg,
        average_weight_kg,
        dispatch_count: batches.len(),
        dispatch_rate_pct,
    }
}

/// Per material type totals in order of first appearance, plus a totals row
pub fn type_summary(records: &[Record]) -> TypeSummary {
    let mut rows: Vec<TypeSummaryRow> = Vec::new();
    let mut totals = TypeSummaryTotals::default();

    for record in records {
        let position = match rows.iter().position(|row| row.material_type == record.material_type) {
            Some(position) => position,
            None => {
                rows.push(empty_row(record.material_type.clone()));
                rows.len() - 1
            }
        };
        let row = &mut rows[position];

        row.total_records += 1;
        row.total_weight_kg += record.weight_kg;
        totals.total_records += 1;
        totals.total_weight_kg += record.weight_kg;
        if record.is_active() {
            row.active_records += 1;
            totals.active_records += 1;
        } else {
            row.dispatched_records += 1;
            totals.dispatched_records += 1;
        }
    }

    for row in &mut rows {
        row.weight_share_pct = if totals.total_weight_kg > 0.0 {
            round_to(row.total_weight_kg / totals.total_weight_kg * 100.0, 1)
        } else {
            0.0
        };
    }

    TypeSummary { rows, totals }
}

fn empty_row(material_type: MaterialType) -> TypeSummaryRow {
    TypeSummaryRow {
        material_type,
        total_records: 0,
        total_weight_kg: 0.0,
        active_records: 0,
        dispatched_records: 0,
        weight_share_pct: 0.0,
    }
}
