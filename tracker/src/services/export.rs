//! Report export: per-type summary and full record listing as CSV files

use chrono::NaiveDateTime;
use shared::{format_timestamp, Record, TypeSummary};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::TrackerResult;
use crate::services::rows::{record_to_row, RECORD_HEADERS};
use crate::services::workbook::encode_rows;

pub const SUMMARY_FILE: &str = "summary_by_type.csv";
pub const RECORDS_FILE: &str = "records.csv";

const SUMMARY_HEADERS: [&str; 6] = [
    "Tipo de Material",
    "Total Registros",
    "Peso Total (kg)",
    "Registros Activos",
    "Registros Despachados",
    "Porcentaje del Total",
];

fn summary_rows(summary: &TypeSummary) -> Vec<Vec<String>> {
    let mut rows = vec![SUMMARY_HEADERS.iter().map(|value| value.to_string()).collect::<Vec<_>>()];

    for row in &summary.rows {
        rows.push(vec![
            row.material_type.to_string(),
            row.total_records.to_string(),
            format!("{:.1}", row.total_weight_kg),
            row.active_records.to_string(),
            row.dispatched_records.to_string(),
            format!("{:.1}%", row.weight_share_pct),
        ]);
    }

    let totals = &summary.totals;
    rows.push(vec![
        "TOTAL".to_string(),
        totals.total_records.to_string(),
        format!("{:.1}", totals.total_weight_kg),
        totals.active_records.to_string(),
        totals.dispatched_records.to_string(),
        "100%".to_string(),
    ]);
    rows
}

/// Write a timestamped report directory under `out_dir` and return its path
pub async fn export_report(
    out_dir: &Path,
    summary: &TypeSummary,
    records: &[Record],
    generated_at: NaiveDateTime,
) -> TrackerResult<PathBuf> {
    let stamp = format_timestamp(&generated_at).replace(':', "-");
    let target = out_dir.join(format!("ecotrak_report_{stamp}"));
    fs::create_dir_all(&target).await?;

    fs::write(target.join(SUMMARY_FILE), encode_rows(&summary_rows(summary))?).await?;

    let mut record_rows = vec![RECORD_HEADERS.iter().map(|value| value.to_string()).collect::<Vec<_>>()];
    record_rows.extend(records.iter().map(record_to_row));
    fs::write(target.join(RECORDS_FILE), encode_rows(&record_rows)?).await?;

    Ok(target)
}
