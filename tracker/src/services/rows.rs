//! Sheet row layout shared by the workbook and sheets API adapters
//!
//! Both backends store the legacy two-sheet layout, seven columns each, with a
//! header row. Parsing is lenient about missing trailing cells.

use shared::{
    format_timestamp, parse_timestamp, DispatchEntry, DispatchId, MaterialType, Record, RecordId, RecordState,
};

use crate::error::{TrackerError, TrackerResult};

pub const DEFAULT_RECORDS_SHEET: &str = "Registros_Reciclaje";
pub const DEFAULT_DISPATCH_SHEET: &str = "Salidas_Despachos";

pub const RECORD_HEADERS: [&str; 7] = ["ID", "Tipo", "Peso", "Fecha_Registro", "Persona", "Estado", "Observaciones"];

pub const DISPATCH_HEADERS: [&str; 7] = [
    "ID_Salida",
    "ID_Registro",
    "Tipo",
    "Peso",
    "Fecha_Despacho",
    "Persona_Autoriza",
    "Observaciones",
];

/// Column letter of the record state, used for single-cell updates
pub const STATE_COLUMN: &str = "F";
pub const STATE_INDEX: usize = 5;

/// Sheet row number (1-based, header on row 1) of the data row at `index`
pub fn sheet_row_number(index: usize) -> usize {
    index + 2
}

pub fn is_blank(cells: &[String]) -> bool {
    cells.iter().all(|cell| cell.trim().is_empty())
}

fn cell(cells: &[String], index: usize) -> &str {
    cells.get(index).map(|value| value.trim()).unwrap_or("")
}

fn row_error(sheet: &str, row: usize, message: impl Into<String>) -> TrackerError {
    TrackerError::RowParse {
        sheet: sheet.to_string(),
        row,
        message: message.into(),
    }
}

fn parse_weight(sheet: &str, row: usize, text: &str) -> TrackerResult<f64> {
    match text.replace(',', ".").parse::<f64>() {
        Ok(weight) if weight.is_finite() => Ok(weight),
        _ => Err(row_error(sheet, row, format!("invalid weight '{text}'"))),
    }
}

fn optional(text: &str) -> Option<String> {
    if text.is_empty() { None } else { Some(text.to_string()) }
}

pub fn record_to_row(record: &Record) -> Vec<String> {
    vec![
        record.id.to_string(),
        record.material_type.to_string(),
        record.weight_kg.to_string(),
        format_timestamp(&record.registered_at),
        record.registered_by.clone(),
        record.state.to_string(),
        record.notes.clone().unwrap_or_default(),
    ]
}

/// Parse one data row of the records sheet; `row` is the sheet row number
pub fn record_from_row(sheet: &str, row: usize, cells: &[String]) -> TrackerResult<Record> {
    let id = cell(cells, 0)
        .parse::<RecordId>()
        .map_err(|_| row_error(sheet, row, format!("invalid record id '{}'", cell(cells, 0))))?;

    let material_type = match cell(cells, 1) {
        "" => MaterialType::Other,
        text => text.parse::<MaterialType>()?,
    };

    let weight_kg = parse_weight(sheet, row, cell(cells, 2))?;

    let registered_at = parse_timestamp(cell(cells, 3))
        .map_err(|_| row_error(sheet, row, format!("invalid registration date '{}'", cell(cells, 3))))?;

    let state = match cell(cells, STATE_INDEX) {
        "" => RecordState::Active,
        text => text
            .parse::<RecordState>()
            .map_err(|_| row_error(sheet, row, format!("invalid state '{text}'")))?,
    };

    Ok(Record {
        id,
        material_type,
        weight_kg,
        registered_at,
        registered_by: cell(cells, 4).to_string(),
        state,
        notes: optional(cell(cells, 6)),
    })
}

pub fn entry_to_row(entry: &DispatchEntry) -> Vec<String> {
    vec![
        entry.dispatch_id.to_string(),
        entry.record_id.to_string(),
        entry.material_type.to_string(),
        entry.weight_kg.to_string(),
        format_timestamp(&entry.dispatched_at),
        entry.authorized_by.clone(),
        entry.notes.clone().unwrap_or_default(),
    ]
}

/// Parse one data row of the dispatch sheet; `row` is the sheet row number
pub fn entry_from_row(sheet: &str, row: usize, cells: &[String]) -> TrackerResult<DispatchEntry> {
    let dispatch_id = cell(cells, 0)
        .parse::<DispatchId>()
        .map_err(|_| row_error(sheet, row, format!("invalid dispatch id '{}'", cell(cells, 0))))?;
    let record_id = cell(cells, 1)
        .parse::<RecordId>()
        .map_err(|_| row_error(sheet, row, format!("invalid record id '{}'", cell(cells, 1))))?;

    let material_type = match cell(cells, 2) {
        "" => MaterialType::Other,
        text => text.parse::<MaterialType>()?,
    };

    let weight_kg = match cell(cells, 3) {
        "" => 0.0,
        text => parse_weight(sheet, row, text)?,
    };

    let dispatched_at = parse_timestamp(cell(cells, 4))
        .map_err(|_| row_error(sheet, row, format!("invalid dispatch date '{}'", cell(cells, 4))))?;

    Ok(DispatchEntry {
        dispatch_id,
        record_id,
        material_type,
        weight_kg,
        dispatched_at,
        authorized_by: cell(cells, 5).to_string(),
        notes: optional(cell(cells, 6)),
    })
}

/// Parse all data rows (header excluded), skipping blank rows
pub fn records_from_rows(sheet: &str, rows: &[Vec<String>]) -> TrackerResult<Vec<Record>> {
    rows.iter()
        .enumerate()
        .filter(|(_, cells)| !is_blank(cells))
        .map(|(index, cells)| record_from_row(sheet, sheet_row_number(index), cells))
        .collect()
}

/// Parse all data rows (header excluded), skipping blank rows
pub fn entries_from_rows(sheet: &str, rows: &[Vec<String>]) -> TrackerResult<Vec<DispatchEntry>> {
    rows.iter()
        .enumerate()
        .filter(|(_, cells)| !is_blank(cells))
        .map(|(index, cells)| entry_from_row(sheet, sheet_row_number(index), cells))
        .collect()
}

/// Index of the data row holding `record_id`, if any
pub fn find_record_row(rows: &[Vec<String>], record_id: RecordId) -> Option<usize> {
    rows.iter()
        .position(|cells| cell(cells, 0).parse::<RecordId>().ok() == Some(record_id))
}
