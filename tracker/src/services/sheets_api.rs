//! Remote spreadsheet persistence over the Google Sheets v4 values API
//!
//! Reads fetch whole `A:G` ranges; inserts use `:append`; state updates write
//! the single state cell of the record's row.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use shared::{process_debug, ConnectionInfo, DispatchEntry, ProcessId, Record, RecordId, RecordState};

use crate::error::{TrackerError, TrackerResult};
use crate::services::rows::{self, DEFAULT_DISPATCH_SHEET, DEFAULT_RECORDS_SHEET, STATE_COLUMN};
use crate::traits::PersistenceAdapter;

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

const BACKEND: &str = "sheets";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetProperties {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Spreadsheet {
    properties: Option<SpreadsheetProperties>,
}

/// Sheets API client bound to one spreadsheet
#[derive(Debug, Clone)]
pub struct SheetsApiAdapter {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    api_key: String,
    records_sheet: String,
    dispatch_sheet: String,
}

impl SheetsApiAdapter {
    pub fn new(spreadsheet_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            api_key: api_key.into(),
            records_sheet: DEFAULT_RECORDS_SHEET.to_string(),
            dispatch_sheet: DEFAULT_DISPATCH_SHEET.to_string(),
        }
    }

    /// Point the client at another API root (test servers, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_sheet_names(mut self, records_sheet: impl Into<String>, dispatch_sheet: impl Into<String>) -> Self {
        self.records_sheet = records_sheet.into();
        self.dispatch_sheet = dispatch_sheet.into();
        self
    }

    fn values_url(&self, range: &str) -> String {
        format!("{}/{}/values/{}", self.base_url, self.spreadsheet_id, range)
    }

    fn full_range(sheet: &str) -> String {
        format!("{sheet}!A:G")
    }

    async fn check_status(operation: &str, response: Response) -> TrackerResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            401 | 403 => Err(TrackerError::Authentication {
                backend: BACKEND.to_string(),
            }),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(TrackerError::persistence(operation, format!("HTTP {status}: {body}")))
            }
        }
    }

    /// Data rows of a sheet (header excluded), cells rendered as text
    async fn get_rows(&self, operation: &str, sheet: &str) -> TrackerResult<Vec<Vec<String>>> {
        let response = self
            .client
            .get(self.values_url(&Self::full_range(sheet)))
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| TrackerError::persistence(operation, e.to_string()))?;

        let range: ValueRange = Self::check_status(operation, response).await?.json().await?;
        Ok(range
            .values
            .into_iter()
            .skip(1)
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn append_rows(&self, operation: &str, sheet: &str, rows: Vec<Vec<String>>) -> TrackerResult<()> {
        let url = format!("{}:append", self.values_url(&Self::full_range(sheet)));
        let response = self
            .client
            .post(url)
            .query(&[("valueInputOption", "RAW"), ("key", self.api_key.as_str())])
            .json(&json!({ "values": rows }))
            .send()
            .await
            .map_err(|e| TrackerError::persistence(operation, e.to_string()))?;

        Self::check_status(operation, response).await?;
        Ok(())
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl PersistenceAdapter for SheetsApiAdapter {
    async fn fetch_records(&self) -> TrackerResult<Vec<Record>> {
        let rows = self.get_rows("fetch_records", &self.records_sheet).await?;
        process_debug!(ProcessId::current(), "📊 Fetched {} record rows", rows.len());
        rows::records_from_rows(&self.records_sheet, &rows)
    }

    async fn fetch_dispatch_entries(&self) -> TrackerResult<Vec<DispatchEntry>> {
        let rows = self.get_rows("fetch_dispatch_entries", &self.dispatch_sheet).await?;
        process_debug!(ProcessId::current(), "📊 Fetched {} dispatch rows", rows.len());
        rows::entries_from_rows(&self.dispatch_sheet, &rows)
    }

    async fn append_record(&self, record: &Record) -> TrackerResult<RecordId> {
        self.append_rows("append_record", &self.records_sheet, vec![rows::record_to_row(record)])
            .await?;
        process_debug!(ProcessId::current(), "📝 Appended record {}", record.id);
        Ok(record.id)
    }

    async fn update_record_state(&self, record_id: RecordId, state: RecordState) -> TrackerResult<()> {
        let operation = "update_record_state";
        let rows = self.get_rows(operation, &self.records_sheet).await?;
        let index = rows::find_record_row(&rows, record_id).ok_or(TrackerError::RecordNotFound { record_id })?;

        let range = format!(
            "{}!{}{}",
            self.records_sheet,
            STATE_COLUMN,
            rows::sheet_row_number(index)
        );
        let response = self
            .client
            .put(self.values_url(&range))
            .query(&[("valueInputOption", "RAW"), ("key", self.api_key.as_str())])
            .json(&json!({ "values": [[state.to_string()]] }))
            .send()
            .await
            .map_err(|e| TrackerError::persistence(operation, e.to_string()))?;

        Self::check_status(operation, response).await?;
        process_debug!(ProcessId::current(), "🔄 Record {} set to {} ({})", record_id, state, range);
        Ok(())
    }

    async fn append_dispatch_entries(&self, entries: &[DispatchEntry]) -> TrackerResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let rows = entries.iter().map(rows::entry_to_row).collect();
        self.append_rows("append_dispatch_entries", &self.dispatch_sheet, rows).await?;
        process_debug!(ProcessId::current(), "📦 Appended {} dispatch entries", entries.len());
        Ok(())
    }

    async fn check_connection(&self) -> TrackerResult<ConnectionInfo> {
        let operation = "check_connection";
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, self.spreadsheet_id))
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| TrackerError::persistence(operation, e.to_string()))?;

        let spreadsheet: Spreadsheet = Self::check_status(operation, response).await?.json().await?;
        Ok(ConnectionInfo {
            backend: BACKEND.to_string(),
            target: self.spreadsheet_id.clone(),
            title: spreadsheet.properties.and_then(|properties| properties.title),
        })
    }

    fn describe(&self) -> String {
        format!("sheets spreadsheet {}", self.spreadsheet_id)
    }
}
