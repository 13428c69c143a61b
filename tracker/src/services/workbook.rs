//! Local workbook persistence
//!
//! A workbook is a directory holding one CSV file per sheet. Sheets are created
//! with their header row on first use. Inserts append to the sheet file; state
//! updates rewrite the records sheet through a temporary file and a rename.

use async_trait::async_trait;
use chrono::Local;
use shared::{process_debug, ConnectionInfo, DispatchEntry, ProcessId, Record, RecordId, RecordState};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{TrackerError, TrackerResult};
use crate::services::rows::{self, DEFAULT_DISPATCH_SHEET, DEFAULT_RECORDS_SHEET, DISPATCH_HEADERS, RECORD_HEADERS};
use crate::traits::PersistenceAdapter;

/// Workbook stored as CSV sheets in a directory
#[derive(Debug, Clone)]
pub struct WorkbookAdapter {
    dir: PathBuf,
    records_sheet: String,
    dispatch_sheet: String,
}

impl WorkbookAdapter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            records_sheet: DEFAULT_RECORDS_SHEET.to_string(),
            dispatch_sheet: DEFAULT_DISPATCH_SHEET.to_string(),
        }
    }

    pub fn with_sheet_names(mut self, records_sheet: impl Into<String>, dispatch_sheet: impl Into<String>) -> Self {
        self.records_sheet = records_sheet.into();
        self.dispatch_sheet = dispatch_sheet.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn records_path(&self) -> PathBuf {
        self.dir.join(format!("{}.csv", self.records_sheet))
    }

    pub fn dispatch_path(&self) -> PathBuf {
        self.dir.join(format!("{}.csv", self.dispatch_sheet))
    }

    /// Create the directory and any missing sheet with its header row
    pub async fn ensure_sheets(&self) -> TrackerResult<()> {
        fs::create_dir_all(&self.dir).await?;
        for (path, headers) in [
            (self.records_path(), RECORD_HEADERS),
            (self.dispatch_path(), DISPATCH_HEADERS),
        ] {
            if fs::metadata(&path).await.is_err() {
                let header = headers.iter().map(|value| value.to_string()).collect::<Vec<_>>();
                fs::write(&path, encode_rows(std::slice::from_ref(&header))?).await?;
                process_debug!(ProcessId::current(), "📁 Created sheet {}", path.display());
            }
        }
        Ok(())
    }

    /// Copy both sheets into a sibling `<dir>_backup_<timestamp>` directory
    pub async fn backup(&self) -> TrackerResult<PathBuf> {
        self.ensure_sheets().await?;

        // `.` and `..` have no file name to derive a sibling from
        let dir = fs::canonicalize(&self.dir).await?;
        let stamp = Local::now().format("%Y-%m-%dT%H-%M-%S");
        let name = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "workbook".to_string());
        let target = dir.with_file_name(format!("{name}_backup_{stamp}"));

        fs::create_dir_all(&target).await?;
        for source in [self.records_path(), self.dispatch_path()] {
            if let Some(file_name) = source.file_name() {
                fs::copy(&source, target.join(file_name)).await?;
            }
        }

        process_debug!(ProcessId::current(), "💾 Workbook backed up to {}", target.display());
        Ok(target)
    }

    async fn read_rows(&self, path: &Path) -> TrackerResult<Vec<Vec<String>>> {
        self.ensure_sheets().await?;
        let bytes = fs::read(path).await?;
        decode_rows(&bytes)
    }

    async fn append_rows(&self, path: &Path, rows: &[Vec<String>]) -> TrackerResult<()> {
        self.ensure_sheets().await?;
        let bytes = encode_rows(rows)?;

        let mut file = fs::OpenOptions::new().append(true).open(path).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        Ok(())
    }

    async fn rewrite_rows(&self, path: &Path, headers: &[&str], rows: &[Vec<String>]) -> TrackerResult<()> {
        let mut all = Vec::with_capacity(rows.len() + 1);
        all.push(headers.iter().map(|value| value.to_string()).collect::<Vec<_>>());
        all.extend(rows.iter().cloned());

        let temp = path.with_extension("csv.tmp");
        fs::write(&temp, encode_rows(&all)?).await?;
        fs::rename(&temp, path).await?;
        Ok(())
    }
}

/// Data rows of a sheet file, header excluded
pub(crate) fn decode_rows(bytes: &[u8]) -> TrackerResult<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|value| value.to_string()).collect());
    }
    Ok(rows)
}

pub(crate) fn encode_rows(rows: &[Vec<String>]) -> TrackerResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());
    for row in rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| TrackerError::persistence("encode_rows", e.to_string()))
}

#[async_trait]
impl PersistenceAdapter for WorkbookAdapter {
    async fn fetch_records(&self) -> TrackerResult<Vec<Record>> {
        let rows = self.read_rows(&self.records_path()).await?;
        rows::records_from_rows(&self.records_sheet, &rows)
    }

    async fn fetch_dispatch_entries(&self) -> TrackerResult<Vec<DispatchEntry>> {
        let rows = self.read_rows(&self.dispatch_path()).await?;
        rows::entries_from_rows(&self.dispatch_sheet, &rows)
    }

    async fn append_record(&self, record: &Record) -> TrackerResult<RecordId> {
        self.append_rows(&self.records_path(), &[rows::record_to_row(record)]).await?;
        process_debug!(ProcessId::current(), "📝 Appended record {} to {}", record.id, self.records_sheet);
        Ok(record.id)
    }

    async fn update_record_state(&self, record_id: RecordId, state: RecordState) -> TrackerResult<()> {
        let path = self.records_path();
        let mut rows = self.read_rows(&path).await?;
        let index = rows::find_record_row(&rows, record_id).ok_or(TrackerError::RecordNotFound { record_id })?;

        let row = &mut rows[index];
        if row.len() <= rows::STATE_INDEX {
            row.resize(RECORD_HEADERS.len(), String::new());
        }
        row[rows::STATE_INDEX] = state.to_string();

        self.rewrite_rows(&path, &RECORD_HEADERS, &rows).await?;
        process_debug!(ProcessId::current(), "🔄 Record {} set to {}", record_id, state);
        Ok(())
    }

    async fn append_dispatch_entries(&self, entries: &[DispatchEntry]) -> TrackerResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let rows: Vec<Vec<String>> = entries.iter().map(rows::entry_to_row).collect();
        self.append_rows(&self.dispatch_path(), &rows).await?;
        process_debug!(
            ProcessId::current(),
            "📦 Appended {} dispatch entries to {}",
            entries.len(),
            self.dispatch_sheet
        );
        Ok(())
    }

    async fn check_connection(&self) -> TrackerResult<ConnectionInfo> {
        self.ensure_sheets().await?;
        Ok(ConnectionInfo {
            backend: "workbook".to_string(),
            target: self.dir.display().to_string(),
            title: None,
        })
    }

    fn describe(&self) -> String {
        format!("workbook at {}", self.dir.display())
    }
}
