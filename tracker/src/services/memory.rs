//! In-process persistence, used when no storage is configured and in tests

use async_trait::async_trait;
use shared::{ConnectionInfo, DispatchEntry, Record, RecordId, RecordState};
use tokio::sync::Mutex;

use crate::error::{TrackerError, TrackerResult};
use crate::traits::PersistenceAdapter;

#[derive(Debug, Default)]
struct MemoryData {
    records: Vec<Record>,
    entries: Vec<DispatchEntry>,
}

/// Memory-only adapter; data is lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    data: Mutex<MemoryData>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with pre-existing rows
    pub fn with_data(records: Vec<Record>, entries: Vec<DispatchEntry>) -> Self {
        Self {
            data: Mutex::new(MemoryData { records, entries }),
        }
    }
}

#[async_trait]
impl PersistenceAdapter for MemoryAdapter {
    async fn fetch_records(&self) -> TrackerResult<Vec<Record>> {
        Ok(self.data.lock().await.records.clone())
    }

    async fn fetch_dispatch_entries(&self) -> TrackerResult<Vec<DispatchEntry>> {
        Ok(self.data.lock().await.entries.clone())
    }

    async fn append_record(&self, record: &Record) -> TrackerResult<RecordId> {
        self.data.lock().await.records.push(record.clone());
        Ok(record.id)
    }

    async fn update_record_state(&self, record_id: RecordId, state: RecordState) -> TrackerResult<()> {
        let mut data = self.data.lock().await;
        let record = data
            .records
            .iter_mut()
            .find(|record| record.id == record_id)
            .ok_or(TrackerError::RecordNotFound { record_id })?;
        record.state = state;
        Ok(())
    }

    async fn append_dispatch_entries(&self, entries: &[DispatchEntry]) -> TrackerResult<()> {
        self.data.lock().await.entries.extend_from_slice(entries);
        Ok(())
    }

    async fn check_connection(&self) -> TrackerResult<ConnectionInfo> {
        Ok(ConnectionInfo {
            backend: "memory".to_string(),
            target: "in-process".to_string(),
            title: None,
        })
    }

    fn describe(&self) -> String {
        "in-memory storage".to_string()
    }
}
