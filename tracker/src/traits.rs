//! Trait definitions with mockall annotations for testing
//!
//! The persistence adapter is the only seam between the tracker and storage.
//! Production code picks an implementation at startup; tests inject
//! `MockPersistenceAdapter` to force failures.

use async_trait::async_trait;
use shared::{ConnectionInfo, DispatchEntry, Record, RecordId, RecordState};

use crate::error::TrackerResult;

/// Storage abstraction for records and dispatch entries
///
/// Implementations only store rows. Validation, id assignment and grouping
/// happen in the tracker before any adapter call.
#[mockall::automock]
#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    /// Load every stored record, in storage order
    async fn fetch_records(&self) -> TrackerResult<Vec<Record>>;

    /// Load every stored dispatch entry, in storage order
    async fn fetch_dispatch_entries(&self) -> TrackerResult<Vec<DispatchEntry>>;

    /// Append one record and return the id it was stored under
    async fn append_record(&self, record: &Record) -> TrackerResult<RecordId>;

    /// Overwrite the state of a stored record
    ///
    /// Fails with `RecordNotFound` when no stored row carries the id. Writing
    /// the state a record already has succeeds.
    async fn update_record_state(&self, record_id: RecordId, state: RecordState) -> TrackerResult<()>;

    /// Append dispatch entries in a single write
    async fn append_dispatch_entries(&self, entries: &[DispatchEntry]) -> TrackerResult<()>;

    /// Verify the backend is reachable and usable
    async fn check_connection(&self) -> TrackerResult<ConnectionInfo>;

    /// Human readable description for logs
    fn describe(&self) -> String;
}

#[async_trait]
impl PersistenceAdapter for Box<dyn PersistenceAdapter> {
    async fn fetch_records(&self) -> TrackerResult<Vec<Record>> {
        (**self).fetch_records().await
    }

    async fn fetch_dispatch_entries(&self) -> TrackerResult<Vec<DispatchEntry>> {
        (**self).fetch_dispatch_entries().await
    }

    async fn append_record(&self, record: &Record) -> TrackerResult<RecordId> {
        (**self).append_record(record).await
    }

    async fn update_record_state(&self, record_id: RecordId, state: RecordState) -> TrackerResult<()> {
        (**self).update_record_state(record_id, state).await
    }

    async fn append_dispatch_entries(&self, entries: &[DispatchEntry]) -> TrackerResult<()> {
        (**self).append_dispatch_entries(entries).await
    }

    async fn check_connection(&self) -> TrackerResult<ConnectionInfo> {
        (**self).check_connection().await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_boxed_adapter_delegates() {
        let mut mock = MockPersistenceAdapter::new();
        mock.expect_fetch_records().times(1).returning(|| Ok(vec![]));
        mock.expect_describe().returning(|| "mock".to_string());

        let boxed: Box<dyn PersistenceAdapter> = Box::new(mock);
        assert!(boxed.fetch_records().await.unwrap().is_empty());
        assert_eq!(boxed.describe(), "mock");
    }
}
