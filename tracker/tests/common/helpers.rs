//! Test helpers and builder patterns for tracker tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use shared::{ConnectionInfo, DispatchRequest, GroupSelection, NewRecord, RecordId};
use tokio::task::JoinHandle;
use tracker::core::RecordStore;
use tracker::services::MemoryAdapter;
use tracker::traits::MockPersistenceAdapter;
use tracker::{Tracker, TrackerError, TrackerHandle, WeightMode};

use super::fixtures::TestFixtures;

/// Builder for a mock adapter whose calls succeed unless configured otherwise
pub struct MockAdapterBuilder {
    adapter: MockPersistenceAdapter,
    failing_state_updates: usize,
    failing_record_appends: usize,
}

impl MockAdapterBuilder {
    pub fn new() -> Self {
        let mut adapter = MockPersistenceAdapter::new();

        adapter.expect_fetch_records().returning(|| Ok(vec![])).times(0..);
        adapter.expect_fetch_dispatch_entries().returning(|| Ok(vec![])).times(0..);
        adapter.expect_append_dispatch_entries().returning(|_| Ok(())).times(0..);
        adapter.expect_describe().returning(|| "mock storage".to_string()).times(0..);
        adapter
            .expect_check_connection()
            .returning(|| {
                Ok(ConnectionInfo {
                    backend: "mock".to_string(),
                    target: "test".to_string(),
                    title: None,
                })
            })
            .times(0..);

        Self {
            adapter,
            failing_state_updates: 0,
            failing_record_appends: 0,
        }
    }

    /// Fail the first `count` state updates with a persistence error
    pub fn failing_state_updates(mut self, count: usize) -> Self {
        self.failing_state_updates = count;
        self
    }

    /// Fail the first `count` record appends with a persistence error
    pub fn failing_record_appends(mut self, count: usize) -> Self {
        self.failing_record_appends = count;
        self
    }

    /// Configure the underlying mock directly
    pub fn with_adapter<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockPersistenceAdapter),
    {
        setup(&mut self.adapter);
        self
    }

    pub fn build(mut self) -> MockPersistenceAdapter {
        let state_calls = Arc::new(AtomicUsize::new(0));
        let failing_updates = self.failing_state_updates;
        self.adapter
            .expect_update_record_state()
            .returning(move |_, _| {
                if state_calls.fetch_add(1, Ordering::SeqCst) < failing_updates {
                    Err(TrackerError::persistence("update_record_state", "sheet unavailable"))
                } else {
                    Ok(())
                }
            })
            .times(0..);

        let append_calls = Arc::new(AtomicUsize::new(0));
        let failing_appends = self.failing_record_appends;
        self.adapter
            .expect_append_record()
            .returning(move |record| {
                if append_calls.fetch_add(1, Ordering::SeqCst) < failing_appends {
                    Err(TrackerError::persistence("append_record", "sheet unavailable"))
                } else {
                    Ok(record.id)
                }
            })
            .times(0..);

        self.adapter
    }
}

impl Default for MockAdapterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper functions for common test operations
pub struct TestHelpers;

impl TestHelpers {
    /// Store with the given registrations applied in order
    pub fn store_with(inputs: Vec<NewRecord>) -> RecordStore {
        let mut store = RecordStore::new();
        for input in inputs {
            store.register(input, TestFixtures::registered_at()).unwrap();
        }
        store
    }

    pub fn dispatch_request(selection: Vec<GroupSelection>) -> DispatchRequest {
        DispatchRequest {
            selection,
            authorized_by: TestFixtures::SUPERVISOR.to_string(),
            dispatched_at: TestFixtures::dispatched_at(),
            notes: None,
        }
    }

    /// Dispatch request selecting the given ids in one group
    pub fn dispatch_ids(ids: &[u64]) -> DispatchRequest {
        Self::dispatch_request(vec![GroupSelection {
            material_type: shared::MaterialType::Other,
            record_ids: ids.iter().copied().map(RecordId).collect(),
        }])
    }

    /// Running tracker over an empty memory adapter
    pub async fn spawn_memory_tracker() -> (TrackerHandle, JoinHandle<()>) {
        let (tracker, handle) = Tracker::new(MemoryAdapter::new(), WeightMode::Exact);
        let worker = tracker.start().await.unwrap();
        (handle, worker)
    }

    /// Register every input through the handle, returning the assigned ids
    pub async fn register_all(handle: &TrackerHandle, inputs: Vec<NewRecord>) -> Vec<RecordId> {
        let mut ids = Vec::new();
        for input in inputs {
            ids.push(handle.register(input).await.unwrap().id);
        }
        ids
    }

    pub fn assert_weight_eq(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < TestFixtures::EPSILON,
            "expected {expected} kg, got {actual} kg"
        );
    }
}
