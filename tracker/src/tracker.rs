//! Tracker service: the single writer over the record store
//!
//! The tracker owns the `RecordStore` and the persistence adapter. Front-ends
//! talk to it through a cloneable `TrackerHandle`; commands are processed one at
//! a time, so two dispatches issued back to back never see the same records as
//! active.
//!
//! Mutations are persist-then-apply: the adapter is written first and memory
//! only changes once every write succeeded. A failed write leaves the store as
//! it was and the caller may retry.

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use shared::{
    logging, process_debug, process_error, process_info, process_warn, ConnectionInfo, DispatchBatch, DispatchId,
    DispatchOutcome, DispatchRequest, MaterialGroup, NewRecord, ProcessId, Record, RecordId, RecordQuery, RecordState,
    Stats, TypeSummary,
};
use tokio::sync::{mpsc, oneshot};

use crate::core::{entries_for_batch, regroup_entries, RecordStore, WeightMode};
use crate::error::{TrackerError, TrackerResult};
use crate::traits::PersistenceAdapter;

const COMMAND_BUFFER: usize = 64;

/// Counts reported after (re)loading from storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub records: usize,
    pub batches: usize,
}

type Reply<T> = oneshot::Sender<T>;

/// Requests processed by the tracker loop
#[derive(Debug)]
pub enum Command {
    Register {
        input: NewRecord,
        reply: Reply<TrackerResult<Record>>,
    },
    Dispatch {
        request: DispatchRequest,
        reply: Reply<TrackerResult<DispatchOutcome>>,
    },
    Records {
        query: RecordQuery,
        reply: Reply<Vec<Record>>,
    },
    Record {
        id: RecordId,
        reply: Reply<Option<Record>>,
    },
    Groups {
        reply: Reply<Vec<MaterialGroup>>,
    },
    History {
        reply: Reply<Vec<DispatchBatch>>,
    },
    Batch {
        id: DispatchId,
        reply: Reply<Option<DispatchBatch>>,
    },
    Stats {
        reply: Reply<Stats>,
    },
    TypeSummary {
        reply: Reply<TypeSummary>,
    },
    Reload {
        reply: Reply<TrackerResult<LoadSummary>>,
    },
    CheckConnection {
        reply: Reply<TrackerResult<ConnectionInfo>>,
    },
}

/// Single-writer owner of the record store
pub struct Tracker<P>
where
    P: PersistenceAdapter + 'static,
{
    store: RecordStore,
    adapter: P,
    weight_mode: WeightMode,

    commands: mpsc::Receiver<Command>,

    /// Shutdown signal
    shutdown_tx: mpsc::Sender<()>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl<P> Tracker<P>
where
    P: PersistenceAdapter + 'static,
{
    /// Create a tracker with an empty store and the handle that talks to it
    pub fn new(adapter: P, weight_mode: WeightMode) -> (Self, TrackerHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let tracker = Self {
            store: RecordStore::new(),
            adapter,
            weight_mode,
            commands: command_rx,
            shutdown_tx,
            shutdown_rx,
        };
        (tracker, TrackerHandle { sender: command_tx })
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn adapter(&self) -> &P {
        &self.adapter
    }

    pub fn get_shutdown_sender(&self) -> mpsc::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Replace the in-memory store with what the adapter holds
    ///
    /// On failure the current store is kept.
    pub async fn load(&mut self) -> TrackerResult<LoadSummary> {
        process_debug!(ProcessId::current(), "📂 Loading from {}", self.adapter.describe());

        let records = self.adapter.fetch_records().await?;
        let entries = self.adapter.fetch_dispatch_entries().await?;
        let batches = regroup_entries(&entries, &records);

        let summary = LoadSummary {
            records: records.len(),
            batches: batches.len(),
        };
        self.store = RecordStore::from_parts(records, batches);

        process_info!(
            ProcessId::current(),
            "📂 Loaded {} records and {} dispatches",
            summary.records,
            summary.batches
        );
        Ok(summary)
    }

    /// Register a record, timestamped now when the input has no time
    pub async fn register(&mut self, input: NewRecord) -> TrackerResult<Record> {
        self.register_at(input, Local::now().naive_local()).await
    }

    pub async fn register_at(&mut self, input: NewRecord, now: NaiveDateTime) -> TrackerResult<Record> {
        let record = self.store.prepare_record(input, now)?;

        self.adapter.append_record(&record).await?;
        let record = self.store.commit_record(record)?;

        process_info!(
            ProcessId::current(),
            "📝 Registered record {} ({}, {} kg)",
            record.id,
            record.material_type,
            record.weight_kg
        );
        Ok(record)
    }

    /// Dispatch the selected records as one batch
    ///
    /// State updates are written before the entries, and the entries go out in
    /// a single append, so a failed attempt can be retried as is.
    pub async fn dispatch(&mut self, request: DispatchRequest) -> TrackerResult<DispatchOutcome> {
        let plan = self.store.plan_dispatch(&request)?;
        let entries = entries_for_batch(&plan.batch, self.store.records(), self.weight_mode);

        for record_id in plan.record_ids() {
            self.adapter.update_record_state(record_id, RecordState::Dispatched).await?;
        }
        self.adapter.append_dispatch_entries(&entries).await?;

        let outcome = self.store.apply_dispatch(plan)?;
        process_info!(
            ProcessId::current(),
            "📦 Dispatch {} authorized by {}: {} records ({})",
            outcome.batch.dispatch_id,
            outcome.batch.authorized_by,
            outcome.batch.record_count,
            outcome.batch.material_summary()
        );
        for skipped in &outcome.skipped {
            process_warn!(
                ProcessId::current(),
                "⚠️ Dispatch {} skipped record {} ({})",
                outcome.batch.dispatch_id,
                skipped.record_id,
                skipped.reason
            );
        }
        Ok(outcome)
    }

    async fn handle_command(&mut self, command: Command) {
        // A dropped reply receiver only means the caller went away
        match command {
            Command::Register { input, reply } => {
                let _ = reply.send(self.register(input).await);
            }
            Command::Dispatch { request, reply } => {
                let _ = reply.send(self.dispatch(request).await);
            }
            Command::Records { query, reply } => {
                let _ = reply.send(self.store.query(&query));
            }
            Command::Record { id, reply } => {
                let _ = reply.send(self.store.get(id).cloned());
            }
            Command::Groups { reply } => {
                let _ = reply.send(self.store.active_groups().into_groups());
            }
            Command::History { reply } => {
                let _ = reply.send(self.store.batches().to_vec());
            }
            Command::Batch { id, reply } => {
                let _ = reply.send(self.store.batch(id).cloned());
            }
            Command::Stats { reply } => {
                let _ = reply.send(self.store.stats());
            }
            Command::TypeSummary { reply } => {
                let _ = reply.send(self.store.type_summary());
            }
            Command::Reload { reply } => {
                let _ = reply.send(self.load().await);
            }
            Command::CheckConnection { reply } => {
                let _ = reply.send(self.adapter.check_connection().await);
            }
        }
    }

    /// Main event loop; ends on shutdown or when every handle is dropped
    pub async fn run(mut self) {
        process_debug!(ProcessId::current(), "🔁 Tracker loop started ({})", self.adapter.describe());

        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    match command {
                        Some(command) => self.handle_command(command).await,
                        None => {
                            process_debug!(ProcessId::current(), "All tracker handles dropped");
                            break;
                        }
                    }
                },
                _ = self.shutdown_rx.recv() => {
                    logging::log_shutdown(ProcessId::current(), "tracker received shutdown signal");
                    break;
                },
            }
        }

        process_debug!(ProcessId::current(), "🔁 Tracker loop stopped");
    }

    /// Load, then run the loop on its own task
    pub async fn start(mut self) -> TrackerResult<tokio::task::JoinHandle<()>> {
        if let Err(e) = self.load().await {
            process_error!(ProcessId::current(), "❌ Initial load failed: {}", e);
            return Err(e);
        }
        Ok(tokio::spawn(self.run()))
    }
}

/// Cloneable client of a running tracker
#[derive(Debug, Clone)]
pub struct TrackerHandle {
    sender: mpsc::Sender<Command>,
}

impl TrackerHandle {
    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> TrackerResult<T> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(make(reply))
            .await
            .map_err(|_| TrackerError::ServiceStopped)?;
        response.await.map_err(|_| TrackerError::ServiceStopped)
    }

    pub async fn register(&self, input: NewRecord) -> TrackerResult<Record> {
        self.request(|reply| Command::Register { input, reply }).await?
    }

    pub async fn dispatch(&self, request: DispatchRequest) -> TrackerResult<DispatchOutcome> {
        self.request(|reply| Command::Dispatch { request, reply }).await?
    }

    pub async fn records(&self, query: RecordQuery) -> TrackerResult<Vec<Record>> {
        self.request(|reply| Command::Records { query, reply }).await
    }

    pub async fn record(&self, id: RecordId) -> TrackerResult<Record> {
        self.request(|reply| Command::Record { id, reply })
            .await?
            .ok_or(TrackerError::RecordNotFound { record_id: id })
    }

    /// Active records grouped by material type
    pub async fn groups(&self) -> TrackerResult<Vec<MaterialGroup>> {
        self.request(|reply| Command::Groups { reply }).await
    }

    /// Dispatch ledger, oldest first
    pub async fn history(&self) -> TrackerResult<Vec<DispatchBatch>> {
        self.request(|reply| Command::History { reply }).await
    }

    pub async fn batch(&self, id: DispatchId) -> TrackerResult<Option<DispatchBatch>> {
        self.request(|reply| Command::Batch { id, reply }).await
    }

    pub async fn stats(&self) -> TrackerResult<Stats> {
        self.request(|reply| Command::Stats { reply }).await
    }

    pub async fn type_summary(&self) -> TrackerResult<TypeSummary> {
        self.request(|reply| Command::TypeSummary { reply }).await
    }

    pub async fn reload(&self) -> TrackerResult<LoadSummary> {
        self.request(|reply| Command::Reload { reply }).await?
    }

    pub async fn check_connection(&self) -> TrackerResult<ConnectionInfo> {
        self.request(|reply| Command::CheckConnection { reply }).await?
    }
}
