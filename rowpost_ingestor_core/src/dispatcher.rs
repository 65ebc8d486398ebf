//! Bounded-concurrency dispatch of records to the store.
//!
//! Every record gets its own write task, but at most `capacity` of them are in
//! flight at any time: the submitter must acquire an admission permit before it
//! spawns a task, and the task returns the permit when it terminates.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use rowpost_observability::UpDownCounter;
use rowpost_store::{PersistedRecord, StoreClient};
use snafu::ResultExt;
use tokio::{
    sync::{OwnedSemaphorePermit, Semaphore},
    task::JoinSet,
};
use tracing::{debug, error, info};

use crate::{
    error::{AdmissionClosedSnafu, ConfigurationSnafu, IdGenerationSnafu, Result},
    id::{RecordIdGenerator, UlidRecordIdGenerator},
    metrics::IngestionMetrics,
    types::RawRecord,
};

pub const DEFAULT_CAPACITY: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherOptions {
    /// Maximum number of concurrent store writes.
    pub capacity: usize,
}

/// Persists records to the store under freshly generated identifiers.
#[derive(Clone)]
pub struct IngestionDispatcher {
    store: Arc<dyn StoreClient>,
    id_generator: Arc<dyn RecordIdGenerator>,
    capacity: usize,
    metrics: IngestionMetrics,
}

/// Write tasks spawned by one `ingest` call.
///
/// Dropping the set detaches the tasks instead of aborting them, so writes that
/// were already dispatched run to completion even if the caller goes away.
struct WriteTasks(JoinSet<()>);

/// Held by a write task for its whole lifetime.
///
/// Dropping it counts the task as completed, then returns the admission permit.
/// This also happens when the task panics or is aborted.
struct TaskGuard {
    completed: Arc<AtomicUsize>,
    in_flight: UpDownCounter<i64>,
    _permit: OwnedSemaphorePermit,
}

impl IngestionDispatcher {
    pub fn new(
        store: Arc<dyn StoreClient>,
        id_generator: Arc<dyn RecordIdGenerator>,
        options: DispatcherOptions,
    ) -> Result<Self> {
        if options.capacity == 0 {
            return ConfigurationSnafu {
                message: "concurrency capacity must be at least 1",
            }
            .fail();
        }

        Ok(Self {
            store,
            id_generator,
            capacity: options.capacity,
            metrics: IngestionMetrics::default(),
        })
    }

    pub fn new_ulid(store: Arc<dyn StoreClient>, options: DispatcherOptions) -> Result<Self> {
        Self::new(store, Arc::new(UlidRecordIdGenerator), options)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Write every record to the store and wait for all writes to terminate.
    ///
    /// Returns the number of write tasks that reached a terminal state, which is
    /// always the number of records. Store failures are logged and do not affect
    /// the other records or the result.
    ///
    /// A failure to generate an identifier stops the submission of further
    /// records, aborts the writes still in flight and is returned to the caller.
    ///
    /// Dropping the returned future stops the submission of further records, but
    /// writes that were already dispatched still complete in the background.
    pub async fn ingest(&self, records: Vec<RawRecord>) -> Result<usize> {
        let total = records.len();
        if total == 0 {
            debug!("No records to ingest");
            return Ok(0);
        }

        let admission = Arc::new(Semaphore::new(self.capacity));
        let completed = Arc::new(AtomicUsize::new(0));
        let mut tasks = WriteTasks(JoinSet::new());

        info!(
            records = total,
            capacity = self.capacity,
            "Starting ingestion"
        );

        for (index, record) in records.into_iter().enumerate() {
            let permit = admission
                .clone()
                .acquire_owned()
                .await
                .context(AdmissionClosedSnafu {})?;

            let id = match self.id_generator.generate_id() {
                Ok(id) => id,
                Err(err) => {
                    error!(
                        index,
                        record = ?record.fields(),
                        error = %err,
                        "Failed to generate record identifier. Aborting ingestion."
                    );
                    tasks.0.abort_all();
                    return Err(err).context(IdGenerationSnafu { index });
                }
            };

            self.metrics.in_flight_records.add(1, &[]);
            let guard = TaskGuard {
                completed: completed.clone(),
                in_flight: self.metrics.in_flight_records.clone(),
                _permit: permit,
            };

            tasks.0.spawn(write_record(
                self.store.clone(),
                self.metrics.clone(),
                record,
                PersistedRecord::new(id),
                guard,
            ));
        }

        while let Some(joined) = tasks.0.join_next().await {
            if let Err(err) = joined {
                error!(error = ?err, "Write task terminated abnormally");
            }
        }

        let completed = completed.load(Ordering::Acquire);
        debug_assert_eq!(completed, total);

        info!(records = completed, "Ingestion completed");

        Ok(completed)
    }
}

async fn write_record(
    store: Arc<dyn StoreClient>,
    metrics: IngestionMetrics,
    record: RawRecord,
    persisted: PersistedRecord,
    _guard: TaskGuard,
) {
    info!(id = %persisted.id, record = ?record.fields(), "Processing record");

    match store.put(&persisted).await {
        Ok(()) => {
            metrics.persisted_records.add(1, &[]);
            debug!(id = %persisted.id, "Record persisted");
        }
        Err(err) => {
            metrics.failed_records.add(1, &[]);
            error!(
                id = %persisted.id,
                record = ?record.fields(),
                error = ?err,
                "Failed to persist record"
            );
        }
    }
}

impl Drop for WriteTasks {
    fn drop(&mut self) {
        self.0.detach_all();
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.in_flight.add(-1, &[]);
        self.completed.fetch_add(1, Ordering::AcqRel);
    }
}

impl Default for DispatcherOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}
