#![allow(dead_code)]

use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use rowpost_ingestor_core::{IdGenerationError, RawRecord, RecordIdGenerator};
use rowpost_store::{PersistedRecord, StoreClient, StoreError};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{Layer, layer::Context};

/// A store that records every `put` and tracks how many run concurrently.
#[derive(Default)]
pub struct RecordingStore {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: Mutex<Vec<String>>,
    finished: AtomicUsize,
    failing_ids: HashSet<String>,
    write_latency: Duration,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            write_latency: Duration::from_millis(10),
            ..Default::default()
        }
    }

    pub fn failing_on(ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            failing_ids: ids.into_iter().map(Into::into).collect(),
            ..Self::new()
        }
    }

    pub fn with_latency(mut self, write_latency: Duration) -> Self {
        self.write_latency = write_latency;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Number of `put` calls that ran until the end of the write.
    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl StoreClient for RecordingStore {
    async fn put(&self, record: &PersistedRecord) -> Result<(), StoreError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        self.calls.lock().unwrap().push(record.id.clone());

        tokio::time::sleep(self.write_latency).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.finished.fetch_add(1, Ordering::SeqCst);

        if self.failing_ids.contains(&record.id) {
            return Err(StoreError::Put {
                id: record.id.clone(),
                source: object_store::Error::Generic {
                    store: "recording",
                    source: "injected failure".into(),
                },
            });
        }

        Ok(())
    }
}

/// A store whose `put` panics for one identifier.
pub struct PanickingStore {
    panic_on: String,
    calls: Mutex<Vec<String>>,
}

impl PanickingStore {
    pub fn new(panic_on: impl Into<String>) -> Self {
        Self {
            panic_on: panic_on.into(),
            calls: Mutex::default(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl StoreClient for PanickingStore {
    async fn put(&self, record: &PersistedRecord) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(record.id.clone());
        tokio::time::sleep(Duration::from_millis(5)).await;

        if record.id == self.panic_on {
            panic!("store crashed while writing {}", record.id);
        }

        Ok(())
    }
}

/// Generates `record-0`, `record-1`, ... and optionally fails on one call.
#[derive(Default)]
pub struct SequentialIdGenerator {
    next: AtomicUsize,
    fail_at: Option<usize>,
}

impl SequentialIdGenerator {
    pub fn failing_at(index: usize) -> Self {
        Self {
            next: AtomicUsize::new(0),
            fail_at: Some(index),
        }
    }
}

impl RecordIdGenerator for SequentialIdGenerator {
    fn generate_id(&self) -> Result<String, IdGenerationError> {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == Some(n) {
            return Err(IdGenerationError::new("entropy source exhausted"));
        }
        Ok(format!("record-{n}"))
    }
}

/// Counts `ERROR` events emitted while it is installed.
#[derive(Clone, Default)]
pub struct ErrorCounter {
    count: Arc<AtomicUsize>,
}

impl ErrorCounter {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub fn sample_records(n: usize) -> Vec<RawRecord> {
    (0..n)
        .map(|i| RawRecord::from_iter([format!("{i}"), format!("name-{i}"), "2024-01-01".into()]))
        .collect()
}

pub fn new_store(store: RecordingStore) -> (Arc<RecordingStore>, Arc<dyn StoreClient>) {
    let store = Arc::new(store);
    let client: Arc<dyn StoreClient> = store.clone();
    (store, client)
}
