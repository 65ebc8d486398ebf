//! Key-value store used to persist ingested records.
//!
//! This crate provides the [`StoreClient`] trait consumed by the ingestion
//! dispatcher, together with [`ObjectStoreClient`], an implementation that writes
//! every record as a small JSON object into an [`ObjectStore`].
//!
//! Object stores are created through an [`ObjectStoreFactory`], so the same
//! client can run against memory, the local file system or a cloud bucket.

pub mod cloud;
pub mod error;
pub mod local;
pub mod paths;
mod record;
mod table;

use std::sync::Arc;

use object_store::{ObjectStore, PutMode, PutOptions, PutPayload, memory::InMemory, path::Path};
use snafu::ResultExt;

pub use cloud::AmazonS3Factory;
pub use error::{Result, StoreError};
pub use local::{LocalFileSystemFactory, TemporaryFileSystemFactory};
pub use record::PersistedRecord;
pub use table::TableName;

use crate::{
    error::{PutSnafu, SerializeSnafu},
    paths::format_record_path,
};

/// Write primitive against the backing key-value store.
#[async_trait::async_trait]
pub trait StoreClient: Send + Sync {
    /// Persist the record under its identifier.
    ///
    /// Idempotency and retries are the implementation's concern; callers invoke
    /// this once per record.
    async fn put(&self, record: &PersistedRecord) -> Result<()>;
}

/// Factory trait for creating the object store that backs a [`StoreClient`].
pub trait ObjectStoreFactory: Send + Sync {
    fn create_object_store(&self) -> Result<Arc<dyn ObjectStore>>;
}

/// Factory for process-local, in-memory object stores.
#[derive(Debug, Default, Clone)]
pub struct InMemoryFactory;

/// A [`StoreClient`] that writes records to `<table>/<id>.json`.
///
/// Writes use create-only semantics, so an identifier collision is reported as an
/// error instead of silently overwriting an existing record.
#[derive(Clone)]
pub struct ObjectStoreClient {
    object_store: Arc<dyn ObjectStore>,
    table: TableName,
}

impl ObjectStoreClient {
    pub fn new(object_store: Arc<dyn ObjectStore>, table: TableName) -> Self {
        Self {
            object_store,
            table,
        }
    }

    pub fn from_factory(factory: &dyn ObjectStoreFactory, table: TableName) -> Result<Self> {
        let object_store = factory.create_object_store()?;
        Ok(Self::new(object_store, table))
    }
}

#[async_trait::async_trait]
impl StoreClient for ObjectStoreClient {
    async fn put(&self, record: &PersistedRecord) -> Result<()> {
        let payload = serde_json::to_vec(record).context(SerializeSnafu {
            id: record.id.clone(),
        })?;

        let path: Path = format_record_path(&self.table, &record.id).into();

        self.object_store
            .put_opts(
                &path,
                PutPayload::from(payload),
                PutOptions {
                    mode: PutMode::Create,
                    ..Default::default()
                },
            )
            .await
            .context(PutSnafu {
                id: record.id.clone(),
            })?;

        Ok(())
    }
}

impl ObjectStoreFactory for InMemoryFactory {
    fn create_object_store(&self) -> Result<Arc<dyn ObjectStore>> {
        Ok(Arc::new(InMemory::new()))
    }
}
