use std::{path::PathBuf, sync::Arc};

use clap::{Args, ValueEnum};
use rowpost_ingestor_core::{DEFAULT_CAPACITY, DispatcherOptions, IngestionDispatcher};
use rowpost_store::{
    AmazonS3Factory, InMemoryFactory, LocalFileSystemFactory, ObjectStoreClient,
    ObjectStoreFactory, TableName, TemporaryFileSystemFactory,
};
use snafu::ResultExt;
use tracing::info;

use crate::error::{CliError, IngestorSnafu, Result, StoreSnafu};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Process memory, lost on exit
    Memory,
    /// A directory on the local file system
    Local,
    /// A temporary directory removed on exit
    Temporary,
    /// An Amazon S3 bucket, configured from the `AWS_*` environment variables
    S3,
}

/// Arguments for configuring where records are stored.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Name of the table records are written to
    #[arg(long, env = "TABLE_NAME")]
    pub table: String,
    /// Store backend
    #[arg(long, value_enum, default_value_t = StoreKind::Temporary)]
    pub store: StoreKind,
    /// Root directory of the `local` store
    #[arg(long)]
    pub store_path: Option<PathBuf>,
    /// Bucket of the `s3` store
    #[arg(long, env = "ROWPOST_BUCKET")]
    pub bucket: Option<String>,
    /// Key prefix inside the `s3` bucket
    #[arg(long, env = "ROWPOST_STORE_PREFIX")]
    pub store_prefix: Option<String>,
    /// Maximum number of concurrent store writes
    #[arg(long, env = "ROWPOST_CONCURRENCY", default_value_t = DEFAULT_CAPACITY)]
    pub concurrency: usize,
}

/// The dispatcher together with the resources that must outlive it.
pub struct IngestionPipeline {
    pub dispatcher: IngestionDispatcher,
    _temporary: Option<TemporaryFileSystemFactory>,
}

impl StoreArgs {
    pub fn build_pipeline(&self) -> Result<IngestionPipeline> {
        let table = TableName::new(&self.table).context(StoreSnafu {})?;

        let mut temporary = None;
        let object_store = match self.store {
            StoreKind::Memory => InMemoryFactory.create_object_store(),
            StoreKind::Local => {
                let path = self.store_path.as_ref().ok_or_else(|| CliError::InvalidArgument {
                    name: "store-path",
                    message: "required when using the local store".to_string(),
                })?;
                LocalFileSystemFactory::new(path)
                    .context(StoreSnafu {})?
                    .create_object_store()
            }
            StoreKind::Temporary => {
                let factory = TemporaryFileSystemFactory::new().context(StoreSnafu {})?;
                println!("Object store root path: {}", factory.root_path().display());
                let object_store = factory.create_object_store();
                temporary = Some(factory);
                object_store
            }
            StoreKind::S3 => {
                let factory = self.s3_factory()?;
                println!("Object store bucket: {}", factory.bucket_name());
                factory.create_object_store()
            }
        }
        .context(StoreSnafu {})?;

        info!(
            table = %table,
            store = ?self.store,
            concurrency = self.concurrency,
            "Configured record store"
        );

        let client = Arc::new(ObjectStoreClient::new(object_store, table));
        let dispatcher = IngestionDispatcher::new_ulid(
            client,
            DispatcherOptions {
                capacity: self.concurrency,
            },
        )
        .context(IngestorSnafu {})?;

        Ok(IngestionPipeline {
            dispatcher,
            _temporary: temporary,
        })
    }
}

impl StoreArgs {
    fn s3_factory(&self) -> Result<AmazonS3Factory> {
        let bucket = self.bucket.as_ref().ok_or_else(|| CliError::InvalidArgument {
            name: "bucket",
            message: "required when using the s3 store".to_string(),
        })?;

        let factory = AmazonS3Factory::new(bucket);
        Ok(match &self.store_prefix {
            Some(prefix) => factory.with_prefix(prefix),
            None => factory,
        })
    }
}
