//! Amazon S3 object store factory.
//!
//! Credentials, region and endpoint are read from the standard `AWS_*`
//! environment variables by the `object_store` builder.

use std::sync::Arc;

use object_store::{
    ObjectStore,
    aws::{AmazonS3Builder, S3CopyIfNotExists},
    prefix::PrefixStore,
};
use snafu::ResultExt;

use crate::{
    ObjectStoreFactory,
    error::{CreationSnafu, Result},
};

/// Factory for creating object stores backed by an S3 bucket.
#[derive(Debug, Clone)]
pub struct AmazonS3Factory {
    bucket_name: String,
    prefix: Option<String>,
}

impl AmazonS3Factory {
    pub fn new(bucket_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            prefix: None,
        }
    }

    /// Write every object below `prefix` inside the bucket.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }
}

impl ObjectStoreFactory for AmazonS3Factory {
    fn create_object_store(&self) -> Result<Arc<dyn ObjectStore>> {
        let store = AmazonS3Builder::from_env()
            .with_bucket_name(&self.bucket_name)
            .with_copy_if_not_exists(S3CopyIfNotExists::Multipart)
            .build()
            .context(CreationSnafu {
                store_type: "AWS S3",
            })?;

        let Some(prefix) = &self.prefix else {
            return Ok(Arc::new(store));
        };

        let store = PrefixStore::new(store, prefix.as_str());
        Ok(Arc::new(store))
    }
}
