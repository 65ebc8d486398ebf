//! Local file system object store factories.
//!
//! `LocalFileSystemFactory` stores records below an existing directory.
//!
//! `TemporaryFileSystemFactory` creates the root directory in a temporary location
//! that is removed when the factory is dropped. This is useful for development and
//! tests, where persisted records are not meant to outlive the process.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use object_store::{ObjectStore, local::LocalFileSystem};
use snafu::ResultExt;
use tempfile::TempDir;

use crate::{
    ObjectStoreFactory,
    error::{CreationSnafu, Result, RootDirectorySnafu},
};

/// Factory for creating object stores backed by the local file system.
pub struct LocalFileSystemFactory {
    root_path: PathBuf,
}

impl LocalFileSystemFactory {
    /// Create a new factory rooted at `root_path`, which must already exist.
    pub fn new(root_path: impl AsRef<Path>) -> Result<Self> {
        let canonical_path =
            std::fs::canonicalize(root_path.as_ref()).context(RootDirectorySnafu {
                store_type: "local file system",
            })?;

        Ok(Self {
            root_path: canonical_path,
        })
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

impl ObjectStoreFactory for LocalFileSystemFactory {
    fn create_object_store(&self) -> Result<Arc<dyn ObjectStore>> {
        let local_fs = LocalFileSystem::new_with_prefix(&self.root_path).context(CreationSnafu {
            store_type: "local file system",
        })?;

        Ok(Arc::new(local_fs))
    }
}

/// Factory for creating object stores in a temporary directory.
///
/// The directory, and every record written to it, is deleted when the factory is
/// dropped.
pub struct TemporaryFileSystemFactory {
    _temp_dir: TempDir,
    local_factory: LocalFileSystemFactory,
}

impl TemporaryFileSystemFactory {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new().context(RootDirectorySnafu {
            store_type: "temporary file system",
        })?;

        let local_factory = LocalFileSystemFactory::new(temp_dir.path())?;

        Ok(Self {
            _temp_dir: temp_dir,
            local_factory,
        })
    }

    pub fn root_path(&self) -> &Path {
        self.local_factory.root_path()
    }
}

impl ObjectStoreFactory for TemporaryFileSystemFactory {
    fn create_object_store(&self) -> Result<Arc<dyn ObjectStore>> {
        self.local_factory.create_object_store()
    }
}
