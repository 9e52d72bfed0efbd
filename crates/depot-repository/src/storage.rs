use std::path::{Path, PathBuf};

use depot_utils::{
    error::{FileSystemResult, LockError},
    fs::ensure_dir_exists,
    lock::{FileLock, FileLockManager},
};

use crate::error::{RepositoryError, Result};

/// Filesystem storage rooted at a repository directory.
#[derive(Debug, Clone)]
pub struct FilesystemStorage {
    root: PathBuf,
    lock_manager: FileLockManager,
}

impl FilesystemStorage {
    /// Creates the storage handle, creating `root` if it does not exist yet.
    pub fn new(root: impl Into<PathBuf>, lock_manager: FileLockManager) -> FileSystemResult<Self> {
        let root = root.into();
        ensure_dir_exists(&root)?;
        Ok(Self { root, lock_manager })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of `relative` inside the storage root.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative.trim_start_matches('/'))
    }

    fn lock_resource(&self) -> String {
        self.root.to_string_lossy().into_owned()
    }

    /// Exclusive lock on the storage root. Blocks until it is available.
    pub fn lock(&self) -> Result<FileLock> {
        self.lock_manager
            .acquire(&self.lock_resource())
            .map_err(|err| self.lock_error(err))
    }

    /// Exclusive lock on the storage root, or `None` if another holder has it.
    pub fn try_lock(&self) -> Result<Option<FileLock>> {
        self.lock_manager
            .try_acquire(&self.lock_resource())
            .map_err(|err| self.lock_error(err))
    }

    fn lock_error(&self, source: LockError) -> RepositoryError {
        RepositoryError::Storage {
            path: self.root.clone(),
            source,
        }
    }
}
