//! Directory locks backed by `flock`.
//!
//! A [`FileLockManager`] owns a directory of `.lock` files, one per locked resource. Storage
//! handles receive the manager at construction and lock their root through it.

use std::{
    fs::{File, OpenOptions},
    path::{Path, PathBuf},
};

use tracing::trace;

use crate::{
    error::{LockError, LockResult},
    fs::ensure_dir_exists,
};

/// An exclusive lock on a resource, released when dropped.
pub struct FileLock {
    _file: nix::fcntl::Flock<File>,
    path: PathBuf,
}

impl FileLock {
    /// Path of the `.lock` file backing this lock.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for FileLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLock").field("path", &self.path).finish()
    }
}

/// Hands out [`FileLock`]s for resources, keyed by name.
#[derive(Debug, Clone)]
pub struct FileLockManager {
    lock_dir: PathBuf,
}

impl FileLockManager {
    pub fn new<P: Into<PathBuf>>(lock_dir: P) -> Self {
        Self {
            lock_dir: lock_dir.into(),
        }
    }

    /// Lock manager in `$XDG_RUNTIME_DIR/depot/locks`, or the temp dir when unset.
    pub fn system() -> Self {
        let base = std::env::var("XDG_RUNTIME_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir());
        Self::new(base.join("depot").join("locks"))
    }

    pub fn lock_dir(&self) -> &Path {
        &self.lock_dir
    }

    /// Lock file path for a resource. Separators and other unsafe characters become `_`, so
    /// `/srv/repos/internal` maps to `_srv_repos_internal.lock`.
    pub fn lock_path(&self, resource: &str) -> PathBuf {
        let sanitized = resource
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect::<String>();

        self.lock_dir.join(format!("{sanitized}.lock"))
    }

    fn open(&self, resource: &str) -> LockResult<(PathBuf, File)> {
        ensure_dir_exists(&self.lock_dir)
            .map_err(|err| LockError::AcquireFailed(err.to_string()))?;

        let lock_path = self.lock_path(resource);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;
        Ok((lock_path, file))
    }

    /// Acquire an exclusive lock, blocking until it is available.
    pub fn acquire(&self, resource: &str) -> LockResult<FileLock> {
        let (path, file) = self.open(resource)?;

        let file = nix::fcntl::Flock::lock(file, nix::fcntl::FlockArg::LockExclusive).map_err(
            |(_, err)| LockError::AcquireFailed(format!("{}: {}", path.display(), err)),
        )?;

        trace!("Acquired lock {}", path.display());
        Ok(FileLock {
            _file: file,
            path,
        })
    }

    /// Try to acquire an exclusive lock without blocking.
    ///
    /// Returns `None` if the lock is already held.
    pub fn try_acquire(&self, resource: &str) -> LockResult<Option<FileLock>> {
        let (path, file) = self.open(resource)?;

        match nix::fcntl::Flock::lock(file, nix::fcntl::FlockArg::LockExclusiveNonblock) {
            Ok(file) => {
                Ok(Some(FileLock {
                    _file: file,
                    path,
                }))
            }
            Err((_, err)) => {
                if matches!(err, nix::errno::Errno::EWOULDBLOCK) {
                    return Ok(None);
                }
                Err(LockError::AcquireFailed(format!(
                    "{}: {}",
                    path.display(),
                    err
                )))
            }
        }
    }
}

impl Default for FileLockManager {
    fn default() -> Self {
        Self::system()
    }
}

#[cfg(test)]
mod tests {
    use std::{thread, time::Duration};

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_lock_path_sanitization() {
        let manager = FileLockManager::new("/run/depot/locks");
        let path = manager.lock_path("/srv/repos/internal");
        assert_eq!(
            path,
            PathBuf::from("/run/depot/locks/_srv_repos_internal.lock")
        );
    }

    #[test]
    fn test_exclusive_lock() {
        let dir = tempdir().unwrap();
        let manager = FileLockManager::new(dir.path().join("locks"));

        let lock1 = manager.acquire("internal").unwrap();
        assert!(manager.try_acquire("internal").unwrap().is_none());

        drop(lock1);

        assert!(manager.try_acquire("internal").unwrap().is_some());
    }

    #[test]
    fn test_locks_on_different_resources() {
        let dir = tempdir().unwrap();
        let manager = FileLockManager::new(dir.path());

        let lock1 = manager.acquire("internal").unwrap();
        let lock2 = manager.acquire("snapshots").unwrap();
        assert_ne!(lock1.path(), lock2.path());
    }

    #[test]
    fn test_lock_blocks_until_released() {
        let dir = tempdir().unwrap();
        let manager = FileLockManager::new(dir.path());

        let lock1 = manager.acquire("blocking").unwrap();
        let path = lock1.path().to_path_buf();

        let other = manager.clone();
        let handle = thread::spawn(move || {
            let lock2 = other.acquire("blocking").unwrap();
            assert_eq!(lock2.path(), path.as_path());
        });

        thread::sleep(Duration::from_millis(100));
        drop(lock1);

        handle.join().unwrap();
    }
}
