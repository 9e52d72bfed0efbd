use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use depot_utils::{lock::FileLockManager, uri::RepositoryUri};

use crate::{
    capabilities::MANAGED_CAPABILITIES,
    error::{RepositoryError, Result},
    repository::{EditableRepository, Repository, RepositoryCore},
    storage::FilesystemStorage,
    types::{ReleaseScheme, RepositoryType},
};

/// A locally hosted repository.
#[derive(Debug, Clone)]
pub struct ManagedRepository {
    core: RepositoryCore,
    repository_base: PathBuf,
    scanned: bool,
    block_redeployment: bool,
    active_release_schemes: BTreeSet<ReleaseScheme>,
    lock_manager: FileLockManager,
}

impl ManagedRepository {
    pub fn new(
        repository_type: RepositoryType,
        id: impl Into<String>,
        name: impl Into<String>,
        repository_base: impl Into<PathBuf>,
        lock_manager: FileLockManager,
    ) -> Self {
        Self {
            core: RepositoryCore::new(repository_type, id, name, &MANAGED_CAPABILITIES),
            repository_base: repository_base.into(),
            scanned: true,
            block_redeployment: false,
            active_release_schemes: BTreeSet::from([ReleaseScheme::Release]),
            lock_manager,
        }
    }

    pub fn repository_base(&self) -> &Path {
        &self.repository_base
    }

    /// Sets the location. Only `file:` URIs, relative references and the empty URI are
    /// accepted.
    pub fn set_location(&mut self, location: RepositoryUri) -> Result<()> {
        if let Some(scheme) = location.scheme() {
            if !location.is_file() {
                return Err(RepositoryError::UnsupportedLocation {
                    id: self.core.id().to_string(),
                    location: format!("{location} ({scheme})"),
                });
            }
        }
        self.core.set_location_unchecked(location);
        Ok(())
    }

    /// Directory holding the repository content.
    ///
    /// An absolute `file:` location is used as is, a relative one is resolved against the
    /// repository base, and an empty location maps to `<base>/<id>`.
    pub fn local_path(&self) -> PathBuf {
        self.local_path_for(self.core.location())
    }

    /// The directory this repository would use with `location`.
    pub fn local_path_for(&self, location: &RepositoryUri) -> PathBuf {
        match location {
            RepositoryUri::Empty => self.repository_base.join(self.core.id()),
            RepositoryUri::Relative(_) => {
                let relative = location.path();
                self.repository_base.join(relative.trim_start_matches('/'))
            }
            RepositoryUri::Absolute { url, .. } => {
                match location.to_file_path() {
                    Some(path) => path,
                    None => {
                        // file URI with a host, e.g. from the `file://` fallback parse
                        let host = url.host_str().unwrap_or_default();
                        let path = location.path();
                        self.repository_base
                            .join(format!("{host}{path}").trim_start_matches('/'))
                    }
                }
            }
        }
    }

    /// Storage handle rooted at [`local_path`](Self::local_path).
    pub fn storage(&self) -> Result<FilesystemStorage> {
        FilesystemStorage::new(self.local_path(), self.lock_manager.clone()).map_err(|err| {
            RepositoryError::StorageRoot {
                id: self.core.id().to_string(),
                source: err,
            }
        })
    }

    pub fn is_scanned(&self) -> bool {
        self.scanned
    }

    pub fn set_scanned(&mut self, scanned: bool) {
        self.scanned = scanned;
    }

    pub fn blocks_redeployments(&self) -> bool {
        self.block_redeployment
    }

    pub fn set_blocks_redeployment(&mut self, block: bool) {
        self.block_redeployment = block;
    }

    pub fn active_release_schemes(&self) -> &BTreeSet<ReleaseScheme> {
        &self.active_release_schemes
    }

    pub fn add_active_release_scheme(&mut self, scheme: ReleaseScheme) {
        self.active_release_schemes.insert(scheme);
    }

    pub fn remove_active_release_scheme(&mut self, scheme: ReleaseScheme) {
        self.active_release_schemes.remove(&scheme);
    }

    pub fn clear_active_release_schemes(&mut self) {
        self.active_release_schemes.clear();
    }
}

impl Repository for ManagedRepository {
    fn core(&self) -> &RepositoryCore {
        &self.core
    }
}

impl EditableRepository for ManagedRepository {
    fn core_mut(&mut self) -> &mut RepositoryCore {
        &mut self.core
    }
}

#[cfg(test)]
mod tests {
    use depot_utils::uri::to_uri;
    use tempfile::tempdir;

    use super::*;

    fn repo(base: &Path) -> ManagedRepository {
        ManagedRepository::new(
            RepositoryType::Maven,
            "internal",
            "Internal",
            base,
            FileLockManager::new(base.join(".locks")),
        )
    }

    #[test]
    fn test_local_path_empty_location() {
        let repo = repo(Path::new("/srv/depot/repositories"));
        assert_eq!(
            repo.local_path(),
            PathBuf::from("/srv/depot/repositories/internal")
        );
    }

    #[test]
    fn test_local_path_relative_location() {
        let mut repo = repo(Path::new("/srv/depot/repositories"));
        repo.set_location(to_uri("releases/internal").unwrap())
            .unwrap();
        assert_eq!(
            repo.local_path(),
            PathBuf::from("/srv/depot/repositories/releases/internal")
        );
    }

    #[test]
    fn test_local_path_absolute_location() {
        let mut repo = repo(Path::new("/srv/depot/repositories"));
        repo.set_location(to_uri("/data/repos/internal").unwrap())
            .unwrap();
        assert_eq!(repo.local_path(), PathBuf::from("/data/repos/internal"));
    }

    #[test]
    fn test_set_location_rejects_other_schemes() {
        let mut repo = repo(Path::new("/srv"));
        let result = repo.set_location(RepositoryUri::parse("https://example.com/repo").unwrap());
        assert!(matches!(
            result,
            Err(RepositoryError::UnsupportedLocation { id, .. }) if id == "internal"
        ));
        assert!(repo.location().is_empty());
    }

    #[test]
    fn test_release_schemes() {
        let mut repo = repo(Path::new("/srv"));
        assert_eq!(
            repo.active_release_schemes(),
            &BTreeSet::from([ReleaseScheme::Release])
        );

        repo.add_active_release_scheme(ReleaseScheme::Snapshot);
        repo.remove_active_release_scheme(ReleaseScheme::Release);
        assert_eq!(
            repo.active_release_schemes(),
            &BTreeSet::from([ReleaseScheme::Snapshot])
        );
    }

    #[test]
    fn test_storage_rooted_at_local_path() {
        let dir = tempdir().unwrap();
        let repo = repo(dir.path());
        let storage = repo.storage().unwrap();
        assert_eq!(storage.root(), dir.path().join("internal"));
        assert!(storage.root().is_dir());
    }
}
