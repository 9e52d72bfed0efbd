use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use depot_utils::{lock::FileLockManager, uri::RepositoryUri};
use tracing::warn;

use crate::{
    capabilities::GROUP_CAPABILITIES,
    error::{RepositoryError, Result},
    managed::ManagedRepository,
    registry::RepositoryLookup,
    repository::{EditableRepository, Repository, RepositoryCore},
    storage::FilesystemStorage,
    types::RepositoryType,
};

pub const DEFAULT_MERGED_INDEX_TTL: u32 = 30;

/// A virtual repository presenting an ordered merge of managed repositories.
///
/// Members are kept as ids and resolved through a [`RepositoryLookup`] when needed, so a
/// group never keeps a member alive.
#[derive(Debug, Clone)]
pub struct RepositoryGroup {
    core: RepositoryCore,
    repositories: Vec<String>,
    merged_index_path: RepositoryUri,
    merged_index_ttl: u32,
    storage: FilesystemStorage,
}

impl RepositoryGroup {
    /// Creates the group and its storage directory `<repository_base>/<id>`.
    pub fn new(
        repository_type: RepositoryType,
        id: impl Into<String>,
        name: impl Into<String>,
        repository_base: &Path,
        lock_manager: FileLockManager,
    ) -> Result<Self> {
        let core = RepositoryCore::new(repository_type, id, name, &GROUP_CAPABILITIES);
        let root = repository_base.join(core.id());

        let storage = FilesystemStorage::new(&root, lock_manager).map_err(|err| {
            RepositoryError::CreateDirectory {
                id: core.id().to_string(),
                path: root.clone(),
                source: err,
            }
        })?;

        let mut group = Self {
            core,
            repositories: Vec::new(),
            merged_index_path: RepositoryUri::Relative(".indexer".to_string()),
            merged_index_ttl: DEFAULT_MERGED_INDEX_TTL,
            storage,
        };
        if let Some(location) = RepositoryUri::from_directory(&root) {
            group.core.set_location_unchecked(location);
        }
        Ok(group)
    }

    pub fn storage(&self) -> &FilesystemStorage {
        &self.storage
    }

    pub fn local_path(&self) -> PathBuf {
        self.storage.root().to_path_buf()
    }

    /// Member ids in merge order. Duplicates are kept.
    pub fn repository_ids(&self) -> &[String] {
        &self.repositories
    }

    /// Replaces the member list.
    pub fn set_repositories<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.repositories = ids.into_iter().map(Into::into).collect();
    }

    pub fn add_repository(&mut self, id: impl Into<String>) {
        self.repositories.push(id.into());
    }

    pub fn remove_repository(&mut self, id: &str) {
        self.repositories.retain(|member| member != id);
    }

    /// Resolves the member ids in order. Ids without a registered repository are skipped.
    pub fn members(&self, lookup: &dyn RepositoryLookup) -> Vec<Arc<ManagedRepository>> {
        self.repositories
            .iter()
            .filter_map(|id| {
                let member = lookup.get_managed_repository(id);
                if member.is_none() {
                    warn!(
                        "Group {} references repository {} which is not registered",
                        self.core.id(),
                        id
                    );
                }
                member
            })
            .collect()
    }

    pub fn merged_index_path(&self) -> &RepositoryUri {
        &self.merged_index_path
    }

    pub fn set_merged_index_path(&mut self, path: RepositoryUri) {
        self.merged_index_path = path;
    }

    /// Time to live of the merged index in minutes.
    pub fn merged_index_ttl(&self) -> u32 {
        self.merged_index_ttl
    }

    pub fn set_merged_index_ttl(&mut self, ttl: u32) {
        self.merged_index_ttl = ttl;
    }
}

impl Repository for RepositoryGroup {
    fn core(&self) -> &RepositoryCore {
        &self.core
    }
}

impl EditableRepository for RepositoryGroup {
    fn core_mut(&mut self) -> &mut RepositoryCore {
        &mut self.core
    }
}
