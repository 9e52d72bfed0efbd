//! In-memory catalog of live repository instances.

use std::{
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use depot_config::{config::Config, repository::ManagedRepositoryConfiguration};
use depot_events::{EventSinkHandle, RepositoryEvent, RepositoryKind};
use tracing::{debug, error, info};

use crate::{
    error::{RepositoryError, Result},
    features::StagingRepositoryFeature,
    group::RepositoryGroup,
    managed::ManagedRepository,
    provider::RepositoryProvider,
    remote::RemoteRepository,
    repository::{EditableRepository, Repository},
};

/// Resolves managed repositories by id.
///
/// Groups hold member ids only and use this to reach the members.
pub trait RepositoryLookup: Send + Sync {
    fn get_managed_repository(&self, id: &str) -> Option<Arc<ManagedRepository>>;
}

/// A registered repository of any kind.
#[derive(Debug, Clone)]
pub enum RepositoryRef {
    Managed(Arc<ManagedRepository>),
    Remote(Arc<RemoteRepository>),
    Group(Arc<RepositoryGroup>),
}

impl RepositoryRef {
    pub fn id(&self) -> &str {
        match self {
            RepositoryRef::Managed(repo) => repo.id(),
            RepositoryRef::Remote(repo) => repo.id(),
            RepositoryRef::Group(group) => group.id(),
        }
    }

    pub fn kind(&self) -> RepositoryKind {
        match self {
            RepositoryRef::Managed(_) => RepositoryKind::Managed,
            RepositoryRef::Remote(_) => RepositoryKind::Remote,
            RepositoryRef::Group(_) => RepositoryKind::Group,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            RepositoryRef::Managed(repo) => repo.name(),
            RepositoryRef::Remote(repo) => repo.name(),
            RepositoryRef::Group(group) => group.name(),
        }
    }
}

#[derive(Default)]
struct Catalog {
    managed: BTreeMap<String, Arc<ManagedRepository>>,
    remote: BTreeMap<String, Arc<RemoteRepository>>,
    groups: BTreeMap<String, Arc<RepositoryGroup>>,
}

impl Catalog {
    fn kind_of(&self, id: &str) -> Option<RepositoryKind> {
        if self.managed.contains_key(id) {
            Some(RepositoryKind::Managed)
        } else if self.remote.contains_key(id) {
            Some(RepositoryKind::Remote)
        } else if self.groups.contains_key(id) {
            Some(RepositoryKind::Group)
        } else {
            None
        }
    }

    fn check_free(&self, id: &str, kind: RepositoryKind) -> Result<()> {
        match self.kind_of(id) {
            Some(existing) if existing != kind => {
                Err(RepositoryError::DuplicateId {
                    id: id.to_string(),
                    existing,
                })
            }
            _ => Ok(()),
        }
    }
}

/// A repository that could not be brought up during [`RepositoryRegistry::initialize`].
#[derive(Debug)]
pub struct InitFailure {
    pub id: String,
    pub kind: RepositoryKind,
    pub error: RepositoryError,
}

/// Outcome of [`RepositoryRegistry::initialize`].
#[derive(Debug, Default)]
pub struct InitReport {
    /// Ids registered, in registration order.
    pub registered: Vec<String>,
    pub failures: Vec<InitFailure>,
}

impl InitReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Thread-safe catalog of managed repositories, remote repositories and groups.
///
/// Ids are unique across all three kinds. Registering an instance under an id already used
/// by the same kind replaces the previous instance.
pub struct RepositoryRegistry {
    catalog: RwLock<Catalog>,
    events: EventSinkHandle,
}

impl RepositoryRegistry {
    pub fn new(events: EventSinkHandle) -> Self {
        Self {
            catalog: RwLock::new(Catalog::default()),
            events,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Catalog> {
        self.catalog.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Catalog> {
        self.catalog.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn registered(&self, id: &str, kind: RepositoryKind) {
        debug!("Registered {} repository {}", kind, id);
        self.events.emit(RepositoryEvent::Registered {
            id: id.to_string(),
            kind,
        });
    }

    pub fn put_managed_repository(
        &self,
        repo: ManagedRepository,
    ) -> Result<Arc<ManagedRepository>> {
        let repo = Arc::new(repo);
        let id = repo.id().to_string();
        {
            let mut catalog = self.write();
            catalog.check_free(&id, RepositoryKind::Managed)?;
            catalog.managed.insert(id.clone(), Arc::clone(&repo));
        }
        self.registered(&id, RepositoryKind::Managed);
        Ok(repo)
    }

    pub fn put_remote_repository(
        &self,
        repo: RemoteRepository,
    ) -> Result<Arc<RemoteRepository>> {
        let repo = Arc::new(repo);
        let id = repo.id().to_string();
        {
            let mut catalog = self.write();
            catalog.check_free(&id, RepositoryKind::Remote)?;
            catalog.remote.insert(id.clone(), Arc::clone(&repo));
        }
        self.registered(&id, RepositoryKind::Remote);
        Ok(repo)
    }

    pub fn put_repository_group(&self, group: RepositoryGroup) -> Result<Arc<RepositoryGroup>> {
        let group = Arc::new(group);
        let id = group.id().to_string();
        {
            let mut catalog = self.write();
            catalog.check_free(&id, RepositoryKind::Group)?;
            catalog.groups.insert(id.clone(), Arc::clone(&group));
        }
        self.registered(&id, RepositoryKind::Group);
        Ok(group)
    }

    /// Drops the repository registered under `id`, whatever its kind.
    pub fn remove(&self, id: &str) -> Result<RepositoryRef> {
        let removed = {
            let mut catalog = self.write();
            if let Some(repo) = catalog.managed.remove(id) {
                RepositoryRef::Managed(repo)
            } else if let Some(repo) = catalog.remote.remove(id) {
                RepositoryRef::Remote(repo)
            } else if let Some(group) = catalog.groups.remove(id) {
                RepositoryRef::Group(group)
            } else {
                return Err(RepositoryError::UnknownRepository(id.to_string()));
            }
        };

        debug!("Removed {} repository {}", removed.kind(), id);
        self.events.emit(RepositoryEvent::Removed {
            id: id.to_string(),
            kind: removed.kind(),
        });
        Ok(removed)
    }

    pub fn get_remote_repository(&self, id: &str) -> Option<Arc<RemoteRepository>> {
        self.read().remote.get(id).cloned()
    }

    pub fn get_repository_group(&self, id: &str) -> Option<Arc<RepositoryGroup>> {
        self.read().groups.get(id).cloned()
    }

    pub fn get_repository(&self, id: &str) -> Option<RepositoryRef> {
        let catalog = self.read();
        catalog
            .managed
            .get(id)
            .cloned()
            .map(RepositoryRef::Managed)
            .or_else(|| catalog.remote.get(id).cloned().map(RepositoryRef::Remote))
            .or_else(|| catalog.groups.get(id).cloned().map(RepositoryRef::Group))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().kind_of(id).is_some()
    }

    pub fn managed_ids(&self) -> Vec<String> {
        self.read().managed.keys().cloned().collect()
    }

    pub fn remote_ids(&self) -> Vec<String> {
        self.read().remote.keys().cloned().collect()
    }

    pub fn group_ids(&self) -> Vec<String> {
        self.read().groups.keys().cloned().collect()
    }

    /// All registered repositories: managed first, then remote, then groups, each sorted by id.
    pub fn repositories(&self) -> Vec<RepositoryRef> {
        let catalog = self.read();
        catalog
            .managed
            .values()
            .cloned()
            .map(RepositoryRef::Managed)
            .chain(catalog.remote.values().cloned().map(RepositoryRef::Remote))
            .chain(catalog.groups.values().cloned().map(RepositoryRef::Group))
            .collect()
    }

    pub fn len(&self) -> usize {
        let catalog = self.read();
        catalog.managed.len() + catalog.remote.len() + catalog.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds and registers every repository in `config`.
    ///
    /// Managed repositories come first, together with their staging siblings, so groups can
    /// resolve them. A repository that fails is reported and skipped; the rest still come up.
    pub fn initialize<P: RepositoryProvider + ?Sized>(
        &self,
        provider: &P,
        config: &Config,
    ) -> InitReport {
        let mut report = InitReport::default();

        for cfg in &config.managed_repositories {
            let result = self.initialize_managed(provider, cfg, &mut report);
            report.record(&cfg.id, RepositoryKind::Managed, result);
        }

        for cfg in &config.remote_repositories {
            let result = provider
                .create_remote_instance(cfg)
                .and_then(|repo| self.put_remote_repository(repo))
                .map(|_| ());
            report.record(&cfg.id, RepositoryKind::Remote, result);
        }

        for cfg in &config.repository_groups {
            let result = provider
                .create_repository_group(cfg)
                .and_then(|group| self.put_repository_group(group))
                .map(|_| ());
            report.record(&cfg.id, RepositoryKind::Group, result);
        }

        info!(
            "Initialized {} repositories, {} failed",
            report.registered.len(),
            report.failures.len()
        );
        report
    }

    fn initialize_managed<P: RepositoryProvider + ?Sized>(
        &self,
        provider: &P,
        cfg: &ManagedRepositoryConfiguration,
        report: &mut InitReport,
    ) -> Result<()> {
        let mut repo = provider.create_managed_instance(cfg)?;

        if cfg.stage_repo_needed {
            let stage = provider.create_staging_instance(cfg)?;
            let stage = self.put_managed_repository(stage)?;
            report.registered.push(stage.id().to_string());

            if let Some(feature) = repo.feature_mut::<StagingRepositoryFeature>() {
                feature.set_staging_repository(Some(stage.id().to_string()));
            }
        }

        self.put_managed_repository(repo)?;
        Ok(())
    }
}

impl InitReport {
    fn record(&mut self, id: &str, kind: RepositoryKind, result: Result<()>) {
        match result {
            Ok(()) => self.registered.push(id.to_string()),
            Err(err) => {
                error!("Could not initialize {} repository {}: {}", kind, id, err);
                self.failures.push(InitFailure {
                    id: id.to_string(),
                    kind,
                    error: err,
                });
            }
        }
    }
}

impl RepositoryLookup for RepositoryRegistry {
    fn get_managed_repository(&self, id: &str) -> Option<Arc<ManagedRepository>> {
        self.read().managed.get(id).cloned()
    }
}
