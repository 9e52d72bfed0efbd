//! Translation between configuration records and live repositories.
//!
//! A [`RepositoryProvider`] builds repositories from their configuration records, applies
//! changed records to existing instances, and turns instances back into records for
//! persistence. [`MavenRepositoryProvider`] handles the Maven family.

use std::{path::PathBuf, sync::Arc};

use depot_config::{
    config::Config,
    group::RepositoryGroupConfiguration,
    repository::{ManagedRepositoryConfiguration, RemoteRepositoryConfiguration},
};
use depot_events::{EventSinkHandle, RepositoryEvent, RepositoryKind};
use depot_utils::{
    fs::ensure_dir_exists,
    lock::FileLockManager,
    time::{from_days, from_seconds, to_days, to_seconds},
    uri::{to_path, to_uri, RepositoryUri},
};
use tracing::{debug, error};
use url::Url;

use crate::{
    error::{RepositoryError, Result},
    features::{
        ArtifactCleanupFeature, IndexCreationFeature, RemoteIndexFeature,
        StagingRepositoryFeature,
    },
    group::RepositoryGroup,
    managed::ManagedRepository,
    registry::RepositoryLookup,
    remote::{PasswordCredentials, RemoteRepository},
    repository::{EditableRepository, Repository, RepositoryCore},
    staging::get_stage_repo_config,
    types::{ReleaseScheme, RepositoryType},
};

/// Base directories the provider places repositories in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderContext {
    pub repository_base_dir: PathBuf,
    pub remote_repository_base_dir: PathBuf,
    pub repository_group_base_dir: PathBuf,
}

impl ProviderContext {
    pub fn new(
        repository_base_dir: impl Into<PathBuf>,
        remote_repository_base_dir: impl Into<PathBuf>,
        repository_group_base_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            repository_base_dir: repository_base_dir.into(),
            remote_repository_base_dir: remote_repository_base_dir.into(),
            repository_group_base_dir: repository_group_base_dir.into(),
        }
    }

    /// Base directories resolved from the config, with environment overrides applied.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            repository_base_dir: config.get_repository_base_dir()?,
            remote_repository_base_dir: config.get_remote_repository_base_dir()?,
            repository_group_base_dir: config.get_repository_group_base_dir()?,
        })
    }
}

pub trait RepositoryProvider: Send + Sync {
    /// Repository types this provider handles.
    fn provides(&self) -> &[RepositoryType];

    /// A managed repository with default settings in the repository base directory.
    fn create_managed_instance_fresh(&self, id: &str, name: &str) -> ManagedRepository;

    /// A remote repository with default settings and no location.
    fn create_remote_instance_fresh(&self, id: &str, name: &str) -> RemoteRepository;

    /// An empty group. Creates the group directory.
    fn create_repository_group_fresh(&self, id: &str, name: &str) -> Result<RepositoryGroup>;

    fn create_managed_instance(
        &self,
        cfg: &ManagedRepositoryConfiguration,
    ) -> Result<ManagedRepository>;

    fn update_managed_instance(
        &self,
        repo: &mut ManagedRepository,
        cfg: &ManagedRepositoryConfiguration,
    ) -> Result<()>;

    /// Creates the staging sibling of the repository configured by `base`.
    fn create_staging_instance(
        &self,
        base: &ManagedRepositoryConfiguration,
    ) -> Result<ManagedRepository>;

    fn create_remote_instance(
        &self,
        cfg: &RemoteRepositoryConfiguration,
    ) -> Result<RemoteRepository>;

    fn update_remote_instance(
        &self,
        repo: &mut RemoteRepository,
        cfg: &RemoteRepositoryConfiguration,
    ) -> Result<()>;

    fn create_repository_group(
        &self,
        cfg: &RepositoryGroupConfiguration,
    ) -> Result<RepositoryGroup>;

    fn update_repository_group_instance(
        &self,
        group: &mut RepositoryGroup,
        cfg: &RepositoryGroupConfiguration,
    ) -> Result<()>;

    fn get_managed_configuration(
        &self,
        repo: &ManagedRepository,
    ) -> Result<ManagedRepositoryConfiguration>;

    fn get_remote_configuration(
        &self,
        repo: &RemoteRepository,
    ) -> Result<RemoteRepositoryConfiguration>;

    fn get_repository_group_configuration(
        &self,
        group: &RepositoryGroup,
    ) -> Result<RepositoryGroupConfiguration>;

    /// Publishes a lifecycle event.
    fn raise(&self, event: RepositoryEvent);
}

const MAVEN_TYPES: &[RepositoryType] = &[RepositoryType::Maven];

/// Provider for Maven 2 repositories.
pub struct MavenRepositoryProvider {
    context: ProviderContext,
    lookup: Arc<dyn RepositoryLookup>,
    lock_manager: FileLockManager,
    events: EventSinkHandle,
}

impl MavenRepositoryProvider {
    pub fn new(
        context: ProviderContext,
        lookup: Arc<dyn RepositoryLookup>,
        lock_manager: FileLockManager,
        events: EventSinkHandle,
    ) -> Self {
        Self {
            context,
            lookup,
            lock_manager,
            events,
        }
    }

    pub fn context(&self) -> &ProviderContext {
        &self.context
    }

    /// Parses the configured type and checks that this provider handles it.
    fn check_type(&self, id: &str, raw: &str) -> Result<RepositoryType> {
        let repository_type = raw.parse::<RepositoryType>().map_err(|value| {
            RepositoryError::UnknownType {
                id: id.to_string(),
                value,
            }
        })?;
        self.check_provided(id, repository_type)?;
        Ok(repository_type)
    }

    fn check_provided(&self, id: &str, repository_type: RepositoryType) -> Result<()> {
        if self.provides().contains(&repository_type) {
            Ok(())
        } else {
            error!(
                "Wrong repository type {} for repository {}",
                repository_type, id
            );
            Err(RepositoryError::UnsupportedType {
                id: id.to_string(),
                repository_type,
            })
        }
    }

    fn index_uri(&self, id: &str, raw: &str) -> Result<RepositoryUri> {
        to_uri(raw).map_err(|source| {
            RepositoryError::InvalidIndexPath {
                id: id.to_string(),
                path: raw.to_string(),
                source,
            }
        })
    }

    fn set_base_config(
        &self,
        core: &mut RepositoryCore,
        name: &str,
        description: &str,
        layout: &str,
    ) {
        core.set_base_uri(
            RepositoryUri::from_directory(&self.context.repository_base_dir).unwrap_or_default(),
        );
        let locale = core.primary_locale().to_string();
        core.set_name(&locale, name);
        core.set_description(&locale, description);
        core.set_layout(layout);
    }

    fn apply_managed(
        &self,
        repo: &mut ManagedRepository,
        cfg: &ManagedRepositoryConfiguration,
    ) -> Result<()> {
        let id = repo.id().to_string();

        let location = to_uri(&cfg.location).map_err(|source| {
            RepositoryError::InvalidLocation {
                id: id.clone(),
                location: cfg.location.clone(),
                source,
            }
        })?;
        let index_path = self.index_uri(&id, &cfg.index_dir)?;
        let packed_index_path = self.index_uri(&id, &cfg.packed_index_dir)?;

        let repo_dir = repo.local_path_for(&location);
        ensure_dir_exists(&repo_dir).map_err(|source| {
            error!(
                "Could not create directory {} for repository {}: {}",
                repo_dir.display(),
                id,
                source
            );
            RepositoryError::CreateDirectory {
                id: id.clone(),
                path: repo_dir.clone(),
                source,
            }
        })?;

        repo.set_location(location)?;
        self.set_base_config(repo.core_mut(), &cfg.name, &cfg.description, &cfg.layout);

        repo.core_mut()
            .set_scheduling_definition(&cfg.refresh_cron_expression);
        repo.set_blocks_redeployment(cfg.block_redeployments);
        repo.set_scanned(cfg.scanned);

        repo.clear_active_release_schemes();
        if cfg.releases {
            repo.add_active_release_scheme(ReleaseScheme::Release);
        }
        if cfg.snapshots {
            repo.add_active_release_scheme(ReleaseScheme::Snapshot);
        }

        let core = repo.core_mut();
        core.require_feature_mut::<StagingRepositoryFeature>()
            .set_stage_repo_needed(cfg.stage_repo_needed);

        let index = core.require_feature_mut::<IndexCreationFeature>();
        index.set_skip_packed_index_creation(cfg.skip_packed_index_creation);
        index.set_index_path(index_path);
        index.set_packed_index_path(packed_index_path);

        let cleanup = core.require_feature_mut::<ArtifactCleanupFeature>();
        cleanup.set_delete_released_snapshots(cfg.delete_released_snapshots);
        cleanup.set_retention_count(cfg.retention_count);
        cleanup.set_retention_period(from_days(cfg.retention_period));

        Ok(())
    }

    fn apply_remote(
        &self,
        repo: &mut RemoteRepository,
        cfg: &RemoteRepositoryConfiguration,
    ) -> Result<()> {
        let id = repo.id().to_string();

        let url = Url::parse(&cfg.url).map_err(|source| {
            error!("Could not set remote url {}", cfg.url);
            RepositoryError::InvalidRemoteUrl {
                id: id.clone(),
                url: cfg.url.clone(),
                source,
            }
        })?;
        let index_path = self.index_uri(&id, &cfg.index_dir)?;
        let packed_index_path = self.index_uri(&id, &cfg.packed_index_dir)?;

        self.set_base_config(repo.core_mut(), &cfg.name, &cfg.description, &cfg.layout);
        repo.set_check_path(&cfg.check_path);
        repo.core_mut()
            .set_scheduling_definition(&cfg.refresh_cron_expression);
        repo.set_location(url, &cfg.url);
        repo.set_timeout(from_seconds(cfg.timeout));

        let mut download = cfg.download_remote_index;
        let mut download_on_startup = cfg.download_remote_index_on_startup;
        let index_uri = match RepositoryUri::parse(&cfg.remote_index_url) {
            Ok(uri) => uri,
            Err(err) if download => {
                error!(
                    "Could not set remote index url {}: {}",
                    cfg.remote_index_url, err
                );
                download = false;
                download_on_startup = false;
                self.raise(RepositoryEvent::RemoteIndexDisabled {
                    id: id.clone(),
                    index_url: cfg.remote_index_url.clone(),
                });
                RepositoryUri::Empty
            }
            Err(err) => {
                debug!(
                    "Ignoring remote index url {} of {}: {}",
                    cfg.remote_index_url, id, err
                );
                RepositoryUri::Empty
            }
        };

        let remote_index = repo.core_mut().require_feature_mut::<RemoteIndexFeature>();
        remote_index.set_download_remote_index(download);
        remote_index.set_download_remote_index_on_startup(download_on_startup);
        remote_index.set_download_timeout(from_seconds(cfg.remote_download_timeout));
        remote_index.set_proxy_id(&cfg.remote_download_network_proxy_id);
        remote_index.set_index_uri(index_uri);

        repo.set_extra_headers(cfg.extra_headers.clone());
        repo.set_extra_parameters(cfg.extra_parameters.clone());

        let credentials = match (&cfg.username, &cfg.password) {
            (Some(username), Some(password)) => {
                Some(PasswordCredentials::new(username, password))
            }
            _ => None,
        };
        repo.set_credentials(credentials);

        let index = repo.core_mut().require_feature_mut::<IndexCreationFeature>();
        index.set_index_path(index_path);
        index.set_packed_index_path(packed_index_path);

        debug!("Updated remote instance {}", id);
        Ok(())
    }

    fn apply_group(
        &self,
        group: &mut RepositoryGroup,
        cfg: &RepositoryGroupConfiguration,
    ) -> Result<()> {
        let id = group.id().to_string();

        if let Some(member) = cfg
            .repositories
            .iter()
            .find(|member| self.lookup.get_managed_repository(member).is_none())
        {
            return Err(RepositoryError::UnknownGroupMember {
                group: id,
                member: member.clone(),
            });
        }

        let merged_index_path = RepositoryUri::parse(&cfg.merged_index_path).map_err(|source| {
            RepositoryError::InvalidIndexPath {
                id: id.clone(),
                path: cfg.merged_index_path.clone(),
                source,
            }
        })?;

        let core = group.core_mut();
        let locale = core.primary_locale().to_string();
        core.set_name(&locale, &cfg.name);
        core.set_scheduling_definition(&cfg.cron_expression);

        group.set_repositories(cfg.repositories.iter().cloned());
        group.set_merged_index_path(merged_index_path);
        group.set_merged_index_ttl(cfg.merged_index_ttl);
        Ok(())
    }
}

impl RepositoryProvider for MavenRepositoryProvider {
    fn provides(&self) -> &[RepositoryType] {
        MAVEN_TYPES
    }

    fn create_managed_instance_fresh(&self, id: &str, name: &str) -> ManagedRepository {
        ManagedRepository::new(
            RepositoryType::Maven,
            id,
            name,
            &self.context.repository_base_dir,
            self.lock_manager.clone(),
        )
    }

    fn create_remote_instance_fresh(&self, id: &str, name: &str) -> RemoteRepository {
        RemoteRepository::new(
            RepositoryType::Maven,
            id,
            name,
            &self.context.remote_repository_base_dir,
        )
    }

    fn create_repository_group_fresh(&self, id: &str, name: &str) -> Result<RepositoryGroup> {
        RepositoryGroup::new(
            RepositoryType::Maven,
            id,
            name,
            &self.context.repository_group_base_dir,
            self.lock_manager.clone(),
        )
    }

    fn create_managed_instance(
        &self,
        cfg: &ManagedRepositoryConfiguration,
    ) -> Result<ManagedRepository> {
        let repository_type = self.check_type(&cfg.id, &cfg.repository_type)?;
        let mut repo = ManagedRepository::new(
            repository_type,
            &cfg.id,
            &cfg.name,
            &self.context.repository_base_dir,
            self.lock_manager.clone(),
        );
        self.apply_managed(&mut repo, cfg)?;
        self.raise(RepositoryEvent::Created {
            id: cfg.id.clone(),
            kind: RepositoryKind::Managed,
        });
        Ok(repo)
    }

    fn update_managed_instance(
        &self,
        repo: &mut ManagedRepository,
        cfg: &ManagedRepositoryConfiguration,
    ) -> Result<()> {
        self.apply_managed(repo, cfg)?;
        self.raise(RepositoryEvent::Updated {
            id: repo.id().to_string(),
            kind: RepositoryKind::Managed,
        });
        Ok(())
    }

    fn create_staging_instance(
        &self,
        base: &ManagedRepositoryConfiguration,
    ) -> Result<ManagedRepository> {
        debug!("Creating staging instance for {}", base.id);
        let repo = self.create_managed_instance(&get_stage_repo_config(base))?;
        self.raise(RepositoryEvent::StagingCreated {
            base_id: base.id.clone(),
            staging_id: repo.id().to_string(),
        });
        Ok(repo)
    }

    fn create_remote_instance(
        &self,
        cfg: &RemoteRepositoryConfiguration,
    ) -> Result<RemoteRepository> {
        let repository_type = self.check_type(&cfg.id, &cfg.repository_type)?;
        let mut repo = RemoteRepository::new(
            repository_type,
            &cfg.id,
            &cfg.name,
            &self.context.remote_repository_base_dir,
        );
        self.apply_remote(&mut repo, cfg)?;
        self.raise(RepositoryEvent::Created {
            id: cfg.id.clone(),
            kind: RepositoryKind::Remote,
        });
        Ok(repo)
    }

    fn update_remote_instance(
        &self,
        repo: &mut RemoteRepository,
        cfg: &RemoteRepositoryConfiguration,
    ) -> Result<()> {
        self.apply_remote(repo, cfg)?;
        self.raise(RepositoryEvent::Updated {
            id: repo.id().to_string(),
            kind: RepositoryKind::Remote,
        });
        Ok(())
    }

    fn create_repository_group(
        &self,
        cfg: &RepositoryGroupConfiguration,
    ) -> Result<RepositoryGroup> {
        let repository_type = self.check_type(&cfg.id, &cfg.repository_type)?;
        let mut group = RepositoryGroup::new(
            repository_type,
            &cfg.id,
            &cfg.id,
            &self.context.repository_group_base_dir,
            self.lock_manager.clone(),
        )?;
        self.apply_group(&mut group, cfg)?;
        self.raise(RepositoryEvent::Created {
            id: cfg.id.clone(),
            kind: RepositoryKind::Group,
        });
        Ok(group)
    }

    fn update_repository_group_instance(
        &self,
        group: &mut RepositoryGroup,
        cfg: &RepositoryGroupConfiguration,
    ) -> Result<()> {
        self.apply_group(group, cfg)?;
        self.raise(RepositoryEvent::Updated {
            id: group.id().to_string(),
            kind: RepositoryKind::Group,
        });
        Ok(())
    }

    fn get_managed_configuration(
        &self,
        repo: &ManagedRepository,
    ) -> Result<ManagedRepositoryConfiguration> {
        self.check_provided(repo.id(), repo.repository_type())?;

        let staging = repo.core().require_feature::<StagingRepositoryFeature>();
        let index = repo.core().require_feature::<IndexCreationFeature>();
        let cleanup = repo.core().require_feature::<ArtifactCleanupFeature>();
        let schemes = repo.active_release_schemes();

        Ok(ManagedRepositoryConfiguration {
            id: repo.id().to_string(),
            repository_type: repo.repository_type().to_string(),
            name: repo.name().to_string(),
            description: repo.description().to_string(),
            layout: repo.layout().to_string(),
            location: to_path(repo.location()),
            index_dir: to_path(index.index_path()),
            packed_index_dir: to_path(index.packed_index_path()),
            refresh_cron_expression: repo.scheduling_definition().to_string(),
            releases: schemes.contains(&ReleaseScheme::Release),
            snapshots: schemes.contains(&ReleaseScheme::Snapshot),
            scanned: repo.is_scanned(),
            block_redeployments: repo.blocks_redeployments(),
            stage_repo_needed: staging.is_stage_repo_needed(),
            skip_packed_index_creation: index.is_skip_packed_index_creation(),
            delete_released_snapshots: cleanup.is_delete_released_snapshots(),
            retention_count: cleanup.retention_count(),
            retention_period: to_days(cleanup.retention_period()),
        })
    }

    fn get_remote_configuration(
        &self,
        repo: &RemoteRepository,
    ) -> Result<RemoteRepositoryConfiguration> {
        self.check_provided(repo.id(), repo.repository_type())?;

        let index = repo.core().require_feature::<IndexCreationFeature>();
        let remote_index = repo.core().require_feature::<RemoteIndexFeature>();
        let credentials = repo.credentials();

        Ok(RemoteRepositoryConfiguration {
            id: repo.id().to_string(),
            repository_type: repo.repository_type().to_string(),
            name: repo.name().to_string(),
            description: repo.description().to_string(),
            layout: repo.layout().to_string(),
            url: repo.location().to_string(),
            username: credentials.map(|c| c.username().to_string()),
            password: credentials.map(|c| c.password().to_string()),
            timeout: to_seconds(repo.timeout()),
            check_path: repo.check_path().to_string(),
            refresh_cron_expression: repo.scheduling_definition().to_string(),
            download_remote_index: remote_index.is_download_remote_index(),
            remote_index_url: remote_index.index_uri().to_string(),
            remote_download_network_proxy_id: remote_index.proxy_id().to_string(),
            remote_download_timeout: to_seconds(remote_index.download_timeout()),
            download_remote_index_on_startup: remote_index.is_download_remote_index_on_startup(),
            index_dir: to_path(index.index_path()),
            packed_index_dir: to_path(index.packed_index_path()),
            extra_parameters: repo.extra_parameters().clone(),
            extra_headers: repo.extra_headers().clone(),
        })
    }

    fn get_repository_group_configuration(
        &self,
        group: &RepositoryGroup,
    ) -> Result<RepositoryGroupConfiguration> {
        self.check_provided(group.id(), group.repository_type())?;

        Ok(RepositoryGroupConfiguration {
            id: group.id().to_string(),
            repository_type: group.repository_type().to_string(),
            name: group.name().to_string(),
            repositories: group.repository_ids().to_vec(),
            merged_index_path: to_path(group.merged_index_path()),
            merged_index_ttl: group.merged_index_ttl(),
            cron_expression: group.scheduling_definition().to_string(),
        })
    }

    fn raise(&self, event: RepositoryEvent) {
        self.events.emit(event);
    }
}
