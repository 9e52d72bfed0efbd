use std::{env, path::PathBuf, sync::Arc};

use depot_config::config::{config_path, Config};
use depot_events::{EventSinkHandle, NullSink};
use depot_repository::{
    InitReport, MavenRepositoryProvider, ProviderContext, RepositoryRegistry,
};
use depot_utils::{lock::FileLockManager, path::resolve_path};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Config file selected by `-c`, or the default location.
pub fn resolve_config_path(custom: Option<&str>) -> CliResult<PathBuf> {
    let Some(custom) = custom else {
        return Ok(config_path());
    };

    let path = resolve_path(custom)?;
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = env::current_dir().map_err(|source| {
        CliError::Io {
            action: "retrieving current directory".to_string(),
            source,
        }
    })?;
    Ok(cwd.join(path))
}

pub struct DepotContext {
    pub config: Config,
    pub registry: Arc<RepositoryRegistry>,
    pub provider: MavenRepositoryProvider,
}

impl DepotContext {
    pub fn new(config: Config, events: EventSinkHandle) -> CliResult<Self> {
        let registry = Arc::new(RepositoryRegistry::new(events.clone()));
        let lock_manager = config
            .get_lock_dir()?
            .map(FileLockManager::new)
            .unwrap_or_else(FileLockManager::system);
        let context = ProviderContext::from_config(&config)?;
        debug!(
            "Repository base directories: {}, {}, {}",
            context.repository_base_dir.display(),
            context.remote_repository_base_dir.display(),
            context.repository_group_base_dir.display()
        );

        let provider =
            MavenRepositoryProvider::new(context, registry.clone(), lock_manager, events);

        Ok(Self {
            config,
            registry,
            provider,
        })
    }

    pub fn load(path: &std::path::Path) -> CliResult<Self> {
        let config = Config::load_from(path)?;
        Self::new(config, Arc::new(NullSink))
    }

    /// Builds and registers every configured repository.
    pub fn initialize(&self) -> InitReport {
        self.registry.initialize(&self.provider, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use depot_config::repository::ManagedRepositoryConfiguration;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_context_initializes_repositories() {
        let dir = tempdir().unwrap();
        let base = |name: &str| Some(dir.path().join(name).to_string_lossy().into_owned());
        let config = Config {
            repository_base_dir: base("repositories"),
            remote_repository_base_dir: base("remotes"),
            repository_group_base_dir: base("groups"),
            lock_dir: base("locks"),
            managed_repositories: vec![ManagedRepositoryConfiguration::new("internal", "Internal")],
            ..Config::default()
        };

        let ctx = DepotContext::new(config, Arc::new(NullSink)).unwrap();
        let report = ctx.initialize();
        assert!(report.is_clean());
        assert!(dir.path().join("repositories/internal").is_dir());
    }

    #[test]
    fn test_relative_config_path_uses_cwd() {
        let path = resolve_config_path(Some("depot.toml")).unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("depot.toml"));
    }
}
