use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use depot_utils::path::{resolve_path, xdg_config_home, xdg_data_home};
use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};
use toml_edit::DocumentMut;
use tracing::{debug, info};

use crate::{
    annotations::{annotate_toml_array_of_tables, annotate_toml_table},
    error::{ConfigError, Result},
    group::RepositoryGroupConfiguration,
    repository::{ManagedRepositoryConfiguration, RemoteRepositoryConfiguration},
};

pub const CONFIG_ENV: &str = "DEPOT_CONFIG";
pub const REPOSITORY_BASE_ENV: &str = "DEPOT_REPOSITORY_BASE";
pub const REMOTE_BASE_ENV: &str = "DEPOT_REMOTE_BASE";
pub const GROUP_BASE_ENV: &str = "DEPOT_GROUP_BASE";

/// Repository manager configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, Documented, DocumentedFields)]
#[serde(default)]
pub struct Config {
    /// Base directory of managed repositories. Relative repository locations are resolved
    /// against it.
    /// Default: $XDG_DATA_HOME/depot/repositories
    pub repository_base_dir: Option<String>,

    /// Base directory for the local caches of remote repositories.
    /// Default: $XDG_DATA_HOME/depot/remotes
    pub remote_repository_base_dir: Option<String>,

    /// Base directory of repository groups.
    /// Default: $XDG_DATA_HOME/depot/groups
    pub repository_group_base_dir: Option<String>,

    /// Directory holding the storage lock files.
    /// Default: $XDG_RUNTIME_DIR/depot/locks
    pub lock_dir: Option<String>,

    /// Locally hosted repositories.
    pub managed_repositories: Vec<ManagedRepositoryConfiguration>,

    /// Proxied remote repositories.
    pub remote_repositories: Vec<RemoteRepositoryConfiguration>,

    /// Virtual repositories merging managed repositories.
    pub repository_groups: Vec<RepositoryGroupConfiguration>,
}

/// Location of the config file: `$DEPOT_CONFIG`, or `$XDG_CONFIG_HOME/depot/config.toml`.
pub fn config_path() -> PathBuf {
    match std::env::var(CONFIG_ENV) {
        Ok(path) => PathBuf::from(path),
        Err(_) => xdg_config_home().join("depot").join("config.toml"),
    }
}

fn data_root() -> String {
    format!("{}/depot", xdg_data_home().display())
}

impl Config {
    pub fn default_config() -> Self {
        let root = data_root();

        let internal = ManagedRepositoryConfiguration {
            description: "Repository for internal releases".to_string(),
            index_dir: ".indexer".to_string(),
            packed_index_dir: ".index".to_string(),
            ..ManagedRepositoryConfiguration::new("internal", "Internal Repository")
        };

        let snapshots = ManagedRepositoryConfiguration {
            description: "Repository for internal snapshots".to_string(),
            releases: false,
            snapshots: true,
            refresh_cron_expression: "0 0,30 * * * ?".to_string(),
            index_dir: ".indexer".to_string(),
            packed_index_dir: ".index".to_string(),
            ..ManagedRepositoryConfiguration::new("snapshots", "Internal Snapshot Repository")
        };

        let central = RemoteRepositoryConfiguration {
            description: "Maven Central".to_string(),
            remote_index_url: ".index".to_string(),
            index_dir: ".indexer".to_string(),
            ..RemoteRepositoryConfiguration::new(
                "central",
                "Central Repository",
                "https://repo.maven.apache.org/maven2",
            )
        };

        let public = RepositoryGroupConfiguration {
            name: "Public Group".to_string(),
            ..RepositoryGroupConfiguration::new("public", ["internal", "snapshots"])
        };

        Self {
            repository_base_dir: Some(format!("{root}/repositories")),
            remote_repository_base_dir: Some(format!("{root}/remotes")),
            repository_group_base_dir: Some(format!("{root}/groups")),
            lock_dir: None,
            managed_repositories: vec![internal, snapshots],
            remote_repositories: vec![central],
            repository_groups: vec![public],
        }
    }

    /// Loads the config from [`config_path`].
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Loads the config from `path`, falling back to the default config when the file
    /// does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                Self::default_config()
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;

        Ok(config)
    }

    /// Validates the repository records: every id is non-empty and unique across managed
    /// repositories, remote repositories and groups.
    pub fn resolve(&mut self) -> Result<()> {
        let mut seen = HashSet::new();

        let ids = self
            .managed_repositories
            .iter()
            .map(|r| ("managed", r.id.as_str()))
            .chain(
                self.remote_repositories
                    .iter()
                    .map(|r| ("remote", r.id.as_str())),
            )
            .chain(
                self.repository_groups
                    .iter()
                    .map(|g| ("group", g.id.as_str())),
            );

        for (kind, id) in ids {
            if id.trim().is_empty() {
                return Err(ConfigError::EmptyRepositoryId { kind });
            }
            if !seen.insert(id) {
                return Err(ConfigError::DuplicateRepositoryId(id.to_string()));
            }
        }

        Ok(())
    }

    pub fn get_repository_base_dir(&self) -> Result<PathBuf> {
        Self::base_dir(
            REPOSITORY_BASE_ENV,
            self.repository_base_dir.as_deref(),
            "repositories",
        )
    }

    pub fn get_remote_repository_base_dir(&self) -> Result<PathBuf> {
        Self::base_dir(
            REMOTE_BASE_ENV,
            self.remote_repository_base_dir.as_deref(),
            "remotes",
        )
    }

    pub fn get_repository_group_base_dir(&self) -> Result<PathBuf> {
        Self::base_dir(
            GROUP_BASE_ENV,
            self.repository_group_base_dir.as_deref(),
            "groups",
        )
    }

    fn base_dir(env_var: &str, configured: Option<&str>, fallback: &str) -> Result<PathBuf> {
        if let Ok(env_path) = std::env::var(env_var) {
            return Ok(resolve_path(&env_path)?);
        }
        if let Some(path) = configured {
            return Ok(resolve_path(path)?);
        }
        Ok(resolve_path(&format!("{}/{fallback}", data_root()))?)
    }

    pub fn get_lock_dir(&self) -> Result<Option<PathBuf>> {
        self.lock_dir
            .as_deref()
            .map(resolve_path)
            .transpose()
            .map_err(ConfigError::from)
    }

    pub fn get_managed(&self, id: &str) -> Option<&ManagedRepositoryConfiguration> {
        self.managed_repositories.iter().find(|r| r.id == id)
    }

    pub fn get_remote(&self, id: &str) -> Option<&RemoteRepositoryConfiguration> {
        self.remote_repositories.iter().find(|r| r.id == id)
    }

    pub fn get_group(&self, id: &str) -> Option<&RepositoryGroupConfiguration> {
        self.repository_groups.iter().find(|g| g.id == id)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let serialized = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serialized)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    pub fn to_annotated_document(&self) -> Result<DocumentMut> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut doc = toml_string.parse::<DocumentMut>()?;

        annotate_toml_table::<Config>(doc.as_table_mut(), true)?;

        if let Some(array) = doc
            .get_mut("managed_repositories")
            .and_then(|item| item.as_array_of_tables_mut())
        {
            annotate_toml_array_of_tables::<ManagedRepositoryConfiguration>(array)?;
        }

        if let Some(array) = doc
            .get_mut("remote_repositories")
            .and_then(|item| item.as_array_of_tables_mut())
        {
            annotate_toml_array_of_tables::<RemoteRepositoryConfiguration>(array)?;
        }

        if let Some(array) = doc
            .get_mut("repository_groups")
            .and_then(|item| item.as_array_of_tables_mut())
        {
            annotate_toml_array_of_tables::<RepositoryGroupConfiguration>(array)?;
        }

        Ok(doc)
    }
}

/// Writes the annotated default config to `path`. Refuses to overwrite an existing file.
pub fn generate_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(ConfigError::ConfigAlreadyExists(path.to_path_buf()));
    }

    let annotated_doc = Config::default_config().to_annotated_document()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, annotated_doc.to_string())?;
    info!(
        "Default configuration file generated with documentation at: {}",
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use tempfile::tempdir;

    use super::*;
    use crate::test_utils::EnvGuard;

    #[test]
    fn test_default_config_creation() {
        let config = Config::default_config();

        assert!(config.get_managed("internal").is_some());
        assert!(config.get_managed("snapshots").is_some_and(|r| r.snapshots));
        assert!(config.get_remote("central").is_some());
        assert_eq!(
            config.get_group("public").map(|g| g.repositories.len()),
            Some(2)
        );
    }

    #[test]
    fn test_default_config_resolves() {
        let mut config = Config::default_config();
        assert!(config.resolve().is_ok());
    }

    #[test]
    fn test_resolve_duplicate_across_kinds() {
        let mut config = Config::default_config();
        config
            .repository_groups
            .push(RepositoryGroupConfiguration::new("central", ["internal"]));

        let result = config.resolve();
        assert!(matches!(result, Err(ConfigError::DuplicateRepositoryId(id)) if id == "central"));
    }

    #[test]
    fn test_resolve_empty_id() {
        let mut config = Config::default();
        config
            .remote_repositories
            .push(RemoteRepositoryConfiguration::new(" ", "blank", "https://example.com"));

        let result = config.resolve();
        assert!(matches!(
            result,
            Err(ConfigError::EmptyRepositoryId { kind: "remote" })
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default_config();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.managed_repositories.len(), 2);
    }

    #[test]
    fn test_load_rejects_duplicates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[[managed_repositories]]
id = "internal"

[[remote_repositories]]
id = "internal"
url = "https://example.com"
"#,
        )
        .unwrap();

        let result = Config::load_from(&path);
        assert!(matches!(result, Err(ConfigError::DuplicateRepositoryId(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default_config();
        config.repository_base_dir = Some("/srv/depot/repositories".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_generate_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        generate_default_config(&path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("# Base directory of managed repositories"));
        assert!(content.contains("[[managed_repositories]]"));

        let result = generate_default_config(&path);
        assert!(matches!(result, Err(ConfigError::ConfigAlreadyExists(_))));
    }

    #[test]
    #[serial]
    fn test_generated_config_parses_back() {
        let doc = Config::default_config().to_annotated_document().unwrap();
        let parsed: Config = toml::from_str(&doc.to_string()).unwrap();
        assert_eq!(parsed, Config::default_config());
    }

    #[test]
    #[serial]
    fn test_base_dir_env_override() {
        let _guard = EnvGuard::set(&[(REPOSITORY_BASE_ENV, "/custom/repositories")]);
        let config = Config::default_config();
        assert_eq!(
            config.get_repository_base_dir().unwrap(),
            PathBuf::from("/custom/repositories")
        );
    }

    #[test]
    #[serial]
    fn test_base_dir_from_file_value() {
        let _guard = EnvGuard::unset(&[GROUP_BASE_ENV]);
        let config = Config {
            repository_group_base_dir: Some("/srv/groups".to_string()),
            ..Config::default()
        };
        assert_eq!(
            config.get_repository_group_base_dir().unwrap(),
            PathBuf::from("/srv/groups")
        );
    }

    #[test]
    #[serial]
    fn test_base_dir_fallback() {
        let _guard = EnvGuard::set(&[("XDG_DATA_HOME", "/tmp/depot-data")]);
        let _unset = EnvGuard::unset(&[REMOTE_BASE_ENV]);
        let config = Config::default();
        assert_eq!(
            config.get_remote_repository_base_dir().unwrap(),
            PathBuf::from("/tmp/depot-data/depot/remotes")
        );
    }

    #[test]
    #[serial]
    fn test_config_path_env() {
        let _guard = EnvGuard::set(&[(CONFIG_ENV, "/etc/depot/config.toml")]);
        assert_eq!(config_path(), PathBuf::from("/etc/depot/config.toml"));
    }
}
