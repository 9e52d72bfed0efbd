use std::collections::BTreeMap;

use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};

pub const DEFAULT_REPOSITORY_TYPE: &str = "MAVEN";
pub const DEFAULT_LAYOUT: &str = "default";
pub const DEFAULT_MANAGED_CRON: &str = "0 0 * * * ?";
pub const DEFAULT_REMOTE_CRON: &str = "0 0 08 ? * SUN";

/// A locally hosted repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Documented, DocumentedFields)]
#[serde(default)]
pub struct ManagedRepositoryConfiguration {
    /// Unique id of the repository.
    pub id: String,

    /// Repository format family.
    /// Default: "MAVEN"
    pub repository_type: String,

    /// Display name.
    pub name: String,

    /// Free text description.
    pub description: String,

    /// Directory layout, "default" or "legacy".
    /// Default: "default"
    pub layout: String,

    /// Filesystem location, an absolute path, a `file://` URI or a path relative to the
    /// repository base directory. Empty means `<repository_base_dir>/<id>`.
    pub location: String,

    /// Directory of the search index. Relative paths are resolved against the repository.
    pub index_dir: String,

    /// Directory of the packed (downloadable) index.
    pub packed_index_dir: String,

    /// Cron expression for the scanning schedule.
    /// Default: "0 0 * * * ?"
    pub refresh_cron_expression: String,

    /// Whether release artifacts are accepted.
    /// Default: true
    pub releases: bool,

    /// Whether snapshot artifacts are accepted.
    /// Default: false
    pub snapshots: bool,

    /// Whether the repository is scanned by the scheduler.
    /// Default: true
    pub scanned: bool,

    /// Reject re-deployment of an already released artifact.
    /// Default: false
    pub block_redeployments: bool,

    /// Create a staging sibling repository (`<id>-stage`) for this repository.
    /// Default: false
    pub stage_repo_needed: bool,

    /// Skip creation of the packed index.
    /// Default: false
    pub skip_packed_index_creation: bool,

    /// Delete snapshots once the matching release is deployed.
    /// Default: false
    pub delete_released_snapshots: bool,

    /// Number of snapshot versions kept by the cleanup task.
    /// Default: 2
    pub retention_count: u32,

    /// Age in days after which old snapshots are removed.
    /// Default: 100
    pub retention_period: u32,
}

impl Default for ManagedRepositoryConfiguration {
    fn default() -> Self {
        Self {
            id: String::new(),
            repository_type: DEFAULT_REPOSITORY_TYPE.to_string(),
            name: String::new(),
            description: String::new(),
            layout: DEFAULT_LAYOUT.to_string(),
            location: String::new(),
            index_dir: String::new(),
            packed_index_dir: String::new(),
            refresh_cron_expression: DEFAULT_MANAGED_CRON.to_string(),
            releases: true,
            snapshots: false,
            scanned: true,
            block_redeployments: false,
            stage_repo_needed: false,
            skip_packed_index_creation: false,
            delete_released_snapshots: false,
            retention_count: 2,
            retention_period: 100,
        }
    }
}

impl ManagedRepositoryConfiguration {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A proxied repository hosted elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Documented, DocumentedFields)]
#[serde(default)]
pub struct RemoteRepositoryConfiguration {
    /// Unique id of the repository.
    pub id: String,

    /// Repository format family.
    /// Default: "MAVEN"
    pub repository_type: String,

    /// Display name.
    pub name: String,

    /// Free text description.
    pub description: String,

    /// Directory layout, "default" or "legacy".
    /// Default: "default"
    pub layout: String,

    /// URL of the remote repository.
    pub url: String,

    /// User name for the remote. Only used together with `password`.
    pub username: Option<String>,

    /// Password for the remote. Only used together with `username`.
    pub password: Option<String>,

    /// Request timeout in seconds.
    /// Default: 60
    pub timeout: u64,

    /// Path requested to check that the remote is reachable.
    pub check_path: String,

    /// Cron expression for the refresh schedule.
    /// Default: "0 0 08 ? * SUN"
    pub refresh_cron_expression: String,

    /// Download the remote search index.
    /// Default: false
    pub download_remote_index: bool,

    /// URL of the remote index, absolute or relative to `url`.
    pub remote_index_url: String,

    /// Id of the network proxy used for index downloads.
    pub remote_download_network_proxy_id: String,

    /// Index download timeout in seconds.
    /// Default: 300
    pub remote_download_timeout: u64,

    /// Download the remote index when the server starts.
    /// Default: false
    pub download_remote_index_on_startup: bool,

    /// Directory of the local copy of the remote index.
    pub index_dir: String,

    /// Directory of the packed index.
    pub packed_index_dir: String,

    /// Extra query parameters sent with every request.
    pub extra_parameters: BTreeMap<String, String>,

    /// Extra HTTP headers sent with every request.
    pub extra_headers: BTreeMap<String, String>,
}

impl Default for RemoteRepositoryConfiguration {
    fn default() -> Self {
        Self {
            id: String::new(),
            repository_type: DEFAULT_REPOSITORY_TYPE.to_string(),
            name: String::new(),
            description: String::new(),
            layout: DEFAULT_LAYOUT.to_string(),
            url: String::new(),
            username: None,
            password: None,
            timeout: 60,
            check_path: String::new(),
            refresh_cron_expression: DEFAULT_REMOTE_CRON.to_string(),
            download_remote_index: false,
            remote_index_url: String::new(),
            remote_download_network_proxy_id: String::new(),
            remote_download_timeout: 300,
            download_remote_index_on_startup: false,
            index_dir: String::new(),
            packed_index_dir: String::new(),
            extra_parameters: BTreeMap::new(),
            extra_headers: BTreeMap::new(),
        }
    }
}

impl RemoteRepositoryConfiguration {
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_managed_defaults() {
        let cfg = ManagedRepositoryConfiguration::new("internal", "Internal Repository");
        assert_eq!(cfg.repository_type, "MAVEN");
        assert_eq!(cfg.layout, "default");
        assert!(cfg.releases);
        assert!(!cfg.snapshots);
        assert!(cfg.scanned);
        assert_eq!(cfg.retention_count, 2);
        assert_eq!(cfg.retention_period, 100);
    }

    #[test]
    fn test_managed_missing_fields_use_defaults() {
        let cfg: ManagedRepositoryConfiguration =
            toml::from_str("id = \"snapshots\"\nsnapshots = true\nreleases = false").unwrap();
        assert_eq!(cfg.id, "snapshots");
        assert!(cfg.snapshots);
        assert!(!cfg.releases);
        assert_eq!(cfg.refresh_cron_expression, DEFAULT_MANAGED_CRON);
    }

    #[test]
    fn test_remote_toml_round_trip() {
        let mut cfg = RemoteRepositoryConfiguration::new(
            "central",
            "Central Repository",
            "https://repo.maven.apache.org/maven2",
        );
        cfg.username = Some("deployer".to_string());
        cfg.password = Some("secret".to_string());
        cfg.extra_headers
            .insert("X-Depot".to_string(), "1".to_string());
        cfg.extra_parameters
            .insert("token".to_string(), "abc".to_string());

        let serialized = toml::to_string(&cfg).unwrap();
        let parsed: RemoteRepositoryConfiguration = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn test_remote_credentials_are_optional() {
        let cfg: RemoteRepositoryConfiguration =
            toml::from_str("id = \"central\"\nurl = \"https://repo.example.org\"").unwrap();
        assert!(cfg.username.is_none());
        assert!(cfg.password.is_none());
        assert_eq!(cfg.timeout, 60);
        assert_eq!(cfg.remote_download_timeout, 300);
    }
}
