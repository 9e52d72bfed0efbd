//! Optional feature values attached to repositories.
//!
//! A repository holds a [`Features`] set with one slot per [`FeatureKind`]. Only the kinds
//! declared by the repository's capabilities are filled, so looking up any other kind yields
//! `None`.

use std::{fmt, time::Duration};

use depot_utils::{time::from_days, uri::RepositoryUri};

use crate::capabilities::RepositoryCapabilities;

pub const STAGING_REPO_POSTFIX: &str = "-stage";

pub const DEFAULT_INDEX_PATH: &str = ".indexer";
pub const DEFAULT_PACKED_INDEX_PATH: &str = ".index";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Staging,
    IndexCreation,
    RemoteIndex,
    ArtifactCleanup,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeatureKind::Staging => "staging",
            FeatureKind::IndexCreation => "index-creation",
            FeatureKind::RemoteIndex => "remote-index",
            FeatureKind::ArtifactCleanup => "artifact-cleanup",
        };
        f.write_str(name)
    }
}

/// A feature value type that can be looked up in a [`Features`] set.
pub trait RepositoryFeature: Sized + 'static {
    const KIND: FeatureKind;

    fn slot(features: &Features) -> Option<&Self>;

    fn slot_mut(features: &mut Features) -> Option<&mut Self>;
}

/// Marks a managed repository as having a staging sibling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagingRepositoryFeature {
    stage_repo_needed: bool,
    staging_repository: Option<String>,
}

impl StagingRepositoryFeature {
    pub fn is_stage_repo_needed(&self) -> bool {
        self.stage_repo_needed
    }

    pub fn set_stage_repo_needed(&mut self, needed: bool) {
        self.stage_repo_needed = needed;
    }

    /// Id of the staging repository, once one has been created.
    pub fn staging_repository(&self) -> Option<&str> {
        self.staging_repository.as_deref()
    }

    pub fn set_staging_repository(&mut self, id: Option<String>) {
        self.staging_repository = id;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexCreationFeature {
    index_path: RepositoryUri,
    packed_index_path: RepositoryUri,
    skip_packed_index_creation: bool,
}

impl Default for IndexCreationFeature {
    fn default() -> Self {
        Self {
            index_path: RepositoryUri::Relative(DEFAULT_INDEX_PATH.to_string()),
            packed_index_path: RepositoryUri::Relative(DEFAULT_PACKED_INDEX_PATH.to_string()),
            skip_packed_index_creation: false,
        }
    }
}

impl IndexCreationFeature {
    pub fn index_path(&self) -> &RepositoryUri {
        &self.index_path
    }

    pub fn set_index_path(&mut self, path: RepositoryUri) {
        self.index_path = path;
    }

    pub fn packed_index_path(&self) -> &RepositoryUri {
        &self.packed_index_path
    }

    pub fn set_packed_index_path(&mut self, path: RepositoryUri) {
        self.packed_index_path = path;
    }

    pub fn is_skip_packed_index_creation(&self) -> bool {
        self.skip_packed_index_creation
    }

    pub fn set_skip_packed_index_creation(&mut self, skip: bool) {
        self.skip_packed_index_creation = skip;
    }
}

/// Download settings for the search index of a remote repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteIndexFeature {
    download_remote_index: bool,
    download_remote_index_on_startup: bool,
    download_timeout: Duration,
    index_uri: RepositoryUri,
    proxy_id: String,
}

impl Default for RemoteIndexFeature {
    fn default() -> Self {
        Self {
            download_remote_index: false,
            download_remote_index_on_startup: false,
            download_timeout: Duration::from_secs(300),
            index_uri: RepositoryUri::Relative(DEFAULT_PACKED_INDEX_PATH.to_string()),
            proxy_id: String::new(),
        }
    }
}

impl RemoteIndexFeature {
    pub fn is_download_remote_index(&self) -> bool {
        self.download_remote_index
    }

    pub fn set_download_remote_index(&mut self, download: bool) {
        self.download_remote_index = download;
    }

    pub fn is_download_remote_index_on_startup(&self) -> bool {
        self.download_remote_index_on_startup
    }

    pub fn set_download_remote_index_on_startup(&mut self, download: bool) {
        self.download_remote_index_on_startup = download;
    }

    pub fn download_timeout(&self) -> Duration {
        self.download_timeout
    }

    pub fn set_download_timeout(&mut self, timeout: Duration) {
        self.download_timeout = timeout;
    }

    pub fn index_uri(&self) -> &RepositoryUri {
        &self.index_uri
    }

    pub fn set_index_uri(&mut self, uri: RepositoryUri) {
        self.index_uri = uri;
    }

    pub fn proxy_id(&self) -> &str {
        &self.proxy_id
    }

    pub fn set_proxy_id(&mut self, proxy_id: impl Into<String>) {
        self.proxy_id = proxy_id.into();
    }
}

/// Snapshot retention settings of a managed repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCleanupFeature {
    delete_released_snapshots: bool,
    retention_count: u32,
    retention_period: Duration,
}

impl Default for ArtifactCleanupFeature {
    fn default() -> Self {
        Self {
            delete_released_snapshots: false,
            retention_count: 2,
            retention_period: from_days(100),
        }
    }
}

impl ArtifactCleanupFeature {
    pub fn is_delete_released_snapshots(&self) -> bool {
        self.delete_released_snapshots
    }

    pub fn set_delete_released_snapshots(&mut self, delete: bool) {
        self.delete_released_snapshots = delete;
    }

    pub fn retention_count(&self) -> u32 {
        self.retention_count
    }

    pub fn set_retention_count(&mut self, count: u32) {
        self.retention_count = count;
    }

    /// Retention period, always a whole number of days.
    pub fn retention_period(&self) -> Duration {
        self.retention_period
    }

    pub fn set_retention_period(&mut self, period: Duration) {
        self.retention_period = period;
    }
}

/// Typed feature slots of a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Features {
    staging: Option<StagingRepositoryFeature>,
    index_creation: Option<IndexCreationFeature>,
    remote_index: Option<RemoteIndexFeature>,
    artifact_cleanup: Option<ArtifactCleanupFeature>,
}

impl Features {
    /// Default-initialised slots for every feature the capabilities declare.
    pub fn for_capabilities(capabilities: &RepositoryCapabilities) -> Self {
        let mut features = Features::default();
        for kind in capabilities.supported_features {
            match kind {
                FeatureKind::Staging => features.staging = Some(Default::default()),
                FeatureKind::IndexCreation => features.index_creation = Some(Default::default()),
                FeatureKind::RemoteIndex => features.remote_index = Some(Default::default()),
                FeatureKind::ArtifactCleanup => {
                    features.artifact_cleanup = Some(Default::default())
                }
            }
        }
        features
    }

    pub fn get<F: RepositoryFeature>(&self) -> Option<&F> {
        F::slot(self)
    }

    pub fn get_mut<F: RepositoryFeature>(&mut self) -> Option<&mut F> {
        F::slot_mut(self)
    }

    pub fn kinds(&self) -> Vec<FeatureKind> {
        let mut kinds = Vec::new();
        if self.staging.is_some() {
            kinds.push(FeatureKind::Staging);
        }
        if self.index_creation.is_some() {
            kinds.push(FeatureKind::IndexCreation);
        }
        if self.remote_index.is_some() {
            kinds.push(FeatureKind::RemoteIndex);
        }
        if self.artifact_cleanup.is_some() {
            kinds.push(FeatureKind::ArtifactCleanup);
        }
        kinds
    }
}

macro_rules! feature_slot {
    ($ty:ty, $kind:expr, $field:ident) => {
        impl RepositoryFeature for $ty {
            const KIND: FeatureKind = $kind;

            fn slot(features: &Features) -> Option<&Self> {
                features.$field.as_ref()
            }

            fn slot_mut(features: &mut Features) -> Option<&mut Self> {
                features.$field.as_mut()
            }
        }
    };
}

feature_slot!(StagingRepositoryFeature, FeatureKind::Staging, staging);
feature_slot!(IndexCreationFeature, FeatureKind::IndexCreation, index_creation);
feature_slot!(RemoteIndexFeature, FeatureKind::RemoteIndex, remote_index);
feature_slot!(ArtifactCleanupFeature, FeatureKind::ArtifactCleanup, artifact_cleanup);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{GROUP_CAPABILITIES, MANAGED_CAPABILITIES, REMOTE_CAPABILITIES};

    #[test]
    fn test_managed_features() {
        let features = Features::for_capabilities(&MANAGED_CAPABILITIES);
        assert!(features.get::<StagingRepositoryFeature>().is_some());
        assert!(features.get::<IndexCreationFeature>().is_some());
        assert!(features.get::<ArtifactCleanupFeature>().is_some());
        assert!(features.get::<RemoteIndexFeature>().is_none());
    }

    #[test]
    fn test_remote_features() {
        let features = Features::for_capabilities(&REMOTE_CAPABILITIES);
        assert_eq!(
            features.kinds(),
            vec![FeatureKind::IndexCreation, FeatureKind::RemoteIndex]
        );
    }

    #[test]
    fn test_group_has_no_features() {
        let features = Features::for_capabilities(&GROUP_CAPABILITIES);
        assert!(features.kinds().is_empty());
        assert!(features.get::<IndexCreationFeature>().is_none());
    }

    #[test]
    fn test_feature_defaults() {
        let cleanup = ArtifactCleanupFeature::default();
        assert_eq!(cleanup.retention_count(), 2);
        assert_eq!(cleanup.retention_period(), Duration::from_secs(100 * 86_400));

        let index = IndexCreationFeature::default();
        assert_eq!(index.index_path().to_string(), ".indexer");
        assert_eq!(index.packed_index_path().to_string(), ".index");
    }

    #[test]
    fn test_feature_get_mut() {
        let mut features = Features::for_capabilities(&MANAGED_CAPABILITIES);
        if let Some(staging) = features.get_mut::<StagingRepositoryFeature>() {
            staging.set_stage_repo_needed(true);
        }
        assert!(features
            .get::<StagingRepositoryFeature>()
            .is_some_and(|f| f.is_stage_repo_needed()));
    }
}
