use crate::{
    features::FeatureKind,
    types::{ReleaseScheme, DEFAULT_LAYOUT, LEGACY_LAYOUT},
};

/// What a kind of repository supports. Set once when the repository is constructed.
#[derive(Debug, PartialEq, Eq)]
pub struct RepositoryCapabilities {
    pub supported_release_schemes: &'static [ReleaseScheme],
    pub supported_layouts: &'static [&'static str],
    pub custom_config_keys: &'static [&'static str],
    pub supported_features: &'static [FeatureKind],
    pub failover_policies: &'static [&'static str],
    pub indexable: bool,
    pub snapshots: bool,
    pub redeployment: bool,
    pub group_merge: bool,
    pub compression: bool,
}

impl RepositoryCapabilities {
    pub fn supports_feature(&self, kind: FeatureKind) -> bool {
        self.supported_features.contains(&kind)
    }

    pub fn supports_release_scheme(&self, scheme: ReleaseScheme) -> bool {
        self.supported_release_schemes.contains(&scheme)
    }

    pub fn supports_layout(&self, layout: &str) -> bool {
        self.supported_layouts.contains(&layout)
    }
}

const MAVEN_SCHEMES: &[ReleaseScheme] = &[ReleaseScheme::Release, ReleaseScheme::Snapshot];
const MAVEN_LAYOUTS: &[&str] = &[DEFAULT_LAYOUT, LEGACY_LAYOUT];

pub static MANAGED_CAPABILITIES: RepositoryCapabilities = RepositoryCapabilities {
    supported_release_schemes: MAVEN_SCHEMES,
    supported_layouts: MAVEN_LAYOUTS,
    custom_config_keys: &[],
    supported_features: &[
        FeatureKind::ArtifactCleanup,
        FeatureKind::IndexCreation,
        FeatureKind::Staging,
    ],
    failover_policies: &[],
    indexable: true,
    snapshots: true,
    redeployment: true,
    group_merge: false,
    compression: false,
};

pub static REMOTE_CAPABILITIES: RepositoryCapabilities = RepositoryCapabilities {
    supported_release_schemes: MAVEN_SCHEMES,
    supported_layouts: MAVEN_LAYOUTS,
    custom_config_keys: &[],
    supported_features: &[FeatureKind::RemoteIndex, FeatureKind::IndexCreation],
    failover_policies: &[],
    indexable: true,
    snapshots: true,
    redeployment: false,
    group_merge: false,
    compression: false,
};

pub static GROUP_CAPABILITIES: RepositoryCapabilities = RepositoryCapabilities {
    supported_release_schemes: MAVEN_SCHEMES,
    supported_layouts: MAVEN_LAYOUTS,
    custom_config_keys: &[],
    supported_features: &[],
    failover_policies: &[],
    indexable: false,
    snapshots: false,
    redeployment: false,
    group_merge: false,
    compression: false,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_managed_capabilities() {
        assert!(MANAGED_CAPABILITIES.supports_feature(FeatureKind::Staging));
        assert!(!MANAGED_CAPABILITIES.supports_feature(FeatureKind::RemoteIndex));
        assert!(MANAGED_CAPABILITIES.supports_release_scheme(ReleaseScheme::Snapshot));
        assert!(MANAGED_CAPABILITIES.supports_layout("legacy"));
        assert!(!MANAGED_CAPABILITIES.supports_layout("flat"));
    }

    #[test]
    fn test_remote_capabilities() {
        assert!(REMOTE_CAPABILITIES.supports_feature(FeatureKind::RemoteIndex));
        assert!(!REMOTE_CAPABILITIES.supports_feature(FeatureKind::Staging));
        assert!(!REMOTE_CAPABILITIES.redeployment);
    }

    #[test]
    fn test_group_capabilities() {
        assert!(GROUP_CAPABILITIES.supported_features.is_empty());
        assert!(!GROUP_CAPABILITIES.indexable);
    }
}
