use std::collections::BTreeMap;

use depot_utils::uri::RepositoryUri;

use crate::{
    capabilities::RepositoryCapabilities,
    features::{Features, RepositoryFeature},
    types::{RepositoryType, DEFAULT_LAYOUT},
};

pub const PRIMARY_LOCALE: &str = "en";

/// State shared by managed repositories, remote repositories and groups.
#[derive(Debug, Clone)]
pub struct RepositoryCore {
    id: String,
    repository_type: RepositoryType,
    names: BTreeMap<String, String>,
    descriptions: BTreeMap<String, String>,
    base_uri: RepositoryUri,
    location: RepositoryUri,
    layout: String,
    scheduling_definition: String,
    capabilities: &'static RepositoryCapabilities,
    features: Features,
}

impl RepositoryCore {
    pub fn new(
        repository_type: RepositoryType,
        id: impl Into<String>,
        name: impl Into<String>,
        capabilities: &'static RepositoryCapabilities,
    ) -> Self {
        let mut names = BTreeMap::new();
        names.insert(PRIMARY_LOCALE.to_string(), name.into());

        Self {
            id: id.into(),
            repository_type,
            names,
            descriptions: BTreeMap::new(),
            base_uri: RepositoryUri::Empty,
            location: RepositoryUri::Empty,
            layout: DEFAULT_LAYOUT.to_string(),
            scheduling_definition: String::new(),
            capabilities,
            features: Features::for_capabilities(capabilities),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn repository_type(&self) -> RepositoryType {
        self.repository_type
    }

    pub fn primary_locale(&self) -> &str {
        PRIMARY_LOCALE
    }

    /// Name in the primary locale.
    pub fn name(&self) -> &str {
        self.name_for(PRIMARY_LOCALE).unwrap_or_default()
    }

    pub fn name_for(&self, locale: &str) -> Option<&str> {
        self.names.get(locale).map(String::as_str)
    }

    pub fn set_name(&mut self, locale: &str, name: impl Into<String>) {
        self.names.insert(locale.to_string(), name.into());
    }

    /// Description in the primary locale.
    pub fn description(&self) -> &str {
        self.description_for(PRIMARY_LOCALE).unwrap_or_default()
    }

    pub fn description_for(&self, locale: &str) -> Option<&str> {
        self.descriptions.get(locale).map(String::as_str)
    }

    pub fn set_description(&mut self, locale: &str, description: impl Into<String>) {
        self.descriptions
            .insert(locale.to_string(), description.into());
    }

    pub fn base_uri(&self) -> &RepositoryUri {
        &self.base_uri
    }

    pub fn set_base_uri(&mut self, uri: RepositoryUri) {
        self.base_uri = uri;
    }

    pub fn location(&self) -> &RepositoryUri {
        &self.location
    }

    pub(crate) fn set_location_unchecked(&mut self, location: RepositoryUri) {
        self.location = location;
    }

    pub fn layout(&self) -> &str {
        &self.layout
    }

    pub fn set_layout(&mut self, layout: impl Into<String>) {
        self.layout = layout.into();
    }

    /// Cron expression of the scheduled tasks.
    pub fn scheduling_definition(&self) -> &str {
        &self.scheduling_definition
    }

    pub fn set_scheduling_definition(&mut self, cron: impl Into<String>) {
        self.scheduling_definition = cron.into();
    }

    pub fn capabilities(&self) -> &'static RepositoryCapabilities {
        self.capabilities
    }

    pub fn features(&self) -> &Features {
        &self.features
    }

    pub fn feature<F: RepositoryFeature>(&self) -> Option<&F> {
        self.features.get::<F>()
    }

    pub fn feature_mut<F: RepositoryFeature>(&mut self) -> Option<&mut F> {
        self.features.get_mut::<F>()
    }

    /// The feature `F`.
    ///
    /// # Panics
    ///
    /// If the capabilities of this repository do not declare `F`.
    pub fn require_feature<F: RepositoryFeature>(&self) -> &F {
        match self.features.get::<F>() {
            Some(feature) => feature,
            None => panic!("repository `{}` has no {} feature", self.id, F::KIND),
        }
    }

    /// Mutable access to the feature `F`.
    ///
    /// # Panics
    ///
    /// If the capabilities of this repository do not declare `F`.
    pub fn require_feature_mut<F: RepositoryFeature>(&mut self) -> &mut F {
        let id = &self.id;
        match self.features.get_mut::<F>() {
            Some(feature) => feature,
            None => panic!("repository `{}` has no {} feature", id, F::KIND),
        }
    }
}

/// Read access to the shared repository state.
pub trait Repository {
    fn core(&self) -> &RepositoryCore;

    fn id(&self) -> &str {
        self.core().id()
    }

    fn name(&self) -> &str {
        self.core().name()
    }

    fn description(&self) -> &str {
        self.core().description()
    }

    fn repository_type(&self) -> RepositoryType {
        self.core().repository_type()
    }

    fn location(&self) -> &RepositoryUri {
        self.core().location()
    }

    fn layout(&self) -> &str {
        self.core().layout()
    }

    fn scheduling_definition(&self) -> &str {
        self.core().scheduling_definition()
    }

    fn capabilities(&self) -> &'static RepositoryCapabilities {
        self.core().capabilities()
    }

    fn feature<F: RepositoryFeature>(&self) -> Option<&F>
    where
        Self: Sized,
    {
        self.core().feature::<F>()
    }
}

/// Write access to the shared repository state.
pub trait EditableRepository: Repository {
    fn core_mut(&mut self) -> &mut RepositoryCore;

    fn feature_mut<F: RepositoryFeature>(&mut self) -> Option<&mut F>
    where
        Self: Sized,
    {
        self.core_mut().feature_mut::<F>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        capabilities::{GROUP_CAPABILITIES, MANAGED_CAPABILITIES},
        features::{IndexCreationFeature, StagingRepositoryFeature},
    };

    #[test]
    fn test_locale_names() {
        let mut core = RepositoryCore::new(
            RepositoryType::Maven,
            "internal",
            "Internal",
            &MANAGED_CAPABILITIES,
        );
        core.set_name("de", "Intern");

        assert_eq!(core.name(), "Internal");
        assert_eq!(core.name_for("de"), Some("Intern"));
        assert_eq!(core.name_for("fr"), None);
        assert_eq!(core.description(), "");
    }

    #[test]
    fn test_require_feature() {
        let mut core = RepositoryCore::new(
            RepositoryType::Maven,
            "internal",
            "Internal",
            &MANAGED_CAPABILITIES,
        );
        core.require_feature_mut::<StagingRepositoryFeature>()
            .set_stage_repo_needed(true);
        assert!(core
            .require_feature::<StagingRepositoryFeature>()
            .is_stage_repo_needed());
    }

    #[test]
    #[should_panic(expected = "repository `public` has no index-creation feature")]
    fn test_require_undeclared_feature_panics() {
        let core = RepositoryCore::new(RepositoryType::Maven, "public", "Public", &GROUP_CAPABILITIES);
        core.require_feature::<IndexCreationFeature>();
    }
}
