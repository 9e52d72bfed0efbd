use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};

use crate::repository::DEFAULT_REPOSITORY_TYPE;

pub const DEFAULT_MERGED_INDEX_PATH: &str = ".indexer";
pub const DEFAULT_MERGED_INDEX_TTL: u32 = 30;

/// A virtual repository that merges a list of managed repositories.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Documented, DocumentedFields)]
#[serde(default)]
pub struct RepositoryGroupConfiguration {
    /// Unique id of the group.
    pub id: String,

    /// Repository format family.
    /// Default: "MAVEN"
    pub repository_type: String,

    /// Display name.
    pub name: String,

    /// Ids of the member repositories. Order matters: the first repository wins on lookups.
    pub repositories: Vec<String>,

    /// Path of the merged index, relative to the group directory.
    /// Default: ".indexer"
    pub merged_index_path: String,

    /// Time to live of the merged index, in minutes.
    /// Default: 30
    pub merged_index_ttl: u32,

    /// Cron expression for the merged index refresh.
    pub cron_expression: String,
}

impl Default for RepositoryGroupConfiguration {
    fn default() -> Self {
        Self {
            id: String::new(),
            repository_type: DEFAULT_REPOSITORY_TYPE.to_string(),
            name: String::new(),
            repositories: Vec::new(),
            merged_index_path: DEFAULT_MERGED_INDEX_PATH.to_string(),
            merged_index_ttl: DEFAULT_MERGED_INDEX_TTL,
            cron_expression: String::new(),
        }
    }
}

impl RepositoryGroupConfiguration {
    pub fn new<I, S>(id: impl Into<String>, repositories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            repositories: repositories.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}
