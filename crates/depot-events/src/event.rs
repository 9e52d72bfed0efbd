use std::fmt;

/// Kind of repository an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryKind {
    Managed,
    Remote,
    Group,
}

impl fmt::Display for RepositoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RepositoryKind::Managed => "managed",
            RepositoryKind::Remote => "remote",
            RepositoryKind::Group => "group",
        };
        f.write_str(name)
    }
}

/// Events raised over the lifetime of a repository instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryEvent {
    /// A repository instance was built from configuration.
    Created { id: String, kind: RepositoryKind },
    /// Configuration was applied onto an existing instance.
    Updated { id: String, kind: RepositoryKind },
    /// A staging sibling was created for a managed repository.
    StagingCreated { base_id: String, staging_id: String },
    /// The remote index URL could not be parsed and index download was switched off.
    RemoteIndexDisabled { id: String, index_url: String },
    /// An instance was added to (or replaced in) the registry.
    Registered { id: String, kind: RepositoryKind },
    /// An instance was dropped from the registry.
    Removed { id: String, kind: RepositoryKind },
}

impl RepositoryEvent {
    /// Id of the repository the event is about.
    pub fn repository_id(&self) -> &str {
        match self {
            RepositoryEvent::Created { id, .. }
            | RepositoryEvent::Updated { id, .. }
            | RepositoryEvent::RemoteIndexDisabled { id, .. }
            | RepositoryEvent::Registered { id, .. }
            | RepositoryEvent::Removed { id, .. } => id,
            RepositoryEvent::StagingCreated { staging_id, .. } => staging_id,
        }
    }
}
