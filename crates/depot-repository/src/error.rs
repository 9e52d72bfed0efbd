//! Error types for depot-repository.

use std::path::PathBuf;

use depot_config::error::ConfigError;
use depot_events::RepositoryKind;
use depot_utils::error::{FileSystemError, LockError, UriError};
use miette::Diagnostic;
use thiserror::Error;

use crate::types::RepositoryType;

#[derive(Error, Diagnostic, Debug)]
pub enum RepositoryError {
    #[error("The location entry of repository `{id}` is not a valid uri: {location}")]
    #[diagnostic(
        code(depot::repository::invalid_location),
        help("Use an absolute path, a file:// URI or a path relative to the repository base directory")
    )]
    InvalidLocation {
        id: String,
        location: String,
        #[source]
        source: UriError,
    },

    #[error("Repository `{id}` does not accept the location `{location}`")]
    #[diagnostic(
        code(depot::repository::unsupported_location),
        help("Managed repositories only accept file:// locations")
    )]
    UnsupportedLocation { id: String, location: String },

    #[error("The index path `{path}` of repository `{id}` is not a valid uri")]
    #[diagnostic(code(depot::repository::invalid_index_path))]
    InvalidIndexPath {
        id: String,
        path: String,
        #[source]
        source: UriError,
    },

    #[error("Could not create directory {} for repository `{id}`", .path.display())]
    #[diagnostic(
        code(depot::repository::create_directory),
        help("Check permissions of the repository base directory")
    )]
    CreateDirectory {
        id: String,
        path: PathBuf,
        #[source]
        source: FileSystemError,
    },

    #[error("The url of remote repository `{id}` is not a valid uri: {url}")]
    #[diagnostic(
        code(depot::repository::invalid_remote_url),
        help("Remote repositories need an absolute URL such as https://repo.example.org/maven2")
    )]
    InvalidRemoteUrl {
        id: String,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Repository `{id}` has type {repository_type}, which the provider does not handle")]
    #[diagnostic(code(depot::repository::unsupported_type))]
    UnsupportedType {
        id: String,
        repository_type: RepositoryType,
    },

    #[error("Repository `{id}` has an unknown type `{value}`")]
    #[diagnostic(
        code(depot::repository::unknown_type),
        help("Valid types are MAVEN, NPM and PYPI")
    )]
    UnknownType { id: String, value: String },

    #[error("Group `{group}` references unknown repository `{member}`")]
    #[diagnostic(
        code(depot::repository::unknown_group_member),
        help("Group members must be managed repositories that are already registered")
    )]
    UnknownGroupMember { group: String, member: String },

    #[error("Repository id `{id}` is already used by a {existing} repository")]
    #[diagnostic(
        code(depot::repository::duplicate_id),
        help("Ids must be unique across managed repositories, remote repositories and groups")
    )]
    DuplicateId { id: String, existing: RepositoryKind },

    #[error("Unknown repository: {0}")]
    #[diagnostic(code(depot::repository::unknown_repository))]
    UnknownRepository(String),

    #[error("Could not lock storage {}", .path.display())]
    #[diagnostic(code(depot::repository::storage))]
    Storage {
        path: PathBuf,
        #[source]
        source: LockError,
    },

    #[error("Could not prepare storage for repository `{id}`")]
    #[diagnostic(code(depot::repository::storage_root))]
    StorageRoot {
        id: String,
        #[source]
        source: FileSystemError,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

impl RepositoryError {
    /// Id of the repository the error refers to, when there is one.
    pub fn repository_id(&self) -> Option<&str> {
        match self {
            Self::InvalidLocation { id, .. }
            | Self::UnsupportedLocation { id, .. }
            | Self::InvalidIndexPath { id, .. }
            | Self::CreateDirectory { id, .. }
            | Self::InvalidRemoteUrl { id, .. }
            | Self::UnsupportedType { id, .. }
            | Self::UnknownType { id, .. }
            | Self::DuplicateId { id, .. }
            | Self::StorageRoot { id, .. } => Some(id),
            Self::UnknownGroupMember { group, .. } => Some(group),
            Self::UnknownRepository(id) => Some(id),
            Self::Storage { .. } | Self::Config(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_carries_identifiers() {
        let err = RepositoryError::InvalidLocation {
            id: "internal".to_string(),
            location: "http://example.com/repo".to_string(),
            source: UriError::UnsupportedScheme {
                input: "http://example.com/repo".to_string(),
                scheme: "http".to_string(),
            },
        };
        let message = err.to_string();
        assert!(message.contains("internal"));
        assert!(message.contains("http://example.com/repo"));
        assert_eq!(err.repository_id(), Some("internal"));
    }

    #[test]
    fn test_group_member_error() {
        let err = RepositoryError::UnknownGroupMember {
            group: "public".to_string(),
            member: "gone".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Group `public` references unknown repository `gone`"
        );
        assert_eq!(err.repository_id(), Some("public"));
    }

    #[test]
    fn test_duplicate_id_names_existing_kind() {
        let err = RepositoryError::DuplicateId {
            id: "central".to_string(),
            existing: RepositoryKind::Remote,
        };
        assert!(err.to_string().contains("remote repository"));
    }
}
