//! Repository model for the depot repository manager.
//!
//! Configuration records from `depot-config` are turned into live [`ManagedRepository`],
//! [`RemoteRepository`] and [`RepositoryGroup`] instances by a [`RepositoryProvider`], and
//! kept in a [`RepositoryRegistry`].

pub mod capabilities;
pub mod error;
pub mod features;
pub mod group;
pub mod managed;
pub mod provider;
pub mod registry;
pub mod remote;
pub mod repository;
pub mod staging;
pub mod storage;
pub mod types;

pub use error::{RepositoryError, Result};
pub use group::RepositoryGroup;
pub use managed::ManagedRepository;
pub use provider::{MavenRepositoryProvider, ProviderContext, RepositoryProvider};
pub use registry::{InitReport, RepositoryLookup, RepositoryRef, RepositoryRegistry};
pub use remote::RemoteRepository;
pub use repository::{EditableRepository, Repository};
pub use types::{ReleaseScheme, RepositoryType};
