use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use depot_utils::uri::RepositoryUri;
use url::Url;

use crate::{
    capabilities::REMOTE_CAPABILITIES,
    repository::{EditableRepository, Repository, RepositoryCore},
    types::RepositoryType,
};

/// User name and password for a remote repository.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordCredentials {
    username: String,
    password: String,
}

impl PasswordCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for PasswordCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A repository proxied from another server.
#[derive(Debug, Clone)]
pub struct RemoteRepository {
    core: RepositoryCore,
    repository_base: PathBuf,
    check_path: String,
    timeout: Duration,
    credentials: Option<PasswordCredentials>,
    extra_headers: BTreeMap<String, String>,
    extra_parameters: BTreeMap<String, String>,
}

impl RemoteRepository {
    pub fn new(
        repository_type: RepositoryType,
        id: impl Into<String>,
        name: impl Into<String>,
        repository_base: impl Into<PathBuf>,
    ) -> Self {
        Self {
            core: RepositoryCore::new(repository_type, id, name, &REMOTE_CAPABILITIES),
            repository_base: repository_base.into(),
            check_path: String::new(),
            timeout: Duration::from_secs(60),
            credentials: None,
            extra_headers: BTreeMap::new(),
            extra_parameters: BTreeMap::new(),
        }
    }

    /// Base directory of the local caches of remote repositories.
    pub fn repository_base(&self) -> &Path {
        &self.repository_base
    }

    /// Local cache directory, `<base>/<id>`.
    pub fn local_path(&self) -> PathBuf {
        self.repository_base.join(self.core.id())
    }

    /// Sets the remote URL. `raw` is the configured text and is what gets written back.
    pub fn set_location(&mut self, url: Url, raw: &str) {
        self.core
            .set_location_unchecked(RepositoryUri::from_parts(url, raw));
    }

    pub fn url(&self) -> Option<&Url> {
        self.core.location().as_url()
    }

    pub fn check_path(&self) -> &str {
        &self.check_path
    }

    pub fn set_check_path(&mut self, path: impl Into<String>) {
        self.check_path = path.into();
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn credentials(&self) -> Option<&PasswordCredentials> {
        self.credentials.as_ref()
    }

    pub fn set_credentials(&mut self, credentials: Option<PasswordCredentials>) {
        self.credentials = credentials;
    }

    pub fn extra_headers(&self) -> &BTreeMap<String, String> {
        &self.extra_headers
    }

    pub fn add_extra_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extra_headers.insert(key.into(), value.into());
    }

    pub fn set_extra_headers(&mut self, headers: BTreeMap<String, String>) {
        self.extra_headers = headers;
    }

    pub fn extra_parameters(&self) -> &BTreeMap<String, String> {
        &self.extra_parameters
    }

    pub fn add_extra_parameter(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extra_parameters.insert(key.into(), value.into());
    }

    pub fn set_extra_parameters(&mut self, parameters: BTreeMap<String, String>) {
        self.extra_parameters = parameters;
    }
}

impl Repository for RemoteRepository {
    fn core(&self) -> &RepositoryCore {
        &self.core
    }
}

impl EditableRepository for RemoteRepository {
    fn core_mut(&mut self) -> &mut RepositoryCore {
        &mut self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_is_redacted() {
        let creds = PasswordCredentials::new("deployer", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("deployer"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_local_path() {
        let repo = RemoteRepository::new(RepositoryType::Maven, "central", "Central", "/srv/remotes");
        assert_eq!(repo.local_path(), PathBuf::from("/srv/remotes/central"));
        assert!(repo.url().is_none());
    }

    #[test]
    fn test_location_keeps_configured_text() {
        let mut repo = RemoteRepository::new(RepositoryType::Maven, "central", "Central", "/srv");
        let raw = "https://Repo.Example.org";
        repo.set_location(Url::parse(raw).unwrap(), raw);
        assert_eq!(repo.location().to_string(), raw);
        assert_eq!(repo.url().unwrap().as_str(), "https://repo.example.org/");
    }

    #[test]
    fn test_extra_headers() {
        let mut repo = RemoteRepository::new(RepositoryType::Maven, "central", "Central", "/srv");
        repo.add_extra_header("X-Depot", "1");
        repo.add_extra_header("X-Depot", "2");
        assert_eq!(repo.extra_headers().get("X-Depot").map(String::as_str), Some("2"));
    }
}
