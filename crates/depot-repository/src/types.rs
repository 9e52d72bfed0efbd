use std::{fmt, str::FromStr};

pub const DEFAULT_LAYOUT: &str = "default";
pub const LEGACY_LAYOUT: &str = "legacy";

/// Repository format family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RepositoryType {
    Maven,
    Npm,
    Pypi,
}

impl RepositoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepositoryType::Maven => "MAVEN",
            RepositoryType::Npm => "NPM",
            RepositoryType::Pypi => "PYPI",
        }
    }
}

impl fmt::Display for RepositoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Only the canonical uppercase names parse, so a parsed type always displays as its input.
impl FromStr for RepositoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MAVEN" => Ok(RepositoryType::Maven),
            "NPM" => Ok(RepositoryType::Npm),
            "PYPI" => Ok(RepositoryType::Pypi),
            _ => Err(s.to_string()),
        }
    }
}

/// Kind of artifact versions a managed repository accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReleaseScheme {
    Release,
    Snapshot,
}

impl fmt::Display for ReleaseScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseScheme::Release => write!(f, "release"),
            ReleaseScheme::Snapshot => write!(f, "snapshot"),
        }
    }
}
