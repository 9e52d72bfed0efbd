use std::{error::Error, fmt, path::PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriError {
    /// The input carries a scheme other than `file`.
    UnsupportedScheme { input: String, scheme: String },

    /// The input is not a syntactically valid URI reference.
    Syntax { input: String, reason: String },

    /// Neither the input nor its `file://` prefixed form could be parsed.
    Unconvertible { input: String, reason: String },

    /// A location resolved to a URI with a query or fragment.
    QueryOrFragment { input: String },
}

impl UriError {
    /// The raw string that failed to convert.
    pub fn input(&self) -> &str {
        match self {
            UriError::UnsupportedScheme { input, .. }
            | UriError::Syntax { input, .. }
            | UriError::Unconvertible { input, .. }
            | UriError::QueryOrFragment { input } => input,
        }
    }
}

impl fmt::Display for UriError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UriError::UnsupportedScheme { input, scheme } => {
                write!(
                    f,
                    "The uri `{input}` is not valid: scheme `{scheme}` is not allowed, only file:// URIs are accepted"
                )
            }
            UriError::Syntax { input, reason } => {
                write!(f, "`{input}` is not a valid uri: {reason}")
            }
            UriError::Unconvertible { input, reason } => {
                write!(f, "The config entry `{input}` cannot be converted to a uri: {reason}")
            }
            UriError::QueryOrFragment { input } => {
                write!(f, "The location `{input}` must not carry a query or fragment")
            }
        }
    }
}

impl Error for UriError {}

#[derive(Debug)]
pub enum PathError {
    CurrentDir { source: std::io::Error },

    Empty,

    MissingEnvVar { var: String, input: String },

    UnclosedVariable { input: String },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::Empty => write!(f, "Path is empty"),
            PathError::CurrentDir { source } => {
                write!(f, "Failed to get current directory: {source}")
            }
            PathError::UnclosedVariable { input } => {
                write!(f, "Unclosed variable expression starting at `{input}`")
            }
            PathError::MissingEnvVar { var, input } => {
                write!(f, "Environment variable `{var}` not set in `{input}`")
            }
        }
    }
}

impl Error for PathError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PathError::CurrentDir { source } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum FileSystemError {
    Directory {
        path: PathBuf,
        action: &'static str,
        source: std::io::Error,
    },

    NotADirectory {
        path: PathBuf,
    },
}

impl FileSystemError {
    pub fn path(&self) -> &PathBuf {
        match self {
            FileSystemError::Directory { path, .. } | FileSystemError::NotADirectory { path } => {
                path
            }
        }
    }
}

impl fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSystemError::Directory {
                path,
                action,
                source,
            } => {
                write!(
                    f,
                    "Failed to {action} directory `{}`: {source}",
                    path.display()
                )
            }
            FileSystemError::NotADirectory { path } => {
                write!(f, "`{}` is not a directory", path.display())
            }
        }
    }
}

impl Error for FileSystemError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FileSystemError::Directory { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum LockError {
    Io(std::io::Error),

    AcquireFailed(String),
}

impl fmt::Display for LockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockError::Io(err) => write!(f, "Lock file error: {err}"),
            LockError::AcquireFailed(msg) => write!(f, "Failed to acquire lock: {msg}"),
        }
    }
}

impl Error for LockError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LockError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LockError {
    fn from(err: std::io::Error) -> Self {
        LockError::Io(err)
    }
}

#[derive(Debug)]
pub enum UtilsError {
    Uri(UriError),
    Path(PathError),
    FileSystem(FileSystemError),
    Lock(LockError),
}

impl fmt::Display for UtilsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UtilsError::Uri(err) => write!(f, "{err}"),
            UtilsError::Path(err) => write!(f, "{err}"),
            UtilsError::FileSystem(err) => write!(f, "{err}"),
            UtilsError::Lock(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UtilsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            UtilsError::Uri(err) => Some(err),
            UtilsError::Path(err) => Some(err),
            UtilsError::FileSystem(err) => Some(err),
            UtilsError::Lock(err) => Some(err),
        }
    }
}

impl From<UriError> for UtilsError {
    fn from(err: UriError) -> Self {
        UtilsError::Uri(err)
    }
}

impl From<PathError> for UtilsError {
    fn from(err: PathError) -> Self {
        UtilsError::Path(err)
    }
}

impl From<FileSystemError> for UtilsError {
    fn from(err: FileSystemError) -> Self {
        UtilsError::FileSystem(err)
    }
}

impl From<LockError> for UtilsError {
    fn from(err: LockError) -> Self {
        UtilsError::Lock(err)
    }
}

pub type FileSystemResult<T> = std::result::Result<T, FileSystemError>;
pub type LockResult<T> = std::result::Result<T, LockError>;
pub type PathResult<T> = std::result::Result<T, PathError>;
pub type UriResult<T> = std::result::Result<T, UriError>;

pub type UtilsResult<T> = std::result::Result<T, UtilsError>;

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_uri_error_display_names_input() {
        let err = UriError::UnsupportedScheme {
            input: "http://x".to_string(),
            scheme: "http".to_string(),
        };
        assert!(err.to_string().contains("http://x"));
        assert_eq!(err.input(), "http://x");

        let err = UriError::Unconvertible {
            input: "[broken".to_string(),
            reason: "invalid IPv6 address".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "The config entry `[broken` cannot be converted to a uri: invalid IPv6 address"
        );
    }

    #[test]
    fn test_file_system_error_display_and_source() {
        let dir_error = FileSystemError::Directory {
            path: PathBuf::from("/dir"),
            action: "create",
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert_eq!(
            dir_error.to_string(),
            "Failed to create directory `/dir`: permission denied"
        );
        assert!(dir_error.source().is_some());
        assert_eq!(dir_error.path(), &PathBuf::from("/dir"));

        let not_a_dir = FileSystemError::NotADirectory {
            path: PathBuf::from("/path"),
        };
        assert_eq!(not_a_dir.to_string(), "`/path` is not a directory");
        assert!(not_a_dir.source().is_none());
    }

    #[test]
    fn test_path_error_display() {
        assert_eq!(PathError::Empty.to_string(), "Path is empty");
        let err = PathError::MissingEnvVar {
            var: "VAR".to_string(),
            input: "$VAR".to_string(),
        };
        assert_eq!(err.to_string(), "Environment variable `VAR` not set in `$VAR`");
    }

    #[test]
    fn test_utils_error_from() {
        let err = UtilsError::from(LockError::AcquireFailed("busy".to_string()));
        assert_eq!(err.to_string(), "Failed to acquire lock: busy");
        assert!(err.source().is_some());
    }
}
