//! Conversion between configured location strings and URIs.
//!
//! Configuration files store repository locations, index directories and remote index URLs as
//! plain strings. At runtime they are held as [`RepositoryUri`], which keeps the distinction
//! between an absent value, a scheme-less reference, and an absolute URL.
//!
//! [`to_uri`] applies the file-scheme policy used for managed repository locations and index
//! directories, and [`to_path`] turns a URI back into the string form written to the
//! configuration.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use tracing::{debug, error};
use url::{ParseError, Url};

use crate::error::{UriError, UriResult};

pub const FILE_SCHEME: &str = "file";

const FILE_PREFIX: &str = "file://";

/// Characters escaped when an absolute filesystem path is turned into a `file:` URI.
const FILE_PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// A parsed URI reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RepositoryUri {
    /// No value configured.
    #[default]
    Empty,

    /// A reference without a scheme, kept verbatim.
    Relative(String),

    /// An absolute URL together with the text it was parsed from.
    ///
    /// `raw` is what [`Display`](fmt::Display) writes, so a configured URL comes back with
    /// the spelling it was given even though `url` is normalised.
    Absolute { url: Url, raw: String },
}

/// Which branch of [`parse_file_uri`] produced the URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseBranch {
    /// The input (or its `file://` form for absolute paths) parsed directly.
    Direct,

    /// The input failed to parse and was re-parsed with a forced `file://` prefix.
    FileFallback,
}

impl RepositoryUri {
    /// Parses a URI reference without any scheme policy.
    ///
    /// Blank input yields [`RepositoryUri::Empty`]. Input without a scheme must only contain
    /// characters allowed in an RFC 3986 reference.
    pub fn parse(raw: &str) -> UriResult<Self> {
        if raw.trim().is_empty() {
            return Ok(RepositoryUri::Empty);
        }

        match Url::parse(raw) {
            Ok(url) => Ok(RepositoryUri::from_parts(url, raw)),
            Err(ParseError::RelativeUrlWithoutBase) => {
                check_reference_chars(raw).map_err(|reason| {
                    UriError::Syntax {
                        input: raw.to_string(),
                        reason,
                    }
                })?;
                Ok(RepositoryUri::Relative(raw.to_string()))
            }
            Err(err) => {
                Err(UriError::Syntax {
                    input: raw.to_string(),
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Wraps an already parsed URL, keeping `raw` as its textual form.
    pub fn from_parts(url: Url, raw: impl Into<String>) -> Self {
        RepositoryUri::Absolute {
            url,
            raw: raw.into(),
        }
    }

    /// `file:` URI for an absolute directory, with a trailing slash.
    pub fn from_directory(path: &Path) -> Option<Self> {
        Url::from_directory_path(path).ok().map(RepositoryUri::from)
    }

    pub fn scheme(&self) -> Option<&str> {
        match self {
            RepositoryUri::Absolute { url, .. } => Some(url.scheme()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RepositoryUri::Empty)
    }

    pub fn is_file(&self) -> bool {
        self.scheme() == Some(FILE_SCHEME)
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            RepositoryUri::Absolute { url, .. } => Some(url),
            _ => None,
        }
    }

    /// The decoded path component, without query or fragment.
    pub fn path(&self) -> String {
        match self {
            RepositoryUri::Empty => String::new(),
            RepositoryUri::Relative(raw) => decode(strip_query_and_fragment(raw)),
            RepositoryUri::Absolute { url, .. } => decode(url.path()),
        }
    }

    /// The native path of a `file:` URI.
    pub fn to_file_path(&self) -> Option<PathBuf> {
        match self {
            RepositoryUri::Absolute { url, .. } if url.scheme() == FILE_SCHEME => {
                url.to_file_path().ok()
            }
            _ => None,
        }
    }
}

impl fmt::Display for RepositoryUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryUri::Empty => Ok(()),
            RepositoryUri::Relative(raw) => f.write_str(raw),
            RepositoryUri::Absolute { raw, .. } => f.write_str(raw),
        }
    }
}

impl From<Url> for RepositoryUri {
    fn from(url: Url) -> Self {
        let raw = url.to_string();
        RepositoryUri::Absolute { url, raw }
    }
}

/// Converts a configured location into a URI, accepting only the `file` scheme.
///
/// See [`parse_file_uri`] for the rules.
pub fn to_uri(raw: &str) -> UriResult<RepositoryUri> {
    parse_file_uri(raw).map(|(uri, _)| uri)
}

/// Converts a configured location into a URI and reports which branch produced it.
///
/// * Blank input gives [`RepositoryUri::Empty`].
/// * Input starting with `/` is an absolute filesystem path. It gets the `file://` prefix
///   with characters that would end the URI path (`#`, `?`, `%` and the like) escaped.
/// * Anything else is parsed as is, and a scheme other than `file` is rejected with
///   [`UriError::UnsupportedScheme`].
/// * If parsing fails, the input is re-parsed with a forced `file://` prefix. When that fails
///   as well the result is [`UriError::Unconvertible`].
/// * A result carrying a query or fragment is rejected with [`UriError::QueryOrFragment`],
///   since the directory it names would lose that part.
///
/// # Example
///
/// ```
/// use depot_utils::uri::{parse_file_uri, ParseBranch};
///
/// let (uri, branch) = parse_file_uri("/var/lib/depot/internal").unwrap();
/// assert_eq!(uri.to_string(), "file:///var/lib/depot/internal");
/// assert_eq!(branch, ParseBranch::Direct);
/// ```
pub fn parse_file_uri(raw: &str) -> UriResult<(RepositoryUri, ParseBranch)> {
    if raw.trim().is_empty() {
        return Ok((RepositoryUri::Empty, ParseBranch::Direct));
    }

    let candidate = if raw.starts_with('/') {
        format!("{FILE_PREFIX}{}", utf8_percent_encode(raw, FILE_PATH))
    } else {
        raw.to_string()
    };

    match RepositoryUri::parse(&candidate) {
        Ok(uri) => {
            if let Some(scheme) = uri.scheme().filter(|scheme| *scheme != FILE_SCHEME) {
                error!("Bad URI scheme found: {}, URI={}", scheme, uri);
                return Err(UriError::UnsupportedScheme {
                    input: raw.to_string(),
                    scheme: scheme.to_string(),
                });
            }
            check_path_only(raw, &uri)?;
            debug!("Setting location uri: {}", uri);
            Ok((uri, ParseBranch::Direct))
        }
        Err(_) => {
            let fallback = format!("{FILE_PREFIX}{raw}");
            match Url::parse(&fallback) {
                Ok(url) => {
                    let uri = RepositoryUri::from_parts(url, fallback);
                    check_path_only(raw, &uri)?;
                    debug!("Setting location uri from fallback: {}", uri);
                    Ok((uri, ParseBranch::FileFallback))
                }
                Err(err) => {
                    error!("Could not create URI from {} -> {}", raw, fallback);
                    Err(UriError::Unconvertible {
                        input: raw.to_string(),
                        reason: err.to_string(),
                    })
                }
            }
        }
    }
}

/// Converts a URI back into its configuration string.
///
/// A URI without scheme gives its path component, a `file:` URI its native path, and any other
/// scheme the URI string unchanged.
pub fn to_path(uri: &RepositoryUri) -> String {
    match uri {
        RepositoryUri::Absolute { url, .. } if url.scheme() == FILE_SCHEME => {
            match url.to_file_path() {
                Ok(path) => path.to_string_lossy().into_owned(),
                Err(()) => decode(url.path()),
            }
        }
        RepositoryUri::Absolute { raw, .. } => raw.clone(),
        other => other.path(),
    }
}

fn check_path_only(raw: &str, uri: &RepositoryUri) -> UriResult<()> {
    let extra = match uri {
        RepositoryUri::Empty => false,
        RepositoryUri::Relative(reference) => reference.contains(['?', '#']),
        RepositoryUri::Absolute { url, .. } => url.query().is_some() || url.fragment().is_some(),
    };
    if extra {
        error!("Location {} carries a query or fragment", raw);
        return Err(UriError::QueryOrFragment {
            input: raw.to_string(),
        });
    }
    Ok(())
}

fn strip_query_and_fragment(raw: &str) -> &str {
    raw.split(['?', '#']).next().unwrap_or_default()
}

fn decode(path: &str) -> String {
    percent_decode_str(path).decode_utf8_lossy().into_owned()
}

fn check_reference_chars(raw: &str) -> Result<(), String> {
    const ALLOWED: &str = "-._~!$&'()*+,;=:@/?#";

    let mut chars = raw.char_indices();
    while let Some((idx, c)) = chars.next() {
        if c == '%' {
            let escape: String = chars.by_ref().take(2).map(|(_, c)| c).collect();
            if escape.len() != 2 || !escape.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(format!("malformed escape sequence at index {idx}"));
            }
            continue;
        }
        let other = !c.is_ascii() && !c.is_whitespace() && !c.is_control();
        if c.is_ascii_alphanumeric() || other || ALLOWED.contains(c) {
            continue;
        }
        return Err(format!("illegal character `{c}` at index {idx}"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_input_is_empty() {
        assert_eq!(to_uri("").unwrap(), RepositoryUri::Empty);
        assert_eq!(to_uri("   ").unwrap(), RepositoryUri::Empty);
        assert_eq!(to_path(&RepositoryUri::Empty), "");
    }

    #[test]
    fn test_absolute_path_gets_file_scheme() {
        let uri = to_uri("/a/b").unwrap();
        assert!(uri.is_file());
        assert_eq!(uri.to_string(), "file:///a/b");
        assert_eq!(to_path(&uri), "/a/b");
    }

    #[test]
    fn test_file_scheme_input_is_accepted() {
        let uri = to_uri("file:///srv/repos/internal").unwrap();
        assert!(uri.is_file());
        assert_eq!(
            uri.to_file_path(),
            Some(PathBuf::from("/srv/repos/internal"))
        );
    }

    #[test]
    fn test_other_schemes_are_rejected() {
        let err = to_uri("http://x").unwrap_err();
        assert_eq!(
            err,
            UriError::UnsupportedScheme {
                input: "http://x".to_string(),
                scheme: "http".to_string(),
            }
        );

        assert!(matches!(
            to_uri("https://repo.example.org/maven2"),
            Err(UriError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn test_relative_reference_is_kept() {
        let (uri, branch) = parse_file_uri("repos/internal").unwrap();
        assert_eq!(uri, RepositoryUri::Relative("repos/internal".to_string()));
        assert_eq!(branch, ParseBranch::Direct);
        assert_eq!(to_path(&uri), "repos/internal");
    }

    #[test]
    fn test_syntax_error_falls_back_to_file_prefix() {
        let (uri, branch) = parse_file_uri("data\\internal").unwrap();
        assert_eq!(branch, ParseBranch::FileFallback);
        assert!(uri.is_file());
    }

    #[test]
    fn test_fallback_failure_is_unconvertible() {
        let err = to_uri("[broken").unwrap_err();
        assert!(matches!(err, UriError::Unconvertible { .. }));
        assert_eq!(err.input(), "[broken");
    }

    #[test]
    fn test_parse_without_policy() {
        let uri = RepositoryUri::parse("https://repo.example.org/.index").unwrap();
        assert_eq!(uri.scheme(), Some("https"));
        assert_eq!(to_path(&uri), "https://repo.example.org/.index");

        assert_eq!(
            RepositoryUri::parse(".index").unwrap(),
            RepositoryUri::Relative(".index".to_string())
        );
        assert!(matches!(
            RepositoryUri::parse("not a uri"),
            Err(UriError::Syntax { .. })
        ));
        assert!(matches!(
            RepositoryUri::parse("bad%zz"),
            Err(UriError::Syntax { .. })
        ));
    }

    #[test]
    fn test_relative_path_component() {
        let uri = RepositoryUri::parse("idx%20dir/packed?x=1#frag").unwrap();
        assert_eq!(uri.path(), "idx dir/packed");
    }

    #[test]
    fn test_absolute_path_with_uri_delimiters_is_kept_whole() {
        for raw in ["/data/repo#1", "/data/what?now", "/data/100%/repo", "/data/a b"] {
            let uri = to_uri(raw).unwrap();
            assert!(uri.is_file(), "{raw}");
            assert_eq!(uri.to_file_path(), Some(PathBuf::from(raw)));
            assert_eq!(to_path(&uri), raw);
        }
    }

    #[test]
    fn test_query_or_fragment_is_rejected() {
        for raw in ["file:///data/repo#1", "file:///data/repo?x=1", "repos/internal#1"] {
            assert_eq!(
                to_uri(raw).unwrap_err(),
                UriError::QueryOrFragment {
                    input: raw.to_string()
                }
            );
        }
    }

    #[test]
    fn test_absolute_url_keeps_configured_spelling() {
        for raw in [
            "https://repo.example.org",
            "https://Repo.Example.org/maven2",
            "http://repo.example.org:80/m2",
        ] {
            let uri = RepositoryUri::parse(raw).unwrap();
            assert_eq!(uri.to_string(), raw);
            assert_eq!(to_path(&uri), raw);
        }

        let uri = RepositoryUri::parse("https://Repo.Example.org").unwrap();
        assert_eq!(uri.as_url().unwrap().host_str(), Some("repo.example.org"));
    }

    #[test]
    fn test_from_directory() {
        let uri = RepositoryUri::from_directory(Path::new("/var/lib/depot")).unwrap();
        assert_eq!(uri.to_string(), "file:///var/lib/depot/");
        assert!(RepositoryUri::from_directory(Path::new("relative")).is_none());
    }
}
