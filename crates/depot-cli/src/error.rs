use depot_config::error::ConfigError;
use depot_repository::RepositoryError;
use depot_utils::error::PathError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    #[diagnostic(code(depot::cli::path))]
    Path(#[from] PathError),

    #[error("IO error while {action}")]
    #[diagnostic(code(depot::cli::io))]
    Io {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(depot::cli::toml))]
    Toml(#[from] toml::ser::Error),

    #[error(transparent)]
    #[diagnostic(code(depot::cli::json))]
    Json(#[from] serde_json::Error),

    #[error("{0} repositories failed to initialize")]
    #[diagnostic(
        code(depot::cli::check_failed),
        help("Fix the reported entries in the configuration file")
    )]
    CheckFailed(usize),
}

pub type CliResult<T> = std::result::Result<T, CliError>;
