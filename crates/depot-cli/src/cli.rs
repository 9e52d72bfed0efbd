use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the default configuration file with documentation comments
    #[clap(name = "init", visible_alias = "defconfig")]
    Init,

    /// Print the resolved configuration
    Config,

    /// List registered repositories
    #[clap(name = "list", visible_alias = "ls")]
    List,

    /// Show the configuration of a repository as it round-trips through the provider
    #[command(arg_required_else_help = true)]
    Show {
        /// Repository id
        id: String,
    },

    /// Print the staging configuration derived from a managed repository
    #[command(arg_required_else_help = true)]
    Stage {
        /// Managed repository id
        id: String,
    },

    /// Initialize every configured repository and report failures
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_command() {
        let args = Args::parse_from(["depot", "show", "internal", "-vv", "--json"]);
        assert_eq!(args.verbose, 2);
        assert!(args.json);
        assert!(matches!(args.command, Commands::Show { id } if id == "internal"));
    }
}
