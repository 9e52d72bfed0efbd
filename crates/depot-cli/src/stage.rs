use depot_config::error::ConfigError;
use depot_repository::staging::get_stage_repo_config;
use tracing::info;

use crate::{context::DepotContext, error::CliResult, list::render};

/// Prints the staging configuration that would be derived for managed repository `id`.
pub fn print_stage_config(ctx: &DepotContext, id: &str, json: bool) -> CliResult<()> {
    let base = ctx
        .config
        .get_managed(id)
        .ok_or_else(|| ConfigError::UnknownRepository(id.to_string()))?;

    if !base.stage_repo_needed {
        info!("Repository {} does not request a staging repository", id);
    }

    let stage = get_stage_repo_config(base);
    println!("{}", render(&stage, json)?);
    Ok(())
}
