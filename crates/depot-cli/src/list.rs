use depot_events::RepositoryKind;
use depot_repository::{
    error::RepositoryError, Repository, RepositoryProvider, RepositoryRef,
};
use nu_ansi_term::Color::{Blue, Cyan, Green, Yellow};
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{peaker::PriorityMax, themes::BorderCorrection, Panel, Style, Width},
};
use tracing::{info, warn};

use crate::{
    context::DepotContext,
    error::CliResult,
    utils::{term_width, Colored},
};

#[derive(Debug, Serialize)]
struct RepositoryRow {
    id: String,
    kind: String,
    name: String,
    location: String,
    layout: String,
}

impl From<&RepositoryRef> for RepositoryRow {
    fn from(repo: &RepositoryRef) -> Self {
        let (location, layout) = match repo {
            RepositoryRef::Managed(repo) => {
                (repo.local_path().display().to_string(), repo.layout())
            }
            RepositoryRef::Remote(repo) => (repo.location().to_string(), repo.layout()),
            RepositoryRef::Group(group) => {
                (group.local_path().display().to_string(), group.layout())
            }
        };
        Self {
            id: repo.id().to_string(),
            kind: repo.kind().to_string(),
            name: repo.name().to_string(),
            location,
            layout: layout.to_string(),
        }
    }
}

fn kind_color(kind: RepositoryKind) -> nu_ansi_term::Color {
    match kind {
        RepositoryKind::Managed => Green,
        RepositoryKind::Remote => Cyan,
        RepositoryKind::Group => Yellow,
    }
}

pub fn list_repositories(ctx: &DepotContext, json: bool) -> CliResult<()> {
    let report = ctx.initialize();
    for failure in &report.failures {
        warn!("Skipping {} repository {}", failure.kind, failure.id);
    }

    let repositories = ctx.registry.repositories();
    let rows: Vec<RepositoryRow> = repositories.iter().map(RepositoryRow::from).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        info!("No repositories configured");
        return Ok(());
    }

    let mut builder = Builder::new();
    builder.push_record(["Id", "Kind", "Name", "Location", "Layout"].map(String::from));
    for (repo, row) in repositories.iter().zip(&rows) {
        builder.push_record([
            Colored(Blue, &row.id).to_string(),
            Colored(kind_color(repo.kind()), &row.kind).to_string(),
            row.name.clone(),
            row.location.clone(),
            row.layout.clone(),
        ]);
    }

    let table = builder
        .build()
        .with(Panel::header("Repositories"))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .with(Width::wrap(term_width()).priority(PriorityMax::default()))
        .to_string();

    info!("\n{table}");
    Ok(())
}

/// Prints the configuration record of a registered repository as produced by the provider.
pub fn show_repository(ctx: &DepotContext, id: &str, json: bool) -> CliResult<()> {
    ctx.initialize();

    let repo = ctx
        .registry
        .get_repository(id)
        .ok_or_else(|| RepositoryError::UnknownRepository(id.to_string()))?;

    let output = match &repo {
        RepositoryRef::Managed(repo) => {
            render(&ctx.provider.get_managed_configuration(repo)?, json)?
        }
        RepositoryRef::Remote(repo) => {
            render(&ctx.provider.get_remote_configuration(repo)?, json)?
        }
        RepositoryRef::Group(group) => {
            render(&ctx.provider.get_repository_group_configuration(group)?, json)?
        }
    };

    info!(
        "{} {} ({})",
        Colored(Blue, repo.id()),
        Colored(kind_color(repo.kind()), repo.kind()),
        repo.name()
    );
    println!("{output}");
    Ok(())
}

pub fn render<T: Serialize>(value: &T, json: bool) -> CliResult<String> {
    if json {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(toml::to_string_pretty(value)?)
    }
}

#[cfg(test)]
mod tests {
    use depot_config::repository::ManagedRepositoryConfiguration;

    use super::*;

    #[test]
    fn test_render_formats() {
        let cfg = ManagedRepositoryConfiguration::new("internal", "Internal");

        let toml = render(&cfg, false).unwrap();
        assert!(toml.contains("id = \"internal\""));

        let json = render(&cfg, true).unwrap();
        assert!(json.contains("\"id\": \"internal\""));
    }
}
