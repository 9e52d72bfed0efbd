use nu_ansi_term::Color::{Green, Red};
use tabled::{
    builder::Builder,
    settings::{peaker::PriorityMax, themes::BorderCorrection, Panel, Style, Width},
};
use tracing::{error, info};

use crate::{
    context::DepotContext,
    error::{CliError, CliResult},
    utils::{term_width, Colored, Icons},
};

/// Brings up every configured repository and fails when any of them could not be created.
pub fn check_repositories(ctx: &DepotContext) -> CliResult<()> {
    let report = ctx.initialize();

    let mut builder = Builder::new();
    for id in &report.registered {
        builder.push_record([
            format!("{} {}", Colored(Green, Icons::CHECK), id),
            "OK".to_string(),
        ]);
    }
    for failure in &report.failures {
        builder.push_record([
            format!("{} {} ({})", Colored(Red, Icons::CROSS), failure.id, failure.kind),
            failure.error.to_string(),
        ]);
    }

    let table = builder
        .build()
        .with(Panel::header("Repository Check"))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .with(Width::wrap(term_width()).priority(PriorityMax::default()))
        .to_string();

    info!("\n{table}");

    if report.is_clean() {
        info!("All {} repositories initialized", report.registered.len());
        return Ok(());
    }

    error!(
        "{} of {} repositories failed",
        report.failures.len(),
        report.failures.len() + report.registered.len()
    );
    Err(CliError::CheckFailed(report.failures.len()))
}
