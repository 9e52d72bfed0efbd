use std::process::ExitCode;

use check::check_repositories;
use clap::Parser;
use cli::{Args, Commands};
use context::{resolve_config_path, DepotContext};
use depot_config::config::generate_default_config;
use error::CliResult;
use list::{list_repositories, render, show_repository};
use logging::setup_logging;
use stage::print_stage_config;
use tracing::debug;

mod check;
mod cli;
mod context;
mod error;
mod list;
mod logging;
mod stage;
mod utils;

fn handle_cli() -> CliResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        utils::set_color(false);
    }

    let config_path = resolve_config_path(args.config.as_deref())?;
    debug!("Using config file {}", config_path.display());

    match args.command {
        Commands::Init => generate_default_config(&config_path)?,
        command => {
            let ctx = DepotContext::load(&config_path)?;

            match command {
                Commands::Config => println!("{}", render(&ctx.config, args.json)?),
                Commands::List => list_repositories(&ctx, args.json)?,
                Commands::Show {
                    id,
                } => show_repository(&ctx, &id, args.json)?,
                Commands::Stage {
                    id,
                } => print_stage_config(&ctx, &id, args.json)?,
                Commands::Check => check_repositories(&ctx)?,
                Commands::Init => unreachable!(),
            }
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
