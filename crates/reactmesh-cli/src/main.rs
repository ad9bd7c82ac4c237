mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod resolver;
mod utils;

use crate::cli::{Cli, Commands};
use crate::config::{DefaultsConfig, build_config};
use crate::error::Result;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    info!("🚀 reactmesh CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let overrides = match &cli.command {
        Commands::Animate(args) => Some(&args.animation),
        Commands::React(args) => Some(&args.animation),
        _ => None,
    };
    let app = build_config(&cli, overrides, &DefaultsConfig::default())?;

    let command_result = match &cli.command {
        Commands::Generate(args) => {
            info!("Dispatching to 'generate' command.");
            commands::generate::run(args, &app, cli.quiet).map(|_| ())
        }
        Commands::Animate(args) => {
            info!("Dispatching to 'animate' command.");
            commands::animate::run(args, &app, cli.quiet).map(|_| ())
        }
        Commands::React(args) => {
            info!("Dispatching to 'react' command.");
            commands::react::run(args, &app, cli.quiet).map(|_| ())
        }
        Commands::Cache(args) => {
            info!("Dispatching to 'cache' command.");
            commands::cache::run(args, &app, cli.quiet)
        }
    };

    match &command_result {
        Ok(()) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }
    command_result
}
