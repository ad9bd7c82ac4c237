use super::{open_pipeline, write_animation};
use crate::cli::ReactArgs;
use crate::config::AppConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use reactmesh::workflows::react::{self, ReactionResult};
use tracing::info;

pub fn run(args: &ReactArgs, app: &AppConfig, quiet: bool) -> Result<ReactionResult> {
    let pipeline = open_pipeline(app);
    let progress_handler = CliProgressHandler::new(quiet);
    let reporter = progress_handler.reporter();

    let reactants: Vec<&str> = args.reactants.iter().map(String::as_str).collect();
    let products: Vec<&str> = args.products.iter().map(String::as_str).collect();

    info!("Invoking the reaction workflow...");
    let result = react::run(
        &pipeline,
        &reactants,
        &products,
        &app.pipeline.animation,
        &reporter,
    )?;

    for generation in result.reactants.iter().chain(&result.products) {
        eprintln!("  {} -> {}", generation.identifier, generation.public_path);
    }
    write_animation(&result.animation, args.animation.output.as_deref())?;
    Ok(result)
}
