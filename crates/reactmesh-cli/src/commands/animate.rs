use super::{open_pipeline, write_animation};
use crate::cli::AnimateArgs;
use crate::config::AppConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use reactmesh::workflows::animate::{Animation, ReactionAnimator};
use tracing::info;

pub fn run(args: &AnimateArgs, app: &AppConfig, quiet: bool) -> Result<Animation> {
    let pipeline = open_pipeline(app);
    let progress_handler = CliProgressHandler::new(quiet);
    let reporter = progress_handler.reporter();

    info!(
        "Animating {} reactant(s) into {} product(s)",
        args.reactants.len(),
        args.products.len()
    );
    let animation = ReactionAnimator::new(&pipeline, app.pipeline.animation.clone()).animate(
        &args.reactants,
        &args.products,
        &reporter,
    )?;

    write_animation(&animation, args.animation.output.as_deref())?;
    Ok(animation)
}
