use super::open_pipeline;
use crate::cli::GenerateArgs;
use crate::config::AppConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use reactmesh::engine::progress::Progress;
use reactmesh::workflows::generate::Generation;
use tracing::info;

pub fn run(args: &GenerateArgs, app: &AppConfig, quiet: bool) -> Result<Vec<Generation>> {
    let pipeline = open_pipeline(app);
    let progress_handler = CliProgressHandler::new(quiet);
    let reporter = progress_handler.reporter();

    let generations = reporter.phase("Generating Structures", || {
        reporter.report(Progress::TaskStart {
            total_steps: args.identifiers.len() as u64,
        });
        let mut generations = Vec::with_capacity(args.identifiers.len());
        for identifier in &args.identifiers {
            let generation = if args.force {
                pipeline.rebuild(identifier)?
            } else {
                pipeline.generate(identifier)?
            };
            reporter.report(Progress::TaskIncrement);
            generations.push(generation);
        }
        reporter.report(Progress::TaskFinish);
        Ok::<_, crate::error::CliError>(generations)
    })?;

    for generation in &generations {
        info!(
            "'{}' -> {} (cache hit: {})",
            generation.identifier, generation.public_path, generation.cache_hit
        );
        match &generation.report {
            Some(report) => println!(
                "✓ {} ({}): {} atom(s), {} bond(s) -> {}",
                generation.identifier,
                report.formula,
                report.atoms.len(),
                report.bonds.len(),
                generation.public_path
            ),
            None => println!(
                "✓ {} (cached) -> {}",
                generation.identifier, generation.public_path
            ),
        }
    }
    Ok(generations)
}
