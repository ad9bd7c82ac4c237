use super::animate::{Animation, ReactionAnimator};
use super::generate::{Generation, GenerationPipeline};
use crate::engine::collaborators::{GeometryEngine, StructureResolver};
use crate::engine::config::AnimationConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct ReactionResult {
    pub reactants: Vec<Generation>,
    pub products: Vec<Generation>,
    pub animation: Animation,
}

/// Generates every reactant and product, then animates the reaction.
///
/// The first generation failure aborts the whole reaction; no partial animation is
/// ever produced.
#[instrument(skip_all, name = "reaction_workflow")]
pub fn run<R: StructureResolver, G: GeometryEngine>(
    pipeline: &GenerationPipeline<R, G>,
    reactants: &[&str],
    products: &[&str],
    config: &AnimationConfig,
    reporter: &ProgressReporter,
) -> Result<ReactionResult, EngineError> {
    config.validate()?;
    info!(
        reactants = reactants.len(),
        products = products.len(),
        "Starting reaction workflow."
    );

    let (reactant_generations, product_generations) =
        reporter.phase("Generating Structures", || {
            reporter.report(Progress::TaskStart {
                total_steps: (reactants.len() + products.len()) as u64,
            });
            let generate_all = |identifiers: &[&str]| {
                identifiers
                    .iter()
                    .map(|identifier| -> Result<Generation, EngineError> {
                        let generation = pipeline.generate(identifier)?;
                        reporter.report(Progress::TaskIncrement);
                        Ok(generation)
                    })
                    .collect::<Result<Vec<_>, EngineError>>()
            };
            let r = generate_all(reactants)?;
            let p = generate_all(products)?;
            reporter.report(Progress::TaskFinish);
            Ok::<_, EngineError>((r, p))
        })?;

    let reactant_paths: Vec<&str> = reactant_generations
        .iter()
        .map(|g| g.public_path.as_str())
        .collect();
    let product_paths: Vec<&str> = product_generations
        .iter()
        .map(|g| g.public_path.as_str())
        .collect();

    let animation = ReactionAnimator::new(pipeline, config.clone()).animate(
        &reactant_paths,
        &product_paths,
        reporter,
    )?;

    info!(frames = animation.frames.len(), "Reaction workflow complete.");
    Ok(ReactionResult {
        reactants: reactant_generations,
        products: product_generations,
        animation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::generate::test_support::*;
    use tempfile::tempdir;

    #[test]
    fn runs_generation_then_animation() {
        let dir = tempdir().unwrap();
        let geometry = CountingGeometry::default();
        let p = pipeline(
            dir.path(),
            MapResolver::with(vec![
                ("co", carbon_monoxide(0.0, false)),
                ("water", water()),
                ("oc", carbon_monoxide(2.0, true)),
            ]),
            &geometry,
        );

        let result = run(
            &p,
            &["co", "water"],
            &["oc"],
            &AnimationConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(result.reactants.len(), 2);
        assert_eq!(result.products.len(), 1);
        assert_eq!(result.animation.reactant_atoms.len(), 5);
        assert_eq!(result.animation.atom_map.len(), 2);
        assert_eq!(result.animation.frames[0].atoms.len(), 2);
    }

    #[test]
    fn first_failure_aborts_the_reaction() {
        let dir = tempdir().unwrap();
        let geometry = CountingGeometry::default();
        let p = pipeline(
            dir.path(),
            MapResolver::with(vec![("co", carbon_monoxide(0.0, false))]),
            &geometry,
        );

        let err = run(
            &p,
            &["co"],
            &["missing", "co"],
            &AnimationConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::NotFound { identifier } if identifier == "missing"));
        assert_eq!(geometry.count(), 1);
    }

    #[test]
    fn invalid_animation_config_is_rejected_up_front() {
        let dir = tempdir().unwrap();
        let geometry = CountingGeometry::default();
        let p = pipeline(dir.path(), MapResolver::default(), &geometry);
        let config = AnimationConfig {
            num_frames: 0,
            ..AnimationConfig::default()
        };
        let err = run(&p, &[], &[], &config, &ProgressReporter::new()).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }
}
