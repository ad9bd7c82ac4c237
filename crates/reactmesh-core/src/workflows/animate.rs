use super::generate::GenerationPipeline;
use super::repair::AutoRepair;
use crate::core::io::glb::{GlbError, GlbFile};
use crate::engine::collaborators::{GeometryEngine, StructureResolver};
use crate::engine::config::AnimationConfig;
use crate::engine::correspondence::{AtomCorrespondence, ExtractedAtom, extract_atoms};
use crate::engine::error::EngineError;
use crate::engine::interpolation::{
    AnimationFrame, ProximityBond, interpolate_frames, proximity_bonds,
};
use crate::engine::progress::{Progress, ProgressReporter};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// A fully materialized reaction animation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Animation {
    pub frames: Vec<AnimationFrame>,
    pub atom_map: AtomCorrespondence,
    pub reactant_atoms: Vec<ExtractedAtom>,
    pub product_atoms: Vec<ExtractedAtom>,
    pub reactant_bonds: Vec<ProximityBond>,
    pub product_bonds: Vec<ProximityBond>,
    pub reactant_assets: Vec<String>,
    pub product_assets: Vec<String>,
}

/// Morphs the atoms of reactant assets into the atoms of product assets.
pub struct ReactionAnimator<'p, R, G> {
    pipeline: &'p GenerationPipeline<R, G>,
    config: AnimationConfig,
}

impl<'p, R: StructureResolver, G: GeometryEngine> ReactionAnimator<'p, R, G> {
    pub fn new(pipeline: &'p GenerationPipeline<R, G>, config: AnimationConfig) -> Self {
        Self { pipeline, config }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    #[instrument(skip_all, fields(reactants = reactant_assets.len(), products = product_assets.len()))]
    pub fn animate<S: AsRef<str>>(
        &self,
        reactant_assets: &[S],
        product_assets: &[S],
        reporter: &ProgressReporter,
    ) -> Result<Animation, EngineError> {
        self.config.validate()?;
        let reactant_assets = self.canonical(reactant_assets);
        let product_assets = self.canonical(product_assets);

        let (reactant_atoms, product_atoms) = reporter.phase("Extracting Atoms", || {
            reporter.report(Progress::TaskStart {
                total_steps: (reactant_assets.len() + product_assets.len()) as u64,
            });
            let reactants = self.extract_all(&reactant_assets, reporter)?;
            let products = self.extract_all(&product_assets, reporter)?;
            reporter.report(Progress::TaskFinish);
            Ok::<_, EngineError>((reactants, products))
        })?;

        let animation = reporter.phase("Interpolating Frames", || {
            let atom_map = AtomCorrespondence::greedy(&reactant_atoms, &product_atoms);
            let unmatched = atom_map.unmatched_reactants(reactant_atoms.len());
            if !unmatched.is_empty() {
                debug!(?unmatched, "Some reactant atoms have no product counterpart.");
            }
            let frames = interpolate_frames(
                &reactant_atoms,
                &product_atoms,
                &atom_map,
                self.config.num_frames,
            );
            let reactant_bonds = proximity_bonds(&reactant_atoms, self.config.bond_threshold);
            let product_bonds = proximity_bonds(&product_atoms, self.config.bond_threshold);
            Animation {
                frames,
                atom_map,
                reactant_atoms,
                product_atoms,
                reactant_bonds,
                product_bonds,
                reactant_assets,
                product_assets,
            }
        });

        info!(
            frames = animation.frames.len(),
            matched = animation.atom_map.len(),
            "Animation ready."
        );
        Ok(animation)
    }

    fn canonical<S: AsRef<str>>(&self, assets: &[S]) -> Vec<String> {
        assets
            .iter()
            .map(|a| self.pipeline.layout().public_path(a.as_ref()))
            .collect()
    }

    fn extract_all(
        &self,
        assets: &[String],
        reporter: &ProgressReporter,
    ) -> Result<Vec<ExtractedAtom>, EngineError> {
        let mut atoms = Vec::new();
        for public_path in assets {
            atoms.extend(self.extract_with_repair(public_path)?);
            reporter.report(Progress::TaskIncrement);
        }
        Ok(atoms)
    }

    /// Extracts atoms from one asset, regenerating it once if it cannot be read.
    fn extract_with_repair(&self, public_path: &str) -> Result<Vec<ExtractedAtom>, EngineError> {
        let file = self.pipeline.asset_for_public_path(public_path).ok_or_else(|| {
            EngineError::AssetMissing {
                path: public_path.to_string(),
                reason: "path does not lie under the media root".to_string(),
            }
        })?;

        let first_error = match read_atoms(&file) {
            Ok(atoms) => return Ok(atoms),
            Err(err) => err,
        };
        warn!(path = %public_path, error = %first_error, "Asset unreadable, attempting repair.");

        let generation = AutoRepair::new(self.pipeline)
            .repair_asset(public_path)
            .map_err(|err| EngineError::AssetMissing {
                path: public_path.to_string(),
                reason: format!("{first_error}; regeneration failed: {err}"),
            })?;

        read_atoms(&generation.file_path).map_err(|source| EngineError::Asset {
            path: generation.file_path.clone(),
            source,
        })
    }
}

fn read_atoms(file: &Path) -> Result<Vec<ExtractedAtom>, GlbError> {
    GlbFile::read_from_path(file).map(|scene| extract_atoms(&scene))
}
