use super::generate::{Generation, GenerationPipeline};
use crate::core::io::glb::GlbFile;
use crate::core::utils::paths::identifier_from_asset_path;
use crate::engine::collaborators::{GeometryEngine, StructureResolver};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use serde::Serialize;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetHealth {
    Healthy,
    Missing,
    Corrupt,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SweepReport {
    pub healthy: Vec<String>,
    pub repaired: Vec<String>,
    pub failed: Vec<(String, String)>,
}

/// Regenerates assets whose files are gone or unreadable.
pub struct AutoRepair<'p, R, G> {
    pipeline: &'p GenerationPipeline<R, G>,
}

impl<'p, R: StructureResolver, G: GeometryEngine> AutoRepair<'p, R, G> {
    pub fn new(pipeline: &'p GenerationPipeline<R, G>) -> Self {
        Self { pipeline }
    }

    pub fn check(&self, public_path: &str) -> AssetHealth {
        let Some(file) = self.pipeline.asset_for_public_path(public_path) else {
            return AssetHealth::Missing;
        };
        if !file.is_file() {
            return AssetHealth::Missing;
        }
        match GlbFile::read_from_path(&file) {
            Ok(scene) if !scene.is_empty() => AssetHealth::Healthy,
            _ => AssetHealth::Corrupt,
        }
    }

    /// Rebuilds the asset behind `public_path`, using its file stem as the identifier.
    #[instrument(skip_all, fields(path = %public_path))]
    pub fn repair_asset(&self, public_path: &str) -> Result<Generation, EngineError> {
        let identifier =
            identifier_from_asset_path(public_path).ok_or_else(|| EngineError::AssetMissing {
                path: public_path.to_string(),
                reason: "no identifier can be derived from the path".to_string(),
            })?;
        warn!(identifier = %identifier, "Regenerating asset.");
        let generation = self.pipeline.rebuild(&identifier)?;
        info!(path = %generation.public_path, "Asset regenerated.");
        Ok(generation)
    }

    /// Checks every indexed asset and rebuilds the broken ones.
    ///
    /// A failed rebuild is recorded in the report and does not stop the sweep.
    #[instrument(skip_all)]
    pub fn sweep(&self, reporter: &ProgressReporter) -> SweepReport {
        let entries = self.pipeline.cache().entries();
        let mut report = SweepReport::default();

        reporter.report(Progress::TaskStart {
            total_steps: entries.len() as u64,
        });
        for (key, public_path) in entries {
            match self.check(&public_path) {
                AssetHealth::Healthy => report.healthy.push(key),
                health => {
                    warn!(key = %key, ?health, "Indexed asset needs repair.");
                    match self.repair_asset(&public_path) {
                        Ok(_) => report.repaired.push(key),
                        Err(err) => report.failed.push((key, err.to_string())),
                    }
                }
            }
            reporter.report(Progress::TaskIncrement);
        }
        reporter.report(Progress::TaskFinish);

        info!(
            healthy = report.healthy.len(),
            repaired = report.repaired.len(),
            failed = report.failed.len(),
            "Cache sweep finished."
        );
        report
    }
}
