pub mod animate;
pub mod cache;
pub mod generate;
pub mod react;

use crate::config::AppConfig;
use crate::error::Result;
use crate::resolver::LibraryResolver;
use reactmesh::workflows::animate::Animation;
use reactmesh::workflows::generate::GenerationPipeline;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

pub type CliPipeline = GenerationPipeline<LibraryResolver>;

fn open_pipeline(app: &AppConfig) -> CliPipeline {
    info!(
        "Opening asset store at {:?} with {} library dir(s)",
        app.pipeline.models_path(),
        app.library.dirs.len()
    );
    GenerationPipeline::with_provided_geometry(&app.pipeline, LibraryResolver::new(&app.library))
}

/// Writes the animation as pretty JSON to `output`, or to stdout.
fn write_animation(animation: &Animation, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, animation).map_err(anyhow::Error::from)?;
            writer.flush()?;
            println!(
                "✓ {} frame(s) written to: {}",
                animation.frames.len(),
                path.display()
            );
        }
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, animation).map_err(anyhow::Error::from)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}
