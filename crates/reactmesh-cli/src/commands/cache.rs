use super::open_pipeline;
use crate::cli::{CacheArgs, CacheCommands};
use crate::config::AppConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use reactmesh::core::utils::paths::normalize_key;
use reactmesh::workflows::repair::{AutoRepair, SweepReport};
use tracing::{info, warn};

pub fn run(args: &CacheArgs, app: &AppConfig, quiet: bool) -> Result<()> {
    match &args.command {
        CacheCommands::List => list(app).map(|_| ()),
        CacheCommands::Get { key } => get(app, key).map(|_| ()),
        CacheCommands::Repair => repair(app, quiet).map(|_| ()),
    }
}

fn list(app: &AppConfig) -> Result<Vec<(String, String)>> {
    let pipeline = open_pipeline(app);
    let entries = pipeline.cache().entries();
    if entries.is_empty() {
        println!("Cache index at {} is empty.", pipeline.cache().path().display());
    }
    for (key, public_path) in &entries {
        println!("{key}\t{public_path}");
    }
    Ok(entries)
}

fn get(app: &AppConfig, raw: &str) -> Result<String> {
    let pipeline = open_pipeline(app);
    let key = normalize_key(raw);
    let public_path = pipeline
        .cache_lookup(&key)
        .ok_or_else(|| CliError::Argument(format!("No cache entry for key '{key}'")))?;
    println!("{public_path}");
    Ok(public_path)
}

fn repair(app: &AppConfig, quiet: bool) -> Result<SweepReport> {
    let pipeline = open_pipeline(app);
    let progress_handler = CliProgressHandler::new(quiet);
    let reporter = progress_handler.reporter();

    let report = reporter.phase("Checking Assets", || AutoRepair::new(&pipeline).sweep(&reporter));
    info!(
        "Sweep finished: {} healthy, {} repaired, {} failed",
        report.healthy.len(),
        report.repaired.len(),
        report.failed.len()
    );

    println!(
        "✓ {} healthy, {} repaired, {} failed",
        report.healthy.len(),
        report.repaired.len(),
        report.failed.len()
    );
    for key in &report.repaired {
        println!("  repaired: {key}");
    }
    for (key, reason) in &report.failed {
        warn!("Could not repair '{}': {}", key, reason);
        println!("  failed:   {key} ({reason})");
    }

    if report.failed.is_empty() {
        Ok(report)
    } else {
        Err(CliError::Other(anyhow::anyhow!(
            "{} asset(s) could not be repaired",
            report.failed.len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::open_pipeline;
    use crate::commands::test_support::app;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn list_and_get_read_the_index() {
        let dir = tempdir().unwrap();
        let app = app(dir.path());
        assert!(list(&app).unwrap().is_empty());

        let pipeline = open_pipeline(&app);
        pipeline.generate("water").unwrap();
        pipeline.generate("co").unwrap();
        drop(pipeline);

        let entries = list(&app).unwrap();
        assert_eq!(
            entries,
            vec![
                ("co".to_string(), "/media/models/co.glb".to_string()),
                ("water".to_string(), "/media/models/water.glb".to_string()),
            ]
        );
        assert_eq!(get(&app, "water").unwrap(), "/media/models/water.glb");
        assert!(matches!(get(&app, "benzene"), Err(CliError::Argument(_))));
    }

    #[test]
    fn repair_regenerates_missing_assets() {
        let dir = tempdir().unwrap();
        let app = app(dir.path());
        let pipeline = open_pipeline(&app);
        let water = pipeline.generate("water").unwrap();
        drop(pipeline);
        fs::remove_file(&water.file_path).unwrap();

        let report = repair(&app, true).unwrap();
        assert_eq!(report.repaired, vec!["water".to_string()]);
        assert!(water.file_path.is_file());
    }

    #[test]
    fn repair_fails_when_an_asset_cannot_be_rebuilt() {
        let dir = tempdir().unwrap();
        let app = app(dir.path());
        let pipeline = open_pipeline(&app);
        pipeline
            .cache()
            .set("ghost", "/media/models/ghost.glb")
            .unwrap();
        drop(pipeline);

        assert!(matches!(repair(&app, true), Err(CliError::Other(_))));
    }
}
