use crate::core::models::structure::Structure;
use crate::core::utils::paths::normalize_key;
use crate::engine::cache::ArtifactCache;
use crate::engine::collaborators::{GeometryEngine, ProvidedGeometry, StructureResolver};
use crate::engine::config::PipelineConfig;
use crate::engine::error::EngineError;
use crate::engine::layout::{Asset, AssetLayout};
use crate::engine::locks::KeyedLocks;
use crate::engine::mesh_builder::{BuildReport, MeshBuilder};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

/// Outcome of one `generate` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub identifier: String,
    pub key: String,
    pub public_path: String,
    pub file_path: PathBuf,
    /// `true` when an existing file was reused and nothing was built.
    pub cache_hit: bool,
    /// Present only when a new asset was built.
    pub report: Option<BuildReport>,
}

impl Generation {
    fn hit(identifier: &str, asset: Asset) -> Self {
        Self {
            identifier: identifier.to_string(),
            key: asset.key,
            public_path: asset.public_path,
            file_path: asset.file_path,
            cache_hit: true,
            report: None,
        }
    }

    fn built(identifier: &str, asset: Asset, report: BuildReport) -> Self {
        Self {
            identifier: identifier.to_string(),
            key: asset.key,
            public_path: asset.public_path,
            file_path: asset.file_path,
            cache_hit: false,
            report: Some(report),
        }
    }
}

/// Maps chemical identifiers to persisted GLB assets.
///
/// The same identifier always yields the same key and public path. Construction for
/// a given key is serialized; once a file exists it is reused without calling the
/// geometry engine or the mesh builder again.
pub struct GenerationPipeline<R, G = ProvidedGeometry> {
    resolver: R,
    geometry: G,
    builder: MeshBuilder,
    layout: AssetLayout,
    cache: ArtifactCache,
    locks: KeyedLocks,
}

impl<R: StructureResolver> GenerationPipeline<R, ProvidedGeometry> {
    pub fn with_provided_geometry(config: &PipelineConfig, resolver: R) -> Self {
        Self::new(config, resolver, ProvidedGeometry)
    }
}

impl<R: StructureResolver, G: GeometryEngine> GenerationPipeline<R, G> {
    pub fn new(config: &PipelineConfig, resolver: R, geometry: G) -> Self {
        let layout = AssetLayout::from_config(config);
        Self {
            resolver,
            geometry,
            builder: MeshBuilder::new(config.mesh.clone()),
            cache: ArtifactCache::open(layout.index_path()),
            layout,
            locks: KeyedLocks::new(),
        }
    }

    pub fn layout(&self) -> &AssetLayout {
        &self.layout
    }

    pub fn cache(&self) -> &ArtifactCache {
        &self.cache
    }

    pub fn builder(&self) -> &MeshBuilder {
        &self.builder
    }

    /// Public path recorded for `key`, if any. The file itself may be gone.
    pub fn cache_lookup(&self, key: &str) -> Option<String> {
        self.cache.get(key)
    }

    pub fn asset_for_public_path(&self, public_path: &str) -> Option<PathBuf> {
        self.layout.resolve_public_path(public_path)
    }

    #[instrument(skip_all, fields(identifier = %identifier))]
    pub fn generate(&self, identifier: &str) -> Result<Generation, EngineError> {
        self.run(identifier, false)
    }

    /// Regenerates the asset even if a file already exists.
    #[instrument(skip_all, fields(identifier = %identifier))]
    pub fn rebuild(&self, identifier: &str) -> Result<Generation, EngineError> {
        self.run(identifier, true)
    }

    fn resolve(&self, identifier: &str) -> Result<Structure, EngineError> {
        let resolved = self
            .resolver
            .resolve(identifier)
            .map_err(|source| EngineError::Resolution {
                identifier: identifier.to_string(),
                source,
            })?;
        match resolved {
            Some(structure) if !structure.is_empty() => Ok(structure),
            _ => Err(EngineError::NotFound {
                identifier: identifier.to_string(),
            }),
        }
    }

    fn run(&self, identifier: &str, force: bool) -> Result<Generation, EngineError> {
        let structure = self.resolve(identifier)?;
        let key = normalize_key(identifier);
        let asset = self.layout.asset(&key);
        debug!(key = %key, atoms = structure.atoms().len(), "Structure resolved.");

        self.locks.with_lock(&key, || {
            if force {
                remove_stale(&asset)?;
            } else if asset.exists() {
                self.register(&asset)?;
                info!(key = %asset.key, path = %asset.public_path, "Cache hit.");
                return Ok(Generation::hit(identifier, asset));
            }

            let embedded =
                self.geometry
                    .embed(&structure)
                    .map_err(|source| EngineError::Geometry {
                        identifier: identifier.to_string(),
                        source,
                    })?;
            let report = self.builder.build(&embedded, &asset.file_path)?;
            self.cache.set(&asset.key, &asset.public_path)?;
            info!(
                key = %asset.key,
                path = %asset.public_path,
                formula = %report.formula,
                "Asset generated."
            );
            Ok(Generation::built(identifier, asset, report))
        })
    }

    /// Records an existing file in the index unless the entry is already correct.
    fn register(&self, asset: &Asset) -> Result<(), EngineError> {
        if self.cache.get(&asset.key).as_deref() != Some(asset.public_path.as_str()) {
            debug!(key = %asset.key, "Indexing existing asset.");
            self.cache.set(&asset.key, &asset.public_path)?;
        }
        Ok(())
    }
}

fn remove_stale(asset: &Asset) -> Result<(), EngineError> {
    match fs::remove_file(&asset.file_path) {
        Ok(()) => {
            warn!(path = %asset.file_path.display(), "Removed existing asset before rebuild.");
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(EngineError::Io {
            path: asset.file_path.clone(),
            source,
        }),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::core::io::glb::GlbFile;
    use crate::core::models::mesh::PrimitiveKind;
    use crate::engine::correspondence::extract_atoms;
    use std::sync::Arc;
    use std::thread;
    use tempfile::tempdir;

    #[test]
    fn water_end_to_end() {
        let dir = tempdir().unwrap();
        let geometry = CountingGeometry::default();
        let p = pipeline(dir.path(), MapResolver::with(vec![("water", water())]), &geometry);

        let generation = p.generate("water").unwrap();
        assert_eq!(generation.key, "water");
        assert_eq!(generation.public_path, "/media/models/water.glb");
        assert!(!generation.cache_hit);
        assert!(generation.file_path.is_file());
        assert_eq!(p.cache_lookup("water").as_deref(), Some("/media/models/water.glb"));

        let scene = GlbFile::read_from_path(&generation.file_path).unwrap();
        assert_eq!(scene.count(PrimitiveKind::Atom), 3);
        assert_eq!(scene.count(PrimitiveKind::Bond), 2);
        let symbols: Vec<_> = extract_atoms(&scene).into_iter().map(|a| a.symbol).collect();
        assert_eq!(symbols, vec!["O", "H", "H"]);
    }

    #[test]
    fn second_generation_is_a_cache_hit_without_embedding() {
        let dir = tempdir().unwrap();
        let geometry = CountingGeometry::default();
        let p = pipeline(dir.path(), MapResolver::with(vec![("water", water())]), &geometry);

        let first = p.generate("water").unwrap();
        let second = p.generate("water").unwrap();
        assert_eq!(geometry.count(), 1);
        assert!(second.cache_hit);
        assert!(second.report.is_none());
        assert_eq!(first.public_path, second.public_path);
    }

    #[test]
    fn cache_hit_survives_restart() {
        let dir = tempdir().unwrap();
        let geometry = CountingGeometry::default();
        pipeline(dir.path(), MapResolver::with(vec![("water", water())]), &geometry)
            .generate("water")
            .unwrap();

        let restarted = pipeline(dir.path(), MapResolver::with(vec![("water", water())]), &geometry);
        assert_eq!(
            restarted.cache_lookup("water").as_deref(),
            Some("/media/models/water.glb")
        );
        assert!(restarted.generate("water").unwrap().cache_hit);
        assert_eq!(geometry.count(), 1);
    }

    #[test]
    fn existing_file_without_index_entry_is_indexed() {
        let dir = tempdir().unwrap();
        let geometry = CountingGeometry::default();
        let p = pipeline(dir.path(), MapResolver::with(vec![("water", water())]), &geometry);
        p.generate("water").unwrap();
        p.cache().remove("water").unwrap();

        let hit = p.generate("water").unwrap();
        assert!(hit.cache_hit);
        assert_eq!(p.cache_lookup("water").as_deref(), Some("/media/models/water.glb"));
    }

    #[test]
    fn concurrent_requests_build_once() {
        let dir = tempdir().unwrap();
        let geometry: &'static CountingGeometry = Box::leak(Box::default());
        let p = Arc::new(pipeline(
            dir.path(),
            MapResolver::with(vec![("water", water())]),
            geometry,
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let p = Arc::clone(&p);
                thread::spawn(move || p.generate("water").unwrap())
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(geometry.count(), 1);
        assert_eq!(results.iter().filter(|g| !g.cache_hit).count(), 1);
    }

    #[test]
    fn unusual_identifiers_map_to_safe_keys() {
        let dir = tempdir().unwrap();
        let geometry = CountingGeometry::default();
        let p = pipeline(
            dir.path(),
            MapResolver::with(vec![("carbon monoxide", carbon_monoxide(0.0, false))]),
            &geometry,
        );
        let generation = p.generate("carbon monoxide").unwrap();
        assert_eq!(generation.key, "carbon_monoxide");
        assert_eq!(generation.public_path, "/media/models/carbon_monoxide.glb");
        assert_eq!(
            p.asset_for_public_path(&generation.public_path),
            Some(generation.file_path.clone())
        );
    }

    #[test]
    fn unknown_identifier_is_not_found_and_writes_nothing() {
        let dir = tempdir().unwrap();
        let geometry = CountingGeometry::default();
        let p = pipeline(dir.path(), MapResolver::default(), &geometry);
        let err = p.generate("unobtainium").unwrap_err();
        assert!(matches!(err, EngineError::NotFound { identifier } if identifier == "unobtainium"));
        assert_eq!(geometry.count(), 0);
        assert!(p.cache().is_empty());
    }

    #[test]
    fn resolver_failure_carries_identifier() {
        let dir = tempdir().unwrap();
        let geometry = CountingGeometry::default();
        let p = pipeline(dir.path(), MapResolver::default(), &geometry);
        let err = p.generate("explode").unwrap_err();
        assert!(matches!(err, EngineError::Resolution { identifier, .. } if identifier == "explode"));
    }

    #[test]
    fn geometry_failure_writes_and_caches_nothing() {
        let dir = tempdir().unwrap();
        let geometry = CountingGeometry {
            fail: true,
            ..CountingGeometry::default()
        };
        let p = pipeline(dir.path(), MapResolver::with(vec![("water", water())]), &geometry);
        let err = p.generate("water").unwrap_err();
        assert!(matches!(err, EngineError::Geometry { .. }));
        assert!(!p.layout().asset("water").exists());
        assert_eq!(p.cache_lookup("water"), None);
    }

    #[test]
    fn rebuild_always_builds() {
        let dir = tempdir().unwrap();
        let geometry = CountingGeometry::default();
        let p = pipeline(dir.path(), MapResolver::with(vec![("water", water())]), &geometry);
        p.generate("water").unwrap();
        let rebuilt = p.rebuild("water").unwrap();
        assert!(!rebuilt.cache_hit);
        assert_eq!(geometry.count(), 2);
        assert!(rebuilt.file_path.is_file());
    }
}
