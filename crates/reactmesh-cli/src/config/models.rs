use reactmesh::engine::config::PipelineConfig;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Where the CLI's structure resolver looks for molfiles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryConfig {
    pub dirs: Vec<PathBuf>,
    pub aliases: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub library: LibraryConfig,
}
