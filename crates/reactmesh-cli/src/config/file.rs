use crate::error::{CliError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileMeshConfig {
    pub atom_radius: Option<f64>,
    pub hydrogen_radius: Option<f64>,
    pub bond_radius: Option<f64>,
    pub bond_offset: Option<f64>,
    /// RGB channels in `0..=255`.
    pub bond_color: Option<[u8; 3]>,
    pub sphere_rings: Option<u32>,
    pub sphere_segments: Option<u32>,
    pub cylinder_sections: Option<u32>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileAnimationConfig {
    pub frames: Option<usize>,
    pub bond_threshold: Option<f64>,
}

/// The optional TOML configuration file. Every field may be omitted.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub media_root: Option<PathBuf>,
    pub models_dir: Option<String>,
    pub index_file: Option<String>,
    #[serde(default)]
    pub library_dirs: Vec<PathBuf>,
    /// Identifier → structure file stem, e.g. `water = "H2O"`.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    pub mesh: Option<FileMeshConfig>,
    pub animation: Option<FileAnimationConfig>,
}

impl FileConfig {
    /// Loads a config file. Relative paths inside it are taken relative to the file.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.relative_to(base))
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn relative_to(mut self, base: &Path) -> Self {
        let anchor = |p: PathBuf| if p.is_relative() { base.join(p) } else { p };
        self.media_root = self.media_root.map(anchor);
        self.library_dirs = self.library_dirs.into_iter().map(anchor).collect();
        self
    }
}
