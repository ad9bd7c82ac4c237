use directories::ProjectDirs;
use std::path::PathBuf;

const FALLBACK_MEDIA_ROOT: &str = "media";

/// Values used when neither the command line nor the config file sets them.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultsConfig {
    pub media_root: PathBuf,
    pub library_dirs: Vec<PathBuf>,
    pub config_file: Option<PathBuf>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        match ProjectDirs::from("org", "reactmesh", "reactmesh") {
            Some(dirs) => Self {
                media_root: dirs.data_dir().join("media"),
                library_dirs: vec![dirs.data_dir().join("library")],
                config_file: Some(dirs.config_dir().join("reactmesh.toml")),
            },
            None => Self {
                media_root: PathBuf::from(FALLBACK_MEDIA_ROOT),
                library_dirs: Vec::new(),
                config_file: None,
            },
        }
    }
}
