use super::collaborators::{GeometryError, ResolutionError};
use super::config::ConfigError;
use crate::core::io::glb::GlbError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Failed to persist cache index {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to resolve '{identifier}': {source}")]
    Resolution {
        identifier: String,
        #[source]
        source: ResolutionError,
    },

    #[error("No structure found for '{identifier}'")]
    NotFound { identifier: String },

    #[error("Could not compute 3D coordinates for '{identifier}': {source}")]
    Geometry {
        identifier: String,
        #[source]
        source: GeometryError,
    },

    #[error("Asset {path} is unavailable: {reason}")]
    AssetMissing { path: String, reason: String },

    #[error("Asset {} could not be processed: {source}", .path.display())]
    Asset {
        path: PathBuf,
        #[source]
        source: GlbError,
    },

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<CacheError> for EngineError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Persist { path, source } => EngineError::Io { path, source },
        }
    }
}
