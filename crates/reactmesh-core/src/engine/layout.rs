use super::config::PipelineConfig;
use crate::core::utils::paths::{PUBLIC_ROOT_SEGMENT, normalize_public_path};
use std::path::{Path, PathBuf};

pub const ASSET_EXTENSION: &str = "glb";

/// A generated asset on disk together with its public address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub key: String,
    pub file_path: PathBuf,
    pub public_path: String,
}

impl Asset {
    /// Checked live on every call; another process may have removed the file.
    pub fn exists(&self) -> bool {
        self.file_path.is_file()
    }
}

/// Where assets and the index live under the media root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLayout {
    media_root: PathBuf,
    models_dir: String,
    index_file: String,
}

impl AssetLayout {
    pub fn new(
        media_root: impl Into<PathBuf>,
        models_dir: impl Into<String>,
        index_file: impl Into<String>,
    ) -> Self {
        Self {
            media_root: media_root.into(),
            models_dir: models_dir.into(),
            index_file: index_file.into(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            config.media_root.clone(),
            config.models_dir.clone(),
            config.index_file.clone(),
        )
    }

    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    pub fn models_path(&self) -> PathBuf {
        self.media_root.join(&self.models_dir)
    }

    pub fn index_path(&self) -> PathBuf {
        self.models_path().join(&self.index_file)
    }

    /// Describes the asset for an already normalized cache key.
    pub fn asset(&self, key: &str) -> Asset {
        let file_name = format!("{key}.{ASSET_EXTENSION}");
        Asset {
            key: key.to_string(),
            file_path: self.models_path().join(&file_name),
            public_path: format!("/{PUBLIC_ROOT_SEGMENT}/{}/{file_name}", self.models_dir),
        }
    }

    /// Canonical `/media/...` form of any path under (or relative to) the media root.
    pub fn public_path(&self, raw: &str) -> String {
        normalize_public_path(raw, &self.media_root.to_string_lossy())
    }

    /// Maps a public path back to a file under the media root.
    ///
    /// Returns `None` when the path would escape the media root.
    pub fn resolve_public_path(&self, raw: &str) -> Option<PathBuf> {
        let public = self.public_path(raw);
        let mut segments = public.split('/').filter(|s| !s.is_empty());
        if segments.next() != Some(PUBLIC_ROOT_SEGMENT) {
            return None;
        }
        let mut path = self.media_root.clone();
        let mut depth = 0usize;
        for segment in segments {
            if segment == ".." || segment.contains(':') {
                return None;
            }
            path.push(segment);
            depth += 1;
        }
        (depth > 0).then_some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> AssetLayout {
        AssetLayout::new("/srv/app/media", "models", "cache_index.json")
    }

    #[test]
    fn asset_paths_follow_the_key() {
        let asset = layout().asset("water");
        assert_eq!(asset.file_path, PathBuf::from("/srv/app/media/models/water.glb"));
        assert_eq!(asset.public_path, "/media/models/water.glb");
        assert_eq!(
            layout().index_path(),
            PathBuf::from("/srv/app/media/models/cache_index.json")
        );
    }

    #[test]
    fn resolve_public_path_maps_back_to_file() {
        let l = layout();
        assert_eq!(
            l.resolve_public_path("/media/models/water.glb"),
            Some(PathBuf::from("/srv/app/media/models/water.glb"))
        );
        assert_eq!(
            l.resolve_public_path("odels/water.glb"),
            Some(PathBuf::from("/srv/app/media/models/water.glb"))
        );
        assert_eq!(
            l.resolve_public_path("/srv/app/media/models/water.glb"),
            Some(PathBuf::from("/srv/app/media/models/water.glb"))
        );
    }

    #[test]
    fn resolve_public_path_rejects_escapes_and_bare_root() {
        let l = layout();
        assert_eq!(l.resolve_public_path("/media/../etc/passwd"), None);
        assert_eq!(l.resolve_public_path("/media/"), None);
    }
}
