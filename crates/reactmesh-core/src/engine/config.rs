use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_MODELS_DIR: &str = "models";
pub const DEFAULT_INDEX_FILE: &str = "cache_index.json";

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

/// Visual constants used by the mesh builder. Lengths are in Angstroms.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshStyle {
    pub atom_radius: f64,
    pub hydrogen_radius: f64,
    pub bond_radius: f64,
    /// Spacing `d` between parallel strands of multiple bonds.
    pub bond_offset: f64,
    pub bond_color: [f32; 3],
    pub sphere_rings: u32,
    pub sphere_segments: u32,
    pub cylinder_sections: u32,
}

impl Default for MeshStyle {
    fn default() -> Self {
        Self {
            atom_radius: 0.25,
            hydrogen_radius: 0.15,
            bond_radius: 0.04,
            bond_offset: 0.09,
            bond_color: [180.0 / 255.0; 3],
            sphere_rings: 12,
            sphere_segments: 24,
            cylinder_sections: 16,
        }
    }
}

impl MeshStyle {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("atom_radius", self.atom_radius),
            ("hydrogen_radius", self.hydrogen_radius),
            ("bond_radius", self.bond_radius),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(name, format!("must be a positive length, got {value}")));
            }
        }
        if !(self.bond_offset.is_finite() && self.bond_offset >= 0.0) {
            return Err(invalid("bond_offset", "must be a non-negative length"));
        }
        if self.bond_color.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(invalid("bond_color", "channels must lie in [0, 1]"));
        }
        if self.sphere_rings < 2 {
            return Err(invalid("sphere_rings", "at least 2 rings are required"));
        }
        if self.sphere_segments < 3 {
            return Err(invalid("sphere_segments", "at least 3 segments are required"));
        }
        if self.cylinder_sections < 3 {
            return Err(invalid("cylinder_sections", "at least 3 sections are required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationConfig {
    pub num_frames: usize,
    /// Atom pairs closer than this (Angstroms) are connected by a proximity bond.
    pub bond_threshold: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            num_frames: 30,
            bond_threshold: 1.6,
        }
    }
}

impl AnimationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_frames == 0 {
            return Err(invalid("num_frames", "at least one frame is required"));
        }
        if !(self.bond_threshold.is_finite() && self.bond_threshold > 0.0) {
            return Err(invalid(
                "bond_threshold",
                format!("must be a positive distance, got {}", self.bond_threshold),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub media_root: PathBuf,
    pub models_dir: String,
    pub index_file: String,
    pub mesh: MeshStyle,
    pub animation: AnimationConfig,
}

impl PipelineConfig {
    pub fn models_path(&self) -> PathBuf {
        self.media_root.join(&self.models_dir)
    }

    pub fn index_path(&self) -> PathBuf {
        self.models_path().join(&self.index_file)
    }
}

#[derive(Default)]
pub struct PipelineConfigBuilder {
    media_root: Option<PathBuf>,
    models_dir: Option<String>,
    index_file: Option<String>,
    mesh: Option<MeshStyle>,
    animation: Option<AnimationConfig>,
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn media_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.media_root = Some(path.into());
        self
    }
    pub fn models_dir(mut self, dir: impl Into<String>) -> Self {
        self.models_dir = Some(dir.into());
        self
    }
    pub fn index_file(mut self, name: impl Into<String>) -> Self {
        self.index_file = Some(name.into());
        self
    }
    pub fn mesh_style(mut self, style: MeshStyle) -> Self {
        self.mesh = Some(style);
        self
    }
    pub fn animation(mut self, animation: AnimationConfig) -> Self {
        self.animation = Some(animation);
        self
    }

    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let media_root = self
            .media_root
            .ok_or(ConfigError::MissingParameter("media_root"))?;
        if media_root.as_os_str().is_empty() {
            return Err(invalid("media_root", "path is empty"));
        }

        let models_dir = self
            .models_dir
            .unwrap_or_else(|| DEFAULT_MODELS_DIR.to_string());
        check_single_segment("models_dir", &models_dir)?;
        let index_file = self
            .index_file
            .unwrap_or_else(|| DEFAULT_INDEX_FILE.to_string());
        check_single_segment("index_file", &index_file)?;

        let mesh = self.mesh.unwrap_or_default();
        mesh.validate()?;
        let animation = self.animation.unwrap_or_default();
        animation.validate()?;

        Ok(PipelineConfig {
            media_root,
            models_dir,
            index_file,
            mesh,
            animation,
        })
    }
}

fn check_single_segment(name: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() || value == "." || value == ".." {
        return Err(invalid(name, format!("'{value}' is not a usable name")));
    }
    if value.contains(['/', '\\']) {
        return Err(invalid(name, format!("'{value}' must be a single path segment")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_defaults() {
        let config = PipelineConfigBuilder::new()
            .media_root("/srv/media")
            .build()
            .unwrap();
        assert_eq!(config.models_dir, "models");
        assert_eq!(config.index_path(), PathBuf::from("/srv/media/models/cache_index.json"));
        assert_eq!(config.mesh, MeshStyle::default());
        assert_eq!(config.animation.num_frames, 30);
        assert_eq!(config.animation.bond_threshold, 1.6);
    }

    #[test]
    fn builder_requires_media_root() {
        assert_eq!(
            PipelineConfigBuilder::new().build().unwrap_err(),
            ConfigError::MissingParameter("media_root")
        );
    }

    #[test]
    fn builder_rejects_nested_models_dir() {
        let err = PipelineConfigBuilder::new()
            .media_root("/m")
            .models_dir("a/b")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter { name: "models_dir", .. }));
    }

    #[test]
    fn builder_validates_style_and_animation() {
        let err = PipelineConfigBuilder::new()
            .media_root("/m")
            .mesh_style(MeshStyle {
                cylinder_sections: 2,
                ..MeshStyle::default()
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter { name: "cylinder_sections", .. }));

        let err = PipelineConfigBuilder::new()
            .media_root("/m")
            .animation(AnimationConfig {
                num_frames: 0,
                ..AnimationConfig::default()
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter { name: "num_frames", .. }));
    }

    #[test]
    fn default_bond_color_is_light_gray() {
        let style = MeshStyle::default();
        assert!((style.bond_color[0] - 180.0 / 255.0).abs() < 1e-6);
        assert!(style.validate().is_ok());
    }
}
