use super::defaults::DefaultsConfig;
use super::file::{FileAnimationConfig, FileConfig, FileMeshConfig};
use super::models::{AppConfig, LibraryConfig};
use crate::cli::{AnimationOverrides, Cli};
use crate::error::Result;
use reactmesh::engine::config::{AnimationConfig, MeshStyle, PipelineConfigBuilder};
use tracing::debug;

/// Merges command-line flags, the config file and the built-in defaults, in that
/// order of precedence.
///
/// An explicit `--config` must exist. The default config location is used only when a
/// file is actually there.
pub fn build_config(
    cli: &Cli,
    overrides: Option<&AnimationOverrides>,
    defaults: &DefaultsConfig,
) -> Result<AppConfig> {
    let file_config = match (&cli.config, &defaults.config_file) {
        (Some(path), _) => FileConfig::from_file(path)?,
        (None, Some(path)) if path.is_file() => FileConfig::from_file(path)?,
        _ => FileConfig::default(),
    };

    let media_root = cli
        .media_root
        .clone()
        .or(file_config.media_root)
        .unwrap_or_else(|| defaults.media_root.clone());
    debug!("Using media root {:?}", media_root);

    let mut builder = PipelineConfigBuilder::new()
        .media_root(media_root)
        .mesh_style(merge_mesh(file_config.mesh))
        .animation(merge_animation(
            overrides.cloned().unwrap_or_default(),
            file_config.animation,
        ));
    if let Some(dir) = file_config.models_dir {
        builder = builder.models_dir(dir);
    }
    if let Some(name) = file_config.index_file {
        builder = builder.index_file(name);
    }
    let pipeline = builder.build()?;

    let dirs = if file_config.library_dirs.is_empty() {
        defaults.library_dirs.clone()
    } else {
        file_config.library_dirs
    };

    Ok(AppConfig {
        pipeline,
        library: LibraryConfig {
            dirs,
            aliases: file_config.aliases,
        },
    })
}

fn merge_mesh(file_val: Option<FileMeshConfig>) -> MeshStyle {
    let defaults = MeshStyle::default();
    let Some(file_val) = file_val else {
        return defaults;
    };
    MeshStyle {
        atom_radius: file_val.atom_radius.unwrap_or(defaults.atom_radius),
        hydrogen_radius: file_val.hydrogen_radius.unwrap_or(defaults.hydrogen_radius),
        bond_radius: file_val.bond_radius.unwrap_or(defaults.bond_radius),
        bond_offset: file_val.bond_offset.unwrap_or(defaults.bond_offset),
        bond_color: file_val
            .bond_color
            .map(|rgb| rgb.map(|c| f32::from(c) / 255.0))
            .unwrap_or(defaults.bond_color),
        sphere_rings: file_val.sphere_rings.unwrap_or(defaults.sphere_rings),
        sphere_segments: file_val.sphere_segments.unwrap_or(defaults.sphere_segments),
        cylinder_sections: file_val
            .cylinder_sections
            .unwrap_or(defaults.cylinder_sections),
    }
}

fn merge_animation(
    cli_val: AnimationOverrides,
    file_val: Option<FileAnimationConfig>,
) -> AnimationConfig {
    let defaults = AnimationConfig::default();
    let file_val = file_val.unwrap_or_default();
    AnimationConfig {
        num_frames: cli_val
            .frames
            .or(file_val.frames)
            .unwrap_or(defaults.num_frames),
        bond_threshold: cli_val
            .bond_threshold
            .or(file_val.bond_threshold)
            .unwrap_or(defaults.bond_threshold),
    }
}
