//! # reactmesh Core Library
//!
//! Generation and caching of binary 3D molecule assets, plus the interpolation engine that
//! morphs reactant atoms into product atoms for reaction animations.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Structure`, `MeshScene`), the
//!   element palette, geometry helpers, path/key normalization and the GLB/SDF codecs.
//!
//! - **[`engine`]: The Building Blocks.** Stateful pieces with a narrow contract: the JSON
//!   `ArtifactCache`, per-key locks, the `MeshBuilder`, atom correspondence and frame
//!   interpolation, configuration, errors and progress reporting.
//!
//! - **[`workflows`]: The Public API.** `GenerationPipeline`, `ReactionAnimator`,
//!   `AutoRepair` and the end-to-end reaction workflow. Structure resolution and 3D
//!   embedding are injected through the [`engine::collaborators`] traits.

pub mod core;
pub mod engine;
pub mod workflows;
