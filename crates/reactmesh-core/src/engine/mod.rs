//! # Engine Module
//!
//! Stateful building blocks used by the public workflows.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Storage layout, mesh style and animation parameters
//! - **Error Handling** ([`error`]) - Engine-level error types shared by all workflows
//! - **Artifact Cache** ([`cache`]) - The persisted key → public path index
//! - **Asset Layout** ([`layout`]) - Mapping between keys, files and public paths
//! - **Key Locks** ([`locks`]) - Per-key serialization of asset construction
//! - **Mesh Builder** ([`mesh_builder`]) - Structure → sphere/cylinder scene → GLB file
//! - **Collaborators** ([`collaborators`]) - Injected structure resolution and 3D embedding
//! - **Correspondence** ([`correspondence`]) - Atom extraction and greedy reactant/product matching
//! - **Interpolation** ([`interpolation`]) - Frame generation and proximity bonds
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events

pub mod cache;
pub mod collaborators;
pub mod config;
pub mod correspondence;
pub mod error;
pub mod interpolation;
pub mod layout;
pub(crate) mod locks;
pub mod mesh_builder;
pub mod progress;
