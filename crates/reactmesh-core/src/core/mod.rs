//! # Core Module
//!
//! Stateless foundations shared by the engine and the workflows.
//!
//! - **Chemical Models** ([`models`]) - Validated structures, the element palette and the
//!   named-primitive mesh scene produced for every structure
//! - **File I/O** ([`io`]) - The GLB asset codec and an MDL molfile/SDF reader
//! - **Utilities** ([`utils`]) - Vector geometry and cache key / public path normalization

pub mod io;
pub mod models;
pub mod utils;
