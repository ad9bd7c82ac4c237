//! Public entry points.
//!
//! - [`generate`]: identifier → cached GLB asset, at most one build per key at a time.
//! - [`animate`]: reactant/product assets → interpolated reaction frames.
//! - [`repair`]: detection and regeneration of missing or corrupt assets.
//! - [`react`]: generates every participant of a reaction, then animates it.

pub mod animate;
pub mod generate;
pub mod react;
pub mod repair;
