//! Data models for chemical structures and the meshes generated from them.
//!
//! A [`structure::Structure`] is the immutable input to mesh generation, the
//! [`element`] table decides how each atom looks, and a [`mesh::MeshScene`] is the
//! collection of named primitives that ends up serialized as an asset.

pub mod element;
pub mod mesh;
pub mod structure;
