//! Provides input/output functionality for the asset and structure file formats.
//!
//! - [`glb`] writes and reads the binary glTF assets that hold generated meshes.
//! - [`sdf`] reads MDL V2000 molfiles / SD files into validated structures.

pub mod glb;
pub mod sdf;
