//! Seams for the external services the pipeline depends on.
//!
//! Resolving an identifier into a structure and computing 3D coordinates are both
//! outside the core. Implementations are injected into the generation pipeline.

use crate::core::models::structure::Structure;
use crate::core::utils::geometry::DEGENERATE_EPSILON;
use std::error::Error as StdError;
use thiserror::Error;

pub type BoxedError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Error)]
#[error("{message}")]
pub struct ResolutionError {
    message: String,
    #[source]
    source: Option<BoxedError>,
}

impl ResolutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl Into<BoxedError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Atom {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },
    #[error("All {atom_count} atoms share one position; no 3D layout is available")]
    CoincidentAtoms { atom_count: usize },
    #[error("Embedding failed: {0}")]
    Failed(String),
}

/// Turns a chemical identifier (name, formula, SMILES, ...) into a structure.
///
/// `Ok(None)` means the identifier is well-formed but unknown.
pub trait StructureResolver {
    fn resolve(&self, identifier: &str) -> Result<Option<Structure>, ResolutionError>;
}

/// Produces 3D coordinates for a resolved structure.
pub trait GeometryEngine {
    fn embed(&self, structure: &Structure) -> Result<Structure, GeometryError>;
}

impl<T: StructureResolver + ?Sized> StructureResolver for &T {
    fn resolve(&self, identifier: &str) -> Result<Option<Structure>, ResolutionError> {
        (**self).resolve(identifier)
    }
}

impl<T: GeometryEngine + ?Sized> GeometryEngine for &T {
    fn embed(&self, structure: &Structure) -> Result<Structure, GeometryError> {
        (**self).embed(structure)
    }
}

/// Accepts the coordinates a resolver already supplied.
///
/// Rejects non-finite coordinates, and multi-atom structures whose atoms all sit on
/// the same point (typical of 2D-less connection tables).
#[derive(Debug, Clone, Copy, Default)]
pub struct ProvidedGeometry;

impl GeometryEngine for ProvidedGeometry {
    fn embed(&self, structure: &Structure) -> Result<Structure, GeometryError> {
        let atoms = structure.atoms();
        if let Some(index) = atoms.iter().position(|a| {
            !(a.position.x.is_finite() && a.position.y.is_finite() && a.position.z.is_finite())
        }) {
            return Err(GeometryError::NonFiniteCoordinate { index });
        }
        if let Some(first) = atoms.first() {
            let all_coincident = atoms
                .iter()
                .all(|a| (a.position - first.position).norm() <= DEGENERATE_EPSILON);
            if atoms.len() > 1 && all_coincident {
                return Err(GeometryError::CoincidentAtoms {
                    atom_count: atoms.len(),
                });
            }
        }
        Ok(structure.clone())
    }
}
