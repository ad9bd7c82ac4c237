//! Atom extraction from assets and reactant → product atom matching.

use crate::core::models::mesh::{MeshScene, PrimitiveKind};
use nalgebra::Point3;
use serde::Serialize;
use tracing::debug;

/// An atom recovered from a rendered asset: element and sphere center.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedAtom {
    pub symbol: String,
    pub position: Point3<f64>,
}

impl ExtractedAtom {
    pub fn new(symbol: impl Into<String>, position: Point3<f64>) -> Self {
        Self {
            symbol: symbol.into(),
            position,
        }
    }
}

/// One atom per atom primitive, in primitive order.
///
/// Bond primitives are ignored, as are atom primitives whose element cannot be
/// determined.
pub fn extract_atoms(scene: &MeshScene) -> Vec<ExtractedAtom> {
    scene
        .primitives()
        .iter()
        .filter(|p| p.kind == PrimitiveKind::Atom)
        .filter_map(|p| {
            let Some(symbol) = p.element.as_deref() else {
                debug!(primitive = %p.name, "Skipping primitive without a known element.");
                return None;
            };
            p.centroid().map(|c| ExtractedAtom::new(symbol, c))
        })
        .collect()
}

/// Partial injective map from reactant indices to product indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AtomCorrespondence {
    pairs: Vec<(usize, usize)>,
}

impl AtomCorrespondence {
    /// Greedy nearest-neighbour matching.
    ///
    /// Reactants are visited in order; each takes the closest still-unused product
    /// with the same element symbol. Equal distances go to the lowest product index.
    /// Reactants with no such product stay unmatched.
    pub fn greedy(reactants: &[ExtractedAtom], products: &[ExtractedAtom]) -> Self {
        let mut used = vec![false; products.len()];
        let mut pairs = Vec::new();

        for (r_idx, reactant) in reactants.iter().enumerate() {
            let mut best: Option<(usize, f64)> = None;
            for (p_idx, product) in products.iter().enumerate() {
                if used[p_idx] || product.symbol != reactant.symbol {
                    continue;
                }
                let distance = (product.position - reactant.position).norm();
                if best.is_none_or(|(_, d)| distance < d) {
                    best = Some((p_idx, distance));
                }
            }
            if let Some((p_idx, _)) = best {
                used[p_idx] = true;
                pairs.push((r_idx, p_idx));
            }
        }

        Self { pairs }
    }

    /// `(reactant, product)` pairs in ascending reactant order.
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    pub fn product_for(&self, reactant: usize) -> Option<usize> {
        self.pairs
            .iter()
            .find(|(r, _)| *r == reactant)
            .map(|(_, p)| *p)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn unmatched_reactants(&self, reactant_count: usize) -> Vec<usize> {
        (0..reactant_count)
            .filter(|r| self.product_for(*r).is_none())
            .collect()
    }
}
