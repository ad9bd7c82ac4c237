use super::correspondence::{AtomCorrespondence, ExtractedAtom};
use crate::core::utils::geometry::{DEGENERATE_EPSILON, lerp, linspace_unit};
use nalgebra::Point3;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameAtom {
    pub reactant_index: usize,
    pub symbol: String,
    pub position: Point3<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationFrame {
    pub t: f64,
    pub atoms: Vec<FrameAtom>,
}

/// A heuristic bond between two atoms closer than the proximity threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProximityBond {
    pub atom1_idx: usize,
    pub atom2_idx: usize,
    pub distance: f64,
}

/// Linearly interpolates every matched atom over `num_frames` evenly spaced steps.
///
/// Frame `k` uses `t = k / (num_frames - 1)`, so the first frame holds the reactant
/// positions and the last the product positions exactly. Unmatched atoms never appear.
pub fn interpolate_frames(
    reactants: &[ExtractedAtom],
    products: &[ExtractedAtom],
    correspondence: &AtomCorrespondence,
    num_frames: usize,
) -> Vec<AnimationFrame> {
    linspace_unit(num_frames)
        .into_iter()
        .map(|t| AnimationFrame {
            t,
            atoms: correspondence
                .pairs()
                .iter()
                .map(|&(r, p)| FrameAtom {
                    reactant_index: r,
                    symbol: reactants[r].symbol.clone(),
                    position: lerp(&reactants[r].position, &products[p].position, t),
                })
                .collect(),
        })
        .collect()
}

/// Every atom pair with `0 < distance <= threshold`, ordered by `(i, j)` with `i < j`.
///
/// Purely distance based; valence is not considered.
pub fn proximity_bonds(atoms: &[ExtractedAtom], threshold: f64) -> Vec<ProximityBond> {
    let mut bonds = Vec::new();
    for i in 0..atoms.len() {
        for j in (i + 1)..atoms.len() {
            let distance = (atoms[i].position - atoms[j].position).norm();
            if distance > DEGENERATE_EPSILON && distance <= threshold {
                bonds.push(ProximityBond {
                    atom1_idx: i,
                    atom2_idx: j,
                    distance,
                });
            }
        }
    }
    bonds
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(symbol: &str, x: f64, y: f64) -> ExtractedAtom {
        ExtractedAtom::new(symbol, Point3::new(x, y, 0.0))
    }

    #[test]
    fn two_frames_are_exactly_reactants_then_products() {
        let reactants = [atom("C", 0.1, 0.2), atom("O", 1.3, -0.7)];
        let products = [atom("O", 9.0, 9.0), atom("C", -4.0, 2.5)];
        let map = AtomCorrespondence::greedy(&reactants, &products);
        let frames = interpolate_frames(&reactants, &products, &map, 2);

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].t, 0.0);
        assert_eq!(frames[1].t, 1.0);
        for fa in &frames[0].atoms {
            assert_eq!(fa.position, reactants[fa.reactant_index].position);
        }
        for fa in &frames[1].atoms {
            let p = map.product_for(fa.reactant_index).unwrap();
            assert_eq!(fa.position, products[p].position);
        }
    }

    #[test]
    fn midpoint_frame_is_halfway() {
        let reactants = [atom("C", 0.0, 0.0)];
        let products = [atom("C", 2.0, 4.0)];
        let map = AtomCorrespondence::greedy(&reactants, &products);
        let frames = interpolate_frames(&reactants, &products, &map, 3);
        assert_eq!(frames[1].t, 0.5);
        assert!((frames[1].atoms[0].position - Point3::new(1.0, 2.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn unmatched_atoms_are_omitted_from_every_frame() {
        let reactants = [atom("C", 0.0, 0.0), atom("Na", 1.0, 0.0)];
        let products = [atom("C", 0.5, 0.0)];
        let map = AtomCorrespondence::greedy(&reactants, &products);
        let frames = interpolate_frames(&reactants, &products, &map, 30);
        assert_eq!(frames.len(), 30);
        assert!(frames.iter().all(|f| f.atoms.len() == 1 && f.atoms[0].symbol == "C"));
    }

    #[test]
    fn single_frame_shows_reactants() {
        let reactants = [atom("O", 1.0, 1.0)];
        let products = [atom("O", 3.0, 3.0)];
        let map = AtomCorrespondence::greedy(&reactants, &products);
        let frames = interpolate_frames(&reactants, &products, &map, 1);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].atoms[0].position, reactants[0].position);
    }

    #[test]
    fn proximity_bonds_use_inclusive_threshold_and_skip_coincident() {
        let atoms = [
            atom("O", 0.0, 0.0),
            atom("H", 0.96, 0.0),
            atom("H", 0.0, 1.5),
            atom("H", 0.0, 0.0),
            atom("C", 5.0, 0.0),
        ];
        let bonds = proximity_bonds(&atoms, 1.5);
        let pairs: Vec<_> = bonds.iter().map(|b| (b.atom1_idx, b.atom2_idx)).collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 3), (2, 3)]);
    }
}
