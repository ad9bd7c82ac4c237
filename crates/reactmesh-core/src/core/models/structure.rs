use super::element::normalize_symbol;
use nalgebra::Point3;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum BondOrder {
    #[default]
    Single = 1,
    Double = 2,
    Triple = 3,
    Aromatic = 4,
}

impl BondOrder {
    /// Maps an MDL CTfile bond type code (1, 2, 3, 4 = aromatic) to a bond order.
    pub fn from_ctfile(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Single),
            2 => Some(Self::Double),
            3 => Some(Self::Triple),
            4 => Some(Self::Aromatic),
            _ => None,
        }
    }

    /// Number of parallel cylinders drawn for this bond.
    ///
    /// Only double and triple bonds get the multi-strand treatment; everything else,
    /// including aromatic bonds, is drawn as a single centered cylinder.
    pub fn strand_count(self) -> usize {
        match self {
            Self::Double => 2,
            Self::Triple => 3,
            Self::Single | Self::Aromatic => 1,
        }
    }
}

#[derive(Debug, Error)]
#[error("Invalid bond order string")]
pub struct ParseBondOrderError;

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "s" | "single" => Ok(Self::Single),
            "2" | "d" | "double" => Ok(Self::Double),
            "3" | "t" | "triple" => Ok(Self::Triple),
            "4" | "ar" | "aromatic" => Ok(Self::Aromatic),
            _ => Err(ParseBondOrderError),
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Single => "Single",
                Self::Double => "Double",
                Self::Triple => "Triple",
                Self::Aromatic => "Aromatic",
            }
        )
    }
}

/// A single atom of a [`Structure`]: its element symbol and 3D position in Angstroms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Atom {
    pub symbol: String,
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates an atom, normalizing the symbol's case (`"CL"` becomes `"Cl"`).
    pub fn new(symbol: &str, position: Point3<f64>) -> Self {
        Self {
            symbol: normalize_symbol(symbol),
            position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Bond {
    pub atom1_idx: usize, // index into Structure::atoms
    pub atom2_idx: usize,
    pub order: BondOrder,
}

impl Bond {
    pub fn new(atom1_idx: usize, atom2_idx: usize, order: BondOrder) -> Self {
        Self {
            atom1_idx,
            atom2_idx,
            order,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum StructureError {
    #[error("Atom {index} has an empty element symbol")]
    EmptySymbol { index: usize },

    #[error("Bond {bond} references atom {atom}, but the structure has only {atom_count} atoms")]
    BondIndexOutOfRange {
        bond: usize,
        atom: usize,
        atom_count: usize,
    },

    #[error("Bond {bond} connects atom {atom} to itself")]
    SelfBond { bond: usize, atom: usize },
}

/// A parsed chemical entity: atoms with 3D coordinates and the bonds between them.
///
/// Structures are validated on construction and immutable afterwards. Degenerate
/// bonds (coincident endpoints) are allowed here; the mesh builder skips them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Structure {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
}

impl Structure {
    pub fn new(atoms: Vec<Atom>, bonds: Vec<Bond>) -> Result<Self, StructureError> {
        for (index, atom) in atoms.iter().enumerate() {
            if atom.symbol.is_empty() {
                return Err(StructureError::EmptySymbol { index });
            }
        }
        for (bond_idx, bond) in bonds.iter().enumerate() {
            for atom in [bond.atom1_idx, bond.atom2_idx] {
                if atom >= atoms.len() {
                    return Err(StructureError::BondIndexOutOfRange {
                        bond: bond_idx,
                        atom,
                        atom_count: atoms.len(),
                    });
                }
            }
            if bond.atom1_idx == bond.atom2_idx {
                return Err(StructureError::SelfBond {
                    bond: bond_idx,
                    atom: bond.atom1_idx,
                });
            }
        }
        Ok(Self { atoms, bonds })
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Molecular formula in Hill order: carbon, then hydrogen, then the rest alphabetically.
    /// Without carbon every element is listed alphabetically.
    pub fn formula(&self) -> String {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for atom in &self.atoms {
            *counts.entry(atom.symbol.as_str()).or_default() += 1;
        }

        let mut ordered: Vec<(&str, usize)> = Vec::with_capacity(counts.len());
        if let Some(c) = counts.remove("C") {
            ordered.push(("C", c));
            if let Some(h) = counts.remove("H") {
                ordered.push(("H", h));
            }
        }
        ordered.extend(counts);

        ordered
            .into_iter()
            .map(|(symbol, n)| {
                if n == 1 {
                    symbol.to_string()
                } else {
                    format!("{symbol}{n}")
                }
            })
            .collect()
    }
}
