use phf::{Map, Set, phf_map, phf_set};

/// Color used for any element missing from [`ELEMENT_COLORS`].
pub const NEUTRAL_GRAY: [f32; 3] = [0.5, 0.5, 0.5];

static ELEMENT_COLORS: Map<&'static str, [f32; 3]> = phf_map! {
    "H" => [1.0, 1.0, 1.0],
    "C" => [0.2, 0.2, 0.2],
    "N" => [0.0, 0.0, 1.0],
    "O" => [1.0, 0.0, 0.0],
    "F" => [0.0, 1.0, 0.0],
    "Cl" => [0.0, 1.0, 0.0],
    "Br" => [0.6, 0.2, 0.2],
    "I" => [0.4, 0.0, 0.8],
    "P" => [1.0, 0.5, 0.0],
    "S" => [1.0, 1.0, 0.2],
    "B" => [1.0, 0.7, 0.7],
    "Si" => [0.5, 0.5, 0.5],
    "Fe" => [1.0, 0.6, 0.2],
};

static PERIODIC_SYMBOLS: Set<&'static str> = phf_set! {
    "H", "He",
    "Li", "Be", "B", "C", "N", "O", "F", "Ne",
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar",
    "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
    "Ga", "Ge", "As", "Se", "Br", "Kr",
    "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd",
    "In", "Sn", "Sb", "Te", "I", "Xe",
    "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb", "Dy",
    "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt",
    "Au", "Hg", "Tl", "Pb", "Bi", "Po", "At", "Rn",
    "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf",
    "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds",
    "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
    "D", "T",
};

/// Trims and title-cases an element symbol: `" cl "` becomes `"Cl"`.
pub fn normalize_symbol(raw: &str) -> String {
    let mut chars = raw.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

pub fn is_known_element(symbol: &str) -> bool {
    PERIODIC_SYMBOLS.contains(symbol)
}

pub fn is_hydrogen(symbol: &str) -> bool {
    matches!(symbol, "H" | "D" | "T")
}

/// RGB color (0..1 per channel) used to draw atoms of this element.
pub fn element_color(symbol: &str) -> [f32; 3] {
    ELEMENT_COLORS
        .get(symbol)
        .copied()
        .unwrap_or(NEUTRAL_GRAY)
}
