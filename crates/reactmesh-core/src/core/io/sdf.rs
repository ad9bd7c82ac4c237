use crate::core::models::structure::{Atom, Bond, BondOrder, Structure, StructureError};
use nalgebra::Point3;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdfError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: SdfParseErrorKind },
    #[error("Unsupported molfile: {0}")]
    Unsupported(String),
    #[error("Invalid structure: {0}")]
    Structure(#[from] StructureError),
}

#[derive(Debug, Error)]
pub enum SdfParseErrorKind {
    #[error("Block ended before the counts line")]
    MissingCountsLine,
    #[error("Invalid {field} count (value: '{value}')")]
    InvalidCount { field: &'static str, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Atom line has an empty element symbol")]
    MissingElement,
    #[error("Bond line needs two atom indices and an order")]
    InvalidBondLine,
    #[error("Bond references atom {index}, outside 1..={atom_count}")]
    AtomIndexOutOfRange { index: usize, atom_count: usize },
    #[error("Unsupported bond order code '{0}'")]
    InvalidBondOrder(String),
    #[error("Block ended after {found} of {expected} {record} lines")]
    Truncated {
        record: &'static str,
        expected: usize,
        found: usize,
    },
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len()))
        .or_else(|| line.get(start..))
        .unwrap_or("")
        .trim()
}

fn parse_err(line: usize, kind: SdfParseErrorKind) -> SdfError {
    SdfError::Parse { line, kind }
}

/// Reader for the first record of an MDL V2000 molfile or SD file.
pub struct SdfFile;

impl SdfFile {
    pub fn read_from(reader: &mut impl BufRead) -> Result<Structure, SdfError> {
        let lines = collect_first_block(reader)?;
        let counts_line_no = 4;
        let counts = lines
            .get(3)
            .ok_or_else(|| parse_err(lines.len() + 1, SdfParseErrorKind::MissingCountsLine))?;
        if counts.contains("V3000") {
            return Err(SdfError::Unsupported(
                "V3000 connection tables are not supported".to_string(),
            ));
        }

        let atom_count = parse_count(counts, 0, "atom", counts_line_no)?;
        let bond_count = parse_count(counts, 3, "bond", counts_line_no)?;

        let atom_start = 4;
        let bond_start = atom_start + atom_count;
        let available = lines.len().saturating_sub(atom_start);
        if available < atom_count {
            return Err(parse_err(
                lines.len() + 1,
                SdfParseErrorKind::Truncated {
                    record: "atom",
                    expected: atom_count,
                    found: available,
                },
            ));
        }
        let available = lines.len().saturating_sub(bond_start);
        if available < bond_count {
            return Err(parse_err(
                lines.len() + 1,
                SdfParseErrorKind::Truncated {
                    record: "bond",
                    expected: bond_count,
                    found: available,
                },
            ));
        }

        let atoms = lines[atom_start..bond_start]
            .iter()
            .enumerate()
            .map(|(i, line)| parse_atom(line, atom_start + i + 1))
            .collect::<Result<Vec<_>, _>>()?;
        let bonds = lines[bond_start..bond_start + bond_count]
            .iter()
            .enumerate()
            .map(|(i, line)| parse_bond(line, bond_start + i + 1, atom_count))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Structure::new(atoms, bonds)?)
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Structure, SdfError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}

fn collect_first_block(reader: &mut impl BufRead) -> Result<Vec<String>, SdfError> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed == "M  END" || trimmed == "$$$$" {
            break;
        }
        lines.push(line);
    }
    Ok(lines)
}

/// Counts are fixed-width (`aaabbb`) but many writers left-pad inconsistently, so a
/// whitespace split is used when the fixed columns do not parse.
fn parse_count(
    line: &str,
    field_idx: usize,
    field: &'static str,
    line_no: usize,
) -> Result<usize, SdfError> {
    let fixed = slice_and_trim(line, field_idx, field_idx + 3);
    if let Ok(n) = fixed.parse::<usize>() {
        return Ok(n);
    }
    let token = line
        .split_whitespace()
        .nth(field_idx / 3)
        .unwrap_or_default();
    token.parse::<usize>().map_err(|_| {
        parse_err(
            line_no,
            SdfParseErrorKind::InvalidCount {
                field,
                value: token.to_string(),
            },
        )
    })
}

fn parse_atom(line: &str, line_no: usize) -> Result<Atom, SdfError> {
    let coord = |start: usize, end: usize| -> Result<f64, SdfError> {
        let value = slice_and_trim(line, start, end);
        value.parse::<f64>().map_err(|_| {
            parse_err(
                line_no,
                SdfParseErrorKind::InvalidFloat {
                    columns: format!("{}-{}", start + 1, end),
                    value: value.to_string(),
                },
            )
        })
    };

    let (x, y, z, symbol) = match (coord(0, 10), coord(10, 20), coord(20, 30)) {
        (Ok(x), Ok(y), Ok(z)) => (x, y, z, slice_and_trim(line, 31, 34).to_string()),
        (Err(fixed_err), _, _) | (_, Err(fixed_err), _) | (_, _, Err(fixed_err)) => {
            // Free-format fallback: `x y z symbol ...`.
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.as_slice() {
                [x, y, z, symbol, ..] => match (
                    x.parse::<f64>(),
                    y.parse::<f64>(),
                    z.parse::<f64>(),
                ) {
                    (Ok(x), Ok(y), Ok(z)) => (x, y, z, symbol.to_string()),
                    _ => return Err(fixed_err),
                },
                _ => return Err(fixed_err),
            }
        }
    };

    if symbol.is_empty() {
        return Err(parse_err(line_no, SdfParseErrorKind::MissingElement));
    }
    Ok(Atom::new(&symbol, Point3::new(x, y, z)))
}

fn parse_bond(line: &str, line_no: usize, atom_count: usize) -> Result<Bond, SdfError> {
    let fixed = (
        slice_and_trim(line, 0, 3).parse::<usize>(),
        slice_and_trim(line, 3, 6).parse::<usize>(),
        slice_and_trim(line, 6, 9),
    );
    let (a1, a2, order_token) = match fixed {
        (Ok(a1), Ok(a2), order) if !order.is_empty() => (a1, a2, order.to_string()),
        _ => {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.as_slice() {
                [a1, a2, order, ..] => match (a1.parse::<usize>(), a2.parse::<usize>()) {
                    (Ok(a1), Ok(a2)) => (a1, a2, order.to_string()),
                    _ => return Err(parse_err(line_no, SdfParseErrorKind::InvalidBondLine)),
                },
                _ => return Err(parse_err(line_no, SdfParseErrorKind::InvalidBondLine)),
            }
        }
    };

    for index in [a1, a2] {
        if index == 0 || index > atom_count {
            return Err(parse_err(
                line_no,
                SdfParseErrorKind::AtomIndexOutOfRange { index, atom_count },
            ));
        }
    }

    let order = order_token
        .parse::<u8>()
        .ok()
        .and_then(BondOrder::from_ctfile)
        .ok_or_else(|| parse_err(line_no, SdfParseErrorKind::InvalidBondOrder(order_token)))?;

    Ok(Bond::new(a1 - 1, a2 - 1, order))
}
