use super::config::MeshStyle;
use super::error::EngineError;
use crate::core::io::glb::GlbFile;
use crate::core::models::element::{element_color, is_hydrogen};
use crate::core::models::mesh::{MeshScene, Primitive, PrimitiveKind};
use crate::core::models::structure::{BondOrder, Structure};
use crate::core::utils::geometry::{DEGENERATE_EPSILON, perpendicular_to, rotation_to_align};
use nalgebra::{Point3, Rotation3, Vector3};
use serde::Serialize;
use std::f64::consts::{PI, TAU};
use std::fs;
use std::io::BufWriter;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtomReport {
    pub index: usize,
    pub symbol: String,
    pub position: Point3<f64>,
    pub radius: f64,
    pub color: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BondReport {
    pub atom1_idx: usize,
    pub atom2_idx: usize,
    pub start: Point3<f64>,
    pub end: Point3<f64>,
    pub order: BondOrder,
    pub length: f64,
    pub strands: usize,
}

/// What a build produced, alongside the asset file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildReport {
    pub formula: String,
    pub atoms: Vec<AtomReport>,
    pub bonds: Vec<BondReport>,
    pub skipped_bonds: usize,
    pub atom_primitives: usize,
    pub bond_primitives: usize,
    pub vertex_count: usize,
    pub triangle_count: usize,
}

/// Strand offsets, in units of the style's `bond_offset`, for each bond order.
fn strand_offsets(order: BondOrder) -> &'static [f64] {
    match order.strand_count() {
        2 => &[-0.5, 0.5],
        3 => &[-1.0, 0.0, 1.0],
        _ => &[0.0],
    }
}

#[derive(Debug, Clone, Default)]
pub struct MeshBuilder {
    style: MeshStyle,
}

impl MeshBuilder {
    pub fn new(style: MeshStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &MeshStyle {
        &self.style
    }

    pub fn atom_radius(&self, symbol: &str) -> f64 {
        if is_hydrogen(symbol) {
            self.style.hydrogen_radius
        } else {
            self.style.atom_radius
        }
    }

    /// Builds one sphere per atom and one cylinder per bond strand.
    ///
    /// Bonds whose endpoints coincide are skipped and counted in the report.
    pub fn build_scene(&self, structure: &Structure) -> (MeshScene, BuildReport) {
        let mut scene = MeshScene::new();
        let mut report = BuildReport {
            formula: structure.formula(),
            ..BuildReport::default()
        };

        for (index, atom) in structure.atoms().iter().enumerate() {
            let radius = self.atom_radius(&atom.symbol);
            let color = element_color(&atom.symbol);
            let (positions, indices) = sphere(
                &atom.position,
                radius,
                self.style.sphere_rings,
                self.style.sphere_segments,
            );
            scene.push(Primitive {
                name: format!("{}_{index}", atom.symbol),
                kind: PrimitiveKind::Atom,
                element: Some(atom.symbol.clone()),
                positions,
                color,
                indices,
            });
            report.atoms.push(AtomReport {
                index,
                symbol: atom.symbol.clone(),
                position: atom.position,
                radius,
                color,
            });
        }

        for bond in structure.bonds() {
            let start = structure.atoms()[bond.atom1_idx].position;
            let end = structure.atoms()[bond.atom2_idx].position;
            let axis = end - start;
            let length = axis.norm();
            if length <= DEGENERATE_EPSILON {
                debug!(
                    atom1 = bond.atom1_idx,
                    atom2 = bond.atom2_idx,
                    "Skipping degenerate bond with coincident endpoints."
                );
                report.skipped_bonds += 1;
                continue;
            }

            let direction = axis / length;
            let rotation = rotation_to_align(&Vector3::z(), &direction);
            let perpendicular = perpendicular_to(&direction);
            let offsets = strand_offsets(bond.order);

            for (strand, factor) in offsets.iter().enumerate() {
                let shift = perpendicular * (factor * self.style.bond_offset);
                let (positions, indices) = cylinder(
                    &(start + shift),
                    &rotation,
                    length,
                    self.style.bond_radius,
                    self.style.cylinder_sections,
                );
                scene.push(Primitive {
                    name: format!("bond_{}_{}_{strand}", bond.atom1_idx, bond.atom2_idx),
                    kind: PrimitiveKind::Bond,
                    element: None,
                    positions,
                    color: self.style.bond_color,
                    indices,
                });
            }
            report.bonds.push(BondReport {
                atom1_idx: bond.atom1_idx,
                atom2_idx: bond.atom2_idx,
                start,
                end,
                order: bond.order,
                length,
                strands: offsets.len(),
            });
        }

        report.atom_primitives = scene.count(PrimitiveKind::Atom);
        report.bond_primitives = scene.count(PrimitiveKind::Bond);
        report.vertex_count = scene.vertex_count();
        report.triangle_count = scene.triangle_count();
        (scene, report)
    }

    /// Builds the scene and writes it as GLB to `destination`.
    ///
    /// The file appears atomically: it is written to a temporary file in the target
    /// directory and renamed into place only once complete.
    pub fn build(
        &self,
        structure: &Structure,
        destination: &Path,
    ) -> Result<BuildReport, EngineError> {
        let (scene, report) = self.build_scene(structure);
        write_scene(&scene, destination)?;
        debug!(
            path = %destination.display(),
            atoms = report.atom_primitives,
            bonds = report.bond_primitives,
            "Asset written."
        );
        Ok(report)
    }
}

pub(crate) fn write_scene(scene: &MeshScene, destination: &Path) -> Result<(), EngineError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| EngineError::Io { path, source }
    };
    let dir = match destination.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(io_err(dir))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err(dir))?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        GlbFile::write_to(scene, &mut writer).map_err(|source| EngineError::Asset {
            path: destination.to_path_buf(),
            source,
        })?;
    }
    tmp.persist(destination)
        .map_err(|e| io_err(destination)(e.error))?;
    trace!(path = %destination.display(), "Temporary asset persisted.");
    Ok(())
}

fn to_f32(p: &Point3<f64>) -> [f32; 3] {
    [p.x as f32, p.y as f32, p.z as f32]
}

/// UV sphere with a single vertex per pole and no duplicated seam, so the mean of
/// its vertices is exactly the center (up to rounding).
fn sphere(center: &Point3<f64>, radius: f64, rings: u32, segments: u32) -> (Vec<[f32; 3]>, Vec<u32>) {
    let (rings, segments) = (rings.max(2), segments.max(3));
    let mut positions = Vec::with_capacity(((rings - 1) * segments + 2) as usize);
    positions.push(to_f32(&(center + Vector3::new(0.0, 0.0, radius))));
    for ring in 1..rings {
        let theta = ring as f64 * PI / rings as f64;
        let (sin_theta, cos_theta) = theta.sin_cos();
        for seg in 0..segments {
            let phi = seg as f64 * TAU / segments as f64;
            let (sin_phi, cos_phi) = phi.sin_cos();
            let offset = Vector3::new(cos_phi * sin_theta, sin_phi * sin_theta, cos_theta) * radius;
            positions.push(to_f32(&(center + offset)));
        }
    }
    positions.push(to_f32(&(center - Vector3::new(0.0, 0.0, radius))));

    let top = 0u32;
    let bottom = (positions.len() - 1) as u32;
    let ring_start = |ring: u32| 1 + (ring - 1) * segments;
    let mut indices = Vec::with_capacity((segments * (rings - 1) * 6) as usize);

    for seg in 0..segments {
        let next = (seg + 1) % segments;
        indices.extend_from_slice(&[top, ring_start(1) + seg, ring_start(1) + next]);
    }
    for ring in 1..rings - 1 {
        let upper = ring_start(ring);
        let lower = ring_start(ring + 1);
        for seg in 0..segments {
            let next = (seg + 1) % segments;
            indices.extend_from_slice(&[upper + seg, lower + seg, upper + next]);
            indices.extend_from_slice(&[upper + next, lower + seg, lower + next]);
        }
    }
    let last = ring_start(rings - 1);
    for seg in 0..segments {
        let next = (seg + 1) % segments;
        indices.extend_from_slice(&[bottom, last + next, last + seg]);
    }

    (positions, indices)
}

/// Capped cylinder built along +Z from the origin, then rotated and moved to `base`.
fn cylinder(
    base: &Point3<f64>,
    rotation: &Rotation3<f64>,
    length: f64,
    radius: f64,
    sections: u32,
) -> (Vec<[f32; 3]>, Vec<u32>) {
    let sections = sections.max(3);
    let place = |local: Vector3<f64>| to_f32(&(base + rotation * local));

    let mut positions = Vec::with_capacity((2 * sections + 2) as usize);
    for i in 0..sections {
        let theta = i as f64 * TAU / sections as f64;
        let (sin, cos) = theta.sin_cos();
        positions.push(place(Vector3::new(cos * radius, sin * radius, 0.0)));
        positions.push(place(Vector3::new(cos * radius, sin * radius, length)));
    }
    let bottom_center = positions.len() as u32;
    positions.push(place(Vector3::zeros()));
    let top_center = bottom_center + 1;
    positions.push(place(Vector3::new(0.0, 0.0, length)));

    let mut indices = Vec::with_capacity((sections * 12) as usize);
    for i in 0..sections {
        let j = (i + 1) % sections;
        let (b0, t0, b1, t1) = (2 * i, 2 * i + 1, 2 * j, 2 * j + 1);
        indices.extend_from_slice(&[b0, b1, t0]);
        indices.extend_from_slice(&[t0, b1, t1]);
        indices.extend_from_slice(&[bottom_center, b1, b0]);
        indices.extend_from_slice(&[top_center, t0, t1]);
    }

    (positions, indices)
}
