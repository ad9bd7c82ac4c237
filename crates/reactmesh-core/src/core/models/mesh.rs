use crate::core::utils::geometry;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Atom,
    Bond,
}

/// One named, uniformly colored triangle mesh inside a [`MeshScene`].
///
/// Atom primitives carry their element symbol explicitly so the element can be
/// recovered from a serialized asset without parsing the primitive name.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub name: String,
    pub kind: PrimitiveKind,
    pub element: Option<String>,
    pub positions: Vec<[f32; 3]>,
    pub color: [f32; 3],
    pub indices: Vec<u32>,
}

impl Primitive {
    /// Mean of all vertex positions, accumulated in `f64`.
    pub fn centroid(&self) -> Option<Point3<f64>> {
        geometry::centroid(
            self.positions
                .iter()
                .map(|p| Point3::new(p[0] as f64, p[1] as f64, p[2] as f64)),
        )
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshScene {
    primitives: Vec<Primitive>,
}

impl MeshScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn into_primitives(self) -> Vec<Primitive> {
        self.primitives
    }

    pub fn count(&self, kind: PrimitiveKind) -> usize {
        self.primitives.iter().filter(|p| p.kind == kind).count()
    }

    pub fn vertex_count(&self) -> usize {
        self.primitives.iter().map(|p| p.positions.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.primitives.iter().map(Primitive::triangle_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

impl From<Vec<Primitive>> for MeshScene {
    fn from(primitives: Vec<Primitive>) -> Self {
        Self { primitives }
    }
}
