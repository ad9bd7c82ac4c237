//! Binary glTF 2.0 (GLB) encoding of [`MeshScene`]s.
//!
//! Every primitive becomes one glTF mesh referenced by one node, both named after the
//! primitive. Vertex data is stored as `POSITION` and `COLOR_0` (`VEC3` float) plus
//! `u32` triangle indices. The primitive kind and element symbol are written to the
//! mesh `extras` so readers never have to guess the element from a name.

use crate::core::models::element::{is_known_element, normalize_symbol};
use crate::core::models::mesh::{MeshScene, Primitive, PrimitiveKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;
use thiserror::Error;

const GLB_MAGIC: u32 = 0x4654_6C67; // "glTF"
const GLB_VERSION: u32 = 2;
const GLB_HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

const COMPONENT_UNSIGNED_BYTE: u32 = 5121;
const COMPONENT_UNSIGNED_SHORT: u32 = 5123;
const COMPONENT_UNSIGNED_INT: u32 = 5125;
const COMPONENT_FLOAT: u32 = 5126;
const TARGET_ARRAY_BUFFER: u32 = 34962;
const TARGET_ELEMENT_ARRAY_BUFFER: u32 = 34963;
const MODE_TRIANGLES: u32 = 4;

const ATTR_POSITION: &str = "POSITION";
const ATTR_COLOR: &str = "COLOR_0";

const GENERATOR: &str = concat!("reactmesh ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum GlbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid glTF JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Not a GLB container: {0}")]
    InvalidHeader(String),
    #[error("Malformed GLB chunk: {0}")]
    InvalidChunk(String),
    #[error("Accessor {index} is invalid: {reason}")]
    InvalidAccessor { index: usize, reason: String },
    #[error("Primitive '{name}' has no vertices")]
    EmptyPrimitive { name: String },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    asset: AssetInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scene: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    scenes: Vec<SceneDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    nodes: Vec<NodeDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    meshes: Vec<MeshDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    accessors: Vec<AccessorDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    buffer_views: Vec<BufferViewDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    buffers: Vec<BufferDef>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AssetInfo {
    version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    generator: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SceneDef {
    #[serde(default)]
    nodes: Vec<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mesh: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    translation: Option<[f64; 3]>,
}

#[derive(Debug, Serialize, Deserialize)]
struct MeshDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    primitives: Vec<PrimitiveDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    extras: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PrimitiveDef {
    attributes: BTreeMap<String, usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    indices: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mode: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessorDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    buffer_view: Option<usize>,
    #[serde(default)]
    byte_offset: usize,
    component_type: u32,
    count: usize,
    #[serde(rename = "type")]
    element_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max: Option<Vec<f32>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BufferViewDef {
    buffer: usize,
    #[serde(default)]
    byte_offset: usize,
    byte_length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    byte_stride: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BufferDef {
    byte_length: usize,
}

/// Explicit per-mesh metadata stored in glTF `extras`.
#[derive(Debug, Serialize, Deserialize)]
struct PrimitiveExtras {
    kind: PrimitiveKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    element: Option<String>,
}

pub struct GlbFile;

impl GlbFile {
    pub fn write_to(scene: &MeshScene, writer: &mut impl Write) -> Result<(), GlbError> {
        let (document, mut bin) = encode_scene(scene)?;
        let mut json = serde_json::to_vec(&document)?;
        pad_to_four(&mut json, b' ');
        pad_to_four(&mut bin, 0);

        let mut total = GLB_HEADER_LEN + CHUNK_HEADER_LEN + json.len();
        if !bin.is_empty() {
            total += CHUNK_HEADER_LEN + bin.len();
        }

        writer.write_all(&GLB_MAGIC.to_le_bytes())?;
        writer.write_all(&GLB_VERSION.to_le_bytes())?;
        writer.write_all(&(total as u32).to_le_bytes())?;

        writer.write_all(&(json.len() as u32).to_le_bytes())?;
        writer.write_all(&CHUNK_JSON.to_le_bytes())?;
        writer.write_all(&json)?;

        if !bin.is_empty() {
            writer.write_all(&(bin.len() as u32).to_le_bytes())?;
            writer.write_all(&CHUNK_BIN.to_le_bytes())?;
            writer.write_all(&bin)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn read_from(reader: &mut impl Read) -> Result<MeshScene, GlbError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::decode(&bytes)
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<MeshScene, GlbError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    pub fn decode(bytes: &[u8]) -> Result<MeshScene, GlbError> {
        let (json, bin) = split_chunks(bytes)?;
        let document: Document = serde_json::from_slice(json)?;
        decode_scene(&document, bin)
    }
}

fn pad_to_four(buf: &mut Vec<u8>, fill: u8) {
    while buf.len() % 4 != 0 {
        buf.push(fill);
    }
}

fn encode_scene(scene: &MeshScene) -> Result<(Document, Vec<u8>), GlbError> {
    let mut bin: Vec<u8> = Vec::new();
    let mut accessors = Vec::new();
    let mut buffer_views = Vec::new();
    let mut meshes = Vec::new();
    let mut nodes = Vec::new();

    let mut push_view = |bin: &mut Vec<u8>, data: Vec<u8>, target: u32| -> usize {
        let view = BufferViewDef {
            buffer: 0,
            byte_offset: bin.len(),
            byte_length: data.len(),
            byte_stride: None,
            target: Some(target),
        };
        bin.extend_from_slice(&data);
        buffer_views.push(view);
        buffer_views.len() - 1
    };

    for primitive in scene.primitives() {
        if primitive.positions.is_empty() {
            return Err(GlbError::EmptyPrimitive {
                name: primitive.name.clone(),
            });
        }

        let mut min = [f32::INFINITY; 3];
        let mut max = [f32::NEG_INFINITY; 3];
        let mut position_bytes = Vec::with_capacity(primitive.positions.len() * 12);
        let mut color_bytes = Vec::with_capacity(primitive.positions.len() * 12);
        for p in &primitive.positions {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
                position_bytes.extend_from_slice(&p[axis].to_le_bytes());
                color_bytes.extend_from_slice(&primitive.color[axis].to_le_bytes());
            }
        }
        let index_bytes: Vec<u8> = primitive
            .indices
            .iter()
            .flat_map(|i| i.to_le_bytes())
            .collect();

        let position_view = push_view(&mut bin, position_bytes, TARGET_ARRAY_BUFFER);
        accessors.push(AccessorDef {
            buffer_view: Some(position_view),
            byte_offset: 0,
            component_type: COMPONENT_FLOAT,
            count: primitive.positions.len(),
            element_type: "VEC3".to_string(),
            min: Some(min.to_vec()),
            max: Some(max.to_vec()),
        });
        let position_accessor = accessors.len() - 1;

        let color_view = push_view(&mut bin, color_bytes, TARGET_ARRAY_BUFFER);
        accessors.push(AccessorDef {
            buffer_view: Some(color_view),
            byte_offset: 0,
            component_type: COMPONENT_FLOAT,
            count: primitive.positions.len(),
            element_type: "VEC3".to_string(),
            min: None,
            max: None,
        });
        let color_accessor = accessors.len() - 1;

        let index_accessor = if primitive.indices.is_empty() {
            None
        } else {
            let index_view = push_view(&mut bin, index_bytes, TARGET_ELEMENT_ARRAY_BUFFER);
            accessors.push(AccessorDef {
                buffer_view: Some(index_view),
                byte_offset: 0,
                component_type: COMPONENT_UNSIGNED_INT,
                count: primitive.indices.len(),
                element_type: "SCALAR".to_string(),
                min: None,
                max: None,
            });
            Some(accessors.len() - 1)
        };

        let mut attributes = BTreeMap::new();
        attributes.insert(ATTR_POSITION.to_string(), position_accessor);
        attributes.insert(ATTR_COLOR.to_string(), color_accessor);

        let extras = serde_json::to_value(PrimitiveExtras {
            kind: primitive.kind,
            element: primitive.element.clone(),
        })?;

        meshes.push(MeshDef {
            name: Some(primitive.name.clone()),
            primitives: vec![PrimitiveDef {
                attributes,
                indices: index_accessor,
                mode: Some(MODE_TRIANGLES),
            }],
            extras: Some(extras),
        });
        nodes.push(NodeDef {
            name: Some(primitive.name.clone()),
            mesh: Some(meshes.len() - 1),
            translation: None,
        });
    }

    let buffers = if bin.is_empty() {
        Vec::new()
    } else {
        vec![BufferDef {
            byte_length: bin.len(),
        }]
    };

    let document = Document {
        asset: AssetInfo {
            version: "2.0".to_string(),
            generator: Some(GENERATOR.to_string()),
        },
        scene: Some(0),
        scenes: vec![SceneDef {
            nodes: (0..nodes.len()).collect(),
        }],
        nodes,
        meshes,
        accessors,
        buffer_views,
        buffers,
    };
    Ok((document, bin))
}

fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let slice = bytes.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

fn split_chunks(bytes: &[u8]) -> Result<(&[u8], &[u8]), GlbError> {
    if bytes.len() < GLB_HEADER_LEN {
        return Err(GlbError::InvalidHeader(format!(
            "file is {} bytes, shorter than the 12-byte header",
            bytes.len()
        )));
    }
    let magic = read_u32(bytes, 0).unwrap_or_default();
    if magic != GLB_MAGIC {
        return Err(GlbError::InvalidHeader(format!("bad magic 0x{magic:08x}")));
    }
    let version = read_u32(bytes, 4).unwrap_or_default();
    if version != GLB_VERSION {
        return Err(GlbError::InvalidHeader(format!(
            "unsupported container version {version}"
        )));
    }
    let declared = read_u32(bytes, 8).unwrap_or_default() as usize;
    if declared > bytes.len() || declared < GLB_HEADER_LEN {
        return Err(GlbError::InvalidHeader(format!(
            "declared length {declared} does not match file size {}",
            bytes.len()
        )));
    }
    let body = &bytes[..declared];

    let mut offset = GLB_HEADER_LEN;
    let mut json: Option<&[u8]> = None;
    let mut bin: &[u8] = &[];
    while offset + CHUNK_HEADER_LEN <= body.len() {
        let length = read_u32(body, offset).unwrap_or_default() as usize;
        let chunk_type = read_u32(body, offset + 4).unwrap_or_default();
        let start = offset + CHUNK_HEADER_LEN;
        let end = start.checked_add(length);
        let data = end.and_then(|end| body.get(start..end)).ok_or_else(|| {
            GlbError::InvalidChunk(format!(
                "chunk at byte {offset} claims {length} bytes past the end of the file"
            ))
        })?;
        match chunk_type {
            CHUNK_JSON if json.is_none() => json = Some(data),
            CHUNK_BIN if json.is_some() => bin = data,
            CHUNK_JSON | CHUNK_BIN => {
                return Err(GlbError::InvalidChunk(format!(
                    "unexpected chunk 0x{chunk_type:08x} at byte {offset}"
                )));
            }
            // Unknown chunk types must be ignored.
            _ => {}
        }
        offset = start + data.len();
    }

    let json = json.ok_or_else(|| GlbError::InvalidChunk("missing JSON chunk".to_string()))?;
    Ok((json, bin))
}

fn decode_scene(document: &Document, bin: &[u8]) -> Result<MeshScene, GlbError> {
    let mut scene = MeshScene::new();
    let node_indices: Vec<usize> = match document.scene.and_then(|s| document.scenes.get(s)) {
        Some(scene_def) => scene_def.nodes.clone(),
        None => (0..document.nodes.len()).collect(),
    };

    for node_idx in node_indices {
        let Some(node) = document.nodes.get(node_idx) else {
            continue;
        };
        let Some(mesh) = node.mesh.and_then(|m| document.meshes.get(m)) else {
            continue;
        };
        let name = mesh
            .name
            .clone()
            .or_else(|| node.name.clone())
            .unwrap_or_else(|| format!("node_{node_idx}"));
        let (kind, element) = classify(&name, mesh.extras.as_ref());
        let offset = node.translation.unwrap_or([0.0; 3]);

        let mut positions = Vec::new();
        let mut indices = Vec::new();
        let mut color = [1.0, 1.0, 1.0];
        for prim in &mesh.primitives {
            let Some(&position_accessor) = prim.attributes.get(ATTR_POSITION) else {
                continue;
            };
            let base = positions.len() as u32;
            let prim_positions = read_vec3_f32(document, bin, position_accessor)?;
            if positions.is_empty() {
                if let Some(&color_accessor) = prim.attributes.get(ATTR_COLOR) {
                    if let Some(first) = read_vec3_f32(document, bin, color_accessor)?.first() {
                        color = *first;
                    }
                }
            }
            positions.extend(prim_positions.into_iter().map(|p| {
                [
                    p[0] + offset[0] as f32,
                    p[1] + offset[1] as f32,
                    p[2] + offset[2] as f32,
                ]
            }));
            if let Some(index_accessor) = prim.indices {
                indices.extend(
                    read_indices(document, bin, index_accessor)?
                        .into_iter()
                        .map(|i| i + base),
                );
            }
        }

        if positions.is_empty() {
            continue;
        }
        scene.push(Primitive {
            name,
            kind,
            element,
            positions,
            color,
            indices,
        });
    }
    Ok(scene)
}

/// Decides the kind and element of a decoded mesh.
///
/// Explicit `extras` metadata wins. Assets without it fall back to the name prefix
/// before the first `_`: `bond` marks a bond, a periodic-table symbol marks an atom.
fn classify(name: &str, extras: Option<&serde_json::Value>) -> (PrimitiveKind, Option<String>) {
    if let Some(parsed) = extras
        .cloned()
        .and_then(|v| serde_json::from_value::<PrimitiveExtras>(v).ok())
    {
        let element = parsed
            .element
            .map(|e| normalize_symbol(&e))
            .filter(|e| !e.is_empty());
        return (parsed.kind, element);
    }

    let prefix = name.trim().split('_').next().unwrap_or_default();
    if prefix.eq_ignore_ascii_case("bond") {
        return (PrimitiveKind::Bond, None);
    }
    let symbol = normalize_symbol(prefix);
    let element = (symbol.chars().all(|c| c.is_ascii_alphabetic()) && is_known_element(&symbol))
        .then_some(symbol);
    (PrimitiveKind::Atom, element)
}

fn view_slice<'a>(
    document: &Document,
    bin: &'a [u8],
    accessor_index: usize,
    expected_type: &str,
) -> Result<(&'a [u8], usize, usize, u32), GlbError> {
    let invalid = |reason: String| GlbError::InvalidAccessor {
        index: accessor_index,
        reason,
    };
    let accessor = document
        .accessors
        .get(accessor_index)
        .ok_or_else(|| invalid("index out of range".to_string()))?;
    if accessor.element_type != expected_type {
        return Err(invalid(format!(
            "expected {expected_type}, found {}",
            accessor.element_type
        )));
    }
    let view_index = accessor
        .buffer_view
        .ok_or_else(|| invalid("sparse or view-less accessors are not supported".to_string()))?;
    let view = document
        .buffer_views
        .get(view_index)
        .ok_or_else(|| invalid(format!("buffer view {view_index} does not exist")))?;
    if view.buffer != 0 {
        return Err(invalid("only the embedded GLB buffer is supported".to_string()));
    }
    let start = view.byte_offset;
    let data = start
        .checked_add(view.byte_length)
        .and_then(|end| bin.get(start..end))
        .ok_or_else(|| invalid("buffer view exceeds the binary chunk".to_string()))?;
    let data = data
        .get(accessor.byte_offset..)
        .ok_or_else(|| invalid("byte offset exceeds the buffer view".to_string()))?;
    Ok((
        data,
        accessor.count,
        view.byte_stride.unwrap_or(0),
        accessor.component_type,
    ))
}

/// Rejects accessors whose `count` elements cannot fit in `data`, before anything
/// is allocated for them.
fn check_extent(
    data: &[u8],
    count: usize,
    stride: usize,
    element_size: usize,
    accessor_index: usize,
) -> Result<(), GlbError> {
    let invalid = |reason: String| GlbError::InvalidAccessor {
        index: accessor_index,
        reason,
    };
    if stride < element_size {
        return Err(invalid(format!(
            "stride {stride} is smaller than the {element_size}-byte element"
        )));
    }
    if count == 0 {
        return Ok(());
    }
    let needed = (count - 1)
        .checked_mul(stride)
        .and_then(|n| n.checked_add(element_size));
    match needed {
        Some(needed) if needed <= data.len() => Ok(()),
        _ => Err(invalid(format!(
            "{count} elements do not fit in a {}-byte view",
            data.len()
        ))),
    }
}

fn read_vec3_f32(
    document: &Document,
    bin: &[u8],
    accessor_index: usize,
) -> Result<Vec<[f32; 3]>, GlbError> {
    let (data, count, stride, component_type) =
        view_slice(document, bin, accessor_index, "VEC3")?;
    if component_type != COMPONENT_FLOAT {
        return Err(GlbError::InvalidAccessor {
            index: accessor_index,
            reason: format!("expected float components, found {component_type}"),
        });
    }
    let stride = if stride == 0 { 12 } else { stride };
    check_extent(data, count, stride, 12, accessor_index)?;
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let base = i * stride;
        let read = |k: usize| {
            read_u32(data, base + k * 4).map(f32::from_bits).ok_or_else(|| {
                GlbError::InvalidAccessor {
                    index: accessor_index,
                    reason: format!("element {i} lies outside the buffer view"),
                }
            })
        };
        out.push([read(0)?, read(1)?, read(2)?]);
    }
    Ok(out)
}

fn read_indices(
    document: &Document,
    bin: &[u8],
    accessor_index: usize,
) -> Result<Vec<u32>, GlbError> {
    let (data, count, stride, component_type) =
        view_slice(document, bin, accessor_index, "SCALAR")?;
    let size = match component_type {
        COMPONENT_UNSIGNED_BYTE => 1,
        COMPONENT_UNSIGNED_SHORT => 2,
        COMPONENT_UNSIGNED_INT => 4,
        other => {
            return Err(GlbError::InvalidAccessor {
                index: accessor_index,
                reason: format!("unsupported index component type {other}"),
            });
        }
    };
    let stride = if stride == 0 { size } else { stride };
    check_extent(data, count, stride, size, accessor_index)?;
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let base = i * stride;
        let bytes = data
            .get(base..base + size)
            .ok_or_else(|| GlbError::InvalidAccessor {
                index: accessor_index,
                reason: format!("index {i} lies outside the buffer view"),
            })?;
        out.push(match size {
            1 => bytes[0] as u32,
            2 => u16::from_le_bytes([bytes[0], bytes[1]]) as u32,
            _ => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(name: &str, element: &str, center: [f32; 3]) -> Primitive {
        let [x, y, z] = center;
        Primitive {
            name: name.to_string(),
            kind: PrimitiveKind::Atom,
            element: Some(element.to_string()),
            positions: vec![
                [x + 1.0, y, z],
                [x - 1.0, y, z],
                [x, y + 1.0, z],
                [x, y - 1.0, z],
            ],
            color: [1.0, 0.0, 0.0],
            indices: vec![0, 2, 1, 1, 3, 0],
        }
    }

    fn encode(scene: &MeshScene) -> Vec<u8> {
        let mut bytes = Vec::new();
        GlbFile::write_to(scene, &mut bytes).unwrap();
        bytes
    }

    #[test]
    fn written_container_has_valid_header_and_alignment() {
        let scene = MeshScene::from(vec![atom("O_0", "O", [0.0, 0.0, 0.0])]);
        let bytes = encode(&scene);
        assert_eq!(&bytes[0..4], b"glTF");
        assert_eq!(read_u32(&bytes, 4), Some(2));
        assert_eq!(read_u32(&bytes, 8), Some(bytes.len() as u32));
        assert_eq!(bytes.len() % 4, 0);
        assert_eq!(read_u32(&bytes, 16), Some(CHUNK_JSON));
    }

    #[test]
    fn decoded_scene_preserves_names_elements_and_geometry() {
        let scene = MeshScene::from(vec![
            atom("Cl_0", "Cl", [1.5, -2.0, 0.25]),
            Primitive {
                name: "bond_0_1_0".to_string(),
                kind: PrimitiveKind::Bond,
                element: None,
                positions: vec![[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]],
                color: [0.5, 0.5, 0.5],
                indices: vec![0, 1, 2],
            },
        ]);
        let decoded = GlbFile::decode(&encode(&scene)).unwrap();
        assert_eq!(decoded.primitives().len(), 2);

        let cl = &decoded.primitives()[0];
        assert_eq!(cl.name, "Cl_0");
        assert_eq!(cl.kind, PrimitiveKind::Atom);
        assert_eq!(cl.element.as_deref(), Some("Cl"));
        assert_eq!(cl.positions, scene.primitives()[0].positions);
        assert_eq!(cl.indices, vec![0, 2, 1, 1, 3, 0]);
        assert_eq!(cl.color, [1.0, 0.0, 0.0]);

        let c = cl.centroid().unwrap();
        assert!((c.x - 1.5).abs() < 1e-6 && (c.y + 2.0).abs() < 1e-6 && (c.z - 0.25).abs() < 1e-6);

        assert_eq!(decoded.primitives()[1].kind, PrimitiveKind::Bond);
        assert_eq!(decoded.primitives()[1].element, None);
    }

    #[test]
    fn classify_prefers_explicit_metadata_over_name() {
        let extras = serde_json::json!({ "kind": "atom", "element": "Cl" });
        assert_eq!(
            classify("C_weird", Some(&extras)),
            (PrimitiveKind::Atom, Some("Cl".to_string()))
        );
    }

    #[test]
    fn classify_falls_back_to_name_prefix() {
        assert_eq!(
            classify("Cl_3", None),
            (PrimitiveKind::Atom, Some("Cl".to_string()))
        );
        assert_eq!(classify("C_12", None), (PrimitiveKind::Atom, Some("C".to_string())));
        assert_eq!(classify("bond_1_2_0", None), (PrimitiveKind::Bond, None));
        assert_eq!(classify("geometry_0", None), (PrimitiveKind::Atom, None));
    }

    #[test]
    fn empty_scene_round_trips_without_binary_chunk() {
        let bytes = encode(&MeshScene::new());
        let decoded = GlbFile::decode(&bytes).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn primitive_without_vertices_is_rejected() {
        let mut empty = atom("O_0", "O", [0.0; 3]);
        empty.positions.clear();
        let err = GlbFile::write_to(&MeshScene::from(vec![empty]), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, GlbError::EmptyPrimitive { .. }));
    }

    #[test]
    fn garbage_and_truncated_input_is_rejected() {
        assert!(matches!(
            GlbFile::decode(b"not a glb file at all"),
            Err(GlbError::InvalidHeader(_))
        ));
        assert!(matches!(GlbFile::decode(b"glT"), Err(GlbError::InvalidHeader(_))));

        let scene = MeshScene::from(vec![atom("O_0", "O", [0.0; 3])]);
        let mut bytes = encode(&scene);
        bytes.truncate(bytes.len() - 8);
        assert!(GlbFile::decode(&bytes).is_err());
    }

    #[test]
    fn oversized_accessor_counts_are_errors() {
        let scene = MeshScene::from(vec![atom("O_0", "O", [0.0; 3])]);

        for accessor in [0, 2] {
            let (mut document, bin) = encode_scene(&scene).unwrap();
            document.accessors[accessor].count = usize::MAX / 2;
            assert!(matches!(
                decode_scene(&document, &bin),
                Err(GlbError::InvalidAccessor { index, .. }) if index == accessor
            ));
        }

        let (mut document, bin) = encode_scene(&scene).unwrap();
        document.accessors[0].count += 1;
        assert!(matches!(
            decode_scene(&document, &bin),
            Err(GlbError::InvalidAccessor { index: 0, .. })
        ));
    }

    #[test]
    fn overflowing_view_bounds_are_errors() {
        let scene = MeshScene::from(vec![atom("O_0", "O", [0.0; 3])]);

        let (mut document, bin) = encode_scene(&scene).unwrap();
        document.buffer_views[0].byte_offset = usize::MAX;
        assert!(matches!(
            decode_scene(&document, &bin),
            Err(GlbError::InvalidAccessor { index: 0, .. })
        ));

        let (mut document, bin) = encode_scene(&scene).unwrap();
        document.buffer_views[0].byte_stride = Some(4);
        assert!(matches!(
            decode_scene(&document, &bin),
            Err(GlbError::InvalidAccessor { index: 0, .. })
        ));
    }

    #[test]
    fn chunk_length_past_the_end_is_an_error() {
        let scene = MeshScene::from(vec![atom("O_0", "O", [0.0; 3])]);
        let mut bytes = encode(&scene);
        bytes[GLB_HEADER_LEN..GLB_HEADER_LEN + 4].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(GlbFile::decode(&bytes), Err(GlbError::InvalidChunk(_))));
    }

    #[test]
    fn node_translation_offsets_decoded_positions() {
        let scene = MeshScene::from(vec![atom("O_0", "O", [0.0; 3])]);
        let (mut document, bin) = encode_scene(&scene).unwrap();
        document.nodes[0].translation = Some([10.0, 0.0, 0.0]);
        let decoded = decode_scene(&document, &bin).unwrap();
        let c = decoded.primitives()[0].centroid().unwrap();
        assert!((c.x - 10.0).abs() < 1e-6);
    }
}
