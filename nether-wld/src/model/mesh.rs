use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::TagRef;
use crate::fragment::{MeshFace, MeshOp};

/// Quantized mesh with vertex data in real units
///
/// Positions are stored as `i16 * 2^-scale`, normals as `i8 / 128` and, in
/// old-world containers, texture coordinates as `i16 / 256`. Values decoded
/// from a container re-encode to the same integers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub tag: String,
    pub flags: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette: Option<TagRef>,
    /// Source positions of records outside the graph (vertex animation and
    /// polyhedron). Kept for inspection; a mesh only encodes while both are 0.
    #[serde(default)]
    pub dm_track_ref: i32,
    #[serde(default)]
    pub fragment4_ref: i32,
    /// Stored as is
    #[serde(default)]
    pub fragment3: i32,
    pub center: Vec3,
    #[serde(default)]
    pub params2: [u32; 3],
    pub bounding_radius: f32,
    pub bbox_min: Vec3,
    pub bbox_max: Vec3,
    /// Position exponent
    pub scale: u16,
    pub vertices: Vec<Vec3>,
    #[serde(default)]
    pub uvs: Vec<Vec2>,
    #[serde(default)]
    pub normals: Vec<Vec3>,
    #[serde(default)]
    pub colors: Vec<[u8; 4]>,
    pub faces: Vec<MeshFace>,
    #[serde(default)]
    pub skin_groups: Vec<[u16; 2]>,
    #[serde(default)]
    pub face_material_groups: Vec<[u16; 2]>,
    #[serde(default)]
    pub vertex_material_groups: Vec<[u16; 2]>,
    #[serde(default)]
    pub mesh_ops: Vec<MeshOp>,
}
