//! Mesh records: 0x36 DmSpriteDef2 and its 0x2D instance
//!
//! Vertex data is kept in its stored integer form here; [`crate::quantize`]
//! converts it to and from real values.

use serde::{Deserialize, Serialize};

use super::{CODE_DM_SPRITE, CODE_DM_SPRITE_DEF2, FragmentCodec};
use crate::cursor::{WldReader, WldWriter};
use crate::error::Result;

/// Mesh operation type whose first four bytes hold an f32 offset
pub const MESH_OP_OFFSET: u8 = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshFace {
    pub flags: u16,
    pub indices: [u16; 3],
}

/// Texture coordinates in their stored form
#[derive(Debug, Clone, PartialEq)]
pub enum MeshUvs {
    /// Old-world i16 pairs over 256
    Legacy(Vec<[i16; 2]>),
    /// New-world raw f32 pairs
    Float(Vec<[f32; 2]>),
}

impl Default for MeshUvs {
    fn default() -> Self {
        Self::Float(Vec::new())
    }
}

impl MeshUvs {
    pub fn len(&self) -> usize {
        match self {
            Self::Legacy(uvs) => uvs.len(),
            Self::Float(uvs) => uvs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Morph/tessellation operation; seldom present outside animated models
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MeshOp {
    Indices {
        index1: u16,
        index2: u16,
        param1: u8,
        op_type: u8,
    },
    Offset {
        offset: f32,
        param1: u8,
    },
}

impl MeshOp {
    fn read(reader: &mut WldReader<'_>) -> Result<Self> {
        let head = reader.read_bytes(4)?;
        let head = [head[0], head[1], head[2], head[3]];
        let param1 = reader.read_u8()?;
        let op_type = reader.read_u8()?;
        Ok(if op_type == MESH_OP_OFFSET {
            Self::Offset {
                offset: f32::from_le_bytes(head),
                param1,
            }
        } else {
            Self::Indices {
                index1: u16::from_le_bytes([head[0], head[1]]),
                index2: u16::from_le_bytes([head[2], head[3]]),
                param1,
                op_type,
            }
        })
    }

    fn write(&self, writer: &mut WldWriter) {
        match *self {
            Self::Indices {
                index1,
                index2,
                param1,
                op_type,
            } => {
                writer.write_u16(index1);
                writer.write_u16(index2);
                writer.write_u8(param1);
                writer.write_u8(op_type);
            }
            Self::Offset { offset, param1 } => {
                writer.write_f32(offset);
                writer.write_u8(param1);
                writer.write_u8(MESH_OP_OFFSET);
            }
        }
    }
}

// =============================================================================
// 0x36 DmSpriteDef2
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DmSpriteDef2 {
    pub name_ref: i32,
    pub flags: u32,
    /// MaterialPalette position
    pub material_palette_ref: u32,
    pub dm_track_ref: i32,
    pub fragment3: i32,
    pub fragment4_ref: i32,
    pub center: [f32; 3],
    pub params2: [u32; 3],
    pub bounding_radius: f32,
    pub bbox_min: [f32; 3],
    pub bbox_max: [f32; 3],
    /// Position exponent: real = raw * 2^-scale
    pub scale: u16,
    pub vertices: Vec<[i16; 3]>,
    /// Variant must match the container version
    pub uvs: MeshUvs,
    pub normals: Vec<[i8; 3]>,
    pub colors: Vec<[u8; 4]>,
    pub faces: Vec<MeshFace>,
    pub skin_groups: Vec<[u16; 2]>,
    pub face_material_groups: Vec<[u16; 2]>,
    pub vertex_material_groups: Vec<[u16; 2]>,
    pub mesh_ops: Vec<MeshOp>,
}

fn read_pair(reader: &mut WldReader<'_>) -> Result<[u16; 2]> {
    Ok([reader.read_u16()?, reader.read_u16()?])
}

impl FragmentCodec for DmSpriteDef2 {
    const CODE: u32 = CODE_DM_SPRITE_DEF2;

    fn read(reader: &mut WldReader<'_>) -> Result<Self> {
        let name_ref = reader.read_i32()?;
        let flags = reader.read_u32()?;
        let material_palette_ref = reader.read_u32()?;
        let dm_track_ref = reader.read_i32()?;
        let fragment3 = reader.read_i32()?;
        let fragment4_ref = reader.read_i32()?;
        let center = reader.read_f32x3()?;
        let params2 = [reader.read_u32()?, reader.read_u32()?, reader.read_u32()?];
        let bounding_radius = reader.read_f32()?;
        let bbox_min = reader.read_f32x3()?;
        let bbox_max = reader.read_f32x3()?;

        let mut counts = [0usize; 9];
        for count in &mut counts {
            *count = usize::from(reader.read_u16()?);
        }
        let [
            vertex_count,
            uv_count,
            normal_count,
            color_count,
            face_count,
            skin_count,
            face_material_count,
            vertex_material_count,
            mesh_op_count,
        ] = counts;
        let scale = reader.read_u16()?;

        let vertices = reader.read_vec(vertex_count, 6, |r| {
            Ok([r.read_i16()?, r.read_i16()?, r.read_i16()?])
        })?;
        let uvs = if reader.is_new_world() {
            MeshUvs::Float(reader.read_vec(uv_count, 8, |r| {
                Ok([r.read_f32()?, r.read_f32()?])
            })?)
        } else {
            MeshUvs::Legacy(reader.read_vec(uv_count, 4, |r| {
                Ok([r.read_i16()?, r.read_i16()?])
            })?)
        };
        let normals = reader.read_vec(normal_count, 3, |r| {
            Ok([r.read_i8()?, r.read_i8()?, r.read_i8()?])
        })?;
        let colors = reader.read_vec(color_count, 4, |r| {
            Ok([r.read_u8()?, r.read_u8()?, r.read_u8()?, r.read_u8()?])
        })?;
        let faces = reader.read_vec(face_count, 8, |r| {
            Ok(MeshFace {
                flags: r.read_u16()?,
                indices: [r.read_u16()?, r.read_u16()?, r.read_u16()?],
            })
        })?;
        let skin_groups = reader.read_vec(skin_count, 4, read_pair)?;
        let face_material_groups = reader.read_vec(face_material_count, 4, read_pair)?;
        let vertex_material_groups = reader.read_vec(vertex_material_count, 4, read_pair)?;
        let mesh_ops = reader.read_vec(mesh_op_count, 6, MeshOp::read)?;
        reader.skip_padding()?;

        Ok(Self {
            name_ref,
            flags,
            material_palette_ref,
            dm_track_ref,
            fragment3,
            fragment4_ref,
            center,
            params2,
            bounding_radius,
            bbox_min,
            bbox_max,
            scale,
            vertices,
            uvs,
            normals,
            colors,
            faces,
            skin_groups,
            face_material_groups,
            vertex_material_groups,
            mesh_ops,
        })
    }

    fn write(&self, writer: &mut WldWriter) -> Result<()> {
        writer.write_i32(self.name_ref);
        writer.write_u32(self.flags);
        writer.write_u32(self.material_palette_ref);
        writer.write_i32(self.dm_track_ref);
        writer.write_i32(self.fragment3);
        writer.write_i32(self.fragment4_ref);
        writer.write_f32s(&self.center);
        for &param in &self.params2 {
            writer.write_u32(param);
        }
        writer.write_f32(self.bounding_radius);
        writer.write_f32s(&self.bbox_min);
        writer.write_f32s(&self.bbox_max);

        for count in [
            self.vertices.len(),
            self.uvs.len(),
            self.normals.len(),
            self.colors.len(),
            self.faces.len(),
            self.skin_groups.len(),
            self.face_material_groups.len(),
            self.vertex_material_groups.len(),
            self.mesh_ops.len(),
        ] {
            writer.write_count_u16(count)?;
        }
        writer.write_u16(self.scale);

        for vertex in &self.vertices {
            for &c in vertex {
                writer.write_i16(c);
            }
        }
        match &self.uvs {
            MeshUvs::Float(uvs) => {
                for uv in uvs {
                    writer.write_f32s(uv);
                }
            }
            MeshUvs::Legacy(uvs) => {
                for uv in uvs {
                    writer.write_i16(uv[0]);
                    writer.write_i16(uv[1]);
                }
            }
        }
        for normal in &self.normals {
            for &c in normal {
                writer.write_i8(c);
            }
        }
        for color in &self.colors {
            writer.write_bytes(color);
        }
        for face in &self.faces {
            writer.write_u16(face.flags);
            for &index in &face.indices {
                writer.write_u16(index);
            }
        }
        for group in self
            .skin_groups
            .iter()
            .chain(&self.face_material_groups)
            .chain(&self.vertex_material_groups)
        {
            writer.write_u16(group[0]);
            writer.write_u16(group[1]);
        }
        for op in &self.mesh_ops {
            op.write(writer);
        }
        writer.pad_to_4();
        Ok(())
    }

    fn name_ref(&self) -> i32 {
        self.name_ref
    }
}

// =============================================================================
// 0x2D DmSprite
// =============================================================================

/// Instance of a mesh definition, referenced by actor definitions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DmSprite {
    pub name_ref: i32,
    pub dm_sprite_ref: i32,
    pub params: u32,
}

impl FragmentCodec for DmSprite {
    const CODE: u32 = CODE_DM_SPRITE;

    fn read(reader: &mut WldReader<'_>) -> Result<Self> {
        Ok(Self {
            name_ref: reader.read_i32()?,
            dm_sprite_ref: reader.read_i32()?,
            params: reader.read_u32()?,
        })
    }

    fn write(&self, writer: &mut WldWriter) -> Result<()> {
        writer.write_i32(self.name_ref);
        writer.write_i32(self.dm_sprite_ref);
        writer.write_u32(self.params);
        Ok(())
    }

    fn name_ref(&self) -> i32 {
        self.name_ref
    }
}
