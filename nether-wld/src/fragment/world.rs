//! Zone structure records: 0x21 WorldTree, 0x22 Region, 0x29 Zone

use serde::{Deserialize, Serialize};

use super::{
    CODE_REGION, CODE_WORLD_TREE, CODE_ZONE, FragmentCodec, read_if, read_refs, write_refs,
};
use crate::cursor::{WldReader, WldWriter};
use crate::error::{Result, WldError};

// =============================================================================
// 0x21 WorldTree
// =============================================================================

/// BSP node; `region` is a 1-based region number, `front`/`back` are node numbers
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WorldTreeNode {
    pub plane: [f32; 4],
    pub region: i32,
    pub front: i32,
    pub back: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldTree {
    pub name_ref: i32,
    pub nodes: Vec<WorldTreeNode>,
}

impl FragmentCodec for WorldTree {
    const CODE: u32 = CODE_WORLD_TREE;

    fn read(reader: &mut WldReader<'_>) -> Result<Self> {
        let name_ref = reader.read_i32()?;
        let count = reader.read_count(28)?;
        let nodes = reader.read_vec(count, 28, |r| {
            Ok(WorldTreeNode {
                plane: r.read_f32x4()?,
                region: r.read_i32()?,
                front: r.read_i32()?,
                back: r.read_i32()?,
            })
        })?;
        Ok(Self { name_ref, nodes })
    }

    fn write(&self, writer: &mut WldWriter) -> Result<()> {
        writer.write_i32(self.name_ref);
        writer.write_count(self.nodes.len())?;
        for node in &self.nodes {
            writer.write_f32s(&node.plane);
            writer.write_i32(node.region);
            writer.write_i32(node.front);
            writer.write_i32(node.back);
        }
        Ok(())
    }

    fn name_ref(&self) -> i32 {
        self.name_ref
    }
}

// =============================================================================
// 0x22 Region
// =============================================================================

pub const REGION_FLAG_HAS_SPHERE: u32 = 0x01;
pub const REGION_FLAG_HAS_REVERB_VOLUME: u32 = 0x02;
pub const REGION_FLAG_HAS_REVERB_OFFSET: u32 = 0x04;
pub const REGION_FLAG_FOG: u32 = 0x08;
pub const REGION_FLAG_GOURAUD2: u32 = 0x10;
pub const REGION_FLAG_ENCODED_VISIBILITY: u32 = 0x20;
/// Vis list ranges are single bytes rather than byte pairs
pub const REGION_FLAG_BYTE_VIS_LISTS: u32 = 0x80;
pub const REGION_FLAG_HAS_MESH: u32 = 0x100;

/// Obstacle type followed by an edge plane
pub const OBSTACLE_TYPE_EDGE_POLYGON_NORMAL: i32 = -15;
/// Obstacle type followed by an edge wall index
pub const OBSTACLE_TYPE_EDGE_WALL: i32 = 18;
pub const OBSTACLE_FLAG_HAS_USER_DATA: u32 = 0x04;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub flags: u32,
    pub render_method: u32,
    pub render_flags: u32,
    pub render_pen: u32,
    pub render_brightness: f32,
    pub render_scaled_ambient: f32,
    pub render_sprite_ref: u32,
    pub uv_origin: [f32; 3],
    pub uv_u_axis: [f32; 3],
    pub uv_v_axis: [f32; 3],
    pub uv_map: Vec<[f32; 2]>,
    pub normal: [f32; 4],
    pub vertices: Vec<u32>,
}

impl Wall {
    const MIN_SIZE: usize = 84;

    fn read(reader: &mut WldReader<'_>) -> Result<Self> {
        let flags = reader.read_u32()?;
        let vertex_count = reader.read_u32()? as usize;
        let render_method = reader.read_u32()?;
        let render_flags = reader.read_u32()?;
        let render_pen = reader.read_u32()?;
        let render_brightness = reader.read_f32()?;
        let render_scaled_ambient = reader.read_f32()?;
        let render_sprite_ref = reader.read_u32()?;
        let uv_origin = reader.read_f32x3()?;
        let uv_u_axis = reader.read_f32x3()?;
        let uv_v_axis = reader.read_f32x3()?;
        let uv_count = reader.read_count(8)?;
        let uv_map = reader.read_vec(uv_count, 8, |r| Ok([r.read_f32()?, r.read_f32()?]))?;
        let normal = reader.read_f32x4()?;
        let vertices = reader.read_vec(vertex_count, 4, |r| r.read_u32())?;
        Ok(Self {
            flags,
            render_method,
            render_flags,
            render_pen,
            render_brightness,
            render_scaled_ambient,
            render_sprite_ref,
            uv_origin,
            uv_u_axis,
            uv_v_axis,
            uv_map,
            normal,
            vertices,
        })
    }

    fn write(&self, writer: &mut WldWriter) -> Result<()> {
        writer.write_u32(self.flags);
        writer.write_count(self.vertices.len())?;
        writer.write_u32(self.render_method);
        writer.write_u32(self.render_flags);
        writer.write_u32(self.render_pen);
        writer.write_f32(self.render_brightness);
        writer.write_f32(self.render_scaled_ambient);
        writer.write_u32(self.render_sprite_ref);
        writer.write_f32s(&self.uv_origin);
        writer.write_f32s(&self.uv_u_axis);
        writer.write_f32s(&self.uv_v_axis);
        writer.write_count(self.uv_map.len())?;
        for uv in &self.uv_map {
            writer.write_f32s(uv);
        }
        writer.write_f32s(&self.normal);
        for &vertex in &self.vertices {
            writer.write_u32(vertex);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub flags: u32,
    pub next_region: i32,
    pub obstacle_type: i32,
    pub vertices: Vec<u32>,
    pub plane: Option<[f32; 4]>,
    pub edge_wall: Option<u32>,
    pub user_data: Option<Vec<u8>>,
}

impl Obstacle {
    const MIN_SIZE: usize = 16;

    fn read(reader: &mut WldReader<'_>) -> Result<Self> {
        let flags = reader.read_u32()?;
        let next_region = reader.read_i32()?;
        let obstacle_type = reader.read_i32()?;
        let vertex_count = reader.read_count(4)?;
        let vertices = reader.read_vec(vertex_count, 4, |r| r.read_u32())?;
        let plane = if obstacle_type == OBSTACLE_TYPE_EDGE_POLYGON_NORMAL {
            Some(reader.read_f32x4()?)
        } else {
            None
        };
        let edge_wall = if obstacle_type == OBSTACLE_TYPE_EDGE_WALL {
            Some(reader.read_u32()?)
        } else {
            None
        };
        let user_data = read_if(reader, flags, OBSTACLE_FLAG_HAS_USER_DATA, |r| {
            let len = r.read_count(1)?;
            Ok(r.read_bytes(len)?.to_vec())
        })?;
        Ok(Self {
            flags,
            next_region,
            obstacle_type,
            vertices,
            plane,
            edge_wall,
            user_data,
        })
    }

    fn write(&self, writer: &mut WldWriter) -> Result<()> {
        writer.write_u32(self.flags);
        writer.write_i32(self.next_region);
        writer.write_i32(self.obstacle_type);
        writer.write_count(self.vertices.len())?;
        for &vertex in &self.vertices {
            writer.write_u32(vertex);
        }
        if self.obstacle_type == OBSTACLE_TYPE_EDGE_POLYGON_NORMAL {
            writer.write_f32s(&self.plane.unwrap_or_default());
        }
        if self.obstacle_type == OBSTACLE_TYPE_EDGE_WALL {
            writer.write_u32(self.edge_wall.unwrap_or_default());
        }
        if self.flags & OBSTACLE_FLAG_HAS_USER_DATA != 0 {
            let data = self.user_data.as_deref().unwrap_or_default();
            writer.write_count(data.len())?;
            writer.write_bytes(data);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VisNode {
    pub plane: [f32; 4],
    pub vis_list_index: u32,
    pub front: u32,
    pub back: u32,
}

/// Visibility ranges, kept as stored bytes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisList {
    pub ranges: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Region {
    pub name_ref: i32,
    pub flags: u32,
    pub ambient_light_ref: i32,
    pub cutting_obstacle_count: u32,
    pub region_vertices: Vec<[f32; 3]>,
    pub proximals: Vec<[f32; 2]>,
    pub render_vertices: Vec<[f32; 3]>,
    pub walls: Vec<Wall>,
    pub obstacles: Vec<Obstacle>,
    pub vis_nodes: Vec<VisNode>,
    pub vis_lists: Vec<VisList>,
    pub sphere: Option<[f32; 4]>,
    pub reverb_volume: Option<f32>,
    pub reverb_offset: Option<i32>,
    pub user_data: Vec<u8>,
    /// DmSpriteDef2 position
    pub mesh_ref: Option<i32>,
}

impl FragmentCodec for Region {
    const CODE: u32 = CODE_REGION;

    fn read(reader: &mut WldReader<'_>) -> Result<Self> {
        let name_ref = reader.read_i32()?;
        let flags = reader.read_u32()?;
        let ambient_light_ref = reader.read_i32()?;
        let region_vertex_count = reader.read_u32()? as usize;
        let proximal_count = reader.read_u32()? as usize;
        let render_vertex_count = reader.read_u32()? as usize;
        let wall_count = reader.read_u32()? as usize;
        let obstacle_count = reader.read_u32()? as usize;
        let cutting_obstacle_count = reader.read_u32()?;
        let vis_node_count = reader.read_u32()? as usize;
        let vis_list_count = reader.read_u32()? as usize;

        let region_vertices = reader.read_vec(region_vertex_count, 12, |r| r.read_f32x3())?;
        let proximals =
            reader.read_vec(proximal_count, 8, |r| Ok([r.read_f32()?, r.read_f32()?]))?;
        let render_vertices = reader.read_vec(render_vertex_count, 12, |r| r.read_f32x3())?;
        let walls = reader.read_vec(wall_count, Wall::MIN_SIZE, Wall::read)?;
        let obstacles = reader.read_vec(obstacle_count, Obstacle::MIN_SIZE, Obstacle::read)?;
        let vis_nodes = reader.read_vec(vis_node_count, 28, |r| {
            Ok(VisNode {
                plane: r.read_f32x4()?,
                vis_list_index: r.read_u32()?,
                front: r.read_u32()?,
                back: r.read_u32()?,
            })
        })?;
        let byte_ranges = flags & REGION_FLAG_BYTE_VIS_LISTS != 0;
        let vis_lists = reader.read_vec(vis_list_count, 2, |r| {
            let count = usize::from(r.read_u16()?);
            let len = if byte_ranges { count } else { count * 2 };
            r.check_count(len, 1)?;
            Ok(VisList {
                ranges: r.read_bytes(len)?.to_vec(),
            })
        })?;

        let sphere = read_if(reader, flags, REGION_FLAG_HAS_SPHERE, |r| r.read_f32x4())?;
        let reverb_volume = read_if(reader, flags, REGION_FLAG_HAS_REVERB_VOLUME, |r| {
            r.read_f32()
        })?;
        let reverb_offset = read_if(reader, flags, REGION_FLAG_HAS_REVERB_OFFSET, |r| {
            r.read_i32()
        })?;
        let user_data_len = reader.read_count(1)?;
        let user_data = reader.read_bytes(user_data_len)?.to_vec();
        let mesh_ref = read_if(reader, flags, REGION_FLAG_HAS_MESH, |r| r.read_i32())?;
        reader.skip_padding_or_end()?;

        Ok(Self {
            name_ref,
            flags,
            ambient_light_ref,
            cutting_obstacle_count,
            region_vertices,
            proximals,
            render_vertices,
            walls,
            obstacles,
            vis_nodes,
            vis_lists,
            sphere,
            reverb_volume,
            reverb_offset,
            user_data,
            mesh_ref,
        })
    }

    fn write(&self, writer: &mut WldWriter) -> Result<()> {
        let byte_ranges = self.flags & REGION_FLAG_BYTE_VIS_LISTS != 0;

        writer.write_i32(self.name_ref);
        writer.write_u32(self.flags);
        writer.write_i32(self.ambient_light_ref);
        writer.write_count(self.region_vertices.len())?;
        writer.write_count(self.proximals.len())?;
        writer.write_count(self.render_vertices.len())?;
        writer.write_count(self.walls.len())?;
        writer.write_count(self.obstacles.len())?;
        writer.write_u32(self.cutting_obstacle_count);
        writer.write_count(self.vis_nodes.len())?;
        writer.write_count(self.vis_lists.len())?;

        for vertex in &self.region_vertices {
            writer.write_f32s(vertex);
        }
        for proximal in &self.proximals {
            writer.write_f32s(proximal);
        }
        for vertex in &self.render_vertices {
            writer.write_f32s(vertex);
        }
        for wall in &self.walls {
            wall.write(writer)?;
        }
        for obstacle in &self.obstacles {
            obstacle.write(writer)?;
        }
        for node in &self.vis_nodes {
            writer.write_f32s(&node.plane);
            writer.write_u32(node.vis_list_index);
            writer.write_u32(node.front);
            writer.write_u32(node.back);
        }
        for list in &self.vis_lists {
            if byte_ranges {
                writer.write_count_u16(list.ranges.len())?;
            } else {
                if list.ranges.len() % 2 != 0 {
                    return Err(WldError::InconsistentLength {
                        count: list.ranges.len(),
                        element_size: 2,
                        remaining: list.ranges.len(),
                    });
                }
                writer.write_count_u16(list.ranges.len() / 2)?;
            }
            writer.write_bytes(&list.ranges);
        }

        if self.flags & REGION_FLAG_HAS_SPHERE != 0 {
            writer.write_f32s(&self.sphere.unwrap_or_default());
        }
        if self.flags & REGION_FLAG_HAS_REVERB_VOLUME != 0 {
            writer.write_f32(self.reverb_volume.unwrap_or_default());
        }
        if self.flags & REGION_FLAG_HAS_REVERB_OFFSET != 0 {
            writer.write_i32(self.reverb_offset.unwrap_or_default());
        }
        writer.write_count(self.user_data.len())?;
        writer.write_bytes(&self.user_data);
        if self.flags & REGION_FLAG_HAS_MESH != 0 {
            writer.write_i32(self.mesh_ref.unwrap_or_default());
        }
        writer.pad_to_4();
        Ok(())
    }

    fn name_ref(&self) -> i32 {
        self.name_ref
    }
}

// =============================================================================
// 0x29 Zone
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Zone {
    pub name_ref: i32,
    pub flags: u32,
    /// Region numbers belonging to this zone
    pub regions: Vec<u32>,
    /// Plain user data; `None` when the record ends after the region list
    pub user_data: Option<Vec<u8>>,
}

impl FragmentCodec for Zone {
    const CODE: u32 = CODE_ZONE;

    fn read(reader: &mut WldReader<'_>) -> Result<Self> {
        let name_ref = reader.read_i32()?;
        let flags = reader.read_u32()?;
        let regions = read_refs(reader)?;
        let user_data = if reader.remaining() == 0 {
            None
        } else {
            let len = reader.read_count(1)?;
            let data = reader.read_obfuscated(len)?;
            if len > 0 {
                reader.skip_padding()?;
            }
            Some(data)
        };
        Ok(Self {
            name_ref,
            flags,
            regions,
            user_data,
        })
    }

    fn write(&self, writer: &mut WldWriter) -> Result<()> {
        writer.write_i32(self.name_ref);
        writer.write_u32(self.flags);
        write_refs(writer, &self.regions)?;
        if let Some(data) = &self.user_data {
            writer.write_count(data.len())?;
            if !data.is_empty() {
                writer.write_obfuscated(data);
                writer.pad_to_4();
            }
        }
        Ok(())
    }

    fn name_ref(&self) -> i32 {
        self.name_ref
    }
}
