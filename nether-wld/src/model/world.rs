use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::TagRef;
use crate::fragment::{Obstacle, VisList, VisNode, Wall};

/// BSP node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub plane: [f32; 4],
    /// Leaf region tag (`R` + six digits)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub front: i32,
    pub back: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldTree {
    pub tag: String,
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub tag: String,
    pub flags: u32,
    /// Global ambient light definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambient_light: Option<TagRef>,
    #[serde(default)]
    pub cutting_obstacle_count: u32,
    #[serde(default)]
    pub region_vertices: Vec<Vec3>,
    #[serde(default)]
    pub proximals: Vec<Vec2>,
    #[serde(default)]
    pub render_vertices: Vec<Vec3>,
    #[serde(default)]
    pub walls: Vec<Wall>,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
    #[serde(default)]
    pub vis_nodes: Vec<VisNode>,
    #[serde(default)]
    pub vis_lists: Vec<VisList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sphere: Option<[f32; 4]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverb_volume: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverb_offset: Option<i32>,
    #[serde(default)]
    pub user_data: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<TagRef>,
}

/// Named set of regions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub tag: String,
    pub flags: u32,
    pub regions: Vec<u32>,
    /// `None` when the record carries no user data field at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<Vec<u8>>,
}
