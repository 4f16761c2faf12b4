use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::TagRef;

/// Zone-wide ambient colour, blue/green/red/alpha
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalAmbientLight {
    pub tag: String,
    pub color: [u8; 4],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LightDef {
    pub tag: String,
    pub flags: u32,
    pub frame_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_frame: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levels: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<[f32; 3]>>,
}

/// Light instance folded into the light that places it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightInstance {
    pub tag: String,
    pub flags: u32,
    pub light: TagRef,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub tag: String,
    pub flags: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light: Option<LightInstance>,
    pub location: Vec3,
    pub radius: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbientLight {
    pub tag: String,
    pub flags: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light: Option<LightInstance>,
    /// Region numbers
    pub regions: Vec<u32>,
}
