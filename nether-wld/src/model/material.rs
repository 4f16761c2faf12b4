use serde::{Deserialize, Serialize};

use super::TagRef;

/// One animation frame of a sprite: a folded bitmap list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteFrame {
    pub tag: String,
    pub files: Vec<String>,
}

/// Animated texture
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpriteDef {
    pub tag: String,
    pub flags: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_frame: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep: Option<u32>,
    pub frames: Vec<SpriteFrame>,
}

/// Sprite instance owned by one material
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteInstance {
    pub tag: String,
    pub flags: u32,
    pub sprite: TagRef,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub tag: String,
    pub flags: u32,
    pub render_method: u32,
    pub rgb_pen: u32,
    pub brightness: f32,
    pub scaled_ambient: f32,
    /// Texture, absent on untextured materials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite: Option<SpriteInstance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairs: Option<(u32, f32)>,
}

/// Ordered material list used by meshes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub tag: String,
    pub flags: u32,
    pub materials: Vec<TagRef>,
}
