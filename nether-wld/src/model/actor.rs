use serde::{Deserialize, Serialize};

use super::TagRef;
use crate::decode::sequence::Sequence;
use crate::fragment::{ActorAction, Location, TrackFrame};

// =============================================================================
// Tracks
// =============================================================================

/// Skeletal keyframes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackDef {
    pub tag: String,
    pub flags: u32,
    pub frames: Vec<TrackFrame>,
    /// Recovered from the tag on decode; ignored on encode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<Sequence>,
}

/// Playback of a track definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackInstance {
    pub tag: String,
    pub track: TagRef,
    pub flags: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<Sequence>,
}

// =============================================================================
// Actors
// =============================================================================

/// One sprite slot of an actor definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorSprite {
    /// A folded mesh instance
    Mesh {
        tag: String,
        params: u32,
        mesh: TagRef,
    },
    /// Source position of a sprite kind outside the graph; does not encode
    Position(u32),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorDef {
    pub tag: String,
    pub flags: u32,
    #[serde(default)]
    pub callback: String,
    /// Source position of a bounds record outside the graph; encodes only as 0
    #[serde(default)]
    pub bounds_ref: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_action: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub actions: Vec<ActorAction>,
    pub sprites: Vec<ActorSprite>,
    #[serde(default)]
    pub user_data: Vec<u8>,
}

/// How an actor names its definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorDefRef {
    /// By name only; the definition may live in another container
    Name(String),
    /// A definition in this graph
    Def(TagRef),
}

/// Bounding sphere folded into an actor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SphereInstance {
    pub tag: String,
    pub radius: f32,
}

/// Placed actor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub tag: String,
    pub flags: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_def: Option<ActorDefRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sphere: Option<SphereInstance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_action: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_radius: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    /// Source position of a vertex colour track; encodes only as 0
    #[serde(default)]
    pub dm_rgb_track_ref: i32,
}
