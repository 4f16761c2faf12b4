//! Actor records: 0x14 ActorDef, 0x15 Actor, 0x16 Sphere

use serde::{Deserialize, Serialize};

use super::{CODE_ACTOR, CODE_ACTOR_DEF, CODE_SPHERE, FragmentCodec, read_if};
use crate::cursor::{WldReader, WldWriter};
use crate::error::Result;

pub const ACTOR_FLAG_HAS_CURRENT_ACTION: u32 = 0x01;
pub const ACTOR_FLAG_HAS_LOCATION: u32 = 0x02;
pub const ACTOR_FLAG_HAS_BOUNDING_RADIUS: u32 = 0x04;
pub const ACTOR_FLAG_HAS_SCALE: u32 = 0x08;
pub const ACTOR_FLAG_HAS_SOUND: u32 = 0x10;
pub const ACTOR_FLAG_ACTIVE: u32 = 0x20;
pub const ACTOR_FLAG_ACTIVE_GEOMETRY: u32 = 0x40;
pub const ACTOR_FLAG_SPRITE_VOLUME_ONLY: u32 = 0x80;
pub const ACTOR_FLAG_HAS_DM_RGB_TRACK: u32 = 0x100;
pub const ACTOR_FLAG_USES_BOUNDING_BOX: u32 = 0x200;

/// Offset and rotation block gated by [`ACTOR_FLAG_HAS_LOCATION`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub offset: [f32; 3],
    pub rotation: [f32; 3],
    pub unknown: u32,
}

impl Location {
    fn read(reader: &mut WldReader<'_>) -> Result<Self> {
        Ok(Self {
            offset: reader.read_f32x3()?,
            rotation: reader.read_f32x3()?,
            unknown: reader.read_u32()?,
        })
    }

    fn write(&self, writer: &mut WldWriter) {
        writer.write_f32s(&self.offset);
        writer.write_f32s(&self.rotation);
        writer.write_u32(self.unknown);
    }
}

/// Level-of-detail distances of one actor action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorAction {
    pub unknown: u32,
    pub lods: Vec<f32>,
}

// =============================================================================
// 0x14 ActorDef
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActorDef {
    pub name_ref: i32,
    pub flags: u32,
    pub callback_name_ref: i32,
    pub bounds_ref: i32,
    pub current_action: Option<u32>,
    pub location: Option<Location>,
    pub actions: Vec<ActorAction>,
    /// Sprite instance positions (DmSprite and friends)
    pub sprites: Vec<u32>,
    /// Plain user data text
    pub user_data: Vec<u8>,
}

impl FragmentCodec for ActorDef {
    const CODE: u32 = CODE_ACTOR_DEF;

    fn read(reader: &mut WldReader<'_>) -> Result<Self> {
        let name_ref = reader.read_i32()?;
        let flags = reader.read_u32()?;
        let callback_name_ref = reader.read_i32()?;
        let action_count = reader.read_u32()? as usize;
        let sprite_count = reader.read_u32()? as usize;
        let bounds_ref = reader.read_i32()?;
        let current_action = read_if(reader, flags, ACTOR_FLAG_HAS_CURRENT_ACTION, |r| {
            r.read_u32()
        })?;
        let location = read_if(reader, flags, ACTOR_FLAG_HAS_LOCATION, Location::read)?;
        let actions = reader.read_vec(action_count, 8, |r| {
            let lod_count = r.read_count(4)?;
            let unknown = r.read_u32()?;
            let lods = r.read_vec(lod_count, 4, |r| r.read_f32())?;
            Ok(ActorAction { unknown, lods })
        })?;
        let sprites = reader.read_vec(sprite_count, 4, |r| r.read_u32())?;
        let user_data_len = reader.read_u32()? as usize;
        let user_data = if user_data_len > 0 {
            let data = reader.read_obfuscated(user_data_len)?;
            reader.skip_padding()?;
            data
        } else {
            Vec::new()
        };
        Ok(Self {
            name_ref,
            flags,
            callback_name_ref,
            bounds_ref,
            current_action,
            location,
            actions,
            sprites,
            user_data,
        })
    }

    fn write(&self, writer: &mut WldWriter) -> Result<()> {
        writer.write_i32(self.name_ref);
        writer.write_u32(self.flags);
        writer.write_i32(self.callback_name_ref);
        writer.write_count(self.actions.len())?;
        writer.write_count(self.sprites.len())?;
        writer.write_i32(self.bounds_ref);
        if self.flags & ACTOR_FLAG_HAS_CURRENT_ACTION != 0 {
            writer.write_u32(self.current_action.unwrap_or_default());
        }
        if self.flags & ACTOR_FLAG_HAS_LOCATION != 0 {
            self.location.unwrap_or_default().write(writer);
        }
        for action in &self.actions {
            writer.write_count(action.lods.len())?;
            writer.write_u32(action.unknown);
            writer.write_f32s(&action.lods);
        }
        for &sprite in &self.sprites {
            writer.write_u32(sprite);
        }
        writer.write_count(self.user_data.len())?;
        if !self.user_data.is_empty() {
            writer.write_obfuscated(&self.user_data);
            writer.pad_to_4();
        }
        Ok(())
    }

    fn name_ref(&self) -> i32 {
        self.name_ref
    }
}

// =============================================================================
// 0x15 Actor
// =============================================================================

/// Placed actor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Actor {
    pub name_ref: i32,
    /// Negative: name-pool tag of the definition; positive: its position
    pub actor_def_ref: i32,
    pub flags: u32,
    /// Sphere position, 0 when absent
    pub sphere_ref: u32,
    pub current_action: Option<u32>,
    pub location: Option<Location>,
    pub bounding_radius: Option<f32>,
    pub scale: Option<f32>,
    pub sound_name_ref: Option<i32>,
    pub dm_rgb_track_ref: i32,
}

impl FragmentCodec for Actor {
    const CODE: u32 = CODE_ACTOR;

    fn read(reader: &mut WldReader<'_>) -> Result<Self> {
        let name_ref = reader.read_i32()?;
        let actor_def_ref = reader.read_i32()?;
        let flags = reader.read_u32()?;
        let sphere_ref = reader.read_u32()?;
        let current_action = read_if(reader, flags, ACTOR_FLAG_HAS_CURRENT_ACTION, |r| {
            r.read_u32()
        })?;
        let location = read_if(reader, flags, ACTOR_FLAG_HAS_LOCATION, Location::read)?;
        let bounding_radius =
            read_if(reader, flags, ACTOR_FLAG_HAS_BOUNDING_RADIUS, |r| r.read_f32())?;
        let scale = read_if(reader, flags, ACTOR_FLAG_HAS_SCALE, |r| r.read_f32())?;
        let sound_name_ref = read_if(reader, flags, ACTOR_FLAG_HAS_SOUND, |r| r.read_i32())?;
        let dm_rgb_track_ref = reader.read_i32()?;
        Ok(Self {
            name_ref,
            actor_def_ref,
            flags,
            sphere_ref,
            current_action,
            location,
            bounding_radius,
            scale,
            sound_name_ref,
            dm_rgb_track_ref,
        })
    }

    fn write(&self, writer: &mut WldWriter) -> Result<()> {
        writer.write_i32(self.name_ref);
        writer.write_i32(self.actor_def_ref);
        writer.write_u32(self.flags);
        writer.write_u32(self.sphere_ref);
        if self.flags & ACTOR_FLAG_HAS_CURRENT_ACTION != 0 {
            writer.write_u32(self.current_action.unwrap_or_default());
        }
        if self.flags & ACTOR_FLAG_HAS_LOCATION != 0 {
            self.location.unwrap_or_default().write(writer);
        }
        if self.flags & ACTOR_FLAG_HAS_BOUNDING_RADIUS != 0 {
            writer.write_f32(self.bounding_radius.unwrap_or_default());
        }
        if self.flags & ACTOR_FLAG_HAS_SCALE != 0 {
            writer.write_f32(self.scale.unwrap_or_default());
        }
        if self.flags & ACTOR_FLAG_HAS_SOUND != 0 {
            writer.write_i32(self.sound_name_ref.unwrap_or_default());
        }
        writer.write_i32(self.dm_rgb_track_ref);
        Ok(())
    }

    fn name_ref(&self) -> i32 {
        self.name_ref
    }
}

// =============================================================================
// 0x16 Sphere
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sphere {
    pub name_ref: i32,
    pub radius: f32,
}

impl FragmentCodec for Sphere {
    const CODE: u32 = CODE_SPHERE;

    fn read(reader: &mut WldReader<'_>) -> Result<Self> {
        Ok(Self {
            name_ref: reader.read_i32()?,
            radius: reader.read_f32()?,
        })
    }

    fn write(&self, writer: &mut WldWriter) -> Result<()> {
        writer.write_i32(self.name_ref);
        writer.write_f32(self.radius);
        Ok(())
    }

    fn name_ref(&self) -> i32 {
        self.name_ref
    }
}
