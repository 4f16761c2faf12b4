//! Light records: 0x1B LightDef, 0x1C Light, 0x28 PointLight, 0x2A AmbientLight,
//! 0x35 GlobalAmbientLightDef

use super::{
    CODE_AMBIENT_LIGHT, CODE_GLOBAL_AMBIENT_LIGHT_DEF, CODE_LIGHT, CODE_LIGHT_DEF,
    CODE_POINT_LIGHT, FragmentCodec, read_if, read_refs, write_refs,
};
use crate::cursor::{WldReader, WldWriter};
use crate::error::{Result, WldError};

pub const LIGHT_FLAG_HAS_CURRENT_FRAME: u32 = 0x01;
pub const LIGHT_FLAG_HAS_SLEEP: u32 = 0x02;
pub const LIGHT_FLAG_HAS_LEVELS: u32 = 0x04;
pub const LIGHT_FLAG_SKIP_FRAMES: u32 = 0x08;
pub const LIGHT_FLAG_HAS_COLORS: u32 = 0x10;

pub const POINT_LIGHT_FLAG_STATIC: u32 = 0x20;
pub const POINT_LIGHT_FLAG_STATIC_INFLUENCE: u32 = 0x40;
pub const POINT_LIGHT_FLAG_HAS_REGIONS: u32 = 0x80;

// =============================================================================
// 0x1B LightDef
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightDef {
    pub name_ref: i32,
    pub flags: u32,
    pub frame_count: u32,
    pub current_frame: Option<u32>,
    pub sleep: Option<u32>,
    /// One level per frame
    pub levels: Option<Vec<f32>>,
    /// One RGB colour per frame
    pub colors: Option<Vec<[f32; 3]>>,
}

impl FragmentCodec for LightDef {
    const CODE: u32 = CODE_LIGHT_DEF;

    fn read(reader: &mut WldReader<'_>) -> Result<Self> {
        let name_ref = reader.read_i32()?;
        let flags = reader.read_u32()?;
        let frame_count = reader.read_u32()?;
        let frames = frame_count as usize;
        let current_frame = read_if(reader, flags, LIGHT_FLAG_HAS_CURRENT_FRAME, |r| {
            r.read_u32()
        })?;
        let sleep = read_if(reader, flags, LIGHT_FLAG_HAS_SLEEP, |r| r.read_u32())?;
        let levels = read_if(reader, flags, LIGHT_FLAG_HAS_LEVELS, |r| {
            r.read_vec(frames, 4, |r| r.read_f32())
        })?;
        let colors = read_if(reader, flags, LIGHT_FLAG_HAS_COLORS, |r| {
            r.read_vec(frames, 12, |r| r.read_f32x3())
        })?;
        Ok(Self {
            name_ref,
            flags,
            frame_count,
            current_frame,
            sleep,
            levels,
            colors,
        })
    }

    fn write(&self, writer: &mut WldWriter) -> Result<()> {
        let frames = self.frame_count as usize;
        let mismatch = |len: usize| WldError::InconsistentLength {
            count: len,
            element_size: 4,
            remaining: frames * 4,
        };

        writer.write_i32(self.name_ref);
        writer.write_u32(self.flags);
        writer.write_u32(self.frame_count);
        if self.flags & LIGHT_FLAG_HAS_CURRENT_FRAME != 0 {
            writer.write_u32(self.current_frame.unwrap_or_default());
        }
        if self.flags & LIGHT_FLAG_HAS_SLEEP != 0 {
            writer.write_u32(self.sleep.unwrap_or_default());
        }
        if self.flags & LIGHT_FLAG_HAS_LEVELS != 0 {
            let levels = self.levels.as_deref().unwrap_or_default();
            if levels.len() != frames {
                return Err(mismatch(levels.len()));
            }
            writer.write_f32s(levels);
        }
        if self.flags & LIGHT_FLAG_HAS_COLORS != 0 {
            let colors = self.colors.as_deref().unwrap_or_default();
            if colors.len() != frames {
                return Err(mismatch(colors.len()));
            }
            for color in colors {
                writer.write_f32s(color);
            }
        }
        Ok(())
    }

    fn name_ref(&self) -> i32 {
        self.name_ref
    }
}

// =============================================================================
// 0x1C Light
// =============================================================================

/// Instance of a LightDef, referenced by point and ambient lights
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Light {
    pub name_ref: i32,
    pub light_def_ref: i32,
    pub flags: u32,
}

impl FragmentCodec for Light {
    const CODE: u32 = CODE_LIGHT;

    fn read(reader: &mut WldReader<'_>) -> Result<Self> {
        Ok(Self {
            name_ref: reader.read_i32()?,
            light_def_ref: reader.read_i32()?,
            flags: reader.read_u32()?,
        })
    }

    fn write(&self, writer: &mut WldWriter) -> Result<()> {
        writer.write_i32(self.name_ref);
        writer.write_i32(self.light_def_ref);
        writer.write_u32(self.flags);
        Ok(())
    }

    fn name_ref(&self) -> i32 {
        self.name_ref
    }
}

// =============================================================================
// 0x28 PointLight
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointLight {
    pub name_ref: i32,
    /// Light instance position
    pub light_ref: i32,
    pub flags: u32,
    pub location: [f32; 3],
    pub radius: f32,
}

impl FragmentCodec for PointLight {
    const CODE: u32 = CODE_POINT_LIGHT;

    fn read(reader: &mut WldReader<'_>) -> Result<Self> {
        Ok(Self {
            name_ref: reader.read_i32()?,
            light_ref: reader.read_i32()?,
            flags: reader.read_u32()?,
            location: reader.read_f32x3()?,
            radius: reader.read_f32()?,
        })
    }

    fn write(&self, writer: &mut WldWriter) -> Result<()> {
        writer.write_i32(self.name_ref);
        writer.write_i32(self.light_ref);
        writer.write_u32(self.flags);
        writer.write_f32s(&self.location);
        writer.write_f32(self.radius);
        Ok(())
    }

    fn name_ref(&self) -> i32 {
        self.name_ref
    }
}

// =============================================================================
// 0x2A AmbientLight
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmbientLight {
    pub name_ref: i32,
    /// Light instance position
    pub light_ref: i32,
    pub flags: u32,
    /// Region numbers lit by this light
    pub regions: Vec<u32>,
}

impl FragmentCodec for AmbientLight {
    const CODE: u32 = CODE_AMBIENT_LIGHT;

    fn read(reader: &mut WldReader<'_>) -> Result<Self> {
        Ok(Self {
            name_ref: reader.read_i32()?,
            light_ref: reader.read_i32()?,
            flags: reader.read_u32()?,
            regions: read_refs(reader)?,
        })
    }

    fn write(&self, writer: &mut WldWriter) -> Result<()> {
        writer.write_i32(self.name_ref);
        writer.write_i32(self.light_ref);
        writer.write_u32(self.flags);
        write_refs(writer, &self.regions)
    }

    fn name_ref(&self) -> i32 {
        self.name_ref
    }
}

// =============================================================================
// 0x35 GlobalAmbientLightDef
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalAmbientLightDef {
    pub name_ref: i32,
    /// Blue, green, red, alpha
    pub color: [u8; 4],
}

impl FragmentCodec for GlobalAmbientLightDef {
    const CODE: u32 = CODE_GLOBAL_AMBIENT_LIGHT_DEF;

    fn read(reader: &mut WldReader<'_>) -> Result<Self> {
        let name_ref = reader.read_i32()?;
        let bytes = reader.read_bytes(4)?;
        Ok(Self {
            name_ref,
            color: [bytes[0], bytes[1], bytes[2], bytes[3]],
        })
    }

    fn write(&self, writer: &mut WldWriter) -> Result<()> {
        writer.write_i32(self.name_ref);
        writer.write_bytes(&self.color);
        Ok(())
    }

    fn name_ref(&self) -> i32 {
        self.name_ref
    }
}
