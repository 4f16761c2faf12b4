//! Texture and material records: 0x03, 0x04, 0x05, 0x30, 0x31

use super::{
    CODE_BM_INFO, CODE_MATERIAL_DEF, CODE_MATERIAL_PALETTE, CODE_SIMPLE_SPRITE,
    CODE_SIMPLE_SPRITE_DEF, FragmentCodec, read_if, read_refs, write_refs,
};
use crate::cursor::{WldReader, WldWriter};
use crate::error::{Result, WldError};

// =============================================================================
// 0x03 BMInfo
// =============================================================================

/// List of bitmap file names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BmInfo {
    pub name_ref: i32,
    /// Plain file name bytes, normally NUL-terminated
    pub files: Vec<Vec<u8>>,
}

impl BmInfo {
    /// Build from file names, adding the NUL terminator each entry carries on disk
    pub fn from_names<S: AsRef<str>>(name_ref: i32, names: &[S]) -> Self {
        let files = names
            .iter()
            .map(|name| {
                let mut bytes = name.as_ref().as_bytes().to_vec();
                bytes.push(0);
                bytes
            })
            .collect();
        Self { name_ref, files }
    }

    /// File names with terminators removed
    ///
    /// Fails unless every entry is UTF-8 text followed by a single NUL, the
    /// only shape [`BmInfo::from_names`] writes back.
    pub fn file_names(&self) -> Result<Vec<String>> {
        self.files
            .iter()
            .map(|bytes| {
                let text = bytes
                    .strip_suffix(&[0])
                    .filter(|text| !text.contains(&0))
                    .and_then(|text| std::str::from_utf8(text).ok());
                text.map(str::to_owned).ok_or(WldError::InvalidText {
                    field: "bitmap file name",
                })
            })
            .collect()
    }
}

impl FragmentCodec for BmInfo {
    const CODE: u32 = CODE_BM_INFO;

    fn read(reader: &mut WldReader<'_>) -> Result<Self> {
        let name_ref = reader.read_i32()?;
        // Stored as count - 1
        let count = i64::from(reader.read_i32()?) + 1;
        let count = usize::try_from(count).map_err(|_| WldError::InconsistentLength {
            count: 0,
            element_size: 2,
            remaining: reader.remaining(),
        })?;
        let files = reader.read_vec(count, 2, |r| {
            let len = usize::from(r.read_u16()?);
            r.read_obfuscated(len)
        })?;
        reader.skip_padding()?;
        Ok(Self { name_ref, files })
    }

    fn write(&self, writer: &mut WldWriter) -> Result<()> {
        writer.write_i32(self.name_ref);
        writer.write_i32(self.files.len() as i32 - 1);
        for file in &self.files {
            writer.write_count_u16(file.len())?;
            writer.write_obfuscated(file);
        }
        writer.pad_to_4();
        Ok(())
    }

    fn name_ref(&self) -> i32 {
        self.name_ref
    }
}

// =============================================================================
// 0x04 SimpleSpriteDef
// =============================================================================

/// `current_frame` follows the frame count
pub const SPRITE_FLAG_HAS_CURRENT_FRAME: u32 = 0x04;
/// `sleep` follows the frame count
pub const SPRITE_FLAG_HAS_SLEEP: u32 = 0x08;
/// Set on every sprite written by the original tools
pub const SPRITE_FLAG_HAS_FRAMES: u32 = 0x10;
pub const SPRITE_FLAG_SKIP_FRAMES: u32 = 0x40;

/// Animated texture: an ordered list of BMInfo frames
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimpleSpriteDef {
    pub name_ref: i32,
    pub flags: u32,
    pub current_frame: Option<i32>,
    pub sleep: Option<u32>,
    /// BMInfo positions, one per frame
    pub frames: Vec<u32>,
}

impl FragmentCodec for SimpleSpriteDef {
    const CODE: u32 = CODE_SIMPLE_SPRITE_DEF;

    fn read(reader: &mut WldReader<'_>) -> Result<Self> {
        let name_ref = reader.read_i32()?;
        let flags = reader.read_u32()?;
        let frame_count = reader.read_u32()? as usize;
        let current_frame = read_if(reader, flags, SPRITE_FLAG_HAS_CURRENT_FRAME, |r| {
            r.read_i32()
        })?;
        let sleep = read_if(reader, flags, SPRITE_FLAG_HAS_SLEEP, |r| r.read_u32())?;
        let frames = reader.read_vec(frame_count, 4, |r| r.read_u32())?;
        Ok(Self {
            name_ref,
            flags,
            current_frame,
            sleep,
            frames,
        })
    }

    fn write(&self, writer: &mut WldWriter) -> Result<()> {
        writer.write_i32(self.name_ref);
        writer.write_u32(self.flags);
        writer.write_count(self.frames.len())?;
        if self.flags & SPRITE_FLAG_HAS_CURRENT_FRAME != 0 {
            writer.write_i32(self.current_frame.unwrap_or_default());
        }
        if self.flags & SPRITE_FLAG_HAS_SLEEP != 0 {
            writer.write_u32(self.sleep.unwrap_or_default());
        }
        for &frame in &self.frames {
            writer.write_u32(frame);
        }
        Ok(())
    }

    fn name_ref(&self) -> i32 {
        self.name_ref
    }
}

// =============================================================================
// 0x05 SimpleSprite
// =============================================================================

/// Instance of a SimpleSpriteDef, referenced by materials
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimpleSprite {
    pub name_ref: i32,
    pub sprite_ref: u32,
    pub flags: u32,
}

impl FragmentCodec for SimpleSprite {
    const CODE: u32 = CODE_SIMPLE_SPRITE;

    fn read(reader: &mut WldReader<'_>) -> Result<Self> {
        Ok(Self {
            name_ref: reader.read_i32()?,
            sprite_ref: reader.read_u32()?,
            flags: reader.read_u32()?,
        })
    }

    fn write(&self, writer: &mut WldWriter) -> Result<()> {
        writer.write_i32(self.name_ref);
        writer.write_u32(self.sprite_ref);
        writer.write_u32(self.flags);
        Ok(())
    }

    fn name_ref(&self) -> i32 {
        self.name_ref
    }
}

// =============================================================================
// 0x30 MaterialDef
// =============================================================================

/// Two trailing pair fields follow the sprite reference
pub const MATERIAL_FLAG_HAS_PAIRS: u32 = 0x02;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialDef {
    pub name_ref: i32,
    pub flags: u32,
    pub render_method: u32,
    pub rgb_pen: u32,
    pub brightness: f32,
    pub scaled_ambient: f32,
    /// SimpleSprite position, 0 when untextured
    pub simple_sprite_ref: u32,
    pub pairs: Option<(u32, f32)>,
}

impl FragmentCodec for MaterialDef {
    const CODE: u32 = CODE_MATERIAL_DEF;

    fn read(reader: &mut WldReader<'_>) -> Result<Self> {
        let name_ref = reader.read_i32()?;
        let flags = reader.read_u32()?;
        let render_method = reader.read_u32()?;
        let rgb_pen = reader.read_u32()?;
        let brightness = reader.read_f32()?;
        let scaled_ambient = reader.read_f32()?;
        let simple_sprite_ref = reader.read_u32()?;
        let pairs = read_if(reader, flags, MATERIAL_FLAG_HAS_PAIRS, |r| {
            Ok((r.read_u32()?, r.read_f32()?))
        })?;
        Ok(Self {
            name_ref,
            flags,
            render_method,
            rgb_pen,
            brightness,
            scaled_ambient,
            simple_sprite_ref,
            pairs,
        })
    }

    fn write(&self, writer: &mut WldWriter) -> Result<()> {
        writer.write_i32(self.name_ref);
        writer.write_u32(self.flags);
        writer.write_u32(self.render_method);
        writer.write_u32(self.rgb_pen);
        writer.write_f32(self.brightness);
        writer.write_f32(self.scaled_ambient);
        writer.write_u32(self.simple_sprite_ref);
        if self.flags & MATERIAL_FLAG_HAS_PAIRS != 0 {
            let (a, b) = self.pairs.unwrap_or_default();
            writer.write_u32(a);
            writer.write_f32(b);
        }
        Ok(())
    }

    fn name_ref(&self) -> i32 {
        self.name_ref
    }
}

// =============================================================================
// 0x31 MaterialPalette
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialPalette {
    pub name_ref: i32,
    pub flags: u32,
    /// MaterialDef positions
    pub materials: Vec<u32>,
}

impl FragmentCodec for MaterialPalette {
    const CODE: u32 = CODE_MATERIAL_PALETTE;

    fn read(reader: &mut WldReader<'_>) -> Result<Self> {
        Ok(Self {
            name_ref: reader.read_i32()?,
            flags: reader.read_u32()?,
            materials: read_refs(reader)?,
        })
    }

    fn write(&self, writer: &mut WldWriter) -> Result<()> {
        writer.write_i32(self.name_ref);
        writer.write_u32(self.flags);
        write_refs(writer, &self.materials)
    }

    fn name_ref(&self) -> i32 {
        self.name_ref
    }
}
