//! Skeletal animation records: 0x12 TrackDef and its 0x13 instance

use serde::{Deserialize, Serialize};

use super::{CODE_TRACK, CODE_TRACK_DEF, FragmentCodec, read_if};
use crate::cursor::{WldReader, WldWriter};
use crate::error::{Result, WldError};

/// Frames are stored as eight i8 values instead of eight i16 values
pub const TRACK_DEF_FLAG_COMPACT: u32 = 0x08;

pub const TRACK_FLAG_HAS_SLEEP: u32 = 0x01;
pub const TRACK_FLAG_REVERSE: u32 = 0x02;
pub const TRACK_FLAG_INTERPOLATE: u32 = 0x04;

/// One bone transform keyframe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackFrame {
    pub rotate_denominator: i16,
    pub rotation: [i16; 3],
    pub shift_denominator: i16,
    pub shift: [i16; 3],
}

impl TrackFrame {
    fn read_compact(reader: &mut WldReader<'_>) -> Result<Self> {
        let mut v = [0i16; 8];
        for slot in &mut v {
            *slot = i16::from(reader.read_i8()?);
        }
        Ok(Self {
            rotate_denominator: v[0],
            rotation: [v[1], v[2], v[3]],
            shift_denominator: v[4],
            shift: [v[5], v[6], v[7]],
        })
    }

    fn read_wide(reader: &mut WldReader<'_>) -> Result<Self> {
        let mut v = [0i16; 8];
        for slot in &mut v {
            *slot = reader.read_i16()?;
        }
        Ok(Self {
            shift_denominator: v[0],
            shift: [v[1], v[2], v[3]],
            rotation: [v[4], v[5], v[6]],
            rotate_denominator: v[7],
        })
    }

    fn write_compact(&self, writer: &mut WldWriter) -> Result<()> {
        let values = [
            self.rotate_denominator,
            self.rotation[0],
            self.rotation[1],
            self.rotation[2],
            self.shift_denominator,
            self.shift[0],
            self.shift[1],
            self.shift[2],
        ];
        for value in values {
            let value = i8::try_from(value).map_err(|_| WldError::ValueOutOfRange {
                field: "compact track frame",
                value: i64::from(value),
            })?;
            writer.write_i8(value);
        }
        Ok(())
    }

    fn write_wide(&self, writer: &mut WldWriter) {
        writer.write_i16(self.shift_denominator);
        for &c in &self.shift {
            writer.write_i16(c);
        }
        for &c in &self.rotation {
            writer.write_i16(c);
        }
        writer.write_i16(self.rotate_denominator);
    }

    /// Whether every component fits the compact i8 layout
    pub fn fits_compact(&self) -> bool {
        let fits = |v: i16| i8::try_from(v).is_ok();
        fits(self.rotate_denominator)
            && fits(self.shift_denominator)
            && self.rotation.iter().all(|&v| fits(v))
            && self.shift.iter().all(|&v| fits(v))
    }
}

// =============================================================================
// 0x12 TrackDef
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackDef {
    pub name_ref: i32,
    pub flags: u32,
    pub frames: Vec<TrackFrame>,
}

impl FragmentCodec for TrackDef {
    const CODE: u32 = CODE_TRACK_DEF;

    fn read(reader: &mut WldReader<'_>) -> Result<Self> {
        let name_ref = reader.read_i32()?;
        let flags = reader.read_u32()?;
        let frames = if flags & TRACK_DEF_FLAG_COMPACT != 0 {
            let count = reader.read_count(8)?;
            reader.read_vec(count, 8, TrackFrame::read_compact)?
        } else {
            let count = reader.read_count(16)?;
            reader.read_vec(count, 16, TrackFrame::read_wide)?
        };
        Ok(Self {
            name_ref,
            flags,
            frames,
        })
    }

    fn write(&self, writer: &mut WldWriter) -> Result<()> {
        writer.write_i32(self.name_ref);
        writer.write_u32(self.flags);
        writer.write_count(self.frames.len())?;
        for frame in &self.frames {
            if self.flags & TRACK_DEF_FLAG_COMPACT != 0 {
                frame.write_compact(writer)?;
            } else {
                frame.write_wide(writer);
            }
        }
        Ok(())
    }

    fn name_ref(&self) -> i32 {
        self.name_ref
    }
}

// =============================================================================
// 0x13 Track
// =============================================================================

/// Instance of a TrackDef with playback settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub name_ref: i32,
    pub track_def_ref: i32,
    pub flags: u32,
    pub sleep: Option<u32>,
}

impl FragmentCodec for Track {
    const CODE: u32 = CODE_TRACK;

    fn read(reader: &mut WldReader<'_>) -> Result<Self> {
        let name_ref = reader.read_i32()?;
        let track_def_ref = reader.read_i32()?;
        let flags = reader.read_u32()?;
        let sleep = read_if(reader, flags, TRACK_FLAG_HAS_SLEEP, |r| r.read_u32())?;
        Ok(Self {
            name_ref,
            track_def_ref,
            flags,
            sleep,
        })
    }

    fn write(&self, writer: &mut WldWriter) -> Result<()> {
        writer.write_i32(self.name_ref);
        writer.write_i32(self.track_def_ref);
        writer.write_u32(self.flags);
        if self.flags & TRACK_FLAG_HAS_SLEEP != 0 {
            writer.write_u32(self.sleep.unwrap_or_default());
        }
        Ok(())
    }

    fn name_ref(&self) -> i32 {
        self.name_ref
    }
}
