//! Fragment record codecs
//!
//! Every fragment kind is a plain struct implementing [`FragmentCodec`]. The
//! [`Fragment`] enum wraps them so a container can hold a mixed sequence of
//! records, and [`FragmentRegistry`] maps an on-disk type code to the matching
//! decoder.
//!
//! Codecs read and write the payload that follows the record envelope
//! (`size`, `code`); the first field of almost every payload is the record's
//! own name reference.

use crate::cursor::{WldReader, WldWriter};
use crate::error::Result;

pub mod actor;
pub mod light;
pub mod material;
pub mod mesh;
mod registry;
pub mod track;
pub mod world;


pub use actor::{Actor, ActorAction, ActorDef, Location, Sphere};
pub use light::{AmbientLight, GlobalAmbientLightDef, Light, LightDef, PointLight};
pub use material::{BmInfo, MaterialDef, MaterialPalette, SimpleSprite, SimpleSpriteDef};
pub use mesh::{DmSprite, DmSpriteDef2, MeshFace, MeshOp, MeshUvs};
pub use registry::{FRAGMENT_NAMES, FragmentRegistry, RegistryEntry, fragment_name};
pub use track::{Track, TrackDef, TrackFrame};
pub use world::{Obstacle, Region, VisList, VisNode, Wall, WorldTree, WorldTreeNode, Zone};

// =============================================================================
// Type codes
// =============================================================================

pub const CODE_BM_INFO: u32 = 0x03;
pub const CODE_SIMPLE_SPRITE_DEF: u32 = 0x04;
pub const CODE_SIMPLE_SPRITE: u32 = 0x05;
pub const CODE_TRACK_DEF: u32 = 0x12;
pub const CODE_TRACK: u32 = 0x13;
pub const CODE_ACTOR_DEF: u32 = 0x14;
pub const CODE_ACTOR: u32 = 0x15;
pub const CODE_SPHERE: u32 = 0x16;
pub const CODE_LIGHT_DEF: u32 = 0x1B;
pub const CODE_LIGHT: u32 = 0x1C;
pub const CODE_WORLD_TREE: u32 = 0x21;
pub const CODE_REGION: u32 = 0x22;
pub const CODE_POINT_LIGHT: u32 = 0x28;
pub const CODE_ZONE: u32 = 0x29;
pub const CODE_AMBIENT_LIGHT: u32 = 0x2A;
pub const CODE_DM_SPRITE: u32 = 0x2D;
pub const CODE_MATERIAL_DEF: u32 = 0x30;
pub const CODE_MATERIAL_PALETTE: u32 = 0x31;
pub const CODE_GLOBAL_AMBIENT_LIGHT_DEF: u32 = 0x35;
pub const CODE_DM_SPRITE_DEF2: u32 = 0x36;

// =============================================================================
// Codec contract
// =============================================================================

/// Binary layout of one fragment kind
pub trait FragmentCodec: Sized {
    /// On-disk type code
    const CODE: u32;

    /// Decode a payload, consuming fields in declaration order
    fn read(reader: &mut WldReader<'_>) -> Result<Self>;

    /// Encode a payload; the output must decode back to `self`
    fn write(&self, writer: &mut WldWriter) -> Result<()>;

    /// Name-pool reference of this record (0 when unnamed)
    fn name_ref(&self) -> i32;
}

/// Payload of a registered kind that has no typed codec
///
/// The body is kept verbatim, so the record round-trips byte-exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct Opaque {
    pub code: u32,
    pub body: Vec<u8>,
}

impl Opaque {
    /// Name reference, if the body is long enough to carry one
    pub fn name_ref(&self) -> i32 {
        self.body
            .get(..4)
            .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .unwrap_or(0)
    }
}

/// One decoded fragment record
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    BmInfo(BmInfo),
    SimpleSpriteDef(SimpleSpriteDef),
    SimpleSprite(SimpleSprite),
    TrackDef(TrackDef),
    Track(Track),
    ActorDef(ActorDef),
    Actor(Actor),
    Sphere(Sphere),
    LightDef(LightDef),
    Light(Light),
    WorldTree(WorldTree),
    Region(Region),
    PointLight(PointLight),
    Zone(Zone),
    AmbientLight(AmbientLight),
    DmSprite(DmSprite),
    MaterialDef(MaterialDef),
    MaterialPalette(MaterialPalette),
    GlobalAmbientLightDef(GlobalAmbientLightDef),
    DmSpriteDef2(DmSpriteDef2),
    Opaque(Opaque),
}

/// Dispatch `$body` to the payload struct of every typed variant
macro_rules! each_typed {
    ($fragment:expr, $inner:ident => $body:expr, $opaque:ident => $fallback:expr) => {
        match $fragment {
            Fragment::BmInfo($inner) => $body,
            Fragment::SimpleSpriteDef($inner) => $body,
            Fragment::SimpleSprite($inner) => $body,
            Fragment::TrackDef($inner) => $body,
            Fragment::Track($inner) => $body,
            Fragment::ActorDef($inner) => $body,
            Fragment::Actor($inner) => $body,
            Fragment::Sphere($inner) => $body,
            Fragment::LightDef($inner) => $body,
            Fragment::Light($inner) => $body,
            Fragment::WorldTree($inner) => $body,
            Fragment::Region($inner) => $body,
            Fragment::PointLight($inner) => $body,
            Fragment::Zone($inner) => $body,
            Fragment::AmbientLight($inner) => $body,
            Fragment::DmSprite($inner) => $body,
            Fragment::MaterialDef($inner) => $body,
            Fragment::MaterialPalette($inner) => $body,
            Fragment::GlobalAmbientLightDef($inner) => $body,
            Fragment::DmSpriteDef2($inner) => $body,
            Fragment::Opaque($opaque) => $fallback,
        }
    };
}

impl Fragment {
    /// On-disk type code
    pub fn code(&self) -> u32 {
        fn code_of<T: FragmentCodec>(_: &T) -> u32 {
            T::CODE
        }
        each_typed!(self, f => code_of(f), o => o.code)
    }

    /// Human-readable kind name
    pub fn kind_name(&self) -> &'static str {
        fragment_name(self.code()).unwrap_or("Unknown")
    }

    /// Name-pool reference of this record
    pub fn name_ref(&self) -> i32 {
        each_typed!(self, f => f.name_ref(), o => o.name_ref())
    }

    /// Encode the payload
    pub fn write(&self, writer: &mut WldWriter) -> Result<()> {
        each_typed!(self, f => f.write(writer), o => {
            writer.write_bytes(&o.body);
            Ok(())
        })
    }

    /// Encode the payload into a fresh buffer
    pub fn to_payload(&self, is_new_world: bool) -> Result<Vec<u8>> {
        let mut writer = WldWriter::new(is_new_world);
        self.write(&mut writer)?;
        Ok(writer.into_bytes())
    }
}

macro_rules! impl_from_payload {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for Fragment {
                fn from(value: $ty) -> Self {
                    Fragment::$ty(value)
                }
            }
        )*
    };
}

impl_from_payload!(
    BmInfo,
    SimpleSpriteDef,
    SimpleSprite,
    TrackDef,
    Track,
    ActorDef,
    Actor,
    Sphere,
    LightDef,
    Light,
    WorldTree,
    Region,
    PointLight,
    Zone,
    AmbientLight,
    DmSprite,
    MaterialDef,
    MaterialPalette,
    GlobalAmbientLightDef,
    DmSpriteDef2,
    Opaque,
);

// =============================================================================
// Shared field helpers
// =============================================================================

/// Whether all bits of `bit` are set in `flags`
#[inline]
pub(crate) fn has_flag(flags: u32, bit: u32) -> bool {
    flags & bit == bit
}

/// Read a field only when its gating flag bit is set
pub(crate) fn read_if<T>(
    reader: &mut WldReader<'_>,
    flags: u32,
    bit: u32,
    read: impl FnOnce(&mut WldReader<'_>) -> Result<T>,
) -> Result<Option<T>> {
    if has_flag(flags, bit) {
        read(reader).map(Some)
    } else {
        Ok(None)
    }
}

/// u32 reference list prefixed by a u32 count
pub(crate) fn read_refs(reader: &mut WldReader<'_>) -> Result<Vec<u32>> {
    let count = reader.read_count(4)?;
    reader.read_vec(count, 4, |r| r.read_u32())
}

pub(crate) fn write_refs(writer: &mut WldWriter, refs: &[u32]) -> Result<()> {
    writer.write_count(refs.len())?;
    for &r in refs {
        writer.write_u32(r);
    }
    Ok(())
}
