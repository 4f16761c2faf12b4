//! Immutable type-code registry
//!
//! Built once and shared by reference; nothing mutates it after construction.

use hashbrown::HashMap;

use super::{
    Actor, ActorDef, AmbientLight, BmInfo, DmSprite, DmSpriteDef2, Fragment, FragmentCodec,
    GlobalAmbientLightDef, Light, LightDef, MaterialDef, MaterialPalette, Opaque, PointLight,
    Region, SimpleSprite, SimpleSpriteDef, Sphere, Track, TrackDef, WorldTree, Zone,
};
use crate::cursor::WldReader;
use crate::error::{Result, WldError};

/// Kind names for every code the format defines, indexed by code
pub const FRAGMENT_NAMES: [&str; 0x38] = [
    "Default",
    "DefaultPaletteFile",
    "UserData",
    "BMInfo",
    "SimpleSpriteDef",
    "SimpleSprite",
    "Sprite2DDef",
    "Sprite2D",
    "Sprite3DDef",
    "Sprite3D",
    "Sprite4DDef",
    "Sprite4D",
    "ParticleSpriteDef",
    "ParticleSprite",
    "CompositeSpriteDef",
    "CompositeSprite",
    "HierarchialSpriteDef",
    "HierarchialSprite",
    "TrackDef",
    "Track",
    "ActorDef",
    "Actor",
    "Sphere",
    "PolyhedronDef",
    "Polyhedron",
    "SphereListDef",
    "SphereList",
    "LightDef",
    "Light",
    "PointLightOld",
    "PointLightOldDef",
    "Sound",
    "SoundDef",
    "WorldTree",
    "Region",
    "ActiveGeoRegion",
    "SkyRegion",
    "DirectionalLightOld",
    "BlitSpriteDef",
    "BlitSprite",
    "PointLight",
    "Zone",
    "AmbientLight",
    "DirectionalLight",
    "DMSpriteDef",
    "DMSprite",
    "DMTrackDef",
    "DMTrack",
    "MaterialDef",
    "MaterialPalette",
    "DmRGBTrackDef",
    "DmRGBTrack",
    "ParticleCloudDef",
    "GlobalAmbientLightDef",
    "DmSpriteDef2",
    "DmTrackDef2",
];

/// Kind name for a type code, if the format defines it
pub fn fragment_name(code: u32) -> Option<&'static str> {
    FRAGMENT_NAMES.get(code as usize).copied()
}

type DecodeFn = fn(&mut WldReader<'_>) -> Result<Fragment>;

fn decode_as<T>(reader: &mut WldReader<'_>) -> Result<Fragment>
where
    T: FragmentCodec + Into<Fragment>,
{
    T::read(reader).map(Into::into)
}

/// One registered type code
#[derive(Debug, Clone, Copy)]
pub struct RegistryEntry {
    pub code: u32,
    pub name: &'static str,
    decode: Option<DecodeFn>,
}

impl RegistryEntry {
    /// Whether the kind has a typed codec (otherwise it is kept opaque)
    pub fn is_typed(&self) -> bool {
        self.decode.is_some()
    }
}

/// Mapping from type code to kind name and decoder
#[derive(Debug, Clone)]
pub struct FragmentRegistry {
    entries: HashMap<u32, RegistryEntry>,
}

impl Default for FragmentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FragmentRegistry {
    /// Registry of every defined code, with typed codecs where implemented
    pub fn new() -> Self {
        let typed: [(u32, DecodeFn); 20] = [
            (BmInfo::CODE, decode_as::<BmInfo>),
            (SimpleSpriteDef::CODE, decode_as::<SimpleSpriteDef>),
            (SimpleSprite::CODE, decode_as::<SimpleSprite>),
            (TrackDef::CODE, decode_as::<TrackDef>),
            (Track::CODE, decode_as::<Track>),
            (ActorDef::CODE, decode_as::<ActorDef>),
            (Actor::CODE, decode_as::<Actor>),
            (Sphere::CODE, decode_as::<Sphere>),
            (LightDef::CODE, decode_as::<LightDef>),
            (Light::CODE, decode_as::<Light>),
            (WorldTree::CODE, decode_as::<WorldTree>),
            (Region::CODE, decode_as::<Region>),
            (PointLight::CODE, decode_as::<PointLight>),
            (Zone::CODE, decode_as::<Zone>),
            (AmbientLight::CODE, decode_as::<AmbientLight>),
            (DmSprite::CODE, decode_as::<DmSprite>),
            (MaterialDef::CODE, decode_as::<MaterialDef>),
            (MaterialPalette::CODE, decode_as::<MaterialPalette>),
            (GlobalAmbientLightDef::CODE, decode_as::<GlobalAmbientLightDef>),
            (DmSpriteDef2::CODE, decode_as::<DmSpriteDef2>),
        ];

        let mut entries: HashMap<u32, RegistryEntry> = FRAGMENT_NAMES
            .iter()
            .enumerate()
            .map(|(code, &name)| {
                let code = code as u32;
                (
                    code,
                    RegistryEntry {
                        code,
                        name,
                        decode: None,
                    },
                )
            })
            .collect();
        for (code, decode) in typed {
            if let Some(entry) = entries.get_mut(&code) {
                entry.decode = Some(decode);
            }
        }

        Self { entries }
    }

    pub fn get(&self, code: u32) -> Option<&RegistryEntry> {
        self.entries.get(&code)
    }

    /// Kind name for a registered code
    pub fn name(&self, code: u32) -> Option<&'static str> {
        self.entries.get(&code).map(|entry| entry.name)
    }

    /// Decode one payload with the codec registered for `code`.
    ///
    /// Registered codes without a typed codec keep the whole payload opaque.
    pub fn dispatch(&self, code: u32, reader: &mut WldReader<'_>) -> Result<Fragment> {
        let entry = self
            .entries
            .get(&code)
            .ok_or(WldError::UnknownFragmentCode(code))?;
        match entry.decode {
            Some(decode) => decode(reader),
            None => {
                let body = reader.read_bytes(reader.remaining())?.to_vec();
                Ok(Fragment::Opaque(Opaque { code, body }))
            }
        }
    }

    /// Registered entries ordered by code
    pub fn entries(&self) -> Vec<&RegistryEntry> {
        let mut entries: Vec<_> = self.entries.values().collect();
        entries.sort_by_key(|entry| entry.code);
        entries
    }
}
