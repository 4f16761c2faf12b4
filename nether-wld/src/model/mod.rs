//! Symbolic scene graph
//!
//! Entities live in one arena and refer to each other by [`TagRef`]: a tag plus
//! the occurrence index among entities of the same kind sharing that tag. The
//! index is derived from arena order, so it is never stored on the entity
//! itself. Positions only exist in the binary container.
//!
//! Instance records (bitmap lists, sprite/mesh/light instances, spheres) are
//! not entities. They are folded into the entity that uses them.

use std::fmt;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

mod actor;
mod light;
mod material;
mod mesh;
mod world;

pub use actor::{Actor, ActorDef, ActorDefRef, ActorSprite, SphereInstance, TrackDef, TrackInstance};
pub use light::{AmbientLight, GlobalAmbientLight, LightDef, LightInstance, PointLight};
pub use material::{Material, Palette, SpriteDef, SpriteFrame, SpriteInstance};
pub use mesh::Mesh;
pub use world::{Region, TreeNode, WorldTree, Zone};

/// Arena index of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub usize);

/// Symbolic reference to an entity of the kind implied by the referring field
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagRef {
    pub tag: String,
    /// Occurrence among same-kind entities with this tag; 0 for the first
    #[serde(default, skip_serializing_if = "is_zero")]
    pub index: u32,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl TagRef {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            index: 0,
        }
    }

    pub fn with_index(tag: impl Into<String>, index: u32) -> Self {
        Self {
            tag: tag.into(),
            index,
        }
    }
}

impl fmt::Display for TagRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.index == 0 {
            write!(f, "{}", self.tag)
        } else {
            write!(f, "{}#{}", self.tag, self.index)
        }
    }
}

/// Entity kinds, in the order their groups are emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    GlobalAmbientLight,
    Mesh,
    Palette,
    Material,
    SpriteDef,
    TrackDef,
    TrackInstance,
    ActorDef,
    LightDef,
    PointLight,
    WorldTree,
    Region,
    AmbientLight,
    Actor,
    Zone,
}

impl EntityKind {
    /// Every kind in emission group order
    pub const ALL: [EntityKind; 15] = [
        EntityKind::GlobalAmbientLight,
        EntityKind::Mesh,
        EntityKind::Palette,
        EntityKind::Material,
        EntityKind::SpriteDef,
        EntityKind::TrackDef,
        EntityKind::TrackInstance,
        EntityKind::ActorDef,
        EntityKind::LightDef,
        EntityKind::PointLight,
        EntityKind::WorldTree,
        EntityKind::Region,
        EntityKind::AmbientLight,
        EntityKind::Actor,
        EntityKind::Zone,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::GlobalAmbientLight => "global ambient light",
            EntityKind::Mesh => "mesh",
            EntityKind::Palette => "palette",
            EntityKind::Material => "material",
            EntityKind::SpriteDef => "sprite",
            EntityKind::TrackDef => "track definition",
            EntityKind::TrackInstance => "track",
            EntityKind::ActorDef => "actor definition",
            EntityKind::LightDef => "light definition",
            EntityKind::PointLight => "point light",
            EntityKind::WorldTree => "world tree",
            EntityKind::Region => "region",
            EntityKind::AmbientLight => "ambient light",
            EntityKind::Actor => "actor",
            EntityKind::Zone => "zone",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    GlobalAmbientLight(GlobalAmbientLight),
    Mesh(Mesh),
    Palette(Palette),
    Material(Material),
    SpriteDef(SpriteDef),
    TrackDef(TrackDef),
    TrackInstance(TrackInstance),
    ActorDef(ActorDef),
    LightDef(LightDef),
    PointLight(PointLight),
    WorldTree(WorldTree),
    Region(Region),
    AmbientLight(AmbientLight),
    Actor(Actor),
    Zone(Zone),
}

macro_rules! each_entity {
    ($entity:expr, $inner:ident => $body:expr) => {
        match $entity {
            Entity::GlobalAmbientLight($inner) => $body,
            Entity::Mesh($inner) => $body,
            Entity::Palette($inner) => $body,
            Entity::Material($inner) => $body,
            Entity::SpriteDef($inner) => $body,
            Entity::TrackDef($inner) => $body,
            Entity::TrackInstance($inner) => $body,
            Entity::ActorDef($inner) => $body,
            Entity::LightDef($inner) => $body,
            Entity::PointLight($inner) => $body,
            Entity::WorldTree($inner) => $body,
            Entity::Region($inner) => $body,
            Entity::AmbientLight($inner) => $body,
            Entity::Actor($inner) => $body,
            Entity::Zone($inner) => $body,
        }
    };
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::GlobalAmbientLight(_) => EntityKind::GlobalAmbientLight,
            Entity::Mesh(_) => EntityKind::Mesh,
            Entity::Palette(_) => EntityKind::Palette,
            Entity::Material(_) => EntityKind::Material,
            Entity::SpriteDef(_) => EntityKind::SpriteDef,
            Entity::TrackDef(_) => EntityKind::TrackDef,
            Entity::TrackInstance(_) => EntityKind::TrackInstance,
            Entity::ActorDef(_) => EntityKind::ActorDef,
            Entity::LightDef(_) => EntityKind::LightDef,
            Entity::PointLight(_) => EntityKind::PointLight,
            Entity::WorldTree(_) => EntityKind::WorldTree,
            Entity::Region(_) => EntityKind::Region,
            Entity::AmbientLight(_) => EntityKind::AmbientLight,
            Entity::Actor(_) => EntityKind::Actor,
            Entity::Zone(_) => EntityKind::Zone,
        }
    }

    pub fn tag(&self) -> &str {
        each_entity!(self, e => &e.tag)
    }

    /// Short description for diagnostics, e.g. `material 'FLOOR_MDF'`
    pub fn describe(&self) -> String {
        format!("{} '{}'", self.kind(), self.tag())
    }
}

macro_rules! impl_from_entity {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for Entity {
                fn from(value: $ty) -> Self {
                    Entity::$ty(value)
                }
            }
        )*
    };
}

impl_from_entity!(
    GlobalAmbientLight,
    Mesh,
    Palette,
    Material,
    SpriteDef,
    TrackDef,
    TrackInstance,
    ActorDef,
    LightDef,
    PointLight,
    WorldTree,
    Region,
    AmbientLight,
    Actor,
    Zone,
);

// =============================================================================
// Graph
// =============================================================================

/// Arena of entities for one asset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldGraph {
    /// Selects the new-world texture coordinate layout
    pub is_new_world: bool,
    pub entities: Vec<Entity>,
}

impl WorldGraph {
    pub fn new(is_new_world: bool) -> Self {
        Self {
            is_new_world,
            entities: Vec::new(),
        }
    }

    /// Append an entity and return its id
    pub fn push(&mut self, entity: impl Into<Entity>) -> EntityId {
        self.entities.push(entity.into());
        EntityId(self.entities.len() - 1)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities
            .iter()
            .enumerate()
            .map(|(index, entity)| (EntityId(index), entity))
    }

    /// Entities of one kind in arena order
    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.iter().filter(move |(_, entity)| entity.kind() == kind)
    }

    /// Symbolic reference that addresses `id`
    pub fn tag_ref(&self, id: EntityId) -> Option<TagRef> {
        let entity = self.get(id)?;
        let kind = entity.kind();
        let tag = entity.tag();
        let index = self.entities[..id.0]
            .iter()
            .filter(|other| other.kind() == kind && other.tag() == tag)
            .count();
        Some(TagRef::with_index(tag, index as u32))
    }

    /// Build a lookup table from (kind, tag, index) to entity
    pub fn lookup(&self) -> TagLookup<'_> {
        let mut by_tag: HashMap<(EntityKind, &str), SmallVec<[EntityId; 1]>> = HashMap::new();
        for (id, entity) in self.iter() {
            by_tag
                .entry((entity.kind(), entity.tag()))
                .or_default()
                .push(id);
        }
        TagLookup { by_tag }
    }
}

/// Tag resolution table borrowed from a graph
#[derive(Debug, Clone)]
pub struct TagLookup<'g> {
    by_tag: HashMap<(EntityKind, &'g str), SmallVec<[EntityId; 1]>>,
}

impl TagLookup<'_> {
    pub fn resolve(&self, kind: EntityKind, tag_ref: &TagRef) -> Option<EntityId> {
        self.by_tag
            .get(&(kind, tag_ref.tag.as_str()))
            .and_then(|ids| ids.get(tag_ref.index as usize))
            .copied()
    }
}

/// Set `bit` when the field it gates is present; bits already set are kept
#[inline]
pub(crate) fn with_flag(flags: u32, bit: u32, present: bool) -> u32 {
    if present { flags | bit } else { flags }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette(tag: &str) -> Palette {
        Palette {
            tag: tag.into(),
            flags: 0,
            materials: vec![],
        }
    }

    #[test]
    fn test_tag_index_counts_same_kind_only() {
        let mut graph = WorldGraph::new(false);
        let first = graph.push(palette("DUP"));
        graph.push(GlobalAmbientLight {
            tag: "DUP".into(),
            color: [0; 4],
        });
        let second = graph.push(palette("DUP"));

        assert_eq!(graph.tag_ref(first), Some(TagRef::new("DUP")));
        assert_eq!(graph.tag_ref(second), Some(TagRef::with_index("DUP", 1)));

        let lookup = graph.lookup();
        assert_eq!(
            lookup.resolve(EntityKind::Palette, &TagRef::with_index("DUP", 1)),
            Some(second)
        );
        assert_eq!(
            lookup.resolve(EntityKind::Palette, &TagRef::with_index("DUP", 2)),
            None
        );
        assert_eq!(lookup.resolve(EntityKind::Material, &TagRef::new("DUP")), None);
    }

    #[test]
    fn test_tag_ref_display() {
        assert_eq!(TagRef::new("A_MDF").to_string(), "A_MDF");
        assert_eq!(TagRef::with_index("A_MDF", 2).to_string(), "A_MDF#2");
    }

    #[test]
    fn test_entity_json_shape() {
        let entity: Entity = palette("PAL").into();
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["kind"], "palette");
        assert_eq!(json["tag"], "PAL");

        let back: Entity = serde_json::from_value(json).unwrap();
        assert_eq!(back, entity);
    }

    #[test]
    fn test_instances_default_to_an_empty_reference() {
        assert_eq!(TrackInstance::default().track, TagRef::new(""));
        assert_eq!(LightInstance::default().light, TagRef::default());
        assert_eq!(SpriteInstance::default().sprite.index, 0);
    }

    #[test]
    fn test_region_json_keeps_user_data_bytes() {
        let region = Region {
            tag: "R000001".into(),
            user_data: vec![0xFF, 0x41],
            ..Default::default()
        };
        let json = serde_json::to_value(Entity::from(region.clone())).unwrap();
        assert_eq!(json["user_data"], serde_json::json!([255, 65]));
        assert!(json.get("ambient_light").is_none());

        let back: Entity = serde_json::from_value(json).unwrap();
        assert_eq!(back, Entity::from(region));
    }

    #[test]
    fn test_with_flag_keeps_existing_bits() {
        assert_eq!(with_flag(0x10, 0x01, true), 0x11);
        assert_eq!(with_flag(0x11, 0x01, false), 0x11);
        assert_eq!(with_flag(0, 0x01, false), 0);
    }
}
