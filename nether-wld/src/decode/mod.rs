//! Container to graph resolver
//!
//! Walks the container once in position order. Definitions become entities
//! and every non-zero reference is turned into a [`TagRef`]. The reference each
//! position will carry is known before the walk, so a reference may point at a
//! record before or after its owner. Instance records are folded into the
//! entity that references them by reading them at their position directly.

use glam::{Vec2, Vec3};
use hashbrown::{HashMap, HashSet};
use serde::Serialize;

use crate::container::{Slot, Wld};
use crate::error::{Result, WldError};
use crate::fragment::{self, Fragment, MeshUvs};
use crate::model::{
    Actor, ActorDef, ActorDefRef, ActorSprite, AmbientLight, Entity, EntityKind,
    GlobalAmbientLight, LightDef, LightInstance, Material, Mesh, Palette, PointLight, Region,
    SphereInstance, SpriteDef, SpriteFrame, SpriteInstance, TagRef, TrackDef, TrackInstance,
    TreeNode, WorldGraph, WorldTree, Zone,
};
use crate::quantize::{self, MAX_VERTEX_SCALE};

pub mod sequence;

#[cfg(test)]
mod tests;

/// Highest region number a `R` + six digit tag can carry
const MAX_REGION_NUMBER: i32 = 999_999;

/// A position that did not become part of the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFragment {
    pub position: u32,
    pub code: u32,
    pub kind: &'static str,
}

/// What the resolver left out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodeReport {
    /// Records that were skipped by the scan or have no typed codec
    pub skipped: Vec<SkippedFragment>,
    /// Instance records no definition references
    pub unreferenced: Vec<u32>,
}

/// Result of [`decode`]
#[derive(Debug, Clone)]
pub struct Decoded {
    pub graph: WorldGraph,
    pub report: DecodeReport,
}

/// Build the graph for a parsed container
pub fn decode(wld: &Wld) -> Result<Decoded> {
    Resolver::new(wld).run()
}

/// Tag for a region number, e.g. 12 -> `R000012`
pub fn region_tag(number: u32) -> String {
    format!("R{number:06}")
}

fn is_instance(fragment: &Fragment) -> bool {
    matches!(
        fragment,
        Fragment::BmInfo(_)
            | Fragment::SimpleSprite(_)
            | Fragment::DmSprite(_)
            | Fragment::Light(_)
            | Fragment::Sphere(_)
    )
}

fn unexpected(position: u32, expected: &'static str, found: &Fragment) -> WldError {
    WldError::UnexpectedFragment {
        position,
        expected,
        found: found.kind_name(),
    }
}

/// Kind of entity a definition record becomes; `None` for instances and opaque records
fn entity_kind(fragment: &Fragment) -> Option<EntityKind> {
    let kind = match fragment {
        Fragment::GlobalAmbientLightDef(_) => EntityKind::GlobalAmbientLight,
        Fragment::SimpleSpriteDef(_) => EntityKind::SpriteDef,
        Fragment::MaterialDef(_) => EntityKind::Material,
        Fragment::MaterialPalette(_) => EntityKind::Palette,
        Fragment::DmSpriteDef2(_) => EntityKind::Mesh,
        Fragment::TrackDef(_) => EntityKind::TrackDef,
        Fragment::Track(_) => EntityKind::TrackInstance,
        Fragment::ActorDef(_) => EntityKind::ActorDef,
        Fragment::Actor(_) => EntityKind::Actor,
        Fragment::LightDef(_) => EntityKind::LightDef,
        Fragment::PointLight(_) => EntityKind::PointLight,
        Fragment::AmbientLight(_) => EntityKind::AmbientLight,
        Fragment::WorldTree(_) => EntityKind::WorldTree,
        Fragment::Region(_) => EntityKind::Region,
        Fragment::Zone(_) => EntityKind::Zone,
        Fragment::BmInfo(_)
        | Fragment::SimpleSprite(_)
        | Fragment::DmSprite(_)
        | Fragment::Light(_)
        | Fragment::Sphere(_)
        | Fragment::Opaque(_) => return None,
    };
    Some(kind)
}

struct Resolver<'w> {
    wld: &'w Wld,
    graph: WorldGraph,
    /// Kind and reference of the entity each position becomes, indexed by position
    refs_at: Vec<Option<(EntityKind, TagRef)>>,
    folded: HashSet<u32>,
    report: DecodeReport,
}

impl<'w> Resolver<'w> {
    fn new(wld: &'w Wld) -> Self {
        Self {
            wld,
            graph: WorldGraph::new(wld.is_new_world()),
            refs_at: Vec::new(),
            folded: HashSet::new(),
            report: DecodeReport::default(),
        }
    }

    /// Assign every definition its tag and occurrence index ahead of the walk
    fn index_refs(&mut self) -> Result<()> {
        let wld = self.wld;
        let mut occurrences: HashMap<(EntityKind, &str), u32> = HashMap::new();
        let mut refs_at = vec![None; wld.len() + 1];
        for (position, slot) in wld.positions() {
            let Some(fragment) = slot.fragment() else {
                continue;
            };
            let Some(kind) = entity_kind(fragment) else {
                continue;
            };
            let tag = wld
                .names
                .name(fragment.name_ref())
                .map_err(|err| err.at_fragment(position, fragment.kind_name()))?;
            let occurrence = occurrences.entry((kind, tag)).or_insert(0);
            refs_at[position as usize] = Some((kind, TagRef::with_index(tag, *occurrence)));
            *occurrence += 1;
        }
        self.refs_at = refs_at;
        Ok(())
    }

    fn run(mut self) -> Result<Decoded> {
        let wld = self.wld;
        self.index_refs()?;
        for (position, slot) in wld.positions() {
            match slot {
                Slot::Known(record) => {
                    let fragment = &record.fragment;
                    self.resolve(position, fragment)
                        .map_err(|err| err.at_fragment(position, fragment.kind_name()))?;
                }
                Slot::Skipped { code, .. } => self.skip(position, *code, slot.kind_name()),
            }
        }

        for (position, slot) in wld.positions() {
            let instance = slot.fragment().is_some_and(is_instance);
            if instance && !self.folded.contains(&position) {
                tracing::warn!(position, kind = slot.kind_name(), "unreferenced instance record");
                self.report.unreferenced.push(position);
            }
        }

        tracing::info!(
            entities = self.graph.len(),
            skipped = self.report.skipped.len(),
            unreferenced = self.report.unreferenced.len(),
            "decoded wld graph"
        );
        Ok(Decoded {
            graph: self.graph,
            report: self.report,
        })
    }

    fn skip(&mut self, position: u32, code: u32, kind: &'static str) {
        tracing::debug!(position, code, kind, "record left out of the graph");
        self.report.skipped.push(SkippedFragment {
            position,
            code,
            kind,
        });
    }

    fn resolve(&mut self, position: u32, fragment: &Fragment) -> Result<()> {
        let entity: Entity = match fragment {
            Fragment::GlobalAmbientLightDef(f) => GlobalAmbientLight {
                tag: self.name(f.name_ref)?,
                color: f.color,
            }
            .into(),
            Fragment::SimpleSpriteDef(f) => {
                let frames = f
                    .frames
                    .iter()
                    .map(|&frame| self.sprite_frame(frame))
                    .collect::<Result<_>>()?;
                SpriteDef {
                    tag: self.name(f.name_ref)?,
                    flags: f.flags,
                    current_frame: f.current_frame,
                    sleep: f.sleep,
                    frames,
                }
                .into()
            }
            Fragment::MaterialDef(f) => {
                let sprite = match f.simple_sprite_ref {
                    0 => None,
                    sprite => Some(self.sprite_instance(sprite)?),
                };
                Material {
                    tag: self.name(f.name_ref)?,
                    flags: f.flags,
                    render_method: f.render_method,
                    rgb_pen: f.rgb_pen,
                    brightness: f.brightness,
                    scaled_ambient: f.scaled_ambient,
                    sprite,
                    pairs: f.pairs,
                }
                .into()
            }
            Fragment::MaterialPalette(f) => {
                let materials = f
                    .materials
                    .iter()
                    .map(|&material| self.def_ref(material, EntityKind::Material))
                    .collect::<Result<_>>()?;
                Palette {
                    tag: self.name(f.name_ref)?,
                    flags: f.flags,
                    materials,
                }
                .into()
            }
            Fragment::DmSpriteDef2(f) => self.mesh(f)?.into(),
            Fragment::TrackDef(f) => {
                let tag = self.name(f.name_ref)?;
                TrackDef {
                    sequence: sequence::classify(&tag),
                    tag,
                    flags: f.flags,
                    frames: f.frames.clone(),
                }
                .into()
            }
            Fragment::Track(f) => {
                let tag = self.name(f.name_ref)?;
                let track_def = positive(f.track_def_ref, "track def ref")?;
                let track = self.def_ref(track_def, EntityKind::TrackDef)?;
                TrackInstance {
                    sequence: sequence::classify(&tag),
                    tag,
                    track,
                    flags: f.flags,
                    sleep: f.sleep,
                }
                .into()
            }
            Fragment::ActorDef(f) => {
                let sprites = f
                    .sprites
                    .iter()
                    .map(|&sprite| self.actor_sprite(sprite))
                    .collect::<Result<_>>()?;
                ActorDef {
                    tag: self.name(f.name_ref)?,
                    flags: f.flags,
                    callback: self.name(f.callback_name_ref)?,
                    bounds_ref: f.bounds_ref,
                    current_action: f.current_action,
                    location: f.location,
                    actions: f.actions.clone(),
                    sprites,
                    user_data: f.user_data.clone(),
                }
                .into()
            }
            Fragment::Actor(f) => self.actor(f)?.into(),
            Fragment::LightDef(f) => LightDef {
                tag: self.name(f.name_ref)?,
                flags: f.flags,
                frame_count: f.frame_count,
                current_frame: f.current_frame,
                sleep: f.sleep,
                levels: f.levels.clone(),
                colors: f.colors.clone(),
            }
            .into(),
            Fragment::PointLight(f) => PointLight {
                tag: self.name(f.name_ref)?,
                flags: f.flags,
                light: self.light_instance(f.light_ref)?,
                location: Vec3::from(f.location),
                radius: f.radius,
            }
            .into(),
            Fragment::AmbientLight(f) => AmbientLight {
                tag: self.name(f.name_ref)?,
                flags: f.flags,
                light: self.light_instance(f.light_ref)?,
                regions: f.regions.clone(),
            }
            .into(),
            Fragment::WorldTree(f) => {
                let nodes = f
                    .nodes
                    .iter()
                    .map(|node| -> Result<TreeNode> {
                        Ok(TreeNode {
                            plane: node.plane,
                            region: node_region(node.region)?,
                            front: node.front,
                            back: node.back,
                        })
                    })
                    .collect::<Result<_>>()?;
                WorldTree {
                    tag: self.name(f.name_ref)?,
                    nodes,
                }
                .into()
            }
            Fragment::Region(f) => self.region(f)?.into(),
            Fragment::Zone(f) => Zone {
                tag: self.name(f.name_ref)?,
                flags: f.flags,
                regions: f.regions.clone(),
                user_data: f.user_data.clone(),
            }
            .into(),
            Fragment::Opaque(opaque) => {
                self.skip(position, opaque.code, fragment.kind_name());
                return Ok(());
            }
            Fragment::BmInfo(_)
            | Fragment::SimpleSprite(_)
            | Fragment::DmSprite(_)
            | Fragment::Light(_)
            | Fragment::Sphere(_) => return Ok(()),
        };
        self.add(position, entity);
        Ok(())
    }

    fn add(&mut self, position: u32, entity: Entity) {
        if let Some(Some((_, tag_ref))) = self.refs_at.get(position as usize) {
            tracing::debug!(position, entity = %tag_ref, kind = %entity.kind(), "resolved");
        }
        self.graph.push(entity);
    }

    fn name(&self, name_ref: i32) -> Result<String> {
        Ok(self.wld.names.name(name_ref)?.to_owned())
    }

    /// Reference to the entity of `kind` that `position` becomes, earlier or later in the walk
    fn def_ref(&self, position: u32, kind: EntityKind) -> Result<TagRef> {
        let slot = self.wld.slot(position)?;
        match self.refs_at.get(position as usize) {
            Some(Some((found, tag_ref))) if *found == kind => Ok(tag_ref.clone()),
            _ => Err(WldError::UnexpectedFragment {
                position,
                expected: record_name(kind),
                found: slot.kind_name(),
            }),
        }
    }

    fn fold(&mut self, position: u32) -> Result<&'w Fragment> {
        let fragment = self.wld.fragment(position)?;
        self.folded.insert(position);
        Ok(fragment)
    }

    fn sprite_frame(&mut self, position: u32) -> Result<SpriteFrame> {
        match self.fold(position)? {
            Fragment::BmInfo(info) => Ok(SpriteFrame {
                tag: self.name(info.name_ref)?,
                files: info.file_names()?,
            }),
            other => Err(unexpected(position, "BMInfo", other)),
        }
    }

    fn sprite_instance(&mut self, position: u32) -> Result<SpriteInstance> {
        match self.fold(position)? {
            Fragment::SimpleSprite(sprite) => Ok(SpriteInstance {
                tag: self.name(sprite.name_ref)?,
                flags: sprite.flags,
                sprite: self.def_ref(sprite.sprite_ref, EntityKind::SpriteDef)?,
            }),
            other => Err(unexpected(position, "SimpleSprite", other)),
        }
    }

    fn light_instance(&mut self, light_ref: i32) -> Result<Option<LightInstance>> {
        if light_ref == 0 {
            return Ok(None);
        }
        let position = positive(light_ref, "light ref")?;
        match self.fold(position)? {
            Fragment::Light(light) => Ok(Some(LightInstance {
                tag: self.name(light.name_ref)?,
                flags: light.flags,
                light: self.def_ref(
                    positive(light.light_def_ref, "light def ref")?,
                    EntityKind::LightDef,
                )?,
            })),
            other => Err(unexpected(position, "Light", other)),
        }
    }

    /// Mesh instances are folded; any other sprite kind keeps its position
    fn actor_sprite(&mut self, position: u32) -> Result<ActorSprite> {
        let Ok(Fragment::DmSprite(sprite)) = self.wld.fragment(position) else {
            return Ok(ActorSprite::Position(position));
        };
        self.folded.insert(position);
        Ok(ActorSprite::Mesh {
            tag: self.name(sprite.name_ref)?,
            params: sprite.params,
            mesh: self.def_ref(positive(sprite.dm_sprite_ref, "mesh ref")?, EntityKind::Mesh)?,
        })
    }

    fn actor(&mut self, f: &fragment::Actor) -> Result<Actor> {
        let actor_def = match f.actor_def_ref {
            0 => None,
            name_ref if name_ref < 0 => Some(ActorDefRef::Name(self.name(name_ref)?)),
            position => Some(ActorDefRef::Def(
                self.def_ref(position as u32, EntityKind::ActorDef)?,
            )),
        };
        let sphere = match f.sphere_ref {
            0 => None,
            position => match self.fold(position)? {
                Fragment::Sphere(sphere) => Some(SphereInstance {
                    tag: self.name(sphere.name_ref)?,
                    radius: sphere.radius,
                }),
                other => return Err(unexpected(position, "Sphere", other)),
            },
        };
        let sound = f.sound_name_ref.map(|name_ref| self.name(name_ref)).transpose()?;
        Ok(Actor {
            tag: self.name(f.name_ref)?,
            flags: f.flags,
            actor_def,
            sphere,
            current_action: f.current_action,
            location: f.location,
            bounding_radius: f.bounding_radius,
            scale: f.scale,
            sound,
            dm_rgb_track_ref: f.dm_rgb_track_ref,
        })
    }

    fn mesh(&self, f: &fragment::DmSpriteDef2) -> Result<Mesh> {
        if f.scale > MAX_VERTEX_SCALE {
            return Err(WldError::ValueOutOfRange {
                field: "mesh vertex scale",
                value: i64::from(f.scale),
            });
        }
        let palette = match f.material_palette_ref {
            0 => None,
            position => Some(self.def_ref(position, EntityKind::Palette)?),
        };
        let uvs = match &f.uvs {
            MeshUvs::Float(uvs) => uvs.iter().map(|&uv| Vec2::from(uv)).collect(),
            MeshUvs::Legacy(uvs) => uvs.iter().map(|&uv| quantize::decode_legacy_uv(uv)).collect(),
        };
        Ok(Mesh {
            tag: self.name(f.name_ref)?,
            flags: f.flags,
            palette,
            dm_track_ref: f.dm_track_ref,
            fragment3: f.fragment3,
            fragment4_ref: f.fragment4_ref,
            center: Vec3::from(f.center),
            params2: f.params2,
            bounding_radius: f.bounding_radius,
            bbox_min: Vec3::from(f.bbox_min),
            bbox_max: Vec3::from(f.bbox_max),
            scale: f.scale,
            vertices: f
                .vertices
                .iter()
                .map(|&v| quantize::decode_position(v, f.scale))
                .collect(),
            uvs,
            normals: f.normals.iter().map(|&n| quantize::decode_normal(n)).collect(),
            colors: f.colors.clone(),
            faces: f.faces.clone(),
            skin_groups: f.skin_groups.clone(),
            face_material_groups: f.face_material_groups.clone(),
            vertex_material_groups: f.vertex_material_groups.clone(),
            mesh_ops: f.mesh_ops.clone(),
        })
    }

    fn region(&self, f: &fragment::Region) -> Result<Region> {
        let mesh = match f.mesh_ref {
            None | Some(0) => None,
            Some(mesh_ref) => {
                let position = positive(mesh_ref, "region mesh ref")?;
                Some(self.def_ref(position, EntityKind::Mesh)?)
            }
        };
        let ambient_light = match f.ambient_light_ref {
            0 => None,
            light_ref => {
                let position = positive(light_ref, "region ambient light ref")?;
                Some(self.def_ref(position, EntityKind::GlobalAmbientLight)?)
            }
        };
        Ok(Region {
            tag: self.name(f.name_ref)?,
            flags: f.flags,
            ambient_light,
            cutting_obstacle_count: f.cutting_obstacle_count,
            region_vertices: f.region_vertices.iter().map(|&v| Vec3::from(v)).collect(),
            proximals: f.proximals.iter().map(|&p| Vec2::from(p)).collect(),
            render_vertices: f.render_vertices.iter().map(|&v| Vec3::from(v)).collect(),
            walls: f.walls.clone(),
            obstacles: f.obstacles.clone(),
            vis_nodes: f.vis_nodes.clone(),
            vis_lists: f.vis_lists.clone(),
            sphere: f.sphere,
            reverb_volume: f.reverb_volume,
            reverb_offset: f.reverb_offset,
            user_data: f.user_data.clone(),
            mesh,
        })
    }
}

/// Record kind that stores entities of `kind`
fn record_name(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::GlobalAmbientLight => "GlobalAmbientLightDef",
        EntityKind::Mesh => "DmSpriteDef2",
        EntityKind::Palette => "MaterialPalette",
        EntityKind::Material => "MaterialDef",
        EntityKind::SpriteDef => "SimpleSpriteDef",
        EntityKind::TrackDef => "TrackDef",
        EntityKind::TrackInstance => "Track",
        EntityKind::ActorDef => "ActorDef",
        EntityKind::LightDef => "LightDef",
        EntityKind::PointLight => "PointLight",
        EntityKind::WorldTree => "WorldTree",
        EntityKind::Region => "Region",
        EntityKind::AmbientLight => "AmbientLight",
        EntityKind::Actor => "Actor",
        EntityKind::Zone => "Zone",
    }
}

/// Position stored in a signed reference field
fn positive(value: i32, field: &'static str) -> Result<u32> {
    u32::try_from(value).map_err(|_| WldError::ValueOutOfRange {
        field,
        value: i64::from(value),
    })
}

fn node_region(region: i32) -> Result<Option<String>> {
    match region {
        0 => Ok(None),
        1..=MAX_REGION_NUMBER => Ok(Some(region_tag(region as u32))),
        _ => Err(WldError::ValueOutOfRange {
            field: "tree node region",
            value: i64::from(region),
        }),
    }
}
