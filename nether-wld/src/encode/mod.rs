//! Graph to container emitter
//!
//! Entities are emitted group by group in [`EntityKind::ALL`] order, each
//! group in arena order. An entity's references are emitted first, so every
//! record only points backwards. Each entity is emitted at most once; instance
//! records are written fresh for their owner right before it.

use hashbrown::HashSet;

use crate::container::Wld;
use crate::error::{Result, WldError};
use crate::fragment::actor::{
    ACTOR_FLAG_HAS_BOUNDING_RADIUS, ACTOR_FLAG_HAS_CURRENT_ACTION, ACTOR_FLAG_HAS_LOCATION,
    ACTOR_FLAG_HAS_SCALE, ACTOR_FLAG_HAS_SOUND,
};
use crate::fragment::light::{
    LIGHT_FLAG_HAS_COLORS, LIGHT_FLAG_HAS_CURRENT_FRAME, LIGHT_FLAG_HAS_LEVELS,
    LIGHT_FLAG_HAS_SLEEP,
};
use crate::fragment::material::{
    MATERIAL_FLAG_HAS_PAIRS, SPRITE_FLAG_HAS_CURRENT_FRAME, SPRITE_FLAG_HAS_SLEEP,
};
use crate::fragment::track::TRACK_FLAG_HAS_SLEEP;
use crate::fragment::world::{
    REGION_FLAG_HAS_MESH, REGION_FLAG_HAS_REVERB_OFFSET, REGION_FLAG_HAS_REVERB_VOLUME,
    REGION_FLAG_HAS_SPHERE,
};
use crate::fragment::{self, BmInfo, Fragment, MeshUvs, WorldTreeNode};
use crate::model::{
    ActorDefRef, ActorSprite, Entity, EntityId, EntityKind, LightInstance, SpriteInstance,
    TagLookup, TagRef, WorldGraph, with_flag,
};
use crate::quantize;


/// Build a container holding every entity of `graph`
pub fn encode(graph: &WorldGraph) -> Result<Wld> {
    let mut emitter = Emitter::new(graph);
    for kind in EntityKind::ALL {
        for (id, _) in graph.of_kind(kind) {
            emitter.emit(id)?;
        }
    }

    let mut wld = emitter.wld;
    wld.refresh_header()?;
    tracing::info!(
        entities = graph.len(),
        fragments = wld.len(),
        names = wld.names.string_count(),
        regions = wld.header.region_count,
        "encoded wld graph"
    );
    Ok(wld)
}

/// Region number carried by a `R` + six digit tag
pub fn parse_region_tag(tag: &str) -> Result<u32> {
    tag.strip_prefix('R')
        .filter(|digits| digits.len() == 6 && digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| WldError::NameConventionMismatch {
            tag: tag.to_owned(),
            expected: "R + six digits",
        })
}

/// Source position of a record outside the graph; only an empty one carries over
fn untranslated(value: i32, field: &'static str) -> Result<i32> {
    match value {
        0 => Ok(0),
        position => Err(WldError::UntranslatedReference {
            field,
            position: i64::from(position),
        }),
    }
}

/// Position as stored in a signed reference field
fn signed(position: u32, field: &'static str) -> Result<i32> {
    i32::try_from(position).map_err(|_| WldError::ValueOutOfRange {
        field,
        value: i64::from(position),
    })
}

struct Emitter<'g> {
    graph: &'g WorldGraph,
    lookup: TagLookup<'g>,
    wld: Wld,
    /// Position of each emitted entity, 0 while not yet emitted
    memo: Vec<u32>,
    visiting: HashSet<EntityId>,
}

impl<'g> Emitter<'g> {
    fn new(graph: &'g WorldGraph) -> Self {
        Self {
            graph,
            lookup: graph.lookup(),
            wld: Wld::new(graph.is_new_world),
            memo: vec![0; graph.len()],
            visiting: HashSet::new(),
        }
    }

    /// Emit an entity after its references and return its position
    fn emit(&mut self, id: EntityId) -> Result<u32> {
        let graph = self.graph;
        let entity = &graph.entities[id.0];
        if self.memo[id.0] != 0 {
            return Ok(self.memo[id.0]);
        }
        if !self.visiting.insert(id) {
            return Err(WldError::CyclicReference(entity.describe()));
        }

        let fragment = self
            .build(entity)
            .map_err(|err| err.in_entity(entity.describe()))?;
        self.visiting.remove(&id);

        let position = self.wld.push(fragment);
        self.memo[id.0] = position;
        tracing::debug!(position, entity = %entity.describe(), "emitted");
        Ok(position)
    }

    /// Emit the entity a reference names
    fn resolve(&mut self, from: &Entity, kind: EntityKind, tag_ref: &TagRef) -> Result<u32> {
        let id = self
            .lookup
            .resolve(kind, tag_ref)
            .ok_or_else(|| WldError::UnresolvedReference {
                from: from.describe(),
                kind: kind.as_str(),
                tag: tag_ref.to_string(),
            })?;
        self.emit(id)
    }

    fn name(&mut self, tag: &str) -> i32 {
        self.wld.names.add(tag)
    }

    fn build(&mut self, entity: &'g Entity) -> Result<Fragment> {
        let fragment: Fragment = match entity {
            Entity::GlobalAmbientLight(light) => fragment::GlobalAmbientLightDef {
                name_ref: self.name(&light.tag),
                color: light.color,
            }
            .into(),

            Entity::Mesh(mesh) => {
                if mesh.scale > quantize::MAX_VERTEX_SCALE {
                    return Err(WldError::ValueOutOfRange {
                        field: "mesh vertex scale",
                        value: i64::from(mesh.scale),
                    });
                }
                let material_palette_ref = match &mesh.palette {
                    Some(palette) => self.resolve(entity, EntityKind::Palette, palette)?,
                    None => 0,
                };
                let uvs = if self.graph.is_new_world {
                    MeshUvs::Float(mesh.uvs.iter().map(|uv| uv.to_array()).collect())
                } else {
                    MeshUvs::Legacy(
                        mesh.uvs
                            .iter()
                            .map(|&uv| quantize::encode_legacy_uv(uv))
                            .collect(),
                    )
                };
                fragment::DmSpriteDef2 {
                    name_ref: self.name(&mesh.tag),
                    flags: mesh.flags,
                    material_palette_ref,
                    dm_track_ref: untranslated(mesh.dm_track_ref, "mesh vertex animation ref")?,
                    fragment3: mesh.fragment3,
                    fragment4_ref: untranslated(mesh.fragment4_ref, "mesh polyhedron ref")?,
                    center: mesh.center.to_array(),
                    params2: mesh.params2,
                    bounding_radius: mesh.bounding_radius,
                    bbox_min: mesh.bbox_min.to_array(),
                    bbox_max: mesh.bbox_max.to_array(),
                    scale: mesh.scale,
                    vertices: mesh
                        .vertices
                        .iter()
                        .map(|&v| quantize::encode_position(v, mesh.scale))
                        .collect(),
                    uvs,
                    normals: mesh
                        .normals
                        .iter()
                        .map(|&n| quantize::encode_normal(n))
                        .collect(),
                    colors: mesh.colors.clone(),
                    faces: mesh.faces.clone(),
                    skin_groups: mesh.skin_groups.clone(),
                    face_material_groups: mesh.face_material_groups.clone(),
                    vertex_material_groups: mesh.vertex_material_groups.clone(),
                    mesh_ops: mesh.mesh_ops.clone(),
                }
                .into()
            }

            Entity::Palette(palette) => {
                let materials = palette
                    .materials
                    .iter()
                    .map(|material| self.resolve(entity, EntityKind::Material, material))
                    .collect::<Result<_>>()?;
                fragment::MaterialPalette {
                    name_ref: self.name(&palette.tag),
                    flags: palette.flags,
                    materials,
                }
                .into()
            }

            Entity::Material(material) => {
                let simple_sprite_ref = match &material.sprite {
                    Some(sprite) => self.sprite_instance(entity, sprite)?,
                    None => 0,
                };
                fragment::MaterialDef {
                    name_ref: self.name(&material.tag),
                    flags: with_flag(
                        material.flags,
                        MATERIAL_FLAG_HAS_PAIRS,
                        material.pairs.is_some(),
                    ),
                    render_method: material.render_method,
                    rgb_pen: material.rgb_pen,
                    brightness: material.brightness,
                    scaled_ambient: material.scaled_ambient,
                    simple_sprite_ref,
                    pairs: material.pairs,
                }
                .into()
            }

            Entity::SpriteDef(sprite) => {
                let frames = sprite
                    .frames
                    .iter()
                    .map(|frame| {
                        let name_ref = self.name(&frame.tag);
                        self.wld
                            .push(BmInfo::from_names(name_ref, &frame.files).into())
                    })
                    .collect();
                let mut flags = sprite.flags;
                flags = with_flag(
                    flags,
                    SPRITE_FLAG_HAS_CURRENT_FRAME,
                    sprite.current_frame.is_some(),
                );
                flags = with_flag(flags, SPRITE_FLAG_HAS_SLEEP, sprite.sleep.is_some());
                fragment::SimpleSpriteDef {
                    name_ref: self.name(&sprite.tag),
                    flags,
                    current_frame: sprite.current_frame,
                    sleep: sprite.sleep,
                    frames,
                }
                .into()
            }

            Entity::TrackDef(track) => fragment::TrackDef {
                name_ref: self.name(&track.tag),
                flags: track.flags,
                frames: track.frames.clone(),
            }
            .into(),

            Entity::TrackInstance(track) => {
                let track_def = self.resolve(entity, EntityKind::TrackDef, &track.track)?;
                fragment::Track {
                    name_ref: self.name(&track.tag),
                    track_def_ref: signed(track_def, "track def ref")?,
                    flags: with_flag(track.flags, TRACK_FLAG_HAS_SLEEP, track.sleep.is_some()),
                    sleep: track.sleep,
                }
                .into()
            }

            Entity::ActorDef(def) => {
                let mut sprites = Vec::with_capacity(def.sprites.len());
                for sprite in &def.sprites {
                    let position = match sprite {
                        ActorSprite::Mesh { tag, params, mesh } => {
                            let mesh = self.resolve(entity, EntityKind::Mesh, mesh)?;
                            let instance = fragment::DmSprite {
                                name_ref: self.name(tag),
                                dm_sprite_ref: signed(mesh, "mesh ref")?,
                                params: *params,
                            };
                            self.wld.push(instance.into())
                        }
                        ActorSprite::Position(position) => {
                            return Err(WldError::UntranslatedReference {
                                field: "actor sprite ref",
                                position: i64::from(*position),
                            });
                        }
                    };
                    sprites.push(position);
                }
                let mut flags = def.flags;
                flags = with_flag(
                    flags,
                    ACTOR_FLAG_HAS_CURRENT_ACTION,
                    def.current_action.is_some(),
                );
                flags = with_flag(flags, ACTOR_FLAG_HAS_LOCATION, def.location.is_some());
                fragment::ActorDef {
                    name_ref: self.name(&def.tag),
                    flags,
                    callback_name_ref: self.name(&def.callback),
                    bounds_ref: untranslated(def.bounds_ref, "actor bounds ref")?,
                    current_action: def.current_action,
                    location: def.location,
                    actions: def.actions.clone(),
                    sprites,
                    user_data: def.user_data.clone(),
                }
                .into()
            }

            Entity::Actor(actor) => {
                let actor_def_ref = match &actor.actor_def {
                    None => 0,
                    Some(ActorDefRef::Name(name)) => self.name(name),
                    Some(ActorDefRef::Def(def)) => {
                        let position = self.resolve(entity, EntityKind::ActorDef, def)?;
                        signed(position, "actor def ref")?
                    }
                };
                let sphere_ref = match &actor.sphere {
                    Some(sphere) => {
                        let instance = fragment::Sphere {
                            name_ref: self.name(&sphere.tag),
                            radius: sphere.radius,
                        };
                        self.wld.push(instance.into())
                    }
                    None => 0,
                };
                let sound_name_ref = actor.sound.as_deref().map(|sound| self.name(sound));

                let mut flags = actor.flags;
                flags = with_flag(
                    flags,
                    ACTOR_FLAG_HAS_CURRENT_ACTION,
                    actor.current_action.is_some(),
                );
                flags = with_flag(flags, ACTOR_FLAG_HAS_LOCATION, actor.location.is_some());
                flags = with_flag(
                    flags,
                    ACTOR_FLAG_HAS_BOUNDING_RADIUS,
                    actor.bounding_radius.is_some(),
                );
                flags = with_flag(flags, ACTOR_FLAG_HAS_SCALE, actor.scale.is_some());
                flags = with_flag(flags, ACTOR_FLAG_HAS_SOUND, sound_name_ref.is_some());
                fragment::Actor {
                    name_ref: self.name(&actor.tag),
                    actor_def_ref,
                    flags,
                    sphere_ref,
                    current_action: actor.current_action,
                    location: actor.location,
                    bounding_radius: actor.bounding_radius,
                    scale: actor.scale,
                    sound_name_ref,
                    dm_rgb_track_ref: untranslated(
                        actor.dm_rgb_track_ref,
                        "actor vertex colour track ref",
                    )?,
                }
                .into()
            }

            Entity::LightDef(light) => {
                let mut flags = light.flags;
                flags = with_flag(
                    flags,
                    LIGHT_FLAG_HAS_CURRENT_FRAME,
                    light.current_frame.is_some(),
                );
                flags = with_flag(flags, LIGHT_FLAG_HAS_SLEEP, light.sleep.is_some());
                flags = with_flag(flags, LIGHT_FLAG_HAS_LEVELS, light.levels.is_some());
                flags = with_flag(flags, LIGHT_FLAG_HAS_COLORS, light.colors.is_some());
                fragment::LightDef {
                    name_ref: self.name(&light.tag),
                    flags,
                    frame_count: light.frame_count,
                    current_frame: light.current_frame,
                    sleep: light.sleep,
                    levels: light.levels.clone(),
                    colors: light.colors.clone(),
                }
                .into()
            }

            Entity::PointLight(light) => {
                let light_ref = self.light_instance(entity, light.light.as_ref())?;
                fragment::PointLight {
                    name_ref: self.name(&light.tag),
                    light_ref,
                    flags: light.flags,
                    location: light.location.to_array(),
                    radius: light.radius,
                }
                .into()
            }

            Entity::AmbientLight(light) => {
                let light_ref = self.light_instance(entity, light.light.as_ref())?;
                fragment::AmbientLight {
                    name_ref: self.name(&light.tag),
                    light_ref,
                    flags: light.flags,
                    regions: light.regions.clone(),
                }
                .into()
            }

            Entity::WorldTree(tree) => {
                let nodes = tree
                    .nodes
                    .iter()
                    .map(|node| -> Result<WorldTreeNode> {
                        let region = match &node.region {
                            Some(tag) => signed(parse_region_tag(tag)?, "tree node region")?,
                            None => 0,
                        };
                        Ok(WorldTreeNode {
                            plane: node.plane,
                            region,
                            front: node.front,
                            back: node.back,
                        })
                    })
                    .collect::<Result<_>>()?;
                fragment::WorldTree {
                    name_ref: self.name(&tree.tag),
                    nodes,
                }
                .into()
            }

            Entity::Region(region) => {
                let ambient_light_ref = match &region.ambient_light {
                    Some(light) => {
                        let position =
                            self.resolve(entity, EntityKind::GlobalAmbientLight, light)?;
                        signed(position, "region ambient light ref")?
                    }
                    None => 0,
                };
                let mesh_ref = match &region.mesh {
                    Some(mesh) => {
                        let position = self.resolve(entity, EntityKind::Mesh, mesh)?;
                        Some(signed(position, "region mesh ref")?)
                    }
                    None => None,
                };
                let mut flags = region.flags;
                flags = with_flag(flags, REGION_FLAG_HAS_SPHERE, region.sphere.is_some());
                flags = with_flag(
                    flags,
                    REGION_FLAG_HAS_REVERB_VOLUME,
                    region.reverb_volume.is_some(),
                );
                flags = with_flag(
                    flags,
                    REGION_FLAG_HAS_REVERB_OFFSET,
                    region.reverb_offset.is_some(),
                );
                flags = with_flag(flags, REGION_FLAG_HAS_MESH, mesh_ref.is_some());
                fragment::Region {
                    name_ref: self.name(&region.tag),
                    flags,
                    ambient_light_ref,
                    cutting_obstacle_count: region.cutting_obstacle_count,
                    region_vertices: region.region_vertices.iter().map(|v| v.to_array()).collect(),
                    proximals: region.proximals.iter().map(|p| p.to_array()).collect(),
                    render_vertices: region.render_vertices.iter().map(|v| v.to_array()).collect(),
                    walls: region.walls.clone(),
                    obstacles: region.obstacles.clone(),
                    vis_nodes: region.vis_nodes.clone(),
                    vis_lists: region.vis_lists.clone(),
                    sphere: region.sphere,
                    reverb_volume: region.reverb_volume,
                    reverb_offset: region.reverb_offset,
                    user_data: region.user_data.clone(),
                    mesh_ref,
                }
                .into()
            }

            Entity::Zone(zone) => fragment::Zone {
                name_ref: self.name(&zone.tag),
                flags: zone.flags,
                regions: zone.regions.clone(),
                user_data: zone.user_data.clone(),
            }
            .into(),
        };
        Ok(fragment)
    }

    /// Write a material's sprite instance and return its position
    fn sprite_instance(&mut self, owner: &Entity, sprite: &SpriteInstance) -> Result<u32> {
        let sprite_ref = self.resolve(owner, EntityKind::SpriteDef, &sprite.sprite)?;
        let instance = fragment::SimpleSprite {
            name_ref: self.name(&sprite.tag),
            sprite_ref,
            flags: sprite.flags,
        };
        Ok(self.wld.push(instance.into()))
    }

    /// Write a light instance and return its position, or 0 without one
    fn light_instance(&mut self, owner: &Entity, light: Option<&LightInstance>) -> Result<i32> {
        let Some(light) = light else {
            return Ok(0);
        };
        let light_def = self.resolve(owner, EntityKind::LightDef, &light.light)?;
        let instance = fragment::Light {
            name_ref: self.name(&light.tag),
            light_def_ref: signed(light_def, "light def ref")?,
            flags: light.flags,
        };
        signed(self.wld.push(instance.into()), "light ref")
    }
}
