use super::*;
use crate::fragment::{
    BmInfo, GlobalAmbientLightDef, Light, MaterialDef, MaterialPalette, Opaque, SimpleSprite,
    SimpleSpriteDef, Sphere, WorldTreeNode,
};
use crate::model::EntityId;

/// Textured material chain: BMInfo, sprite, sprite instance, material
fn textured(wld: &mut Wld, material: &str) -> u32 {
    let name = wld.names.add("TEX_SPRITE");
    let frame_name = wld.names.add("TEX1");
    let frame = wld.push(BmInfo::from_names(frame_name, &["tex1.bmp"]).into());
    let sprite = wld.push(
        SimpleSpriteDef {
            name_ref: name,
            flags: 0x10,
            frames: vec![frame],
            ..Default::default()
        }
        .into(),
    );
    let instance = wld.push(
        SimpleSprite {
            name_ref: 0,
            sprite_ref: sprite,
            flags: 0x50,
        }
        .into(),
    );
    let name_ref = wld.names.add(material);
    wld.push(
        MaterialDef {
            name_ref,
            simple_sprite_ref: instance,
            brightness: 0.75,
            ..Default::default()
        }
        .into(),
    )
}

#[test]
fn test_instances_are_folded_into_owners() {
    let mut wld = Wld::new(true);
    let material = textured(&mut wld, "FLOOR_MDF");
    let palette_name = wld.names.add("ZONE_MP");
    wld.push(
        MaterialPalette {
            name_ref: palette_name,
            flags: 0,
            materials: vec![material, material],
        }
        .into(),
    );

    let Decoded { graph, report } = decode(&wld).unwrap();
    assert_eq!(graph.len(), 3);
    assert!(report.unreferenced.is_empty());

    let Entity::SpriteDef(sprite) = &graph.entities[0] else {
        panic!("expected sprite, got {:?}", graph.entities[0]);
    };
    assert_eq!(sprite.frames.len(), 1);
    assert_eq!(sprite.frames[0].tag, "TEX1");
    assert_eq!(sprite.frames[0].files, ["tex1.bmp"]);

    let Entity::Material(material) = &graph.entities[1] else {
        panic!("expected material");
    };
    let instance = material.sprite.as_ref().unwrap();
    assert_eq!(instance.sprite, TagRef::new("TEX_SPRITE"));
    assert_eq!(instance.flags, 0x50);
    assert_eq!(material.brightness, 0.75);

    let Entity::Palette(palette) = &graph.entities[2] else {
        panic!("expected palette");
    };
    assert_eq!(palette.materials, [TagRef::new("FLOOR_MDF"), TagRef::new("FLOOR_MDF")]);
}

#[test]
fn test_zero_references_stay_empty() {
    let mut wld = Wld::new(false);
    let name_ref = wld.names.add("PLAIN_MDF");
    wld.push(
        MaterialDef {
            name_ref,
            simple_sprite_ref: 0,
            ..Default::default()
        }
        .into(),
    );
    let light_name = wld.names.add("LAMP_LDEF");
    wld.push(
        fragment::PointLight {
            name_ref: light_name,
            light_ref: 0,
            ..Default::default()
        }
        .into(),
    );
    let actor_name = wld.names.add("NOBODY");
    wld.push(
        fragment::Actor {
            name_ref: actor_name,
            actor_def_ref: 0,
            sphere_ref: 0,
            ..Default::default()
        }
        .into(),
    );

    let graph = decode(&wld).unwrap().graph;
    let [Entity::Material(material), Entity::PointLight(light), Entity::Actor(actor)] =
        graph.entities.as_slice()
    else {
        panic!("unexpected entities {:?}", graph.entities);
    };
    assert_eq!(material.sprite, None);
    assert_eq!(light.light, None);
    assert_eq!(actor.actor_def, None);
    assert_eq!(actor.sphere, None);
}

#[test]
fn test_forward_references_resolve() {
    let mut wld = Wld::new(true);
    let palette_name = wld.names.add("ZONE_MP");
    let material_name = wld.names.add("LATE_MDF");
    wld.push(
        MaterialPalette {
            name_ref: palette_name,
            flags: 0,
            materials: vec![3, 2],
        }
        .into(),
    );
    for rgb_pen in [1, 2] {
        wld.push(
            MaterialDef {
                name_ref: material_name,
                rgb_pen,
                ..Default::default()
            }
            .into(),
        );
    }

    let graph = decode(&wld).unwrap().graph;
    let Entity::Palette(palette) = &graph.entities[0] else {
        panic!("expected palette, got {:?}", graph.entities[0]);
    };
    assert_eq!(
        palette.materials,
        [TagRef::with_index("LATE_MDF", 1), TagRef::new("LATE_MDF")]
    );
    assert_eq!(graph.tag_ref(EntityId(2)), Some(TagRef::with_index("LATE_MDF", 1)));
}

#[test]
fn test_region_ambient_light_resolves_in_either_direction() {
    let mut wld = Wld::new(true);
    let light_name = wld.names.add("DEFAULT_AMBIENTLIGHT");
    let region_name = wld.names.add("R1_DMSPRITEDEF");
    let before = wld.push(
        GlobalAmbientLightDef {
            name_ref: light_name,
            color: [1, 2, 3, 4],
        }
        .into(),
    );
    for ambient_light_ref in [before as i32, 4] {
        wld.push(
            fragment::Region {
                name_ref: region_name,
                ambient_light_ref,
                ..Default::default()
            }
            .into(),
        );
    }
    wld.push(
        GlobalAmbientLightDef {
            name_ref: light_name,
            color: [5, 6, 7, 8],
        }
        .into(),
    );

    let graph = decode(&wld).unwrap().graph;
    let regions: Vec<_> = graph
        .entities
        .iter()
        .filter_map(|entity| match entity {
            Entity::Region(region) => Some(region.ambient_light.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        regions,
        [
            Some(TagRef::new("DEFAULT_AMBIENTLIGHT")),
            Some(TagRef::with_index("DEFAULT_AMBIENTLIGHT", 1)),
        ]
    );
}

#[test]
fn test_region_ambient_light_must_be_a_light() {
    let mut wld = Wld::new(true);
    wld.push(fragment::DmSpriteDef2::default().into());
    wld.push(
        fragment::Region {
            ambient_light_ref: 1,
            ..Default::default()
        }
        .into(),
    );

    let err = decode(&wld).unwrap_err();
    assert!(
        matches!(
            err.root(),
            WldError::UnexpectedFragment {
                position: 1,
                expected: "GlobalAmbientLightDef",
                found: "DmSpriteDef2",
            }
        ),
        "{err}"
    );
}

#[test]
fn test_binary_user_data_is_kept_as_bytes() {
    let mut wld = Wld::new(true);
    wld.push(
        fragment::Region {
            user_data: vec![0xFF, 0x41],
            ..Default::default()
        }
        .into(),
    );
    wld.push(
        fragment::Zone {
            user_data: Some(vec![0x80, 0x00, 0xC3]),
            ..Default::default()
        }
        .into(),
    );

    let graph = decode(&wld).unwrap().graph;
    let [Entity::Region(region), Entity::Zone(zone)] = graph.entities.as_slice() else {
        panic!("unexpected entities {:?}", graph.entities);
    };
    assert_eq!(region.user_data, [0xFF, 0x41]);
    assert_eq!(zone.user_data.as_deref(), Some(&[0x80, 0x00, 0xC3][..]));
}

#[test]
fn test_bitmap_name_must_be_text() {
    let mut wld = Wld::new(true);
    let frame = wld.push(
        BmInfo {
            name_ref: 0,
            files: vec![b"\xFFTEX.BMP\0".to_vec()],
        }
        .into(),
    );
    wld.push(
        SimpleSpriteDef {
            flags: 0x10,
            frames: vec![frame],
            ..Default::default()
        }
        .into(),
    );

    let err = decode(&wld).unwrap_err();
    assert!(
        matches!(err.root(), WldError::InvalidText { field: "bitmap file name" }),
        "{err}"
    );
    assert!(err.to_string().starts_with("fragment 2 (SimpleSpriteDef)"), "{err}");
}

#[test]
fn test_reference_to_wrong_kind_fails() {
    let mut wld = Wld::new(true);
    wld.push(GlobalAmbientLightDef::default().into());
    wld.push(
        MaterialPalette {
            name_ref: 0,
            flags: 0,
            materials: vec![1],
        }
        .into(),
    );

    let err = decode(&wld).unwrap_err();
    assert!(
        matches!(
            err.root(),
            WldError::UnexpectedFragment {
                position: 1,
                expected: "MaterialDef",
                found: "GlobalAmbientLightDef",
            }
        ),
        "{err}"
    );
}

#[test]
fn test_reference_past_end_fails() {
    let mut wld = Wld::new(true);
    wld.push(
        MaterialPalette {
            name_ref: 0,
            flags: 0,
            materials: vec![9],
        }
        .into(),
    );
    let err = decode(&wld).unwrap_err();
    assert!(
        matches!(err.root(), WldError::PositionOutOfRange { position: 9, count: 1 }),
        "{err}"
    );
}

#[test]
fn test_repeated_tags_get_occurrence_indices() {
    let mut wld = Wld::new(true);
    let name_ref = wld.names.add("DUP_MDF");
    wld.push(
        MaterialDef {
            name_ref,
            ..Default::default()
        }
        .into(),
    );
    let second = wld.push(
        MaterialDef {
            name_ref,
            rgb_pen: 7,
            ..Default::default()
        }
        .into(),
    );
    wld.push(
        MaterialPalette {
            name_ref: 0,
            flags: 0,
            materials: vec![second],
        }
        .into(),
    );

    let graph = decode(&wld).unwrap().graph;
    let Entity::Palette(palette) = &graph.entities[2] else {
        panic!("expected palette");
    };
    assert_eq!(palette.materials, [TagRef::with_index("DUP_MDF", 1)]);
    assert_eq!(graph.tag_ref(EntityId(1)), Some(TagRef::with_index("DUP_MDF", 1)));
}

#[test]
fn test_actor_definition_by_name_and_by_position() {
    let mut wld = Wld::new(true);
    let def_name = wld.names.add("ELF_ACTORDEF");
    let def = wld.push(
        fragment::ActorDef {
            name_ref: def_name,
            ..Default::default()
        }
        .into(),
    );
    let sphere_name = wld.names.add("ELF_SPH");
    let sphere = wld.push(
        Sphere {
            name_ref: sphere_name,
            radius: 2.5,
        }
        .into(),
    );
    wld.push(
        fragment::Actor {
            actor_def_ref: def as i32,
            sphere_ref: sphere,
            ..Default::default()
        }
        .into(),
    );
    let remote = wld.names.add("ORC_ACTORDEF");
    wld.push(
        fragment::Actor {
            actor_def_ref: remote,
            ..Default::default()
        }
        .into(),
    );

    let graph = decode(&wld).unwrap().graph;
    let Entity::Actor(placed) = &graph.entities[1] else {
        panic!("expected actor");
    };
    assert_eq!(
        placed.actor_def,
        Some(ActorDefRef::Def(TagRef::new("ELF_ACTORDEF")))
    );
    assert_eq!(
        placed.sphere,
        Some(SphereInstance {
            tag: "ELF_SPH".into(),
            radius: 2.5,
        })
    );
    let Entity::Actor(remote) = &graph.entities[2] else {
        panic!("expected actor");
    };
    assert_eq!(remote.actor_def, Some(ActorDefRef::Name("ORC_ACTORDEF".into())));
}

#[test]
fn test_non_mesh_actor_sprites_keep_their_position() {
    let mut wld = Wld::new(true);
    let opaque = wld.push(
        Opaque {
            code: 0x08,
            body: vec![0; 4],
        }
        .into(),
    );
    wld.push(
        fragment::ActorDef {
            sprites: vec![opaque],
            ..Default::default()
        }
        .into(),
    );

    let Decoded { graph, report } = decode(&wld).unwrap();
    let Entity::ActorDef(def) = &graph.entities[0] else {
        panic!("expected actor def");
    };
    assert_eq!(def.sprites, [ActorSprite::Position(1)]);
    assert_eq!(
        report.skipped,
        [SkippedFragment {
            position: 1,
            code: 0x08,
            kind: "Sprite3DDef",
        }]
    );
}

#[test]
fn test_tree_node_regions_become_tags() {
    let mut wld = Wld::new(true);
    wld.push(
        fragment::WorldTree {
            name_ref: 0,
            nodes: vec![
                WorldTreeNode {
                    front: 2,
                    ..Default::default()
                },
                WorldTreeNode {
                    region: 12,
                    ..Default::default()
                },
            ],
        }
        .into(),
    );

    let graph = decode(&wld).unwrap().graph;
    let Entity::WorldTree(tree) = &graph.entities[0] else {
        panic!("expected world tree");
    };
    assert_eq!(tree.nodes[0].region, None);
    assert_eq!(tree.nodes[1].region.as_deref(), Some("R000012"));
}

#[test]
fn test_negative_tree_node_region_fails() {
    let mut wld = Wld::new(true);
    wld.push(
        fragment::WorldTree {
            name_ref: 0,
            nodes: vec![WorldTreeNode {
                region: -3,
                ..Default::default()
            }],
        }
        .into(),
    );
    let err = decode(&wld).unwrap_err();
    assert!(matches!(err.root(), WldError::ValueOutOfRange { value: -3, .. }), "{err}");
}

#[test]
fn test_unreferenced_instances_are_reported() {
    let mut wld = Wld::new(true);
    wld.push(Sphere::default().into());
    wld.push(Light::default().into());

    let Decoded { graph, report } = decode(&wld).unwrap();
    assert!(graph.is_empty());
    assert_eq!(report.unreferenced, [1, 2]);
}

#[test]
fn test_track_tags_are_classified() {
    let mut wld = Wld::new(true);
    let def_name = wld.names.add("C01HUMCH_TRACKDEF");
    let def = wld.push(
        fragment::TrackDef {
            name_ref: def_name,
            ..Default::default()
        }
        .into(),
    );
    let name_ref = wld.names.add("HUMCH_TRACK");
    wld.push(
        fragment::Track {
            name_ref,
            track_def_ref: def as i32,
            ..Default::default()
        }
        .into(),
    );

    let graph = decode(&wld).unwrap().graph;
    let Entity::TrackDef(track_def) = &graph.entities[0] else {
        panic!("expected track def");
    };
    let sequence = track_def.sequence.as_ref().unwrap();
    assert_eq!((sequence.animation.as_str(), sequence.model.as_str()), ("C01", "HUM"));

    let Entity::TrackInstance(track) = &graph.entities[1] else {
        panic!("expected track");
    };
    assert_eq!(track.track, TagRef::new("C01HUMCH_TRACKDEF"));
    assert_eq!(track.sequence, None);
}

#[test]
fn test_mesh_vertices_are_dequantized() {
    let mut wld = Wld::new(false);
    wld.push(
        fragment::DmSpriteDef2 {
            scale: 4,
            vertices: vec![[16, -32, 8]],
            uvs: MeshUvs::Legacy(vec![[256, 128]]),
            normals: vec![[64, 0, -128]],
            ..Default::default()
        }
        .into(),
    );

    let graph = decode(&wld).unwrap().graph;
    let Entity::Mesh(mesh) = &graph.entities[0] else {
        panic!("expected mesh");
    };
    assert_eq!(mesh.vertices, [Vec3::new(1.0, -2.0, 0.5)]);
    assert_eq!(mesh.uvs, [Vec2::new(1.0, 0.5)]);
    assert_eq!(mesh.normals, [Vec3::new(0.5, 0.0, -1.0)]);
    assert_eq!(mesh.palette, None);
}

#[test]
fn test_mesh_scale_past_exact_range_fails() {
    let mut wld = Wld::new(true);
    wld.push(
        fragment::DmSpriteDef2 {
            scale: MAX_VERTEX_SCALE + 1,
            vertices: vec![[1, -5, 300]],
            ..Default::default()
        }
        .into(),
    );

    let err = decode(&wld).unwrap_err();
    assert!(
        matches!(
            err.root(),
            WldError::ValueOutOfRange {
                field: "mesh vertex scale",
                value: 150,
            }
        ),
        "{err}"
    );
}
