//! Whole-container round trips through bytes and the symbolic graph

use glam::{Vec2, Vec3};
use nether_wld::decode::{self, sequence};
use nether_wld::encode;
use nether_wld::fragment::{
    self, ActorAction, Location, MeshFace, MeshOp, TrackFrame, VisList, VisNode, Wall,
};
use nether_wld::hash;
use nether_wld::model::{
    Actor, ActorDef, ActorDefRef, ActorSprite, AmbientLight, GlobalAmbientLight, LightDef,
    LightInstance, Material, Mesh, Palette, PointLight, Region, SphereInstance, SpriteDef,
    SpriteFrame, SpriteInstance, TrackDef, TrackInstance, TreeNode, WorldTree, Zone,
};
use nether_wld::{
    FragmentRegistry, ReadOptions, TagRef, VERSION_NEW_WORLD, WLD_MAGIC, Wld, WorldGraph,
};

fn parse(bytes: &[u8]) -> Wld {
    let (wld, report) =
        Wld::parse(bytes, &FragmentRegistry::new(), &ReadOptions::default()).unwrap();
    assert!(report.is_clean(), "{report:?}");
    wld
}

fn track_def(tag: &str) -> TrackDef {
    TrackDef {
        tag: tag.into(),
        flags: 0,
        frames: vec![TrackFrame {
            rotate_denominator: 16384,
            rotation: [0, 100, -100],
            shift_denominator: 256,
            shift: [512, 0, -3000],
        }],
        sequence: sequence::classify(tag),
    }
}

/// A zone using every entity kind, pushed in the order the encoder emits it so
/// that decoding rebuilds the identical arena. Gating flag bits match the
/// fields present.
fn zone_graph(is_new_world: bool) -> WorldGraph {
    let mut graph = WorldGraph::new(is_new_world);
    graph.push(GlobalAmbientLight {
        tag: "DEFAULT_AMBIENT".into(),
        color: [10, 20, 30, 255],
    });

    graph.push(SpriteDef {
        tag: "GRASS_SPRITE".into(),
        flags: 0x18,
        current_frame: None,
        sleep: Some(100),
        frames: vec![
            SpriteFrame {
                tag: "GRASS1".into(),
                files: vec!["grass1.bmp".into()],
            },
            SpriteFrame {
                tag: "GRASS2".into(),
                files: vec!["grass2.bmp".into(), "grass2_alpha.bmp".into()],
            },
        ],
    });
    graph.push(Material {
        tag: "GRASS_MDF".into(),
        flags: 0x02,
        render_method: 0x8000_0001,
        rgb_pen: 0xFFB2_B2B2,
        brightness: 0.0,
        scaled_ambient: 0.75,
        sprite: Some(SpriteInstance {
            tag: String::new(),
            flags: 0x50,
            sprite: TagRef::new("GRASS_SPRITE"),
        }),
        pairs: Some((0, 1.0)),
    });
    graph.push(Material {
        tag: "BLACK_MDF".into(),
        flags: 0x01,
        ..Default::default()
    });
    graph.push(Palette {
        tag: "ZONE_MP".into(),
        flags: 0,
        materials: vec![TagRef::new("GRASS_MDF"), TagRef::new("BLACK_MDF")],
    });

    let uvs = if is_new_world {
        vec![Vec2::new(0.1, 0.9), Vec2::new(1.5, -0.25), Vec2::new(0.0, 0.0)]
    } else {
        vec![Vec2::new(0.125, 0.5), Vec2::new(1.5, -0.25), Vec2::new(0.0, 0.0)]
    };
    graph.push(Mesh {
        tag: "R1_DMSPRITEDEF".into(),
        flags: 0x0001_8003,
        palette: Some(TagRef::new("ZONE_MP")),
        center: Vec3::new(100.0, -20.0, 4.0),
        bounding_radius: 64.0,
        bbox_min: Vec3::new(-10.0, -10.0, 0.0),
        bbox_max: Vec3::new(10.0, 10.0, 8.0),
        scale: 6,
        vertices: vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.5, -0.25, 2.0),
            Vec3::new(-8.0, 7.984375, 0.015625),
        ],
        uvs,
        normals: vec![Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.5, 0.5, 0.0), Vec3::ZERO],
        colors: vec![[255, 0, 0, 255]; 3],
        faces: vec![MeshFace {
            flags: 0,
            indices: [0, 1, 2],
        }],
        face_material_groups: vec![[1, 0]],
        vertex_material_groups: vec![[3, 0]],
        mesh_ops: vec![
            MeshOp::Indices {
                index1: 0,
                index2: 1,
                param1: 0,
                op_type: 1,
            },
            MeshOp::Offset {
                offset: 0.5,
                param1: 2,
            },
        ],
        ..Default::default()
    });
    graph.push(Mesh {
        tag: "ELF_DMSPRITEDEF".into(),
        scale: 0,
        vertices: vec![Vec3::new(3.0, 4.0, 5.0)],
        ..Default::default()
    });

    graph.push(track_def("C01ELF_TRACKDEF"));
    graph.push(track_def("ELF_TRACKDEF"));
    graph.push(TrackInstance {
        tag: "C01ELF_TRACK".into(),
        track: TagRef::new("C01ELF_TRACKDEF"),
        flags: 0x05,
        sleep: Some(50),
        sequence: sequence::classify("C01ELF_TRACK"),
    });

    graph.push(ActorDef {
        tag: "ELF_ACTORDEF".into(),
        flags: 0x02,
        callback: "SPRITECALLBACK".into(),
        bounds_ref: 0,
        current_action: None,
        location: Some(Location {
            offset: [0.0, 0.0, 1.0],
            rotation: [0.0, 90.0, 0.0],
            unknown: 0,
        }),
        actions: vec![ActorAction {
            unknown: 0,
            lods: vec![1.0e30],
        }],
        sprites: vec![ActorSprite::Mesh {
            tag: "ELF_DMSPRITE".into(),
            params: 0,
            mesh: TagRef::new("ELF_DMSPRITEDEF"),
        }],
        user_data: b"elf".to_vec(),
    });

    graph.push(LightDef {
        tag: "TORCH_LDEF".into(),
        flags: 0x15,
        frame_count: 2,
        current_frame: Some(1),
        sleep: None,
        levels: Some(vec![1.0, 0.5]),
        colors: Some(vec![[1.0, 0.5, 0.25], [1.0, 1.0, 1.0]]),
    });
    graph.push(PointLight {
        tag: "TORCH_PL".into(),
        flags: 0x20,
        light: Some(LightInstance {
            tag: "TORCH_L".into(),
            flags: 0,
            light: TagRef::new("TORCH_LDEF"),
        }),
        location: Vec3::new(12.0, -4.5, 30.0),
        radius: 100.0,
    });

    graph.push(WorldTree {
        tag: String::new(),
        nodes: vec![
            TreeNode {
                plane: [0.0, 0.0, 1.0, -10.0],
                region: None,
                front: 2,
                back: 3,
            },
            TreeNode {
                region: Some("R000001".into()),
                ..Default::default()
            },
            TreeNode {
                region: Some("R000002".into()),
                ..Default::default()
            },
        ],
    });

    graph.push(Region {
        tag: "R000001".into(),
        flags: 0x181,
        region_vertices: vec![Vec3::new(1.0, 2.0, 3.0)],
        proximals: vec![Vec2::new(0.5, 0.25)],
        walls: vec![Wall {
            vertices: vec![0, 1, 2],
            ..Default::default()
        }],
        vis_nodes: vec![VisNode {
            plane: [1.0, 0.0, 0.0, 4.0],
            vis_list_index: 1,
            front: 0,
            back: 0,
        }],
        vis_lists: vec![VisList {
            ranges: vec![0, 1, 2],
        }],
        sphere: Some([0.0, 0.0, 0.0, 50.0]),
        user_data: vec![0xFF, 0x41, 0x00],
        ambient_light: Some(TagRef::new("DEFAULT_AMBIENT")),
        mesh: Some(TagRef::new("R1_DMSPRITEDEF")),
        ..Default::default()
    });
    graph.push(Region {
        tag: "R000002".into(),
        flags: 0x06,
        reverb_volume: Some(0.5),
        reverb_offset: Some(-2),
        ..Default::default()
    });

    graph.push(AmbientLight {
        tag: "AMBIENT".into(),
        flags: 0,
        light: Some(LightInstance {
            tag: "AMBIENT_L".into(),
            flags: 0,
            light: TagRef::new("TORCH_LDEF"),
        }),
        regions: vec![0, 1],
    });

    graph.push(Actor {
        tag: "ELF01".into(),
        flags: 0x2E,
        actor_def: Some(ActorDefRef::Def(TagRef::new("ELF_ACTORDEF"))),
        sphere: Some(SphereInstance {
            tag: "ELF01_SPH".into(),
            radius: 3.0,
        }),
        current_action: None,
        location: Some(Location::default()),
        bounding_radius: Some(4.0),
        scale: Some(1.0),
        sound: None,
        dm_rgb_track_ref: 0,
    });
    graph.push(Actor {
        tag: "PLAYER".into(),
        actor_def: Some(ActorDefRef::Name("HUM_ACTORDEF".into())),
        ..Default::default()
    });

    graph.push(Zone {
        tag: "WATER_ZONE".into(),
        flags: 0,
        regions: vec![1],
        user_data: Some(b"WTN__01521000000000000000000000___000000000000".to_vec()),
    });
    graph.push(Zone {
        tag: "EMPTY_ZONE".into(),
        flags: 0,
        regions: vec![],
        user_data: None,
    });
    graph
}

fn assert_graph_round_trip(graph: &WorldGraph) {
    let bytes = encode::encode(graph).unwrap().to_bytes().unwrap();

    let wld = parse(&bytes);
    assert_eq!(wld.to_bytes().unwrap(), bytes, "container rewrite changed bytes");

    let decoded = decode::decode(&wld).unwrap();
    assert!(decoded.report.skipped.is_empty());
    assert!(decoded.report.unreferenced.is_empty());
    assert_eq!(&decoded.graph, graph);

    let again = encode::encode(&decoded.graph).unwrap().to_bytes().unwrap();
    assert_eq!(again, bytes, "graph round trip changed bytes");
}

#[test]
fn test_new_world_graph_round_trip() {
    assert_graph_round_trip(&zone_graph(true));
}

#[test]
fn test_old_world_graph_round_trip() {
    assert_graph_round_trip(&zone_graph(false));
}

#[test]
fn test_encoded_header_counts() {
    let wld = encode::encode(&zone_graph(true)).unwrap();
    assert_eq!(wld.header.region_count, 2);
    assert_eq!(wld.header.string_count as usize, wld.names.string_count());

    let bytes = wld.to_bytes().unwrap();
    assert_eq!(&bytes[..4], WLD_MAGIC);
    assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), VERSION_NEW_WORLD);
    assert_eq!(
        u32::from_le_bytes(bytes[8..12].try_into().unwrap()) as usize,
        wld.len()
    );
}

/// Hand-built container: an unknown record, a record kind without a typed
/// codec, non-zero padding and a stale header field
fn raw_container() -> Vec<u8> {
    let names = hash::obfuscate(b"\0TEX1\0");
    let mut records: Vec<(u32, Vec<u8>)> = Vec::new();

    // BMInfo "TEX1" with one 7-byte file name, padded with junk
    let mut bm_info = Vec::new();
    bm_info.extend_from_slice(&(-1i32).to_le_bytes());
    bm_info.extend_from_slice(&0i32.to_le_bytes());
    bm_info.extend_from_slice(&7u16.to_le_bytes());
    bm_info.extend_from_slice(&hash::obfuscate(b"a.bmp\0\0"));
    bm_info.extend_from_slice(&[0xAB, 0xCD, 0xEF]);
    records.push((0x03, bm_info));

    // Sprite3DDef has no typed codec
    records.push((0x08, vec![1, 2, 3, 4, 5, 6, 7, 8]));
    // 0x40 is not a known code at all
    records.push((0x40, vec![0xFF; 5]));

    let mut out = Vec::new();
    out.extend_from_slice(WLD_MAGIC);
    out.extend_from_slice(&VERSION_NEW_WORLD.to_le_bytes());
    out.extend_from_slice(&(records.len() as u32).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    // Stale max fragment size is written back as stored
    out.extend_from_slice(&999u32.to_le_bytes());
    out.extend_from_slice(&(names.len() as u32).to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&names);
    for (code, payload) in &records {
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&code.to_le_bytes());
        out.extend_from_slice(payload);
    }
    out
}

#[test]
fn test_raw_container_is_rewritten_byte_exact() {
    let bytes = raw_container();
    let (wld, report) =
        Wld::parse(&bytes, &FragmentRegistry::new(), &ReadOptions::default()).unwrap();
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].position, 3);
    assert_eq!(wld.len(), 3);
    assert_eq!(wld.to_bytes().unwrap(), bytes);

    let decoded = decode::decode(&wld).unwrap();
    assert!(decoded.graph.is_empty());
    let skipped: Vec<_> = decoded.report.skipped.iter().map(|s| s.position).collect();
    assert_eq!(skipped, [2, 3]);
    assert_eq!(decoded.report.unreferenced, [1]);
}

#[test]
fn test_graph_json_round_trip() {
    let graph = zone_graph(true);
    let json = serde_json::to_string_pretty(&graph).unwrap();
    let back: WorldGraph = serde_json::from_str(&json).unwrap();
    assert_eq!(back, graph);
    assert_eq!(
        encode::encode(&back).unwrap().to_bytes().unwrap(),
        encode::encode(&graph).unwrap().to_bytes().unwrap()
    );
}

#[test]
fn test_region_ambient_light_survives_reordering() {
    // The mesh comes first here but the encoder emits ambient lights first
    let mut wld = Wld::new(true);
    wld.push(fragment::DmSpriteDef2::default().into());
    let light_name = wld.names.add("DEFAULT_AMBIENT");
    wld.push(
        fragment::GlobalAmbientLightDef {
            name_ref: light_name,
            color: [1, 2, 3, 4],
        }
        .into(),
    );
    let region_name = wld.names.add("R000001");
    wld.push(
        fragment::Region {
            name_ref: region_name,
            ambient_light_ref: 2,
            user_data: vec![0xFF, 0x41],
            ..Default::default()
        }
        .into(),
    );
    wld.refresh_header().unwrap();
    let bytes = wld.to_bytes().unwrap();

    let decoded = decode::decode(&parse(&bytes)).unwrap();
    let rebuilt = parse(&encode::encode(&decoded.graph).unwrap().to_bytes().unwrap());

    let (position, region) = rebuilt
        .positions()
        .find_map(|(position, slot)| match slot.fragment() {
            Some(fragment::Fragment::Region(region)) => Some((position, region.clone())),
            _ => None,
        })
        .unwrap();
    assert_eq!(position, 3);
    assert_eq!(region.user_data, [0xFF, 0x41]);
    let light = rebuilt.fragment(region.ambient_light_ref as u32).unwrap();
    let fragment::Fragment::GlobalAmbientLightDef(light) = light else {
        panic!("ambient light ref points at {}", light.kind_name());
    };
    assert_eq!(light.color, [1, 2, 3, 4]);
    assert_eq!(rebuilt.names.name(light.name_ref).unwrap(), "DEFAULT_AMBIENT");
}
