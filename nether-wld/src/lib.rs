//! Nether-WLD: WLD fragment container codec for Nethercore
//!
//! This crate converts between the binary WLD container and a symbolic,
//! tag-addressed scene graph. The binary side is a flat list of typed records
//! ("fragments") that reference each other by 1-based container position and
//! share one obfuscated string table. The symbolic side is an arena of entities
//! that reference each other by tag.
//!
//! # Key Features
//!
//! - **Byte-exact**: an unmodified container writes back bit for bit, including
//!   padding contents, unknown flag bits and records the registry cannot decode
//! - **Bounded reads**: declared counts are checked against the remaining bytes
//!   before anything is allocated
//! - **Leaf-first encoding**: every entity is emitted once, after everything it
//!   references, with cycle detection
//! - **Single-pass decoding**: instance records are folded into the entities
//!   that use them
//!
//! # Layers
//!
//! - [`container`]: header, record envelopes, skipped-record tolerance
//! - [`fragment`]: per-kind payload codecs and the type-code registry
//! - [`model`]: the symbolic graph
//! - [`encode`] / [`decode`]: translation between the two
//!
//! # Usage
//!
//! ```ignore
//! use nether_wld::{FragmentRegistry, ReadOptions, Wld, decode, encode};
//!
//! let bytes = std::fs::read("gfaydark.wld").unwrap();
//! let registry = FragmentRegistry::new();
//! let (wld, report) = Wld::parse(&bytes, &registry, &ReadOptions::default()).unwrap();
//! println!("{} records, {} skipped", wld.len(), report.skipped.len());
//!
//! let graph = decode::decode(&wld).unwrap().graph;
//! let rebuilt = encode::encode(&graph).unwrap().to_bytes().unwrap();
//! ```

pub mod container;
pub mod cursor;
pub mod decode;
pub mod encode;
mod error;
pub mod fragment;
pub mod hash;
pub mod model;
pub mod name_pool;
pub mod quantize;

pub use container::{ReadOptions, ScanReport, Slot, Wld, WldHeader};
pub use error::{Result, WldError};
pub use fragment::{Fragment, FragmentCodec, FragmentRegistry};
pub use model::{Entity, EntityId, EntityKind, TagRef, WorldGraph};
pub use name_pool::NamePool;

// =============================================================================
// Constants
// =============================================================================

/// Container magic bytes
pub const WLD_MAGIC: &[u8; 4] = &[0x02, 0x3D, 0x50, 0x54];

/// Version word of old-world containers (i16 texture coordinates)
pub const VERSION_OLD_WORLD: u32 = 0x0001_5500;

/// Version word of new-world containers (f32 texture coordinates)
pub const VERSION_NEW_WORLD: u32 = 0x1000_C800;
