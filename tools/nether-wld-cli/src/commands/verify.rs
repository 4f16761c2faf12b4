//! Round-trip verification
//!
//! Two checks: the parsed container writes back to the same bytes, and the
//! decoded graph survives encode, write, parse and decode unchanged. A graph
//! that cannot be encoded fails the second check instead of the whole run.

use anyhow::{Context, Result};
use nether_wld::decode::decode;
use nether_wld::{ReadOptions, WorldGraph};
use nether_wld::encode::encode;
use serde::Serialize;
use std::path::Path;

use super::parse_container;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verification {
    pub records: usize,
    pub entities: usize,
    /// Offset of the first differing byte when the rewrite is not exact
    pub first_difference: Option<usize>,
    pub graph_round_trip: bool,
    /// Why the graph round trip failed
    pub graph_error: Option<String>,
}

impl Verification {
    pub fn byte_exact(&self) -> bool {
        self.first_difference.is_none()
    }

    pub fn passed(&self) -> bool {
        self.byte_exact() && self.graph_round_trip
    }
}

/// Verify an in-memory container
pub fn verify_bytes(bytes: &[u8], options: &ReadOptions) -> Result<Verification> {
    let (wld, _) = parse_container(bytes, options)?;
    let rewritten = wld.to_bytes().context("Failed to rewrite container")?;
    let first_difference = first_difference(bytes, &rewritten);
    if let Some(offset) = first_difference {
        tracing::warn!("Rewrite differs from input at byte {}", offset);
    }

    let graph = decode(&wld).context("Failed to decode container")?.graph;
    let graph_error = match round_trip_graph(&graph, options) {
        Ok(true) => None,
        Ok(false) => Some("graph changed across encode and decode".to_owned()),
        Err(err) => Some(format!("{err:#}")),
    };
    if let Some(reason) = &graph_error {
        tracing::warn!("Graph round trip failed: {}", reason);
    }

    Ok(Verification {
        records: wld.len(),
        entities: graph.len(),
        first_difference,
        graph_round_trip: graph_error.is_none(),
        graph_error,
    })
}

/// Encode, write, parse and decode `graph`; true when it comes back unchanged
fn round_trip_graph(graph: &WorldGraph, options: &ReadOptions) -> Result<bool> {
    let encoded = encode(graph)
        .context("Failed to encode decoded graph")?
        .to_bytes()
        .context("Failed to write encoded graph")?;
    let (reparsed, _) = parse_container(&encoded, options)?;
    let redecoded = decode(&reparsed)
        .context("Failed to decode re-encoded container")?
        .graph;
    Ok(&redecoded == graph)
}

/// Verify a container file
pub fn verify_file(input: &Path, options: &ReadOptions) -> Result<Verification> {
    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to read WLD: {}", input.display()))?;
    verify_bytes(&bytes, options).with_context(|| format!("Failed to verify {}", input.display()))
}

fn first_difference(a: &[u8], b: &[u8]) -> Option<usize> {
    match a.iter().zip(b).position(|(x, y)| x != y) {
        Some(offset) => Some(offset),
        None if a.len() != b.len() => Some(a.len().min(b.len())),
        None => None,
    }
}
