//! Container <-> JSON graph conversion

use anyhow::{Context, Result};
use nether_wld::decode::{DecodeReport, decode};
use nether_wld::encode::encode;
use nether_wld::{ReadOptions, ScanReport, WorldGraph};
use serde::Serialize;
use std::path::Path;

use super::{read_container, write_json};

/// What `decode` left out, written with `--report`
#[derive(Debug, Serialize)]
pub struct DecodeSummary {
    pub entities: usize,
    pub scan: ScanReport,
    pub decode: DecodeReport,
}

/// Decode a container into a JSON graph
pub fn decode_file(
    input: &Path,
    output: &Path,
    report: Option<&Path>,
    options: &ReadOptions,
    pretty: bool,
) -> Result<DecodeSummary> {
    let (wld, scan) = read_container(input, options)?;
    let decoded = decode(&wld).with_context(|| format!("Failed to decode {}", input.display()))?;

    write_json(output, &decoded.graph, pretty)?;

    let summary = DecodeSummary {
        entities: decoded.graph.len(),
        scan,
        decode: decoded.report,
    };
    if let Some(path) = report {
        write_json(path, &summary, pretty)?;
    }
    tracing::info!(
        "Decoded {} entities ({} skipped, {} unreferenced)",
        summary.entities,
        summary.decode.skipped.len(),
        summary.decode.unreferenced.len()
    );
    Ok(summary)
}

/// Encode a JSON graph into a container; returns the container size
pub fn encode_file(input: &Path, output: &Path) -> Result<usize> {
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read graph: {}", input.display()))?;
    let graph: WorldGraph = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse graph JSON: {}", input.display()))?;

    let wld = encode(&graph).context("Failed to encode graph")?;
    let bytes = wld.to_bytes().context("Failed to write container")?;
    std::fs::write(output, &bytes)
        .with_context(|| format!("Failed to write WLD: {}", output.display()))?;

    tracing::info!(
        "Encoded {} entities into {} records ({} bytes)",
        graph.len(),
        wld.len(),
        bytes.len()
    );
    Ok(bytes.len())
}
