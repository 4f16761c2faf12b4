//! Subcommand implementations
//!
//! Each command takes plain paths and options so it can be driven from the
//! binary or from tests.

pub mod convert;
pub mod inspect;
pub mod verify;

pub use convert::{DecodeSummary, decode_file, encode_file};
pub use inspect::{RecordSummary, inspect_file, render, summarize};
pub use verify::{Verification, verify_bytes, verify_file};

use anyhow::{Context, Result};
use nether_wld::{FragmentRegistry, ReadOptions, ScanReport, Wld};
use serde::Serialize;
use std::path::Path;

/// Read and parse a container file
pub fn read_container(path: &Path, options: &ReadOptions) -> Result<(Wld, ScanReport)> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read WLD: {}", path.display()))?;
    parse_container(&bytes, options).with_context(|| format!("Failed to parse WLD: {}", path.display()))
}

pub(crate) fn parse_container(bytes: &[u8], options: &ReadOptions) -> Result<(Wld, ScanReport)> {
    let registry = FragmentRegistry::new();
    let (wld, report) = Wld::parse(bytes, &registry, options)?;
    log_scan_report(&report);
    Ok((wld, report))
}

fn log_scan_report(report: &ScanReport) {
    for skipped in &report.skipped {
        tracing::warn!(
            "Record {} (code 0x{:02X}, {} bytes) kept undecoded: {:?}",
            skipped.position,
            skipped.code,
            skipped.size,
            skipped.reason
        );
    }
    if let Some((header, pool)) = report.name_count_mismatch {
        tracing::warn!("Header declares {} names, pool holds {}", header, pool);
    }
    if let Some((header, found)) = report.region_count_mismatch {
        tracing::warn!("Header declares {} regions, found {}", header, found);
    }
    if !report.trailing.is_empty() {
        tracing::debug!("{} records carry trailing bytes", report.trailing.len());
    }
}

/// Serialize `value` as JSON into `path`
pub fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Failed to serialize JSON")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
