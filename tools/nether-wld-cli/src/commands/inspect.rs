//! Record listing

use anyhow::Result;
use nether_wld::{ReadOptions, Wld};
use std::fmt::Write;
use std::path::Path;

/// One line of the listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSummary {
    pub position: u32,
    pub code: u32,
    pub kind: &'static str,
    /// Payload size in bytes
    pub size: usize,
    /// Empty for records named by position or not at all
    pub tag: String,
    pub skipped: bool,
}

/// List every position of a parsed container
pub fn summarize(wld: &Wld) -> Result<Vec<RecordSummary>> {
    let is_new_world = wld.is_new_world();
    wld.positions()
        .map(|(position, slot)| -> Result<RecordSummary> {
            let name_ref = slot.name_ref();
            let tag = if name_ref < 0 {
                wld.names.name(name_ref).unwrap_or("<invalid name>").to_owned()
            } else {
                String::new()
            };
            Ok(RecordSummary {
                position,
                code: slot.code(),
                kind: slot.kind_name(),
                size: slot.to_payload(is_new_world)?.len(),
                tag,
                skipped: slot.fragment().is_none(),
            })
        })
        .collect()
}

/// Render the listing as text
pub fn render(wld: &Wld, records: &[RecordSummary]) -> String {
    let header = &wld.header;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} world, {} records, {} regions, {} names, largest record {} bytes",
        if wld.is_new_world() { "new" } else { "old" },
        header.fragment_count,
        header.region_count,
        header.string_count,
        header.max_fragment_size
    );
    for record in records {
        let _ = writeln!(
            out,
            "{:>6}  0x{:02X}  {:<22} {:>8}  {}{}",
            record.position,
            record.code,
            record.kind,
            record.size,
            record.tag,
            if record.skipped { "  (skipped)" } else { "" }
        );
    }
    out
}

/// Parse `input` and render its listing
pub fn inspect_file(input: &Path, options: &ReadOptions) -> Result<String> {
    let (wld, _) = super::read_container(input, options)?;
    let records = summarize(&wld)?;
    Ok(render(&wld, &records))
}
