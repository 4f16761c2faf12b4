//! WLD container: header, record envelope scan and writer
//!
//! A container is a header, the obfuscated name pool and a flat list of
//! records. Each record is `u32 size`, `u32 code` and `size` payload bytes.
//! Records are addressed by 1-based position; position 0 is the null
//! reference and is never stored.

use serde::{Deserialize, Serialize};

use crate::cursor::{PaddingBytes, WldReader, WldWriter};
use crate::error::{Result, WldError};
use crate::fragment::{Fragment, FragmentRegistry, fragment_name};
use crate::name_pool::NamePool;
use crate::{VERSION_NEW_WORLD, VERSION_OLD_WORLD, WLD_MAGIC};

/// Fixed header size before the name blob
pub const HEADER_SIZE: usize = 28;

/// Record envelope size (size + code)
pub const ENVELOPE_SIZE: usize = 8;

// =============================================================================
// Header
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WldHeader {
    pub version: u32,
    pub fragment_count: u32,
    /// Number of Region records
    pub region_count: u32,
    /// Largest record payload
    pub max_fragment_size: u32,
    /// Length of the obfuscated name blob
    pub hash_size: u32,
    /// Number of non-empty names in the pool
    pub string_count: u32,
}

impl WldHeader {
    pub fn new(is_new_world: bool) -> Self {
        Self {
            version: if is_new_world {
                VERSION_NEW_WORLD
            } else {
                VERSION_OLD_WORLD
            },
            fragment_count: 0,
            region_count: 0,
            max_fragment_size: 0,
            hash_size: 0,
            string_count: 0,
        }
    }

    /// Parse and validate the fixed header at the start of `data`
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = WldReader::new(data, false);

        if reader.read_bytes(4)? != WLD_MAGIC {
            return Err(WldError::InvalidMagic);
        }

        let version = reader.read_u32()?;
        if version != VERSION_OLD_WORLD && version != VERSION_NEW_WORLD {
            return Err(WldError::UnsupportedVersion(version));
        }

        Ok(Self {
            version,
            fragment_count: reader.read_u32()?,
            region_count: reader.read_u32()?,
            max_fragment_size: reader.read_u32()?,
            hash_size: reader.read_u32()?,
            string_count: reader.read_u32()?,
        })
    }

    pub fn is_new_world(&self) -> bool {
        self.version == VERSION_NEW_WORLD
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(WLD_MAGIC);
        for field in [
            self.version,
            self.fragment_count,
            self.region_count,
            self.max_fragment_size,
            self.hash_size,
            self.string_count,
        ] {
            out.extend_from_slice(&field.to_le_bytes());
        }
    }
}

// =============================================================================
// Raw envelope scan
// =============================================================================

/// One record envelope, payload not yet decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord<'a> {
    pub position: u32,
    pub code: u32,
    pub payload: &'a [u8],
}

impl RawRecord<'_> {
    pub fn kind_name(&self) -> &'static str {
        fragment_name(self.code).unwrap_or("Unknown")
    }

    /// Leading name reference, if the payload carries one
    pub fn name_ref(&self) -> i32 {
        self.payload
            .get(..4)
            .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .unwrap_or(0)
    }
}

/// Container split into header, name blob and record envelopes
#[derive(Debug, Clone)]
pub struct RawContainer<'a> {
    pub header: WldHeader,
    /// Obfuscated name blob
    pub names: &'a [u8],
    pub records: Vec<RawRecord<'a>>,
    /// Bytes after the last declared record
    pub tail: &'a [u8],
}

impl<'a> RawContainer<'a> {
    /// Walk the header and every record envelope without decoding payloads
    pub fn scan(data: &'a [u8]) -> Result<Self> {
        let header = WldHeader::parse(data)?;
        let mut reader = WldReader::new(data, header.is_new_world());
        reader.read_bytes(HEADER_SIZE)?;
        let names = reader.read_bytes(header.hash_size as usize)?;

        let count = header.fragment_count as usize;
        let mut records = Vec::with_capacity(count.min(reader.remaining() / ENVELOPE_SIZE));
        for index in 0..header.fragment_count {
            let position = index + 1;
            let record = Self::read_envelope(&mut reader, position)?;
            tracing::debug!(
                position,
                code = record.code,
                size = record.payload.len(),
                "scanned {}",
                record.kind_name()
            );
            records.push(record);
        }

        let tail = reader.rest();
        if !tail.is_empty() {
            tracing::warn!(bytes = tail.len(), "data after the last declared record");
        }

        Ok(Self {
            header,
            names,
            records,
            tail,
        })
    }

    fn read_envelope(reader: &mut WldReader<'a>, position: u32) -> Result<RawRecord<'a>> {
        let envelope = |err: WldError| err.at_fragment(position, "envelope");
        let size = reader.read_u32().map_err(envelope)? as usize;
        let code = reader.read_u32().map_err(envelope)?;
        let payload = reader
            .read_bytes(size)
            .map_err(|err| err.at_fragment(position, fragment_name(code).unwrap_or("Unknown")))?;
        Ok(RawRecord {
            position,
            code,
            payload,
        })
    }
}

// =============================================================================
// Decoded container
// =============================================================================

/// Container read options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// Fail when the header region count disagrees with the Region records
    pub strict_region_count: bool,
    /// Keep records with unregistered codes as skipped slots instead of failing
    pub skip_unknown: bool,
    /// Keep records whose payload fails to decode as skipped slots
    pub skip_malformed: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            strict_region_count: false,
            skip_unknown: true,
            skip_malformed: false,
        }
    }
}

/// A decoded record with everything needed to write it back unchanged
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub fragment: Fragment,
    /// Payload bytes after the last field the codec reads
    pub trailing: Vec<u8>,
    /// Non-zero padding bytes
    pub padding: PaddingBytes,
    /// Padding bytes the stored payload ended without
    pub missing_padding: usize,
}

impl Record {
    pub fn new(fragment: Fragment) -> Self {
        Self {
            fragment,
            trailing: Vec::new(),
            padding: PaddingBytes::new(),
            missing_padding: 0,
        }
    }

    /// Encode the full payload, including restored padding and trailing bytes
    pub fn to_payload(&self, is_new_world: bool) -> Result<Vec<u8>> {
        let mut writer = WldWriter::new(is_new_world);
        self.fragment.write(&mut writer)?;
        writer.truncate_end(self.missing_padding);
        writer.restore_padding(&self.padding);
        writer.write_bytes(&self.trailing);
        Ok(writer.into_bytes())
    }
}

/// Why a record was kept undecoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    UnknownCode,
    Malformed(String),
}

/// One container position
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Known(Record),
    Skipped {
        code: u32,
        payload: Vec<u8>,
        reason: SkipReason,
    },
}

impl Slot {
    pub fn code(&self) -> u32 {
        match self {
            Slot::Known(record) => record.fragment.code(),
            Slot::Skipped { code, .. } => *code,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        fragment_name(self.code()).unwrap_or("Unknown")
    }

    pub fn name_ref(&self) -> i32 {
        match self {
            Slot::Known(record) => record.fragment.name_ref(),
            Slot::Skipped { payload, .. } => payload
                .get(..4)
                .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .unwrap_or(0),
        }
    }

    pub fn fragment(&self) -> Option<&Fragment> {
        match self {
            Slot::Known(record) => Some(&record.fragment),
            Slot::Skipped { .. } => None,
        }
    }

    pub fn to_payload(&self, is_new_world: bool) -> Result<Vec<u8>> {
        match self {
            Slot::Known(record) => record.to_payload(is_new_world),
            Slot::Skipped { payload, .. } => Ok(payload.clone()),
        }
    }
}

/// A record kept undecoded during a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub position: u32,
    pub code: u32,
    pub size: usize,
    pub reason: SkipReason,
}

/// Everything a scan tolerated instead of failing on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub skipped: Vec<SkippedRecord>,
    /// (position, byte count) of records with bytes after their last field
    pub trailing: Vec<(u32, usize)>,
    /// (header, pool) string counts when they disagree
    pub name_count_mismatch: Option<(u32, usize)>,
    /// (header, found) region counts when they disagree
    pub region_count_mismatch: Option<(u32, u32)>,
}

impl ScanReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
            && self.trailing.is_empty()
            && self.name_count_mismatch.is_none()
            && self.region_count_mismatch.is_none()
    }
}

/// A decoded container
#[derive(Debug, Clone, PartialEq)]
pub struct Wld {
    pub header: WldHeader,
    pub names: NamePool,
    pub slots: Vec<Slot>,
    /// Bytes after the last record, written back verbatim
    pub tail: Vec<u8>,
}

impl Wld {
    /// Empty container with a fresh name pool
    pub fn new(is_new_world: bool) -> Self {
        Self {
            header: WldHeader::new(is_new_world),
            names: NamePool::new(),
            slots: Vec::new(),
            tail: Vec::new(),
        }
    }

    pub fn is_new_world(&self) -> bool {
        self.header.is_new_world()
    }

    /// Decode a container, dispatching each record through `registry`
    pub fn parse(
        data: &[u8],
        registry: &FragmentRegistry,
        options: &ReadOptions,
    ) -> Result<(Self, ScanReport)> {
        let raw = RawContainer::scan(data)?;
        let header = raw.header;
        let is_new_world = header.is_new_world();
        let names = NamePool::from_obfuscated(raw.names);
        let mut report = ScanReport::default();

        if names.string_count() != header.string_count as usize {
            tracing::warn!(
                header = header.string_count,
                found = names.string_count(),
                "name count mismatch, ignoring"
            );
            report.name_count_mismatch = Some((header.string_count, names.string_count()));
        }

        let mut slots = Vec::with_capacity(raw.records.len());
        let mut regions = 0u32;
        for record in &raw.records {
            let position = record.position;
            let mut reader = WldReader::new(record.payload, is_new_world);
            let slot = match registry.dispatch(record.code, &mut reader) {
                Ok(fragment) => {
                    if matches!(fragment, Fragment::Region(_)) {
                        regions += 1;
                    }
                    let trailing = reader.rest().to_vec();
                    if !trailing.is_empty() {
                        tracing::warn!(
                            position,
                            bytes = trailing.len(),
                            "{} has bytes after its last field",
                            fragment.kind_name()
                        );
                        report.trailing.push((position, trailing.len()));
                    }
                    Slot::Known(Record {
                        fragment,
                        trailing,
                        padding: reader.take_padding(),
                        missing_padding: reader.missing_padding(),
                    })
                }
                Err(WldError::UnknownFragmentCode(code)) if options.skip_unknown => {
                    tracing::warn!(position, code, "skipping record with unknown code");
                    Self::skip(record, SkipReason::UnknownCode, &mut report)
                }
                Err(err)
                    if options.skip_malformed
                        && !matches!(err, WldError::UnknownFragmentCode(_)) =>
                {
                    tracing::warn!(position, error = %err, "skipping malformed {}", record.kind_name());
                    Self::skip(record, SkipReason::Malformed(err.to_string()), &mut report)
                }
                Err(err) => return Err(err.at_fragment(position, record.kind_name())),
            };
            slots.push(slot);
        }

        if regions != header.region_count {
            if options.strict_region_count {
                return Err(WldError::RegionCountMismatch {
                    header: header.region_count,
                    found: regions,
                });
            }
            tracing::warn!(
                header = header.region_count,
                found = regions,
                "region count mismatch, ignoring"
            );
            report.region_count_mismatch = Some((header.region_count, regions));
        }

        tracing::info!(
            fragments = slots.len(),
            names = names.string_count(),
            skipped = report.skipped.len(),
            new_world = is_new_world,
            "parsed wld container"
        );

        let wld = Self {
            header,
            names,
            slots,
            tail: raw.tail.to_vec(),
        };
        Ok((wld, report))
    }

    fn skip(record: &RawRecord<'_>, reason: SkipReason, report: &mut ScanReport) -> Slot {
        report.skipped.push(SkippedRecord {
            position: record.position,
            code: record.code,
            size: record.payload.len(),
            reason: reason.clone(),
        });
        Slot::Skipped {
            code: record.code,
            payload: record.payload.to_vec(),
            reason,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Append a fragment and return its position
    pub fn push(&mut self, fragment: Fragment) -> u32 {
        self.slots.push(Slot::Known(Record::new(fragment)));
        self.slots.len() as u32
    }

    /// Slot at a 1-based position
    pub fn slot(&self, position: u32) -> Result<&Slot> {
        let count = self.slots.len() as u32;
        position
            .checked_sub(1)
            .and_then(|index| self.slots.get(index as usize))
            .ok_or(WldError::PositionOutOfRange { position, count })
    }

    /// Decoded fragment at a 1-based position
    pub fn fragment(&self, position: u32) -> Result<&Fragment> {
        let slot = self.slot(position)?;
        slot.fragment().ok_or(WldError::UnexpectedFragment {
            position,
            expected: "decoded record",
            found: slot.kind_name(),
        })
    }

    /// Slots paired with their positions
    pub fn positions(&self) -> impl Iterator<Item = (u32, &Slot)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| (index as u32 + 1, slot))
    }

    /// Recompute the header fields derived from the records and name pool
    pub fn refresh_header(&mut self) -> Result<()> {
        let is_new_world = self.is_new_world();
        let mut max_size = 0usize;
        let mut regions = 0u32;
        for (position, slot) in self.positions() {
            let payload = slot
                .to_payload(is_new_world)
                .map_err(|err| err.at_fragment(position, slot.kind_name()))?;
            max_size = max_size.max(payload.len());
            if matches!(slot.fragment(), Some(Fragment::Region(_))) {
                regions += 1;
            }
        }
        self.header.region_count = regions;
        self.header.max_fragment_size = to_u32(max_size, "max fragment size")?;
        self.header.string_count = to_u32(self.names.string_count(), "string count")?;
        Ok(())
    }

    /// Encode the container.
    ///
    /// `fragment_count` and `hash_size` always follow the content; every other
    /// header field is written as stored.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let is_new_world = self.is_new_world();
        let names = self.names.to_obfuscated();

        let mut header = self.header;
        header.fragment_count = to_u32(self.slots.len(), "fragment count")?;
        header.hash_size = to_u32(names.len(), "name pool size")?;

        let mut out = Vec::with_capacity(HEADER_SIZE + names.len());
        header.write(&mut out);
        out.extend_from_slice(&names);

        for (position, slot) in self.positions() {
            let payload = slot
                .to_payload(is_new_world)
                .map_err(|err| err.at_fragment(position, slot.kind_name()))?;
            out.extend_from_slice(&to_u32(payload.len(), "fragment size")?.to_le_bytes());
            out.extend_from_slice(&slot.code().to_le_bytes());
            out.extend_from_slice(&payload);
        }
        out.extend_from_slice(&self.tail);
        Ok(out)
    }
}

fn to_u32(value: usize, field: &'static str) -> Result<u32> {
    u32::try_from(value).map_err(|_| WldError::ValueOutOfRange {
        field,
        value: value as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::{MaterialPalette, Sphere};
    use crate::hash;

    fn envelope(code: u32, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&code.to_le_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn container(version: u32, names: &[u8], string_count: u32, records: &[Vec<u8>]) -> Vec<u8> {
        let mut out = WLD_MAGIC.to_vec();
        for field in [
            version,
            records.len() as u32,
            0,
            0,
            names.len() as u32,
            string_count,
        ] {
            out.extend_from_slice(&field.to_le_bytes());
        }
        out.extend_from_slice(names);
        for record in records {
            out.extend_from_slice(record);
        }
        out
    }

    #[test]
    fn test_header_rejects_bad_magic() {
        let mut data = container(VERSION_OLD_WORLD, &[], 0, &[]);
        data[0] = 0x03;
        assert!(matches!(
            WldHeader::parse(&data),
            Err(WldError::InvalidMagic)
        ));
    }

    #[test]
    fn test_header_rejects_unknown_version() {
        let data = container(0x1234, &[], 0, &[]);
        assert!(matches!(
            WldHeader::parse(&data),
            Err(WldError::UnsupportedVersion(0x1234))
        ));
    }

    #[test]
    fn test_scan_with_empty_name_blob() {
        let sphere = envelope(0x16, &[0, 0, 0, 0, 0, 0, 0x80, 0x3F]);
        let unnamed = envelope(0x35, &[0, 0, 0, 0, 1, 2, 3, 4]);
        let data = container(VERSION_NEW_WORLD, &[], 0, &[sphere, unnamed]);

        let raw = RawContainer::scan(&data).unwrap();
        assert!(raw.header.is_new_world());
        assert_eq!(raw.header.hash_size, 0);
        assert!(raw.names.is_empty());
        assert_eq!(raw.records.len(), 2);
        assert_eq!(raw.records[0].position, 1);
        assert_eq!(raw.records[0].kind_name(), "Sphere");
        assert_eq!(raw.records[1].position, 2);
        assert_eq!(raw.records[1].payload.len(), 8);
        assert!(raw.tail.is_empty());
    }

    #[test]
    fn test_scan_truncated_envelope() {
        let mut record = envelope(0x16, &[0; 8]);
        record.truncate(12);
        let data = container(VERSION_OLD_WORLD, &[], 0, &[record]);
        let err = RawContainer::scan(&data).unwrap_err();
        assert!(matches!(
            err,
            WldError::Fragment {
                position: 1,
                kind: "Sphere",
                ..
            }
        ));
        assert!(matches!(err.root(), WldError::TruncatedRecord { .. }));
    }

    #[test]
    fn test_unknown_code_is_skipped_and_kept() {
        let names = hash::obfuscate(b"\0BALL\0");
        let before = envelope(0x16, &[0, 0, 0, 0, 0, 0, 0, 0x40]);
        let unknown = envelope(0x99, &[9, 9, 9]);
        let after = envelope(0x16, &[0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0x80, 0x3F]);
        let data = container(VERSION_OLD_WORLD, &names, 1, &[before, unknown, after]);

        let registry = FragmentRegistry::new();
        let (wld, report) = Wld::parse(&data, &registry, &ReadOptions::default()).unwrap();

        assert_eq!(wld.len(), 3);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].position, 2);
        assert_eq!(report.skipped[0].reason, SkipReason::UnknownCode);
        assert!(matches!(wld.fragment(2), Err(WldError::UnexpectedFragment { .. })));

        let Fragment::Sphere(first) = wld.fragment(1).unwrap() else {
            panic!("expected sphere");
        };
        assert_eq!(first.radius, 2.0);
        let Fragment::Sphere(last) = wld.fragment(3).unwrap() else {
            panic!("expected sphere");
        };
        assert_eq!(wld.names.name(last.name_ref).unwrap(), "BALL");
        assert_eq!(last.radius, 1.0);

        assert_eq!(wld.to_bytes().unwrap(), data);
    }

    #[test]
    fn test_unpadded_region_written_back_unchanged() {
        let mut payload = Vec::new();
        for field in [0i32, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2] {
            payload.extend_from_slice(&field.to_le_bytes());
        }
        payload.extend_from_slice(b"ab");
        let data = container(VERSION_NEW_WORLD, &[], 0, &[envelope(0x22, &payload)]);

        let (wld, report) =
            Wld::parse(&data, &FragmentRegistry::new(), &ReadOptions::default()).unwrap();
        assert!(report.trailing.is_empty());
        assert!(matches!(wld.fragment(1), Ok(Fragment::Region(_))));
        assert_eq!(wld.to_bytes().unwrap(), data);
    }

    #[test]
    fn test_unknown_code_fails_when_not_skipping() {
        let data = container(VERSION_OLD_WORLD, &[], 0, &[envelope(0x99, &[])]);
        let options = ReadOptions {
            skip_unknown: false,
            ..ReadOptions::default()
        };
        let err = Wld::parse(&data, &FragmentRegistry::new(), &options).unwrap_err();
        assert!(matches!(err.root(), WldError::UnknownFragmentCode(0x99)));
    }

    #[test]
    fn test_malformed_record_reports_position() {
        // Palette declares three materials but holds one
        let palette = envelope(0x31, &[0, 0, 0, 0, 0, 0, 0, 0, 3, 0, 0, 0, 1, 0, 0, 0]);
        let data = container(VERSION_OLD_WORLD, &[], 0, &[palette.clone()]);
        let registry = FragmentRegistry::new();

        let err = Wld::parse(&data, &registry, &ReadOptions::default()).unwrap_err();
        assert!(err.to_string().starts_with("fragment 1 (MaterialPalette)"));
        assert!(matches!(err.root(), WldError::InconsistentLength { .. }));

        let options = ReadOptions {
            skip_malformed: true,
            ..ReadOptions::default()
        };
        let (wld, report) = Wld::parse(&data, &registry, &options).unwrap();
        assert!(matches!(report.skipped[0].reason, SkipReason::Malformed(_)));
        assert_eq!(wld.to_bytes().unwrap(), data);
    }

    #[test]
    fn test_region_count_strict() {
        let mut data = container(VERSION_OLD_WORLD, &[], 0, &[]);
        // region_count field
        data[12] = 2;
        let registry = FragmentRegistry::new();

        let (_, report) = Wld::parse(&data, &registry, &ReadOptions::default()).unwrap();
        assert_eq!(report.region_count_mismatch, Some((2, 0)));

        let strict = ReadOptions {
            strict_region_count: true,
            ..ReadOptions::default()
        };
        assert!(matches!(
            Wld::parse(&data, &registry, &strict),
            Err(WldError::RegionCountMismatch {
                header: 2,
                found: 0
            })
        ));
    }

    #[test]
    fn test_trailing_bytes_preserved() {
        let sphere = envelope(0x16, &[0, 0, 0, 0, 0, 0, 0, 0x40, 0xAB, 0xCD]);
        let data = container(VERSION_OLD_WORLD, &[], 0, &[sphere]);
        let (wld, report) =
            Wld::parse(&data, &FragmentRegistry::new(), &ReadOptions::default()).unwrap();
        assert_eq!(report.trailing, vec![(1, 2)]);
        assert_eq!(wld.to_bytes().unwrap(), data);
    }

    #[test]
    fn test_push_and_refresh_header() {
        let mut wld = Wld::new(true);
        let name_ref = wld.names.add("PAL");
        let position = wld.push(
            MaterialPalette {
                name_ref,
                flags: 0,
                materials: vec![],
            }
            .into(),
        );
        wld.push(Sphere::default().into());
        assert_eq!(position, 1);

        wld.refresh_header().unwrap();
        assert_eq!(wld.header.max_fragment_size, 12);
        assert_eq!(wld.header.string_count, 1);
        assert_eq!(wld.header.region_count, 0);

        let bytes = wld.to_bytes().unwrap();
        let (parsed, report) =
            Wld::parse(&bytes, &FragmentRegistry::new(), &ReadOptions::default()).unwrap();
        assert!(report.is_clean());
        assert_eq!(parsed.header.fragment_count, 2);
        assert_eq!(parsed.slots, wld.slots);
    }

    #[test]
    fn test_position_zero_is_never_a_record() {
        let wld = Wld::new(false);
        assert!(matches!(
            wld.slot(0),
            Err(WldError::PositionOutOfRange {
                position: 0,
                count: 0
            })
        ));
    }
}
