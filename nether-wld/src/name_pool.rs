//! Deduplicated string table shared by every record of one container
//!
//! The pool is a single blob of NUL-terminated strings that starts with one NUL,
//! so byte offset 0 always names the empty string. Records store offsets
//! negated; [`NamePool::name`] accepts either sign.

use hashbrown::HashMap;

use crate::error::{Result, WldError};
use crate::hash;

/// Append-only string table for one container build or decode
#[derive(Debug, Clone, PartialEq)]
pub struct NamePool {
    blob: Vec<u8>,
    offsets: HashMap<String, i32>,
    entries: usize,
}

impl Default for NamePool {
    fn default() -> Self {
        Self::new()
    }
}

impl NamePool {
    /// Create an empty pool holding only the leading NUL
    pub fn new() -> Self {
        Self {
            blob: vec![0],
            offsets: HashMap::new(),
            entries: 0,
        }
    }

    /// Rebuild a pool from the obfuscated blob stored in a container header.
    ///
    /// The blob is kept verbatim, including any bytes after the last NUL, so
    /// [`NamePool::to_obfuscated`] reproduces the input exactly.
    pub fn from_obfuscated(raw: &[u8]) -> Self {
        let blob = hash::deobfuscate(raw);
        let mut offsets = HashMap::new();
        let mut entries = 0;

        let mut start = 0;
        for (i, &byte) in blob.iter().enumerate() {
            if byte != 0 {
                continue;
            }
            if i > start {
                let name = String::from_utf8_lossy(&blob[start..i]).into_owned();
                offsets.entry(name).or_insert(-(start as i32));
                entries += 1;
            }
            start = i + 1;
        }
        if start < blob.len() {
            tracing::debug!(
                "name pool has {} unterminated trailing bytes",
                blob.len() - start
            );
        }

        Self {
            blob,
            offsets,
            entries,
        }
    }

    /// Add a tag and return its stored (negated) offset.
    ///
    /// Adding the same tag again returns the same offset. The empty tag is 0.
    pub fn add(&mut self, tag: &str) -> i32 {
        if tag.is_empty() {
            return 0;
        }
        if let Some(&offset) = self.offsets.get(tag) {
            return offset;
        }
        // A decoded empty blob has no leading NUL yet
        if self.blob.is_empty() {
            self.blob.push(0);
        }
        let offset = -(self.blob.len() as i32);
        self.blob.extend_from_slice(tag.as_bytes());
        self.blob.push(0);
        self.offsets.insert(tag.to_owned(), offset);
        self.entries += 1;
        offset
    }

    /// Look up the string stored at a name reference
    pub fn name(&self, name_ref: i32) -> Result<&str> {
        let offset = name_ref.unsigned_abs() as usize;
        if offset == 0 {
            return Ok("");
        }
        let tail = self
            .blob
            .get(offset..)
            .ok_or(WldError::InvalidNameRef(name_ref))?;
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        std::str::from_utf8(&tail[..end]).map_err(|_| WldError::InvalidNameRef(name_ref))
    }

    /// Stored offset for a tag that was already added
    pub fn offset_of(&self, tag: &str) -> Option<i32> {
        if tag.is_empty() {
            return Some(0);
        }
        self.offsets.get(tag).copied()
    }

    /// Number of non-empty strings in the pool
    pub fn string_count(&self) -> usize {
        self.entries
    }

    /// Plain blob bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.blob
    }

    /// Blob bytes as stored in a container
    pub fn to_obfuscated(&self) -> Vec<u8> {
        hash::obfuscate(&self.blob)
    }

    pub fn len(&self) -> usize {
        self.blob.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }
}
