//! Bounds-checked little-endian cursors over one record payload
//!
//! Readers never allocate from a declared count without first checking the
//! count against the bytes that remain, so a corrupt count fails with
//! [`WldError::InconsistentLength`] instead of reserving memory.

use smallvec::SmallVec;

use crate::error::{Result, WldError};
use crate::hash;

/// Non-zero padding bytes seen while reading, as (payload offset, value)
pub type PaddingBytes = SmallVec<[(u32, u8); 4]>;

/// Round `len` up to the next multiple of 4
#[inline]
pub const fn padding_for(len: usize) -> usize {
    (4 - len % 4) % 4
}

// ============================================================================
// Reader
// ============================================================================

/// Reader over a single record payload
#[derive(Debug, Clone)]
pub struct WldReader<'a> {
    data: &'a [u8],
    pos: usize,
    is_new_world: bool,
    padding: PaddingBytes,
    /// Padding bytes absent because the payload ended at its last field
    missing_padding: usize,
}

impl<'a> WldReader<'a> {
    pub fn new(data: &'a [u8], is_new_world: bool) -> Self {
        Self {
            data,
            pos: 0,
            is_new_world,
            padding: PaddingBytes::new(),
            missing_padding: 0,
        }
    }

    /// Whether the container uses the new-world layout variants
    pub fn is_new_world(&self) -> bool {
        self.is_new_world
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Unread bytes, without advancing
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(WldError::TruncatedRecord {
                needed: len,
                remaining,
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(i8::from_le_bytes(self.read_array()?))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32x3(&mut self) -> Result<[f32; 3]> {
        Ok([self.read_f32()?, self.read_f32()?, self.read_f32()?])
    }

    pub fn read_f32x4(&mut self) -> Result<[f32; 4]> {
        Ok([
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
        ])
    }

    /// Validate a declared element count against the remaining payload.
    ///
    /// `element_size` is the minimum encoded size of one element.
    pub fn check_count(&self, count: usize, element_size: usize) -> Result<usize> {
        let remaining = self.remaining();
        match count.checked_mul(element_size) {
            Some(total) if total <= remaining => Ok(count),
            _ => Err(WldError::InconsistentLength {
                count,
                element_size,
                remaining,
            }),
        }
    }

    /// Read a u32 element count and validate it
    pub fn read_count(&mut self, element_size: usize) -> Result<usize> {
        let count = self.read_u32()? as usize;
        self.check_count(count, element_size)
    }

    /// Read a u16 element count and validate it
    pub fn read_count_u16(&mut self, element_size: usize) -> Result<usize> {
        let count = usize::from(self.read_u16()?);
        self.check_count(count, element_size)
    }

    /// Read `count` elements with `read`, after bounding the count
    pub fn read_vec<T>(
        &mut self,
        count: usize,
        element_size: usize,
        mut read: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        self.check_count(count, element_size)?;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(read(self)?);
        }
        Ok(out)
    }

    /// Read `len` obfuscated bytes and return them in plain form
    pub fn read_obfuscated(&mut self, len: usize) -> Result<Vec<u8>> {
        self.check_count(len, 1)?;
        Ok(hash::deobfuscate(self.read_bytes(len)?))
    }

    /// Consume padding up to the next 4-byte boundary of the payload.
    ///
    /// Padding contents are not validated. Non-zero bytes are remembered so the
    /// record can be written back unchanged.
    pub fn skip_padding(&mut self) -> Result<()> {
        let start = self.pos;
        let pad = padding_for(start);
        let bytes = self.read_bytes(pad)?;
        for (i, &byte) in bytes.iter().enumerate() {
            if byte != 0 {
                self.padding.push(((start + i) as u32, byte));
            }
        }
        Ok(())
    }

    /// Like [`skip_padding`](Self::skip_padding), but the payload may also end
    /// exactly at the current offset.
    pub fn skip_padding_or_end(&mut self) -> Result<()> {
        if self.remaining() == 0 {
            self.missing_padding = padding_for(self.pos);
            return Ok(());
        }
        self.skip_padding()
    }

    /// Padding bytes the payload left out, see [`skip_padding_or_end`](Self::skip_padding_or_end)
    pub fn missing_padding(&self) -> usize {
        self.missing_padding
    }

    /// Non-zero padding bytes consumed so far
    pub fn take_padding(&mut self) -> PaddingBytes {
        std::mem::take(&mut self.padding)
    }
}

// ============================================================================
// Writer
// ============================================================================

/// Writer producing a single record payload
#[derive(Debug, Clone, Default)]
pub struct WldWriter {
    buf: Vec<u8>,
    is_new_world: bool,
}

impl WldWriter {
    pub fn new(is_new_world: bool) -> Self {
        Self {
            buf: Vec::new(),
            is_new_world,
        }
    }

    pub fn is_new_world(&self) -> bool {
        self.is_new_world
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i16(&mut self, value: i16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32s(&mut self, values: &[f32]) {
        for &value in values {
            self.write_f32(value);
        }
    }

    /// Write an element count as u32
    pub fn write_count(&mut self, count: usize) -> Result<()> {
        let count = u32::try_from(count).map_err(|_| WldError::ValueOutOfRange {
            field: "element count",
            value: count as i64,
        })?;
        self.write_u32(count);
        Ok(())
    }

    /// Write an element count as u16
    pub fn write_count_u16(&mut self, count: usize) -> Result<()> {
        let count = u16::try_from(count).map_err(|_| WldError::ValueOutOfRange {
            field: "element count",
            value: count as i64,
        })?;
        self.write_u16(count);
        Ok(())
    }

    /// Obfuscate plain bytes and append them
    pub fn write_obfuscated(&mut self, plain: &[u8]) {
        self.buf.extend_from_slice(&hash::obfuscate(plain));
    }

    /// Append zero bytes up to the next 4-byte boundary of the payload
    pub fn pad_to_4(&mut self) {
        let pad = padding_for(self.buf.len());
        self.buf.resize(self.buf.len() + pad, 0);
    }

    /// Drop the last `count` bytes written
    pub fn truncate_end(&mut self, count: usize) {
        self.buf.truncate(self.buf.len().saturating_sub(count));
    }

    /// Restore non-zero padding bytes recorded by [`WldReader::take_padding`].
    ///
    /// Offsets past the end of the payload are ignored.
    pub fn restore_padding(&mut self, padding: &[(u32, u8)]) {
        for &(offset, byte) in padding {
            if let Some(slot) = self.buf.get_mut(offset as usize) {
                *slot = byte;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_for() {
        assert_eq!(padding_for(0), 0);
        assert_eq!(padding_for(1), 3);
        assert_eq!(padding_for(6), 2);
        assert_eq!(padding_for(8), 0);
    }

    #[test]
    fn test_truncated_read() {
        let mut reader = WldReader::new(&[1, 2, 3], false);
        assert_eq!(reader.read_u16().unwrap(), 0x0201);
        let err = reader.read_u32().unwrap_err();
        assert!(matches!(
            err,
            WldError::TruncatedRecord {
                needed: 4,
                remaining: 1
            }
        ));
    }

    #[test]
    fn test_count_bounded_by_remaining_input() {
        // Declares four billion elements in an eight byte record
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0];
        let mut reader = WldReader::new(&data, true);
        let err = reader.read_count(4).unwrap_err();
        assert!(matches!(err, WldError::InconsistentLength { remaining: 4, .. }));
    }

    #[test]
    fn test_skip_padding_ignores_contents() {
        let data = [7, 0xAA, 0xBB, 0xCC, 9];
        let mut reader = WldReader::new(&data, false);
        reader.read_u8().unwrap();
        reader.skip_padding().unwrap();
        assert_eq!(reader.read_u8().unwrap(), 9);

        let padding = reader.take_padding();
        assert_eq!(padding.as_slice(), &[(1, 0xAA), (2, 0xBB), (3, 0xCC)]);

        let mut writer = WldWriter::new(false);
        writer.write_u8(7);
        writer.pad_to_4();
        writer.write_u8(9);
        writer.restore_padding(&padding);
        assert_eq!(writer.into_bytes(), data);
    }

    #[test]
    fn test_writer_pads_with_zeros() {
        let mut writer = WldWriter::new(false);
        writer.write_u16(0xBEEF);
        writer.write_u8(1);
        writer.pad_to_4();
        assert_eq!(writer.into_bytes(), vec![0xEF, 0xBE, 1, 0]);
    }
}
