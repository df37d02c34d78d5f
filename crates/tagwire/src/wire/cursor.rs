// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 tagwire contributors

//! Bounds-checked forward read cursor over a byte slice.

use crate::error::DecodeError;
use crate::wire::WireType;

/// Immutable cursor for reading wire units (bounds-checked, zero-copy).
pub struct WireCursor<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> WireCursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_empty(&self) -> bool {
        self.offset >= self.buffer.len()
    }

    pub fn read_byte(&mut self) -> Result<u8, DecodeError> {
        if self.offset >= self.buffer.len() {
            return Err(DecodeError::Truncated {
                offset: self.offset,
            });
        }
        let byte = self.buffer[self.offset];
        self.offset += 1;
        Ok(byte)
    }

    pub fn read_exact(&mut self, count: usize) -> Result<&'a [u8], DecodeError> {
        if count > self.remaining() {
            return Err(DecodeError::LengthOverrun {
                offset: self.offset,
                need: count,
                have: self.remaining(),
            });
        }
        let slice = &self.buffer[self.offset..self.offset + count];
        self.offset += count;
        Ok(slice)
    }

    /// Read an unsigned LEB128 varint, rejecting encodings past ten bytes.
    pub fn read_varint(&mut self) -> Result<u64, DecodeError> {
        let start = self.offset;
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = self.read_byte().map_err(|_| DecodeError::Truncated { offset: start })?;
            value |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift >= 70 {
                return Err(DecodeError::VarintOverflow { offset: start });
            }
        }
    }

    pub fn read_fixed32(&mut self) -> Result<u32, DecodeError> {
        let bytes = self.read_exact(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_fixed64(&mut self) -> Result<u64, DecodeError> {
        let bytes = self.read_exact(8)?;
        Ok(u64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    /// Read a varint length prefix followed by that many bytes.
    pub fn read_length_delimited(&mut self) -> Result<&'a [u8], DecodeError> {
        let start = self.offset;
        let len = self.read_varint()?;
        let len = usize::try_from(len).map_err(|_| DecodeError::LengthOverrun {
            offset: start,
            need: usize::MAX,
            have: self.remaining(),
        })?;
        self.read_exact(len)
    }

    /// Skip one value of the given wire type. Used for unknown field
    /// numbers; the tag alone tells us how far to advance.
    pub fn skip(&mut self, wire_type: WireType) -> Result<(), DecodeError> {
        match wire_type {
            WireType::Varint => {
                self.read_varint()?;
            }
            WireType::Fixed32 => {
                self.read_exact(4)?;
            }
            WireType::Fixed64 => {
                self.read_exact(8)?;
            }
            WireType::LengthDelimited => {
                self.read_length_delimited()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_past_end_is_truncated() {
        let mut cursor = WireCursor::new(&[0x01]);
        assert_eq!(cursor.read_byte().unwrap(), 1);
        assert!(matches!(
            cursor.read_byte(),
            Err(DecodeError::Truncated { offset: 1 })
        ));
    }

    #[test]
    fn length_prefix_past_end_is_overrun() {
        // Length prefix says 5 bytes but only 2 follow.
        let mut cursor = WireCursor::new(&[0x05, 0xAA, 0xBB]);
        assert!(matches!(
            cursor.read_length_delimited(),
            Err(DecodeError::LengthOverrun { need: 5, have: 2, .. })
        ));
    }

    #[test]
    fn unterminated_varint_is_truncated() {
        let mut cursor = WireCursor::new(&[0x80, 0x80]);
        assert!(matches!(
            cursor.read_varint(),
            Err(DecodeError::Truncated { offset: 0 })
        ));
    }

    #[test]
    fn oversized_varint_is_overflow() {
        let bytes = [0xFFu8; 11];
        let mut cursor = WireCursor::new(&bytes);
        assert!(matches!(
            cursor.read_varint(),
            Err(DecodeError::VarintOverflow { offset: 0 })
        ));
    }

    #[test]
    fn skip_by_wire_type() {
        let mut buf = Vec::new();
        buf.extend([0xAC, 0x02]); // varint 300
        buf.extend(1234u32.to_le_bytes());
        buf.extend(5678u64.to_le_bytes());
        buf.extend([0x03, b'a', b'b', b'c']);
        buf.push(0x2A); // trailing sentinel

        let mut cursor = WireCursor::new(&buf);
        cursor.skip(WireType::Varint).unwrap();
        cursor.skip(WireType::Fixed32).unwrap();
        cursor.skip(WireType::Fixed64).unwrap();
        cursor.skip(WireType::LengthDelimited).unwrap();
        assert_eq!(cursor.read_byte().unwrap(), 0x2A);
        assert!(cursor.is_empty());
    }
}
