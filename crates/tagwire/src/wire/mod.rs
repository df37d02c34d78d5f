// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 tagwire contributors

//! Wire-format primitives: wire-type categories, tag framing, varints and
//! the bounds-checked read cursor.
//!
//! The resolution engine never touches bytes directly; everything byte-level
//! lives here and is selected through an `EncodingStrategy`.

mod cursor;
mod varint;

pub use cursor::WireCursor;
pub use varint::{decode_zigzag32, decode_zigzag64, encode_varint, encode_zigzag32, encode_zigzag64};

use crate::error::DecodeError;
use std::fmt;

/// On-wire value categories, as carried in the low three bits of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    Fixed32 = 5,
}

impl WireType {
    /// Recover a wire type from the low three bits of a decoded tag.
    pub fn from_tag_bits(bits: u8) -> Result<Self, DecodeError> {
        match bits {
            0 => Ok(Self::Varint),
            1 => Ok(Self::Fixed64),
            2 => Ok(Self::LengthDelimited),
            5 => Ok(Self::Fixed32),
            other => Err(DecodeError::InvalidWireType { bits: other }),
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Varint => "varint",
            Self::Fixed64 => "fixed64",
            Self::LengthDelimited => "length-delimited",
            Self::Fixed32 => "fixed32",
        };
        f.write_str(name)
    }
}

/// Pack a field number and wire type into a tag varint value.
pub fn tag(number: u32, wire_type: WireType) -> u64 {
    (u64::from(number) << 3) | u64::from(wire_type as u8)
}

/// Append a field tag to the sink.
pub fn write_tag(sink: &mut Vec<u8>, number: u32, wire_type: WireType) {
    encode_varint(sink, tag(number, wire_type));
}

/// Split a decoded tag varint into `(field number, wire type)`.
///
/// Field numbers start at 1; zero and anything past `u32::MAX` are
/// rejected rather than truncated, so a hostile tag cannot alias onto a
/// known field.
pub fn split_tag(raw: u64) -> Result<(u32, WireType), DecodeError> {
    let wire_type = WireType::from_tag_bits((raw & 0x07) as u8)?;
    let number = raw >> 3;
    if number == 0 || number > u64::from(u32::MAX) {
        return Err(DecodeError::InvalidFieldNumber { number });
    }
    Ok((number as u32, wire_type))
}

/// Append a length-delimited payload: varint length, then the bytes.
pub fn write_length_delimited(sink: &mut Vec<u8>, payload: &[u8]) {
    encode_varint(sink, payload.len() as u64);
    sink.extend_from_slice(payload);
}
