// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 tagwire contributors

//! Error taxonomy: schema-compile errors, dump-time validation errors and
//! load-time decode errors are distinct types so callers can tell a broken
//! definition from a broken value from broken bytes.

use std::fmt;
use std::io;

/// Raised while compiling a record definition into descriptors.
///
/// Always fatal to the definition: `SchemaBuilder::build` returns no schema
/// when any message fails to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A field's base type has no encoding strategy.
    NotSerializable { field: String, type_name: String },
    /// A field was declared as a multi-member alternative that is not
    /// `{T, absent}`.
    UnsupportedUnion { field: String },
    /// A repeated field wraps something that cannot be an element type.
    MalformedElement { field: String, reason: String },
    /// Two fields of one message claim the same field number.
    DuplicateFieldNumber {
        number: u32,
        first: String,
        second: String,
    },
    /// Field numbers start at 1.
    ZeroFieldNumber { field: String },
    /// A field references a message that was declared but never defined.
    UndefinedMessage { name: String },
    /// A oneof group names a field number the message does not have, or a
    /// field that is not optional.
    BadOneOfMember { group: String, number: u32 },
    /// An explicit default value does not fit the field's strategy.
    BadDefault { field: String, reason: String },
    /// Two message types claim the same name, in one schema or in the
    /// process-wide registry.
    DuplicateTypeName { name: String },
    /// A message's nested-type list reaches the message itself. Rendering
    /// walks the list recursively, so it must form a DAG.
    CyclicNesting { name: String },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSerializable { field, type_name } => {
                write!(f, "field '{}': type is not serializable: {}", field, type_name)
            }
            Self::UnsupportedUnion { field } => {
                write!(f, "field '{}': union types are not supported for fields", field)
            }
            Self::MalformedElement { field, reason } => {
                write!(f, "field '{}': {}", field, reason)
            }
            Self::DuplicateFieldNumber {
                number,
                first,
                second,
            } => write!(
                f,
                "duplicate field number {}: '{}' and '{}'",
                number, first, second
            ),
            Self::ZeroFieldNumber { field } => {
                write!(f, "field '{}': field number must be positive", field)
            }
            Self::UndefinedMessage { name } => {
                write!(f, "message '{}' was declared but never defined", name)
            }
            Self::BadOneOfMember { group, number } => write!(
                f,
                "oneof '{}': field number {} is not an optional field",
                group, number
            ),
            Self::BadDefault { field, reason } => {
                write!(f, "field '{}': bad default value: {}", field, reason)
            }
            Self::DuplicateTypeName { name } => {
                write!(f, "duplicate message type name '{}'", name)
            }
            Self::CyclicNesting { name } => {
                write!(f, "message '{}' appears in its own nested-type chain", name)
            }
        }
    }
}

impl std::error::Error for SchemaError {}

/// Raised when an instance value fails its field's validate step at dump
/// time, or when instance-level operations get mismatched types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Value variant does not match the field's encoding strategy.
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },
    /// Enumeration value is not a declared member.
    UnknownEnumValue { field: String, value: i32 },
    /// No field with that name on the message.
    NoSuchField { name: String },
    /// `push` on a field that is not repeated.
    NotRepeated { name: String },
    /// Two instances of different message types were combined.
    SchemaMismatch { expected: String, found: String },
    /// Message nesting deeper than the codec accepts.
    RecursionLimit { limit: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch {
                field,
                expected,
                found,
            } => write!(
                f,
                "field '{}': type mismatch: expected {}, found {}",
                field, expected, found
            ),
            Self::UnknownEnumValue { field, value } => write!(
                f,
                "field '{}': {} is not a declared member of the enumeration",
                field, value
            ),
            Self::NoSuchField { name } => write!(f, "no such field: '{}'", name),
            Self::NotRepeated { name } => write!(f, "field '{}' is not repeated", name),
            Self::SchemaMismatch { expected, found } => write!(
                f,
                "message type mismatch: expected {}, found {}",
                expected, found
            ),
            Self::RecursionLimit { limit } => {
                write!(f, "message nesting exceeds {} levels", limit)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Raised while reading wire data back into an instance.
///
/// Unknown field numbers are never a `DecodeError`; they are skipped by
/// wire type.
#[derive(Debug)]
pub enum DecodeError {
    /// Input ended inside a value.
    Truncated { offset: usize },
    /// A varint ran past ten bytes.
    VarintOverflow { offset: usize },
    /// Tag carried a wire-type bit pattern outside the known set.
    InvalidWireType { bits: u8 },
    /// Tag carried a field number of zero or past the 32-bit range.
    InvalidFieldNumber { number: u64 },
    /// Message nesting deeper than the codec accepts.
    RecursionLimit { limit: usize },
    /// A known field arrived under a wire type its strategy cannot accept.
    WireTypeMismatch {
        field: String,
        expected: String,
        found: String,
    },
    /// A string field held invalid UTF-8.
    InvalidUtf8 { field: String },
    /// A length prefix pointed past the end of the input.
    LengthOverrun {
        offset: usize,
        need: usize,
        have: usize,
    },
    /// Streaming source failed.
    Io(io::Error),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { offset } => write!(f, "truncated input at offset {}", offset),
            Self::VarintOverflow { offset } => {
                write!(f, "varint overflow at offset {}", offset)
            }
            Self::InvalidWireType { bits } => write!(f, "invalid wire type {}", bits),
            Self::InvalidFieldNumber { number } => {
                write!(f, "invalid field number {}", number)
            }
            Self::RecursionLimit { limit } => {
                write!(f, "message nesting exceeds {} levels", limit)
            }
            Self::WireTypeMismatch {
                field,
                expected,
                found,
            } => write!(
                f,
                "field '{}': expected wire type {}, got {}",
                field, expected, found
            ),
            Self::InvalidUtf8 { field } => write!(f, "field '{}': invalid UTF-8", field),
            Self::LengthOverrun { offset, need, have } => write!(
                f,
                "length prefix at offset {} needs {} bytes, {} remain",
                offset, need, have
            ),
            Self::Io(e) => write!(f, "read failed: {}", e),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for DecodeError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Dump-side wrapper for the streaming variant: validation failed, or the
/// sink rejected the bytes.
#[derive(Debug)]
pub enum EncodeError {
    Validation(ValidationError),
    Io(io::Error),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "validation failed: {}", e),
            Self::Io(e) => write!(f, "write failed: {}", e),
        }
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<ValidationError> for EncodeError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<io::Error> for EncodeError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
