// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 tagwire contributors

//! The encoding strategy registry: a fixed mapping from base types to the
//! wire-level capability bundle a field will use.
//!
//! Resolution happens once, at schema-compile time. Dump, load, merge and
//! rendering all consult the chosen [`EncodingStrategy`] and never look at
//! the declared type again.

use crate::error::{SchemaError, ValidationError};
use crate::schema::descriptor::{EnumDescriptor, EnumRef, MessageRef};
use crate::schema::type_expr::{ScalarType, TypeExpr};
use crate::value::Value;
use crate::wire::WireType;

/// Numeric encoding kinds behind [`EncodingStrategy::Scalar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Int32,
    Int64,
    UInt32,
    UInt64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Float,
    Double,
}

/// Exactly one encoding strategy per field, chosen at compile time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodingStrategy {
    Scalar(ScalarKind),
    Boolean,
    Text,
    Bytes,
    Enumeration(EnumRef),
    /// Identity reference into the schema arena; resolved lazily at
    /// dump/load/render so mutually-nested messages can compile.
    Nested(MessageRef),
}

impl EncodingStrategy {
    /// Wire-type category this strategy produces.
    pub fn wire_type(&self) -> WireType {
        match self {
            Self::Scalar(kind) => match kind {
                ScalarKind::Int32
                | ScalarKind::Int64
                | ScalarKind::UInt32
                | ScalarKind::UInt64
                | ScalarKind::Sint32
                | ScalarKind::Sint64 => WireType::Varint,
                ScalarKind::Fixed32 | ScalarKind::Sfixed32 | ScalarKind::Float => WireType::Fixed32,
                ScalarKind::Fixed64 | ScalarKind::Sfixed64 | ScalarKind::Double => WireType::Fixed64,
            },
            Self::Boolean | Self::Enumeration(_) => WireType::Varint,
            Self::Text | Self::Bytes | Self::Nested(_) => WireType::LengthDelimited,
        }
    }

    /// Whether repeated values of this strategy pack under one tag.
    /// Length-delimited payloads never pack; everything else does.
    pub fn packed_capable(&self) -> bool {
        self.wire_type() != WireType::LengthDelimited
    }

    /// The value variant this strategy accepts, for error messages.
    pub fn expected(&self) -> &'static str {
        match self {
            Self::Scalar(kind) => match kind {
                ScalarKind::Int32 | ScalarKind::Sint32 | ScalarKind::Sfixed32 => "i32",
                ScalarKind::Int64 | ScalarKind::Sint64 | ScalarKind::Sfixed64 => "i64",
                ScalarKind::UInt32 | ScalarKind::Fixed32 => "u32",
                ScalarKind::UInt64 | ScalarKind::Fixed64 => "u64",
                ScalarKind::Float => "f32",
                ScalarKind::Double => "f64",
            },
            Self::Boolean => "bool",
            Self::Text => "string",
            Self::Bytes => "bytes",
            Self::Enumeration(_) => "enum",
            Self::Nested(_) => "message",
        }
    }

    /// Check a single element value against this strategy.
    ///
    /// This is the dump-time validate step: enumeration values must be
    /// declared members, everything else is a variant match. Nested
    /// instance contents are validated recursively by the codec, not here.
    pub fn validate(
        &self,
        enums: &[EnumDescriptor],
        field: &str,
        value: &Value,
    ) -> Result<(), ValidationError> {
        let ok = match (self, value) {
            (Self::Scalar(kind), v) => match kind {
                ScalarKind::Int32 | ScalarKind::Sint32 | ScalarKind::Sfixed32 => {
                    matches!(v, Value::I32(_))
                }
                ScalarKind::Int64 | ScalarKind::Sint64 | ScalarKind::Sfixed64 => {
                    matches!(v, Value::I64(_))
                }
                ScalarKind::UInt32 | ScalarKind::Fixed32 => matches!(v, Value::U32(_)),
                ScalarKind::UInt64 | ScalarKind::Fixed64 => matches!(v, Value::U64(_)),
                ScalarKind::Float => matches!(v, Value::F32(_)),
                ScalarKind::Double => matches!(v, Value::F64(_)),
            },
            (Self::Boolean, Value::Bool(_)) => true,
            (Self::Text, Value::Str(_)) => true,
            (Self::Bytes, Value::Bytes(_)) => true,
            (Self::Enumeration(r), Value::Enum(v)) => {
                if enums[r.0].member_by_value(*v).is_none() {
                    return Err(ValidationError::UnknownEnumValue {
                        field: field.to_string(),
                        value: *v,
                    });
                }
                true
            }
            (Self::Nested(r), Value::Message(m)) => m.descriptor_ref() == *r,
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(ValidationError::TypeMismatch {
                field: field.to_string(),
                expected: self.expected().to_string(),
                found: value.kind_name().to_string(),
            })
        }
    }

    /// Default value for a singular field without an explicit default.
    ///
    /// Nested messages return `None`: a singular message field starts
    /// absent, which also keeps cyclic record types finitely constructible.
    pub fn zero_value(&self, enums: &[EnumDescriptor]) -> Option<Value> {
        match self {
            Self::Scalar(kind) => Some(match kind {
                ScalarKind::Int32 | ScalarKind::Sint32 | ScalarKind::Sfixed32 => Value::I32(0),
                ScalarKind::Int64 | ScalarKind::Sint64 | ScalarKind::Sfixed64 => Value::I64(0),
                ScalarKind::UInt32 | ScalarKind::Fixed32 => Value::U32(0),
                ScalarKind::UInt64 | ScalarKind::Fixed64 => Value::U64(0),
                ScalarKind::Float => Value::F32(0.0),
                ScalarKind::Double => Value::F64(0.0),
            }),
            Self::Boolean => Some(Value::Bool(false)),
            Self::Text => Some(Value::Str(String::new())),
            Self::Bytes => Some(Value::Bytes(Vec::new())),
            Self::Enumeration(r) => enums[r.0].members.first().map(|(_, v)| Value::Enum(*v)),
            Self::Nested(_) => None,
        }
    }
}

/// Resolve a base type to its encoding strategy, first match wins.
pub fn resolve(field: &str, base: &TypeExpr) -> Result<EncodingStrategy, SchemaError> {
    match base {
        // 1. Declared message record. Only an identity reference is stored,
        //    so the referenced descriptor may still be under construction.
        TypeExpr::Message(r) => Ok(EncodingStrategy::Nested(*r)),
        // 2. Integer-backed enumeration.
        TypeExpr::Enum(r) => Ok(EncodingStrategy::Enumeration(*r)),
        // 3. Fixed scalar table, keyed by exact type marker.
        TypeExpr::Scalar(scalar) => Ok(scalar_strategy(*scalar)),
        // 4. Nothing matched: schema-compile-time error, never deferred.
        other => Err(SchemaError::NotSerializable {
            field: field.to_string(),
            type_name: other.describe(),
        }),
    }
}

fn scalar_strategy(scalar: ScalarType) -> EncodingStrategy {
    match scalar {
        ScalarType::Bool | ScalarType::BoolValue => EncodingStrategy::Boolean,
        ScalarType::Int32 => EncodingStrategy::Scalar(ScalarKind::Int32),
        ScalarType::Int64 => EncodingStrategy::Scalar(ScalarKind::Int64),
        ScalarType::UInt32 | ScalarType::UInt32Value => EncodingStrategy::Scalar(ScalarKind::UInt32),
        ScalarType::UInt64 => EncodingStrategy::Scalar(ScalarKind::UInt64),
        ScalarType::Sint32 => EncodingStrategy::Scalar(ScalarKind::Sint32),
        ScalarType::Sint64 => EncodingStrategy::Scalar(ScalarKind::Sint64),
        ScalarType::Fixed32 => EncodingStrategy::Scalar(ScalarKind::Fixed32),
        ScalarType::Fixed64 => EncodingStrategy::Scalar(ScalarKind::Fixed64),
        ScalarType::Sfixed32 => EncodingStrategy::Scalar(ScalarKind::Sfixed32),
        ScalarType::Sfixed64 => EncodingStrategy::Scalar(ScalarKind::Sfixed64),
        ScalarType::Float => EncodingStrategy::Scalar(ScalarKind::Float),
        ScalarType::Double => EncodingStrategy::Scalar(ScalarKind::Double),
        ScalarType::String | ScalarType::StringValue => EncodingStrategy::Text,
        ScalarType::Bytes => EncodingStrategy::Bytes,
    }
}

/// Schema keyword rendered for each scalar marker.
pub fn keyword(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::Bool => "bool",
        ScalarType::Int32 => "int32",
        ScalarType::Int64 => "int64",
        ScalarType::UInt32 => "uint32",
        ScalarType::UInt64 => "uint64",
        ScalarType::Sint32 => "sint32",
        ScalarType::Sint64 => "sint64",
        ScalarType::Fixed32 => "fixed32",
        ScalarType::Fixed64 => "fixed64",
        ScalarType::Sfixed32 => "sfixed32",
        ScalarType::Sfixed64 => "sfixed64",
        ScalarType::Float => "float",
        ScalarType::Double => "double",
        ScalarType::String => "string",
        ScalarType::Bytes => "bytes",
        ScalarType::UInt32Value => "google.protobuf.UInt32Value",
        ScalarType::BoolValue => "google.protobuf.BoolValue",
        ScalarType::StringValue => "google.protobuf.StringValue",
    }
}
