// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 tagwire contributors

//! Declared field types and the shape analyzer that strips `optional` and
//! `repeated` wrappers down to a base type.

use crate::error::SchemaError;
use crate::schema::descriptor::{EnumRef, MessageRef};

/// Scalar and well-known wrapper type markers.
///
/// Matching is by exact variant identity: `Fixed32` and `UInt32` both denote
/// 32-bit unsigned integers but encode differently on the wire, so they are
/// distinct keys in the strategy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Bool,
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
    String,
    Bytes,
    // google.protobuf wrapper value types. Encoded like the plain scalar
    // they wrap; only the rendered keyword differs.
    UInt32Value,
    BoolValue,
    StringValue,
}

/// A declared field type expression, before shape analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Scalar(ScalarType),
    Enum(EnumRef),
    Message(MessageRef),
    /// Sequence-of-T wrapper.
    Repeated(Box<TypeExpr>),
    /// Multi-member alternative. Only `{T, Absent}` is meaningful; anything
    /// else is rejected by the analyzer.
    Alternative(Vec<TypeExpr>),
    /// The absent marker inside an alternative.
    Absent,
}

impl TypeExpr {
    pub fn scalar(scalar: ScalarType) -> Self {
        Self::Scalar(scalar)
    }

    pub fn message(message: MessageRef) -> Self {
        Self::Message(message)
    }

    pub fn enumeration(enumeration: EnumRef) -> Self {
        Self::Enum(enumeration)
    }

    /// `optional T` as a two-member alternative of `T` and the absent marker.
    pub fn optional(inner: TypeExpr) -> Self {
        Self::Alternative(vec![inner, Self::Absent])
    }

    pub fn repeated(inner: TypeExpr) -> Self {
        Self::Repeated(Box::new(inner))
    }

    /// Short description used in error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Scalar(s) => format!("{:?}", s),
            Self::Enum(_) => "enum".into(),
            Self::Message(_) => "message".into(),
            Self::Repeated(_) => "repeated".into(),
            Self::Alternative(_) => "union".into(),
            Self::Absent => "absent marker".into(),
        }
    }
}

/// Analyzer output: the two stripped modifiers plus the base type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeShape {
    pub optional: bool,
    pub repeated: bool,
    pub base: TypeExpr,
}

/// Strip `optional` then `repeated` from a declared type.
///
/// Optional is checked first, so `optional repeated T` analyzes with both
/// flags set (repetition later wins for the field shape). `repeated
/// optional T` has no wire meaning and fails instead of misencoding.
/// Pure function; `field` is only used for error reporting.
pub fn analyze(field: &str, declared: &TypeExpr) -> Result<TypeShape, SchemaError> {
    let (optional, unwrapped) = strip_optional(field, declared)?;
    let (repeated, base) = strip_repeated(field, unwrapped)?;
    Ok(TypeShape {
        optional,
        repeated,
        base,
    })
}

fn strip_optional<'a>(
    field: &str,
    declared: &'a TypeExpr,
) -> Result<(bool, &'a TypeExpr), SchemaError> {
    match declared {
        TypeExpr::Alternative(members) => {
            if members.len() == 2 {
                let absent = members
                    .iter()
                    .filter(|m| matches!(m, TypeExpr::Absent))
                    .count();
                if absent == 1 {
                    let base = members
                        .iter()
                        .find(|m| !matches!(m, TypeExpr::Absent))
                        .ok_or_else(|| SchemaError::UnsupportedUnion {
                            field: field.to_string(),
                        })?;
                    return Ok((true, base));
                }
            }
            // Any other alternative must fail loudly, never pick a branch.
            Err(SchemaError::UnsupportedUnion {
                field: field.to_string(),
            })
        }
        other => Ok((false, other)),
    }
}

fn strip_repeated(field: &str, unwrapped: &TypeExpr) -> Result<(bool, TypeExpr), SchemaError> {
    match unwrapped {
        TypeExpr::Repeated(inner) => match inner.as_ref() {
            TypeExpr::Alternative(_) | TypeExpr::Absent => Err(SchemaError::MalformedElement {
                field: field.to_string(),
                reason: "repeated optional is not supported".into(),
            }),
            TypeExpr::Repeated(_) => Err(SchemaError::MalformedElement {
                field: field.to_string(),
                reason: "nested repetition is not supported".into(),
            }),
            base => Ok((true, base.clone())),
        },
        base => Ok((false, base.clone())),
    }
}
