// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 tagwire contributors

//! Binary dump, load and merge over compiled descriptors.
//!
//! All per-field byte work is selected through the field's
//! [`EncodingStrategy`]; this module walks descriptors and moves values,
//! the `wire` module moves bytes.

use crate::error::{DecodeError, ValidationError};
use crate::message::Message;
use crate::schema::{EncodingStrategy, FieldShape, MessageRef, ScalarKind, Schema};
use crate::value::Value;
use crate::wire::{
    self, decode_zigzag32, decode_zigzag64, encode_varint, encode_zigzag32, encode_zigzag64,
    WireCursor, WireType,
};
use std::sync::Arc;

/// Deepest message nesting accepted by validate, dump, load and merge.
/// Matches the conventional protobuf parser limit.
pub(crate) const RECURSION_LIMIT: usize = 100;

/// Validate every present value, recursing into nested instances.
pub(crate) fn validate_message(msg: &Message) -> Result<(), ValidationError> {
    validate_at(msg, 0)
}

fn validate_at(msg: &Message, depth: usize) -> Result<(), ValidationError> {
    if depth >= RECURSION_LIMIT {
        return Err(ValidationError::RecursionLimit {
            limit: RECURSION_LIMIT,
        });
    }
    let desc = msg.descriptor();
    for (slot, field) in desc.fields().iter().enumerate() {
        let Some(value) = msg.value_at(slot) else {
            continue;
        };
        if field.shape.is_repeated() {
            let Value::List(elements) = value else {
                return Err(ValidationError::TypeMismatch {
                    field: field.name.clone(),
                    expected: "list".into(),
                    found: value.kind_name().into(),
                });
            };
            for element in elements {
                field
                    .strategy
                    .validate(&msg.schema().enums, &field.name, element)?;
                if let Value::Message(inner) = element {
                    validate_at(inner, depth + 1)?;
                }
            }
        } else {
            field
                .strategy
                .validate(&msg.schema().enums, &field.name, value)?;
            if let Value::Message(inner) = value {
                validate_at(inner, depth + 1)?;
            }
        }
    }
    Ok(())
}

/// Dump an instance to bytes: validate first, then write fields in
/// declaration order. A validation failure yields no bytes at all.
/// Validation also bounds the tree depth, so the write pass below cannot
/// recurse past [`RECURSION_LIMIT`].
pub(crate) fn encode_message(msg: &Message) -> Result<Vec<u8>, ValidationError> {
    validate_message(msg)?;
    let mut sink = Vec::new();
    encode_fields(msg, &mut sink)?;
    Ok(sink)
}

fn encode_fields(msg: &Message, sink: &mut Vec<u8>) -> Result<(), ValidationError> {
    let desc = msg.descriptor();
    for (slot, field) in desc.fields().iter().enumerate() {
        let Some(value) = msg.value_at(slot) else {
            continue;
        };
        match field.shape {
            FieldShape::Singular | FieldShape::Optional => {
                wire::write_tag(sink, field.number, field.strategy.wire_type());
                encode_element(&field.strategy, &field.name, value, sink)?;
            }
            FieldShape::Packed => {
                let Value::List(elements) = value else {
                    continue;
                };
                if elements.is_empty() {
                    continue;
                }
                // One tag, one combined length, elements back to back.
                let mut packed = Vec::new();
                for element in elements {
                    encode_element(&field.strategy, &field.name, element, &mut packed)?;
                }
                wire::write_tag(sink, field.number, WireType::LengthDelimited);
                wire::write_length_delimited(sink, &packed);
            }
            FieldShape::Unpacked => {
                let Value::List(elements) = value else {
                    continue;
                };
                // One tag + length + value per element.
                for element in elements {
                    wire::write_tag(sink, field.number, field.strategy.wire_type());
                    encode_element(&field.strategy, &field.name, element, sink)?;
                }
            }
        }
    }
    Ok(())
}

/// Encode one element value, without any tag. Mismatched variants cannot
/// occur after validation; the error path stays for safety.
fn encode_element(
    strategy: &EncodingStrategy,
    field: &str,
    value: &Value,
    sink: &mut Vec<u8>,
) -> Result<(), ValidationError> {
    match (strategy, value) {
        (EncodingStrategy::Scalar(ScalarKind::Int32), Value::I32(v)) => {
            // Negative int32 sign-extends to ten wire bytes.
            encode_varint(sink, i64::from(*v) as u64);
        }
        (EncodingStrategy::Scalar(ScalarKind::Int64), Value::I64(v)) => {
            encode_varint(sink, *v as u64);
        }
        (EncodingStrategy::Scalar(ScalarKind::UInt32), Value::U32(v)) => {
            encode_varint(sink, u64::from(*v));
        }
        (EncodingStrategy::Scalar(ScalarKind::UInt64), Value::U64(v)) => {
            encode_varint(sink, *v);
        }
        (EncodingStrategy::Scalar(ScalarKind::Sint32), Value::I32(v)) => {
            encode_varint(sink, encode_zigzag32(*v));
        }
        (EncodingStrategy::Scalar(ScalarKind::Sint64), Value::I64(v)) => {
            encode_varint(sink, encode_zigzag64(*v));
        }
        (EncodingStrategy::Scalar(ScalarKind::Fixed32), Value::U32(v)) => {
            sink.extend_from_slice(&v.to_le_bytes());
        }
        (EncodingStrategy::Scalar(ScalarKind::Fixed64), Value::U64(v)) => {
            sink.extend_from_slice(&v.to_le_bytes());
        }
        (EncodingStrategy::Scalar(ScalarKind::Sfixed32), Value::I32(v)) => {
            sink.extend_from_slice(&v.to_le_bytes());
        }
        (EncodingStrategy::Scalar(ScalarKind::Sfixed64), Value::I64(v)) => {
            sink.extend_from_slice(&v.to_le_bytes());
        }
        (EncodingStrategy::Scalar(ScalarKind::Float), Value::F32(v)) => {
            sink.extend_from_slice(&v.to_le_bytes());
        }
        (EncodingStrategy::Scalar(ScalarKind::Double), Value::F64(v)) => {
            sink.extend_from_slice(&v.to_le_bytes());
        }
        (EncodingStrategy::Boolean, Value::Bool(v)) => {
            encode_varint(sink, u64::from(*v));
        }
        (EncodingStrategy::Text, Value::Str(v)) => {
            wire::write_length_delimited(sink, v.as_bytes());
        }
        (EncodingStrategy::Bytes, Value::Bytes(v)) => {
            wire::write_length_delimited(sink, v);
        }
        (EncodingStrategy::Enumeration(_), Value::Enum(v)) => {
            encode_varint(sink, i64::from(*v) as u64);
        }
        (EncodingStrategy::Nested(_), Value::Message(inner)) => {
            let mut payload = Vec::new();
            encode_fields(inner, &mut payload)?;
            wire::write_length_delimited(sink, &payload);
        }
        (strategy, value) => {
            return Err(ValidationError::TypeMismatch {
                field: field.to_string(),
                expected: strategy.expected().to_string(),
                found: value.kind_name().to_string(),
            });
        }
    }
    Ok(())
}

/// Load an instance from bytes: read wire units until the input is
/// exhausted, looking fields up by number.
pub(crate) fn decode_message(
    schema: &Arc<Schema>,
    descriptor: MessageRef,
    bytes: &[u8],
) -> Result<Message, DecodeError> {
    decode_at(schema, descriptor, bytes, 0)
}

fn decode_at(
    schema: &Arc<Schema>,
    descriptor: MessageRef,
    bytes: &[u8],
    depth: usize,
) -> Result<Message, DecodeError> {
    // Nesting depth is attacker-controllable input; cap it instead of
    // letting a deep payload exhaust the stack.
    if depth >= RECURSION_LIMIT {
        return Err(DecodeError::RecursionLimit {
            limit: RECURSION_LIMIT,
        });
    }
    let mut msg = Message::new(schema, descriptor);
    let mut cursor = WireCursor::new(bytes);

    while !cursor.is_empty() {
        let raw = cursor.read_varint()?;
        let (number, wire_type) = wire::split_tag(raw)?;

        let Some(&slot) = schema.message(descriptor).by_number.get(&number) else {
            // Unknown field number: skip by wire type, never an error.
            log::trace!(
                "[codec] {}: skipping unknown field {} ({})",
                schema.message(descriptor).name,
                number,
                wire_type
            );
            cursor.skip(wire_type)?;
            continue;
        };

        let field = &schema.message(descriptor).fields()[slot];
        if field.shape.is_repeated() {
            let expected = field.strategy.wire_type();
            if field.strategy.packed_capable() && wire_type == WireType::LengthDelimited {
                // Packed unit: elements concatenated under one length.
                // Parsers accept packed data for any packable field,
                // regardless of how the writer was compiled.
                let payload = cursor.read_length_delimited()?;
                let mut elements = WireCursor::new(payload);
                while !elements.is_empty() {
                    let value =
                        decode_element(schema, &field.strategy, &field.name, &mut elements, depth)?;
                    push_element(&mut msg, slot, value);
                }
            } else if wire_type == expected {
                let value = decode_element(schema, &field.strategy, &field.name, &mut cursor, depth)?;
                push_element(&mut msg, slot, value);
            } else {
                return Err(DecodeError::WireTypeMismatch {
                    field: field.name.clone(),
                    expected: expected.to_string(),
                    found: wire_type.to_string(),
                });
            }
        } else {
            if wire_type != field.strategy.wire_type() {
                return Err(DecodeError::WireTypeMismatch {
                    field: field.name.clone(),
                    expected: field.strategy.wire_type().to_string(),
                    found: wire_type.to_string(),
                });
            }
            let value = decode_element(schema, &field.strategy, &field.name, &mut cursor, depth)?;
            // Last occurrence wins, matching merge semantics.
            msg.assign(slot, Some(value));
        }
    }

    Ok(msg)
}

fn push_element(msg: &mut Message, slot: usize, value: Value) {
    match msg.value_at_mut(slot) {
        Some(Value::List(elements)) => elements.push(value),
        other => *other = Some(Value::List(vec![value])),
    }
}

fn decode_element(
    schema: &Arc<Schema>,
    strategy: &EncodingStrategy,
    field: &str,
    cursor: &mut WireCursor<'_>,
    depth: usize,
) -> Result<Value, DecodeError> {
    let value = match strategy {
        EncodingStrategy::Scalar(kind) => match kind {
            ScalarKind::Int32 => Value::I32(cursor.read_varint()? as i64 as i32),
            ScalarKind::Int64 => Value::I64(cursor.read_varint()? as i64),
            ScalarKind::UInt32 => Value::U32(cursor.read_varint()? as u32),
            ScalarKind::UInt64 => Value::U64(cursor.read_varint()?),
            ScalarKind::Sint32 => Value::I32(decode_zigzag32(cursor.read_varint()?)),
            ScalarKind::Sint64 => Value::I64(decode_zigzag64(cursor.read_varint()?)),
            ScalarKind::Fixed32 => Value::U32(cursor.read_fixed32()?),
            ScalarKind::Fixed64 => Value::U64(cursor.read_fixed64()?),
            ScalarKind::Sfixed32 => Value::I32(cursor.read_fixed32()? as i32),
            ScalarKind::Sfixed64 => Value::I64(cursor.read_fixed64()? as i64),
            ScalarKind::Float => Value::F32(f32::from_bits(cursor.read_fixed32()?)),
            ScalarKind::Double => Value::F64(f64::from_bits(cursor.read_fixed64()?)),
        },
        EncodingStrategy::Boolean => Value::Bool(cursor.read_varint()? != 0),
        EncodingStrategy::Text => {
            let bytes = cursor.read_length_delimited()?;
            let text = String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8 {
                field: field.to_string(),
            })?;
            Value::Str(text)
        }
        EncodingStrategy::Bytes => Value::Bytes(cursor.read_length_delimited()?.to_vec()),
        // Membership of the decoded value is not checked here; dump-time
        // validation rejects values that never were declared members.
        EncodingStrategy::Enumeration(_) => Value::Enum(cursor.read_varint()? as i64 as i32),
        EncodingStrategy::Nested(inner) => {
            let payload = cursor.read_length_delimited()?;
            Value::Message(decode_at(schema, *inner, payload, depth + 1)?)
        }
    };
    Ok(value)
}

/// Field-wise merge of `other` into `msg`, by declaration order.
pub(crate) fn merge_message(msg: &mut Message, other: &Message) -> Result<(), ValidationError> {
    merge_at(msg, other, 0)
}

fn merge_at(msg: &mut Message, other: &Message, depth: usize) -> Result<(), ValidationError> {
    if depth >= RECURSION_LIMIT {
        return Err(ValidationError::RecursionLimit {
            limit: RECURSION_LIMIT,
        });
    }
    // Structural equality: two instances merge only when their compiled
    // descriptors agree field for field.
    if msg.descriptor() != other.descriptor() {
        return Err(ValidationError::SchemaMismatch {
            expected: msg.type_name().to_string(),
            found: other.type_name().to_string(),
        });
    }

    let shapes: Vec<FieldShape> = msg.descriptor().fields().iter().map(|f| f.shape).collect();
    for (slot, shape) in shapes.into_iter().enumerate() {
        let Some(other_value) = other.value_at(slot) else {
            continue;
        };
        if shape.is_repeated() {
            let Value::List(other_elements) = other_value else {
                continue;
            };
            // Self's elements first, then other's; never deduplicated.
            match msg.value_at_mut(slot) {
                Some(Value::List(elements)) => elements.extend(other_elements.iter().cloned()),
                empty => *empty = Some(Value::List(other_elements.clone())),
            }
        } else {
            let both_nested = matches!(
                (msg.value_at(slot), other_value),
                (Some(Value::Message(_)), Value::Message(_))
            );
            if both_nested {
                if let (Some(Value::Message(inner)), Value::Message(other_inner)) =
                    (msg.value_at_mut(slot).as_mut(), other_value)
                {
                    merge_at(inner, other_inner, depth + 1)?;
                }
            } else {
                // Other's value wins when present.
                msg.assign(slot, Some(other_value.clone()));
            }
        }
    }
    Ok(())
}
