// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 tagwire contributors

//! Runtime message instances.
//!
//! An instance holds one value slot per field, in declaration order. The
//! compiled descriptor is shared read-only metadata reached through the
//! schema arena; instances never copy it.

use crate::codec;
use crate::error::{DecodeError, EncodeError, ValidationError};
use crate::schema::{FieldShape, MessageDescriptor, MessageRef, Schema};
use crate::value::Value;
use std::io::{Read, Write};
use std::sync::Arc;

/// One runtime value of a compiled record type.
#[derive(Debug, Clone)]
pub struct Message {
    schema: Arc<Schema>,
    descriptor: MessageRef,
    /// One slot per field, declaration order. `None` is absent.
    values: Vec<Option<Value>>,
}

impl Message {
    /// New instance with default contents: singular fields get their
    /// explicit default or the strategy's zero value, optional fields start
    /// absent, repeated fields start empty. Singular nested-message fields
    /// also start absent, which keeps cyclic record types constructible.
    pub fn new(schema: &Arc<Schema>, descriptor: MessageRef) -> Self {
        let desc = schema.message(descriptor);
        let values = desc
            .fields()
            .iter()
            .map(|f| match f.shape {
                FieldShape::Packed | FieldShape::Unpacked => Some(Value::List(Vec::new())),
                FieldShape::Optional => f.default.clone(),
                FieldShape::Singular => f
                    .default
                    .clone()
                    .or_else(|| f.strategy.zero_value(&schema.enums)),
            })
            .collect();
        Self {
            schema: schema.clone(),
            descriptor,
            values,
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn descriptor(&self) -> &MessageDescriptor {
        self.schema.message(self.descriptor)
    }

    pub fn descriptor_ref(&self) -> MessageRef {
        self.descriptor
    }

    pub fn type_name(&self) -> &str {
        &self.descriptor().name
    }

    /// Set a field by name, validating the value against the field's
    /// strategy. Setting a oneof member clears the group's other members,
    /// so at most one member of a group ever holds a value.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ValidationError> {
        let value = value.into();
        let slot = self.slot(name)?;
        let field = &self.descriptor().fields()[slot];
        if field.shape.is_repeated() {
            let Value::List(elements) = &value else {
                return Err(ValidationError::TypeMismatch {
                    field: name.to_string(),
                    expected: "list".into(),
                    found: value.kind_name().into(),
                });
            };
            for element in elements {
                field
                    .strategy
                    .validate(&self.schema.enums, name, element)?;
            }
        } else {
            field.strategy.validate(&self.schema.enums, name, &value)?;
        }
        self.assign(slot, Some(value));
        Ok(())
    }

    /// Append one element to a repeated field.
    pub fn push(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ValidationError> {
        let value = value.into();
        let slot = self.slot(name)?;
        let field = &self.descriptor().fields()[slot];
        if !field.shape.is_repeated() {
            return Err(ValidationError::NotRepeated {
                name: name.to_string(),
            });
        }
        field.strategy.validate(&self.schema.enums, name, &value)?;
        match &mut self.values[slot] {
            Some(Value::List(elements)) => elements.push(value),
            other => *other = Some(Value::List(vec![value])),
        }
        Ok(())
    }

    /// Reset a field to its initial contents.
    pub fn clear(&mut self, name: &str) -> Result<(), ValidationError> {
        let slot = self.slot(name)?;
        let field = &self.descriptor().fields()[slot];
        self.values[slot] = match field.shape {
            FieldShape::Packed | FieldShape::Unpacked => Some(Value::List(Vec::new())),
            FieldShape::Optional => field.default.clone(),
            FieldShape::Singular => field
                .default
                .clone()
                .or_else(|| field.strategy.zero_value(&self.schema.enums)),
        };
        Ok(())
    }

    /// Current value of a field, or `None` when the field is absent or the
    /// name is unknown.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let slot = self.descriptor().slot_by_name(name)?;
        self.values[slot].as_ref()
    }

    /// Whether the field currently holds a value.
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The single set member of a oneof group: `(field name, value)`.
    pub fn oneof(&self, group: &str) -> Option<(&str, &Value)> {
        let desc = self.descriptor();
        let group = desc.oneofs().iter().find(|g| g.name == group)?;
        group.members.iter().find_map(|&slot| {
            self.values[slot]
                .as_ref()
                .map(|v| (desc.fields()[slot].name.as_str(), v))
        })
    }

    /// Validate every present value against its field's strategy, without
    /// producing any bytes.
    pub fn validate(&self) -> Result<(), ValidationError> {
        codec::validate_message(self)
    }

    /// Serialize to bytes. Validation runs first; a validation failure
    /// produces no partial output.
    pub fn encode(&self) -> Result<Vec<u8>, ValidationError> {
        codec::encode_message(self)
    }

    /// Streaming dump: validate, then write the finished buffer to a sink.
    pub fn encode_to<W: Write>(&self, sink: &mut W) -> Result<(), EncodeError> {
        let bytes = self.encode()?;
        sink.write_all(&bytes)?;
        Ok(())
    }

    /// Deserialize an instance from bytes. Unknown field numbers are
    /// skipped by wire type; malformed input fails without yielding a
    /// partially-populated instance.
    pub fn decode(
        schema: &Arc<Schema>,
        descriptor: MessageRef,
        bytes: &[u8],
    ) -> Result<Self, DecodeError> {
        codec::decode_message(schema, descriptor, bytes)
    }

    /// Streaming load: read the source to its end, then decode.
    pub fn decode_from<R: Read>(
        schema: &Arc<Schema>,
        descriptor: MessageRef,
        source: &mut R,
    ) -> Result<Self, DecodeError> {
        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes)?;
        codec::decode_message(schema, descriptor, &bytes)
    }

    /// Merge another instance of the same type into this one: repeated
    /// fields concatenate self-then-other, nested messages merge
    /// recursively, everything else takes the other's value when present.
    pub fn merge_from(&mut self, other: &Message) -> Result<(), ValidationError> {
        codec::merge_message(self, other)
    }

    fn slot(&self, name: &str) -> Result<usize, ValidationError> {
        self.descriptor()
            .slot_by_name(name)
            .ok_or_else(|| ValidationError::NoSuchField {
                name: name.to_string(),
            })
    }

    /// Assign a slot directly, maintaining the oneof invariant.
    pub(crate) fn assign(&mut self, slot: usize, value: Option<Value>) {
        let clear: Vec<usize> = if value.is_some() {
            self.descriptor()
                .oneof_of_slot(slot)
                .map(|g| g.members.iter().copied().filter(|&m| m != slot).collect())
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        for member in clear {
            self.values[member] = None;
        }
        self.values[slot] = value;
    }

    pub(crate) fn value_at(&self, slot: usize) -> Option<&Value> {
        self.values[slot].as_ref()
    }

    pub(crate) fn value_at_mut(&mut self, slot: usize) -> &mut Option<Value> {
        &mut self.values[slot]
    }
}

/// Field-by-field equality of two instances of the same descriptor.
impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor == other.descriptor && self.values == other.values
    }
}
