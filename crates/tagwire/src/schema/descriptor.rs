// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 tagwire contributors

//! Compiled descriptors: the immutable output of schema compilation.
//!
//! Descriptors live in a [`Schema`] arena and are addressed through stable
//! [`MessageRef`] / [`EnumRef`] indices. A nested-message strategy holds only
//! a `MessageRef`, never the descriptor itself, so mutually-referencing
//! record types compile without either needing the other to be finished.

use crate::schema::strategy::EncodingStrategy;
use std::collections::HashMap;

/// Stable identity of a message descriptor within its [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef(pub(crate) usize);

/// Stable identity of an enum descriptor within its [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumRef(pub(crate) usize);

/// How a field's presence and repetition are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// Exactly one value, always serialized.
    Singular,
    /// Zero or one value; absent values are skipped on the wire.
    Optional,
    /// Repeated, all elements under a single tag with one combined length.
    Packed,
    /// Repeated, one tag + value per element.
    Unpacked,
}

impl FieldShape {
    pub fn is_repeated(self) -> bool {
        matches!(self, Self::Packed | Self::Unpacked)
    }
}

/// One compiled field: number, name, shape and chosen encoding strategy.
///
/// Immutable once built; owned exclusively by its [`MessageDescriptor`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub number: u32,
    pub name: String,
    pub shape: FieldShape,
    pub strategy: EncodingStrategy,
    /// Keyword or declared type name used by the schema text renderer.
    pub type_name: String,
    /// Explicit default for singular fields, validated at build time.
    pub default: Option<crate::value::Value>,
}

/// A read-only view over a set of optional fields where at most one member
/// holds a value at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct OneOfDescriptor {
    pub name: String,
    /// Member field slots, in declared group order.
    pub members: Vec<usize>,
}

/// A compiled record type: ordered fields plus an O(1) number index.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDescriptor {
    pub name: String,
    /// Declaration order, used by dump, merge and rendering.
    pub(crate) fields: Vec<FieldDescriptor>,
    /// Field number -> slot in `fields`, used by decode.
    pub(crate) by_number: HashMap<u32, usize>,
    /// Inner message types for rendering. Sourced from the definition's own
    /// nested-type list, independent of which fields reference what.
    pub(crate) nested: Vec<MessageRef>,
    pub(crate) oneofs: Vec<OneOfDescriptor>,
}

impl MessageDescriptor {
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field_by_number(&self, number: u32) -> Option<&FieldDescriptor> {
        self.by_number.get(&number).map(|&slot| &self.fields[slot])
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub(crate) fn slot_by_name(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn nested(&self) -> &[MessageRef] {
        &self.nested
    }

    pub fn oneofs(&self) -> &[OneOfDescriptor] {
        &self.oneofs
    }

    /// The oneof group containing the given field slot, if any.
    pub(crate) fn oneof_of_slot(&self, slot: usize) -> Option<&OneOfDescriptor> {
        self.oneofs.iter().find(|g| g.members.contains(&slot))
    }
}

/// An integer-backed enumeration with named members.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    pub name: String,
    /// Declaration order.
    pub(crate) members: Vec<(String, i32)>,
}

impl EnumDescriptor {
    pub fn members(&self) -> &[(String, i32)] {
        &self.members
    }

    pub fn member_by_value(&self, value: i32) -> Option<&str> {
        self.members
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(n, _)| n.as_str())
    }

    pub fn member_by_name(&self, name: &str) -> Option<i32> {
        self.members
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}

/// Arena of compiled descriptors.
///
/// Built exactly once, immutable thereafter, and safe for unsynchronized
/// concurrent reads behind an `Arc`.
#[derive(Debug, PartialEq)]
pub struct Schema {
    pub(crate) messages: Vec<MessageDescriptor>,
    pub(crate) enums: Vec<EnumDescriptor>,
}

impl Schema {
    pub fn message(&self, r: MessageRef) -> &MessageDescriptor {
        &self.messages[r.0]
    }

    pub fn enumeration(&self, r: EnumRef) -> &EnumDescriptor {
        &self.enums[r.0]
    }

    pub fn message_by_name(&self, name: &str) -> Option<MessageRef> {
        self.messages
            .iter()
            .position(|m| m.name == name)
            .map(MessageRef)
    }

    pub fn messages(&self) -> impl Iterator<Item = MessageRef> + '_ {
        (0..self.messages.len()).map(MessageRef)
    }
}
