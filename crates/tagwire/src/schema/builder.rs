// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 tagwire contributors

//! Schema definition surface and the message descriptor compiler.
//!
//! Record types are declared first (reserving a stable [`MessageRef`]) and
//! defined afterwards, so mutually-referencing records can name each other
//! before either is finished. Compilation runs once, in `build`, and either
//! produces a complete immutable [`Schema`] or fails; no partially-usable
//! descriptor ever escapes.

use crate::error::SchemaError;
use crate::schema::descriptor::{
    EnumDescriptor, EnumRef, FieldDescriptor, FieldShape, MessageDescriptor, MessageRef,
    OneOfDescriptor, Schema,
};
use crate::schema::strategy::{self, EncodingStrategy};
use crate::schema::type_expr::{analyze, TypeExpr};
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// One pending field: declared, not yet compiled.
#[derive(Debug, Clone)]
struct FieldDef {
    number: u32,
    name: String,
    declared: TypeExpr,
    default: Option<Value>,
}

/// Fluent definition of one record type's fields, inner types and oneof
/// groups.
#[derive(Debug, Clone, Default)]
pub struct MessageDef {
    fields: Vec<FieldDef>,
    nested: Vec<MessageRef>,
    oneofs: Vec<(String, Vec<u32>)>,
}

impl MessageDef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field. Declaration order is preserved through dump, merge
    /// and rendering; numbers need not be contiguous or ordered.
    #[must_use]
    pub fn field(mut self, number: u32, name: impl Into<String>, declared: TypeExpr) -> Self {
        self.fields.push(FieldDef {
            number,
            name: name.into(),
            declared,
            default: None,
        });
        self
    }

    /// Declare a field with an explicit default value for new instances.
    #[must_use]
    pub fn field_with_default(
        mut self,
        number: u32,
        name: impl Into<String>,
        declared: TypeExpr,
        default: impl Into<Value>,
    ) -> Self {
        self.fields.push(FieldDef {
            number,
            name: name.into(),
            declared,
            default: Some(default.into()),
        });
        self
    }

    /// Register an inner message type for rendering. This list is the sole
    /// source of nested blocks in schema text; it is not inferred from
    /// field references and must be acyclic.
    #[must_use]
    pub fn nested(mut self, inner: MessageRef) -> Self {
        self.nested.push(inner);
        self
    }

    /// Declare a oneof group over the given field numbers. Members must be
    /// optional fields; at most one holds a value at a time.
    #[must_use]
    pub fn oneof(mut self, name: impl Into<String>, members: impl IntoIterator<Item = u32>) -> Self {
        self.oneofs
            .push((name.into(), members.into_iter().collect()));
        self
    }
}

/// Builder for a [`Schema`] arena.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    names: Vec<String>,
    defs: Vec<Option<MessageDef>>,
    enums: Vec<EnumDescriptor>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a slot for a message type. The returned reference may be
    /// used in field types immediately, including by the message itself.
    pub fn declare(&mut self, name: impl Into<String>) -> MessageRef {
        self.names.push(name.into());
        self.defs.push(None);
        MessageRef(self.names.len() - 1)
    }

    /// Declare an integer-backed enumeration.
    pub fn declare_enum(
        &mut self,
        name: impl Into<String>,
        members: &[(&str, i32)],
    ) -> EnumRef {
        self.enums.push(EnumDescriptor {
            name: name.into(),
            members: members
                .iter()
                .map(|(n, v)| ((*n).to_string(), *v))
                .collect(),
        });
        EnumRef(self.enums.len() - 1)
    }

    /// Attach the field list to a previously declared message.
    pub fn define(&mut self, message: MessageRef, def: MessageDef) -> &mut Self {
        self.defs[message.0] = Some(def);
        self
    }

    /// Compile every declared message into descriptors.
    pub fn build(self) -> Result<Arc<Schema>, SchemaError> {
        for (i, name) in self.names.iter().enumerate() {
            if self.names[..i].contains(name) {
                return Err(SchemaError::DuplicateTypeName { name: name.clone() });
            }
        }

        let mut messages = Vec::with_capacity(self.defs.len());
        for (slot, def) in self.defs.iter().enumerate() {
            let def = def.as_ref().ok_or_else(|| SchemaError::UndefinedMessage {
                name: self.names[slot].clone(),
            })?;
            messages.push(self.compile_message(&self.names[slot], def)?);
        }

        check_nested_cycles(&messages)?;

        Ok(Arc::new(Schema {
            messages,
            enums: self.enums,
        }))
    }

    /// The message descriptor compiler: one pass over the declared fields
    /// in declaration order.
    fn compile_message(
        &self,
        name: &str,
        def: &MessageDef,
    ) -> Result<MessageDescriptor, SchemaError> {
        let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(def.fields.len());
        let mut by_number: HashMap<u32, usize> = HashMap::with_capacity(def.fields.len());

        for fd in &def.fields {
            if fd.number == 0 {
                return Err(SchemaError::ZeroFieldNumber {
                    field: fd.name.clone(),
                });
            }

            let shape = analyze(&fd.name, &fd.declared)?;
            let strategy = strategy::resolve(&fd.name, &shape.base)?;
            self.check_refs(&strategy)?;

            let field_shape = if shape.repeated {
                if strategy.packed_capable() {
                    FieldShape::Packed
                } else {
                    FieldShape::Unpacked
                }
            } else if shape.optional {
                FieldShape::Optional
            } else {
                FieldShape::Singular
            };

            let type_name = match &shape.base {
                TypeExpr::Scalar(s) => strategy::keyword(*s).to_string(),
                TypeExpr::Message(r) => self.names[r.0].clone(),
                TypeExpr::Enum(r) => self.enums[r.0].name.clone(),
                // resolve() already rejected everything else.
                other => other.describe(),
            };

            if let Some(default) = &fd.default {
                self.check_default(&fd.name, field_shape, &strategy, default)?;
            }

            let slot = fields.len();
            if let Some(&existing) = by_number.get(&fd.number) {
                return Err(SchemaError::DuplicateFieldNumber {
                    number: fd.number,
                    first: fields[existing].name.clone(),
                    second: fd.name.clone(),
                });
            }
            by_number.insert(fd.number, slot);

            fields.push(FieldDescriptor {
                number: fd.number,
                name: fd.name.clone(),
                shape: field_shape,
                strategy,
                type_name,
                default: fd.default.clone(),
            });
        }

        let oneofs = self.compile_oneofs(def, &fields, &by_number)?;

        for inner in &def.nested {
            if inner.0 >= self.names.len() {
                return Err(SchemaError::UndefinedMessage {
                    name: format!("<message #{}>", inner.0),
                });
            }
        }

        log::debug!(
            "[schema] compiled message {} ({} fields, {} oneofs)",
            name,
            fields.len(),
            oneofs.len()
        );

        Ok(MessageDescriptor {
            name: name.to_string(),
            fields,
            by_number,
            nested: def.nested.clone(),
            oneofs,
        })
    }

    fn compile_oneofs(
        &self,
        def: &MessageDef,
        fields: &[FieldDescriptor],
        by_number: &HashMap<u32, usize>,
    ) -> Result<Vec<OneOfDescriptor>, SchemaError> {
        let mut oneofs = Vec::with_capacity(def.oneofs.len());
        for (group, numbers) in &def.oneofs {
            let mut members = Vec::with_capacity(numbers.len());
            for &number in numbers {
                let slot = *by_number
                    .get(&number)
                    .ok_or_else(|| SchemaError::BadOneOfMember {
                        group: group.clone(),
                        number,
                    })?;
                // Singular members would never read as absent and repeated
                // members have no single value; only optional fields work.
                if fields[slot].shape != FieldShape::Optional {
                    return Err(SchemaError::BadOneOfMember {
                        group: group.clone(),
                        number,
                    });
                }
                members.push(slot);
            }
            oneofs.push(OneOfDescriptor {
                name: group.clone(),
                members,
            });
        }
        Ok(oneofs)
    }

    /// References must point into this builder's arena; a ref from another
    /// builder would index out of bounds at runtime.
    fn check_refs(&self, strategy: &EncodingStrategy) -> Result<(), SchemaError> {
        match strategy {
            EncodingStrategy::Nested(r) if r.0 >= self.names.len() => {
                Err(SchemaError::UndefinedMessage {
                    name: format!("<message #{}>", r.0),
                })
            }
            EncodingStrategy::Enumeration(r) if r.0 >= self.enums.len() => {
                Err(SchemaError::UndefinedMessage {
                    name: format!("<enum #{}>", r.0),
                })
            }
            _ => Ok(()),
        }
    }

    fn check_default(
        &self,
        field: &str,
        shape: FieldShape,
        strategy: &EncodingStrategy,
        default: &Value,
    ) -> Result<(), SchemaError> {
        if shape.is_repeated() {
            return Err(SchemaError::BadDefault {
                field: field.to_string(),
                reason: "repeated fields cannot have a default".into(),
            });
        }
        if matches!(strategy, EncodingStrategy::Nested(_)) {
            return Err(SchemaError::BadDefault {
                field: field.to_string(),
                reason: "message fields cannot have a default".into(),
            });
        }
        strategy
            .validate(&self.enums, field, default)
            .map_err(|e| SchemaError::BadDefault {
                field: field.to_string(),
                reason: e.to_string(),
            })
    }
}

/// The nested-type lists must form a DAG; rendering walks them
/// recursively. Field references may still be cyclic, only the inner-type
/// lists may not.
fn check_nested_cycles(messages: &[MessageDescriptor]) -> Result<(), SchemaError> {
    let mut state = vec![0u8; messages.len()];
    for slot in 0..messages.len() {
        visit_nested(slot, messages, &mut state)?;
    }
    Ok(())
}

fn visit_nested(
    slot: usize,
    messages: &[MessageDescriptor],
    state: &mut [u8],
) -> Result<(), SchemaError> {
    const IN_PROGRESS: u8 = 1;
    const DONE: u8 = 2;
    match state[slot] {
        IN_PROGRESS => Err(SchemaError::CyclicNesting {
            name: messages[slot].name.clone(),
        }),
        DONE => Ok(()),
        _ => {
            state[slot] = IN_PROGRESS;
            for inner in &messages[slot].nested {
                visit_nested(inner.0, messages, state)?;
            }
            state[slot] = DONE;
            Ok(())
        }
    }
}
