// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 tagwire contributors

//! Process-wide schema side-table.
//!
//! Compiled metadata is never attached to user types; it lives in a
//! companion table keyed by message type name, so generic tooling can find
//! a descriptor (and its schema text) from a name alone.

use crate::error::SchemaError;
use crate::schema::descriptor::{MessageRef, Schema};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::{Arc, OnceLock};

type Table = DashMap<String, (Arc<Schema>, MessageRef)>;

fn table() -> &'static Table {
    static TABLE: OnceLock<Table> = OnceLock::new();
    TABLE.get_or_init(DashMap::new)
}

/// Record every message type of the schema under its type name.
///
/// Publishing a name twice is an error. Each name is claimed atomically
/// through the map's entry API, so concurrent publishes of the same name
/// cannot both succeed; on a clash, the names this call already claimed
/// are released again before the error returns.
pub fn publish(schema: &Arc<Schema>) -> Result<(), SchemaError> {
    let table = table();
    let mut claimed: Vec<MessageRef> = Vec::new();
    for r in schema.messages() {
        let name = schema.message(r).name.clone();
        let clash = match table.entry(name.clone()) {
            Entry::Occupied(_) => true,
            Entry::Vacant(slot) => {
                slot.insert((schema.clone(), r));
                false
            }
        };
        if clash {
            // The entry guard is released before touching other keys.
            for done in claimed {
                table.remove(&schema.message(done).name);
            }
            return Err(SchemaError::DuplicateTypeName { name });
        }
        claimed.push(r);
        log::debug!("[registry] published message type {}", name);
    }
    Ok(())
}

/// Look up a published message type by name.
pub fn lookup(name: &str) -> Option<(Arc<Schema>, MessageRef)> {
    table().get(name).map(|entry| entry.value().clone())
}

/// Render the schema text of a published message type.
pub fn schema_text(name: &str) -> Option<String> {
    let (schema, r) = lookup(name)?;
    Some(schema.to_schema_text(r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::builder::{MessageDef, SchemaBuilder};
    use crate::schema::type_expr::{ScalarType, TypeExpr};

    #[test]
    fn publish_then_lookup() {
        let mut builder = SchemaBuilder::new();
        let m = builder.declare("RegistrySample");
        builder.define(
            m,
            MessageDef::new().field(1, "id", TypeExpr::scalar(ScalarType::UInt64)),
        );
        let schema = builder.build().unwrap();

        publish(&schema).unwrap();
        let (found, r) = lookup("RegistrySample").unwrap();
        assert_eq!(found.message(r).name, "RegistrySample");
        assert!(lookup("NoSuchType").is_none());

        // Same name again is rejected.
        assert!(matches!(
            publish(&schema),
            Err(SchemaError::DuplicateTypeName { .. })
        ));
    }

    #[test]
    fn failed_publish_releases_claimed_names() {
        let mut builder = SchemaBuilder::new();
        let taken = builder.declare("RollbackTaken");
        builder.define(
            taken,
            MessageDef::new().field(1, "id", TypeExpr::scalar(ScalarType::UInt32)),
        );
        publish(&builder.build().unwrap()).unwrap();

        // Second schema claims a fresh name before clashing on the taken
        // one; the fresh name must not stay behind.
        let mut builder = SchemaBuilder::new();
        let fresh = builder.declare("RollbackFresh");
        let clash = builder.declare("RollbackTaken");
        builder.define(
            fresh,
            MessageDef::new().field(1, "id", TypeExpr::scalar(ScalarType::UInt32)),
        );
        builder.define(
            clash,
            MessageDef::new().field(1, "id", TypeExpr::scalar(ScalarType::UInt32)),
        );
        assert!(matches!(
            publish(&builder.build().unwrap()),
            Err(SchemaError::DuplicateTypeName { .. })
        ));
        assert!(lookup("RollbackFresh").is_none());
        assert!(lookup("RollbackTaken").is_some());
    }
}
