// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 tagwire contributors

//! Schema text rendering.
//!
//! Produces a `message Name { ... }` block from a compiled descriptor:
//! nested message blocks first, then one line per field in declaration
//! order. Output is deterministic for a given schema.

use crate::schema::{MessageRef, Schema};
use std::fmt::Write;

const INDENT: &str = "    ";

impl Schema {
    /// Render one message type (and its nested types) as schema text.
    pub fn to_schema_text(&self, r: MessageRef) -> String {
        let mut out = String::new();
        self.render_message(r, 0, &mut out);
        // Every line is newline-terminated; the text itself ends at the
        // top-level closing brace.
        out.truncate(out.len().saturating_sub(1));
        out
    }

    fn render_message(&self, r: MessageRef, depth: usize, out: &mut String) {
        let desc = self.message(r);
        let pad = INDENT.repeat(depth);
        let _ = writeln!(out, "{pad}message {} {{", desc.name);

        // Inner types come from the descriptor's own nested list, not from
        // which fields happen to reference what.
        for &inner in desc.nested() {
            self.render_message(inner, depth + 1, out);
        }

        for field in desc.fields() {
            let label = if field.shape.is_repeated() {
                "repeated "
            } else {
                ""
            };
            let _ = writeln!(
                out,
                "{pad}{INDENT}{label}{} {} = {};",
                field.type_name, field.name, field.number
            );
        }
        let _ = writeln!(out, "{pad}}}");
    }
}
