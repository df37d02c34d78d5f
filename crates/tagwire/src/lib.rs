// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 tagwire contributors

//! # tagwire - runtime Protocol Buffers schemas in pure Rust
//!
//! A schema compiler and binary codec for the Protocol Buffers wire
//! format, built entirely at runtime: no `.proto` files, no code
//! generation. Message types are declared with a builder, compiled once
//! into immutable descriptors, and then drive dump, load, merge and
//! schema-text rendering for any number of instances.
//!
//! ## Quick Start
//!
//! ```rust
//! use tagwire::{Message, MessageDef, ScalarType, SchemaBuilder, TypeExpr};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Declare and compile a message type.
//! let mut builder = SchemaBuilder::new();
//! let search = builder.declare("SearchRequest");
//! builder.define(
//!     search,
//!     MessageDef::new()
//!         .field(1, "query", TypeExpr::scalar(ScalarType::String))
//!         .field(2, "page_number", TypeExpr::scalar(ScalarType::Int32))
//!         .field(3, "results_per_page", TypeExpr::scalar(ScalarType::Int32)),
//! );
//! let schema = builder.build()?;
//!
//! // Populate an instance and dump it to bytes.
//! let mut request = Message::new(&schema, search);
//! request.set("query", "wire format")?;
//! request.set("page_number", 2i32)?;
//! let bytes = request.encode()?;
//!
//! // Load it back; the round trip is lossless.
//! let loaded = Message::decode(&schema, search, &bytes)?;
//! assert_eq!(loaded, request);
//!
//! // Render the schema text.
//! assert!(schema.to_schema_text(search).starts_with("message SearchRequest {"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SchemaBuilder`] | Declares message and enum types, compiles them into a [`Schema`] |
//! | [`Schema`] | Immutable arena of compiled descriptors, shared via `Arc` |
//! | [`Message`] | A runtime instance of one compiled message type |
//! | [`Value`] | The runtime value held by one field |
//! | [`EncodingStrategy`] | The wire capability bundle chosen for a field at compile time |
//!
//! ## Modules Overview
//!
//! - [`schema`] - type expressions, descriptors, builder, strategy registry
//! - [`wire`] - varint/ZigZag primitives and the bounds-checked read cursor
//! - [`error`] - build-time, dump-time and load-time error taxonomies

/// Error taxonomies for schema building, validation and the codec.
pub mod error;
/// Compiled descriptors, the schema builder and the strategy registry.
pub mod schema;
/// Wire-format primitives: tags, varints, ZigZag, read cursor.
pub mod wire;

mod codec;
mod message;
mod render;
mod value;

pub use error::{DecodeError, EncodeError, SchemaError, ValidationError};
pub use message::Message;
pub use schema::{
    EncodingStrategy, EnumDescriptor, EnumRef, FieldDescriptor, FieldShape, MessageDef,
    MessageDescriptor, MessageRef, OneOfDescriptor, ScalarKind, ScalarType, Schema, SchemaBuilder,
    TypeExpr, TypeShape,
};
pub use value::Value;
