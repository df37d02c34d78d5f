// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 tagwire contributors

//! Schema compilation: declared types in, immutable descriptors out.
//!
//! The pipeline per field is analyzer -> strategy registry -> descriptor
//! builder, run once per record type by [`SchemaBuilder::build`]. Binary
//! round-tripping and text rendering consume the compiled descriptors and
//! never re-analyze declared types.

mod builder;
mod descriptor;
pub mod registry;
mod strategy;
mod type_expr;

pub use builder::{MessageDef, SchemaBuilder};
pub use descriptor::{
    EnumDescriptor, EnumRef, FieldDescriptor, FieldShape, MessageDescriptor, MessageRef,
    OneOfDescriptor, Schema,
};
pub use strategy::{keyword, resolve, EncodingStrategy, ScalarKind};
pub use type_expr::{analyze, ScalarType, TypeExpr, TypeShape};
