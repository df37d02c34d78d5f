// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 tagwire contributors

//! Dump/load round-trip coverage across every field shape, plus wire-level
//! shape checks for packed and unpacked repetition.

use std::sync::Arc;
use tagwire::{
    DecodeError, Message, MessageDef, MessageRef, ScalarType, Schema, SchemaBuilder, TypeExpr,
    Value,
};

fn scalar_soup() -> (Arc<Schema>, MessageRef) {
    let mut builder = SchemaBuilder::new();
    let m = builder.declare("ScalarSoup");
    builder.define(
        m,
        MessageDef::new()
            .field(1, "flag", TypeExpr::scalar(ScalarType::Bool))
            .field(2, "i32", TypeExpr::scalar(ScalarType::Int32))
            .field(3, "i64", TypeExpr::scalar(ScalarType::Int64))
            .field(4, "u32", TypeExpr::scalar(ScalarType::UInt32))
            .field(5, "u64", TypeExpr::scalar(ScalarType::UInt64))
            .field(6, "s32", TypeExpr::scalar(ScalarType::Sint32))
            .field(7, "s64", TypeExpr::scalar(ScalarType::Sint64))
            .field(8, "f32", TypeExpr::scalar(ScalarType::Fixed32))
            .field(9, "f64", TypeExpr::scalar(ScalarType::Fixed64))
            .field(10, "sf32", TypeExpr::scalar(ScalarType::Sfixed32))
            .field(11, "sf64", TypeExpr::scalar(ScalarType::Sfixed64))
            .field(12, "real", TypeExpr::scalar(ScalarType::Float))
            .field(13, "precise", TypeExpr::scalar(ScalarType::Double))
            .field(14, "label", TypeExpr::scalar(ScalarType::String))
            .field(15, "blob", TypeExpr::scalar(ScalarType::Bytes)),
    );
    (builder.build().unwrap(), m)
}

#[test]
fn every_scalar_kind_round_trips() {
    let (schema, m) = scalar_soup();
    let mut msg = Message::new(&schema, m);
    msg.set("flag", true).unwrap();
    msg.set("i32", -123_456i32).unwrap();
    msg.set("i64", -9_000_000_000i64).unwrap();
    msg.set("u32", 4_000_000_000u32).unwrap();
    msg.set("u64", u64::MAX).unwrap();
    msg.set("s32", i32::MIN).unwrap();
    msg.set("s64", i64::MIN).unwrap();
    msg.set("f32", 0xDEAD_BEEFu32).unwrap();
    msg.set("f64", 0xFEED_FACE_CAFE_BEEFu64).unwrap();
    msg.set("sf32", -7i32).unwrap();
    msg.set("sf64", -7_000_000_000i64).unwrap();
    msg.set("real", 1.5f32).unwrap();
    msg.set("precise", -2.25f64).unwrap();
    msg.set("label", "round trip").unwrap();
    msg.set("blob", vec![0u8, 255, 128]).unwrap();

    let bytes = msg.encode().unwrap();
    let loaded = Message::decode(&schema, m, &bytes).unwrap();
    assert_eq!(loaded, msg);
}

#[test]
fn zero_length_load_yields_default_instance() {
    let (schema, m) = scalar_soup();
    let loaded = Message::decode(&schema, m, &[]).unwrap();
    assert_eq!(loaded, Message::new(&schema, m));
}

#[test]
fn dump_is_deterministic() {
    let (schema, m) = scalar_soup();
    let mut msg = Message::new(&schema, m);
    msg.set("label", "same bytes").unwrap();
    msg.set("u64", 42u64).unwrap();
    assert_eq!(msg.encode().unwrap(), msg.encode().unwrap());
}

#[test]
fn optional_absent_writes_nothing_and_survives() {
    let mut builder = SchemaBuilder::new();
    let m = builder.declare("MaybeLabel");
    builder.define(
        m,
        MessageDef::new().field(
            1,
            "label",
            TypeExpr::optional(TypeExpr::scalar(ScalarType::String)),
        ),
    );
    let schema = builder.build().unwrap();

    let absent = Message::new(&schema, m);
    assert!(!absent.has("label"));
    let bytes = absent.encode().unwrap();
    assert!(bytes.is_empty());
    let loaded = Message::decode(&schema, m, &bytes).unwrap();
    assert!(!loaded.has("label"));

    let mut present = Message::new(&schema, m);
    present.set("label", "here").unwrap();
    let loaded = Message::decode(&schema, m, &present.encode().unwrap()).unwrap();
    assert_eq!(loaded.get("label"), Some(&Value::Str("here".into())));
}

#[test]
fn empty_repeated_writes_nothing() {
    let mut builder = SchemaBuilder::new();
    let m = builder.declare("Counts");
    builder.define(
        m,
        MessageDef::new().field(
            1,
            "values",
            TypeExpr::repeated(TypeExpr::scalar(ScalarType::UInt32)),
        ),
    );
    let schema = builder.build().unwrap();
    let msg = Message::new(&schema, m);
    assert!(msg.encode().unwrap().is_empty());
}

#[test]
fn packed_repetition_writes_one_unit() {
    let mut builder = SchemaBuilder::new();
    let m = builder.declare("Counts");
    builder.define(
        m,
        MessageDef::new().field(
            4,
            "values",
            TypeExpr::repeated(TypeExpr::scalar(ScalarType::UInt32)),
        ),
    );
    let schema = builder.build().unwrap();
    let mut msg = Message::new(&schema, m);
    for v in [3u32, 270, 86942] {
        msg.push("values", v).unwrap();
    }
    // Canonical packed example: one tag, one length, elements back to back.
    assert_eq!(
        msg.encode().unwrap(),
        [0x22, 0x06, 0x03, 0x8E, 0x02, 0x9E, 0xA7, 0x05]
    );
    let loaded = Message::decode(&schema, m, &msg.encode().unwrap()).unwrap();
    assert_eq!(loaded, msg);
}

#[test]
fn packed_reader_accepts_unpacked_units() {
    let mut builder = SchemaBuilder::new();
    let m = builder.declare("Counts");
    builder.define(
        m,
        MessageDef::new().field(
            1,
            "values",
            TypeExpr::repeated(TypeExpr::scalar(ScalarType::UInt32)),
        ),
    );
    let schema = builder.build().unwrap();
    // A writer compiled without packing would emit one tagged varint per
    // element; readers accept both layouts, even interleaved.
    let bytes = [0x08, 0x03, 0x0A, 0x02, 0x8E, 0x02, 0x08, 0x2A];
    let msg = Message::decode(&schema, m, &bytes).unwrap();
    assert_eq!(
        msg.get("values"),
        Some(&Value::List(vec![
            Value::U32(3),
            Value::U32(270),
            Value::U32(42)
        ]))
    );
}

#[test]
fn string_repetition_is_unpacked_on_the_wire() {
    let mut builder = SchemaBuilder::new();
    let m = builder.declare("Names");
    builder.define(
        m,
        MessageDef::new().field(
            1,
            "names",
            TypeExpr::repeated(TypeExpr::scalar(ScalarType::String)),
        ),
    );
    let schema = builder.build().unwrap();
    let mut msg = Message::new(&schema, m);
    msg.push("names", "ab").unwrap();
    msg.push("names", "c").unwrap();
    // One tag + length + payload per element.
    assert_eq!(msg.encode().unwrap(), b"\x0A\x02ab\x0A\x01c");
    let loaded = Message::decode(&schema, m, &msg.encode().unwrap()).unwrap();
    assert_eq!(loaded, msg);
}

#[test]
fn nested_and_mutually_recursive_types_round_trip() {
    let mut builder = SchemaBuilder::new();
    let ping = builder.declare("Ping");
    let pong = builder.declare("Pong");
    builder.define(
        ping,
        MessageDef::new()
            .field(1, "hop", TypeExpr::scalar(ScalarType::UInt32))
            .field(2, "reply", TypeExpr::optional(TypeExpr::message(pong))),
    );
    builder.define(
        pong,
        MessageDef::new()
            .field(1, "hop", TypeExpr::scalar(ScalarType::UInt32))
            .field(2, "reply", TypeExpr::optional(TypeExpr::message(ping))),
    );
    let schema = builder.build().unwrap();

    let mut inner_ping = Message::new(&schema, ping);
    inner_ping.set("hop", 3u32).unwrap();
    let mut inner_pong = Message::new(&schema, pong);
    inner_pong.set("hop", 2u32).unwrap();
    inner_pong.set("reply", inner_ping).unwrap();
    let mut outer = Message::new(&schema, ping);
    outer.set("hop", 1u32).unwrap();
    outer.set("reply", inner_pong).unwrap();

    let bytes = outer.encode().unwrap();
    let loaded = Message::decode(&schema, ping, &bytes).unwrap();
    assert_eq!(loaded, outer);
    let reply = loaded.get("reply").and_then(Value::as_message).unwrap();
    assert_eq!(reply.get("hop"), Some(&Value::U32(2)));
}

#[test]
fn unknown_fields_are_tolerated_across_schema_versions() {
    let mut wide_builder = SchemaBuilder::new();
    let wide = wide_builder.declare("Record");
    wide_builder.define(
        wide,
        MessageDef::new()
            .field(1, "id", TypeExpr::scalar(ScalarType::UInt32))
            .field(2, "label", TypeExpr::scalar(ScalarType::String))
            .field(
                3,
                "tags",
                TypeExpr::repeated(TypeExpr::scalar(ScalarType::UInt32)),
            ),
    );
    let wide_schema = wide_builder.build().unwrap();

    let mut narrow_builder = SchemaBuilder::new();
    let narrow = narrow_builder.declare("Record");
    narrow_builder.define(
        narrow,
        MessageDef::new().field(2, "label", TypeExpr::scalar(ScalarType::String)),
    );
    let narrow_schema = narrow_builder.build().unwrap();

    let mut msg = Message::new(&wide_schema, wide);
    msg.set("id", 7u32).unwrap();
    msg.set("label", "kept").unwrap();
    msg.push("tags", 1u32).unwrap();
    msg.push("tags", 2u32).unwrap();

    let loaded = Message::decode(&narrow_schema, narrow, &msg.encode().unwrap()).unwrap();
    assert_eq!(loaded.get("label"), Some(&Value::Str("kept".into())));
}

#[test]
fn truncated_nested_payload_fails() {
    let mut builder = SchemaBuilder::new();
    let outer = builder.declare("Outer");
    let inner = builder.declare("Inner");
    builder.define(
        inner,
        MessageDef::new().field(1, "id", TypeExpr::scalar(ScalarType::UInt64)),
    );
    builder.define(
        outer,
        MessageDef::new().field(1, "child", TypeExpr::optional(TypeExpr::message(inner))),
    );
    let schema = builder.build().unwrap();
    // Length claims 5 payload bytes, only 2 present.
    let bytes = [0x0A, 0x05, 0x08, 0x01];
    assert!(matches!(
        Message::decode(&schema, outer, &bytes),
        Err(DecodeError::LengthOverrun { .. } | DecodeError::Truncated { .. })
    ));
}

#[test]
fn io_adapters_round_trip() {
    let (schema, m) = scalar_soup();
    let mut msg = Message::new(&schema, m);
    msg.set("label", "streamed").unwrap();
    msg.set("u32", 99u32).unwrap();

    let mut sink = Vec::new();
    msg.encode_to(&mut sink).unwrap();
    let loaded = Message::decode_from(&schema, m, &mut sink.as_slice()).unwrap();
    assert_eq!(loaded, msg);
}

#[test]
fn randomized_scalar_round_trip() {
    let (schema, m) = scalar_soup();
    fastrand::seed(0x7A67);

    for _ in 0..200 {
        let mut msg = Message::new(&schema, m);
        msg.set("flag", fastrand::bool()).unwrap();
        msg.set("i32", fastrand::i32(..)).unwrap();
        msg.set("i64", fastrand::i64(..)).unwrap();
        msg.set("u32", fastrand::u32(..)).unwrap();
        msg.set("u64", fastrand::u64(..)).unwrap();
        msg.set("s32", fastrand::i32(..)).unwrap();
        msg.set("s64", fastrand::i64(..)).unwrap();
        msg.set("f32", fastrand::u32(..)).unwrap();
        msg.set("f64", fastrand::u64(..)).unwrap();
        msg.set("sf32", fastrand::i32(..)).unwrap();
        msg.set("sf64", fastrand::i64(..)).unwrap();
        msg.set("real", f32::from_bits(fastrand::u32(..) & 0x7F7F_FFFF))
            .unwrap();
        msg.set("precise", f64::from_bits(fastrand::u64(..) & 0x7FEF_FFFF_FFFF_FFFF))
            .unwrap();

        let bytes = msg.encode().unwrap();
        let loaded = Message::decode(&schema, m, &bytes).unwrap();
        assert_eq!(loaded, msg);
    }
}
