// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 tagwire contributors

//! LEB128 varints and the ZigZag transform for signed variable-length
//! integers.

/// Append an unsigned LEB128 varint to the sink.
pub fn encode_varint(sink: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            sink.push(byte);
            return;
        }
        sink.push(byte | 0x80);
    }
}

/// ZigZag-map an `i32` so small magnitudes stay small on the wire.
pub fn encode_zigzag32(value: i32) -> u64 {
    u64::from(((value << 1) ^ (value >> 31)) as u32)
}

/// ZigZag-map an `i64`.
pub fn encode_zigzag64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`encode_zigzag32`].
pub fn decode_zigzag32(raw: u64) -> i32 {
    let raw = raw as u32;
    ((raw >> 1) as i32) ^ -((raw & 1) as i32)
}

/// Inverse of [`encode_zigzag64`].
pub fn decode_zigzag64(raw: u64) -> i64 {
    ((raw >> 1) as i64) ^ -((raw & 1) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::WireCursor;

    #[test]
    fn varint_known_vectors() {
        let mut sink = Vec::new();
        encode_varint(&mut sink, 0);
        assert_eq!(sink, [0x00]);

        sink.clear();
        encode_varint(&mut sink, 1);
        assert_eq!(sink, [0x01]);

        sink.clear();
        encode_varint(&mut sink, 300);
        assert_eq!(sink, [0xAC, 0x02]);

        sink.clear();
        encode_varint(&mut sink, u64::MAX);
        assert_eq!(sink.len(), 10);
    }

    #[test]
    fn varint_round_trip() {
        for value in [0u64, 1, 127, 128, 300, 16_383, 16_384, u64::from(u32::MAX), u64::MAX] {
            let mut sink = Vec::new();
            encode_varint(&mut sink, value);
            let mut cursor = WireCursor::new(&sink);
            assert_eq!(cursor.read_varint().unwrap(), value);
            assert!(cursor.is_empty());
        }
    }

    #[test]
    fn zigzag_known_vectors() {
        // From the protobuf encoding documentation.
        assert_eq!(encode_zigzag32(0), 0);
        assert_eq!(encode_zigzag32(-1), 1);
        assert_eq!(encode_zigzag32(1), 2);
        assert_eq!(encode_zigzag32(-2), 3);
        assert_eq!(encode_zigzag32(i32::MAX), 4_294_967_294);
        assert_eq!(encode_zigzag32(i32::MIN), 4_294_967_295);

        for value in [0i32, 1, -1, 42, -42, i32::MAX, i32::MIN] {
            assert_eq!(decode_zigzag32(encode_zigzag32(value)), value);
        }
        for value in [0i64, 1, -1, 1 << 40, -(1 << 40), i64::MAX, i64::MIN] {
            assert_eq!(decode_zigzag64(encode_zigzag64(value)), value);
        }
    }
}
