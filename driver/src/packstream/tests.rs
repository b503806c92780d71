/*
 * Created on Tue Jan 16 2024
 *
 * This file is a part of Skybolt
 * Skybolt is a free and open-source client driver for the Bolt graph
 * database wire protocol written by Sayan Nandan ("the Author") with
 * the vision to provide a fast and reliable way to talk to graph
 * databases without compromising on correctness or simplicity.
 *
 * Copyright (c) 2024, Sayan Nandan <ohsayan@outlook.com>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 *
*/

use {
    super::{load, unload},
    crate::{
        buffer::Buffer,
        error::BoltError,
        values::{Value, ValueKind},
    },
    rand::Rng,
};

fn pack(value: &Value) -> Vec<u8> {
    let mut buffer = Buffer::with_capacity(64);
    load(&mut buffer, value).unwrap();
    buffer.peek().to_vec()
}

fn unpack(bytes: &[u8]) -> Value {
    let mut buffer = Buffer::with_capacity(64);
    buffer.load(bytes);
    let mut value = Value::new();
    unload(&mut buffer, &mut value).unwrap();
    assert!(buffer.is_empty(), "the item must consume every byte");
    value
}

#[test]
fn null_and_booleans() {
    let mut value = Value::new();
    assert_eq!(pack(&value), vec![0xC0]);
    value.to_bit(0);
    assert_eq!(pack(&value), vec![0xC2]);
    value.to_bit(1);
    assert_eq!(pack(&value), vec![0xC3]);
    assert_eq!(unpack(&[0xC0]).kind(), ValueKind::Null);
    assert_eq!(unpack(&[0xC2]).bit(), 0);
    assert_eq!(unpack(&[0xC3]).bit(), 1);
}

#[test]
fn tiny_ints_pack_into_the_marker() {
    let mut value = Value::new();
    for i in -16..=127i64 {
        value.to_int64(i);
        let bytes = pack(&value);
        assert_eq!(bytes.len(), 1, "{i} must be a bare marker");
        assert_eq!(bytes[0], i as u8);
        assert_eq!(unpack(&bytes).int64(), i);
    }
}

#[test]
fn integer_width_selection_is_minimal() {
    // (value, encoded length including marker)
    let cases: [(i64, usize); 12] = [
        (-16, 1),
        (127, 1),
        (-17, 2),
        (-128, 2),
        (128, 3),
        (-129, 3),
        (32767, 3),
        (32768, 5),
        (-2147483648, 5),
        (2147483647, 5),
        (2147483648, 9),
        (i64::MIN, 9),
    ];
    let mut value = Value::new();
    for (i, expected_len) in cases {
        value.to_int64(i);
        let bytes = pack(&value);
        assert_eq!(bytes.len(), expected_len, "width for {i}");
        assert_eq!(unpack(&bytes).int64(), i, "roundtrip for {i}");
    }
}

#[test]
fn narrow_int_kinds_share_the_integer_rules() {
    let mut value = Value::new();
    value.to_int8(-1);
    assert_eq!(pack(&value), vec![0xFF]);
    value.to_int16(300);
    assert_eq!(pack(&value), vec![0xC9, 0x01, 0x2C]);
    value.to_int32(-40000);
    assert_eq!(pack(&value), vec![0xCA, 0xFF, 0xFF, 0x63, 0xC0]);
}

#[test]
fn random_integers_roundtrip_minimally() {
    let mut rng = rand::thread_rng();
    let mut value = Value::new();
    for _ in 0..2000 {
        let i: i64 = rng.gen();
        let expected_len = if (-16..=127).contains(&i) {
            1
        } else if (i8::MIN as i64..=i8::MAX as i64).contains(&i) {
            2
        } else if (i16::MIN as i64..=i16::MAX as i64).contains(&i) {
            3
        } else if (i32::MIN as i64..=i32::MAX as i64).contains(&i) {
            5
        } else {
            9
        };
        value.to_int64(i);
        let bytes = pack(&value);
        assert_eq!(bytes.len(), expected_len, "width for {i}");
        assert_eq!(unpack(&bytes).int64(), i);
    }
}

#[test]
fn float64_is_big_endian_ieee754() {
    let mut value = Value::new();
    value.to_float64(6.283185307179586);
    assert_eq!(
        pack(&value),
        vec![0xC1, 0x40, 0x19, 0x21, 0xFB, 0x54, 0x44, 0x2D, 0x18]
    );
    assert_eq!(unpack(&pack(&value)).float64(), 6.283185307179586);
    value.to_float64(-0.0);
    let back = unpack(&pack(&value));
    assert_eq!(back.float64().to_bits(), (-0.0f64).to_bits());
}

#[test]
fn string_prefix_selection() {
    let mut value = Value::new();
    value.to_string8("");
    assert_eq!(pack(&value), vec![0x80]);
    value.to_string8("a");
    assert_eq!(pack(&value), vec![0x81, 0x61]);
    // 15 bytes: still tiny
    value.to_string8(&"s".repeat(15));
    assert_eq!(pack(&value)[0], 0x8F);
    // 16 bytes: 8-bit prefix
    value.to_string8(&"s".repeat(16));
    assert_eq!(&pack(&value)[..2], &[0xD0, 0x10]);
    // 256 bytes: 16-bit prefix
    value.to_string8(&"s".repeat(256));
    assert_eq!(&pack(&value)[..3], &[0xD1, 0x01, 0x00]);
    // 65536 bytes: 32-bit prefix
    value.to_string8(&"s".repeat(65536));
    assert_eq!(&pack(&value)[..5], &[0xD2, 0x00, 0x01, 0x00, 0x00]);
}

#[test]
fn strings_roundtrip_including_multibyte() {
    let mut value = Value::new();
    for s in ["", "a", "größe", "en to tre", "\u{1F680} lift off"] {
        value.to_string8(s);
        let back = unpack(&pack(&value));
        assert_eq!(back.kind(), ValueKind::String8);
        assert_eq!(back.string8(), s);
    }
}

#[test]
fn invalid_utf8_is_a_protocol_violation() {
    let mut buffer = Buffer::with_capacity(16);
    buffer.load(&[0x84, 0xFF, 0xFE, 0xFD, 0xFC]);
    let mut value = Value::new();
    assert_eq!(
        unload(&mut buffer, &mut value),
        Err(BoltError::ProtocolViolation)
    );
}

#[test]
fn byte_arrays() {
    let mut value = Value::new();
    value.to_byte_array(&[1, 2, 3]);
    assert_eq!(pack(&value), vec![0xCC, 0x03, 1, 2, 3]);
    let back = unpack(&pack(&value));
    assert_eq!(back.kind(), ValueKind::ByteArray);
    assert_eq!(back.byte_array(), &[1, 2, 3]);

    value.to_byte_array(&[0xAB; 300]);
    let bytes = pack(&value);
    assert_eq!(&bytes[..3], &[0xCD, 0x01, 0x2C]);
    assert_eq!(unpack(&bytes).byte_array(), &[0xAB; 300][..]);
}

#[test]
fn lists_nest_and_roundtrip() {
    let mut value = Value::new();
    value.to_list(2);
    value.list_at_mut(0).to_int64(1);
    value.list_at_mut(1).to_list(1);
    value.list_at_mut(1).list_at_mut(0).to_string8("in");
    let bytes = pack(&value);
    assert_eq!(bytes, vec![0x92, 0x01, 0x91, 0x82, 0x69, 0x6E]);
    let back = unpack(&bytes);
    assert_eq!(back.list_at(0).int64(), 1);
    assert_eq!(back.list_at(1).list_at(0).string8(), "in");
}

#[test]
fn list_header_widths() {
    let mut value = Value::new();
    value.to_list(15);
    assert_eq!(pack(&value)[0], 0x9F);
    value.to_list(16);
    assert_eq!(&pack(&value)[..2], &[0xD4, 0x10]);
    value.to_list(256);
    assert_eq!(&pack(&value)[..3], &[0xD5, 0x01, 0x00]);
}

#[test]
fn dictionaries_preserve_insertion_order() {
    let mut value = Value::new();
    value.to_dictionary8(2);
    value.dict_set_key(0, "one");
    value.dict_value_at_mut(0).to_int64(1);
    value.dict_set_key(1, "two");
    value.dict_value_at_mut(1).to_int64(2);
    let bytes = pack(&value);
    assert_eq!(bytes[0], 0xA2);
    let back = unpack(&bytes);
    assert_eq!(back.kind(), ValueKind::Dictionary8);
    assert_eq!(back.dict_key_at(0), "one");
    assert_eq!(back.dict_value_at(0).int64(), 1);
    assert_eq!(back.dict_key_at(1), "two");
    assert_eq!(back.dict_value_at(1).int64(), 2);
}

#[test]
fn map_with_non_string_key_is_a_protocol_violation() {
    // {1: 2} — keys must be strings
    let mut buffer = Buffer::with_capacity(16);
    buffer.load(&[0xA1, 0x01, 0x02]);
    let mut value = Value::new();
    assert_eq!(
        unload(&mut buffer, &mut value),
        Err(BoltError::ProtocolViolation)
    );
}

#[test]
fn structures_carry_the_signature_between_header_and_fields() {
    let mut value = Value::new();
    value.to_structure(0x4E, 2);
    value.struct_field_at_mut(0).to_int64(1);
    value.struct_field_at_mut(1).to_string8("n");
    let bytes = pack(&value);
    assert_eq!(bytes, vec![0xB2, 0x4E, 0x01, 0x81, 0x6E]);
    let back = unpack(&bytes);
    assert_eq!(back.kind(), ValueKind::Structure);
    assert_eq!(back.subtype(), Some(0x4E));
    assert_eq!(back.struct_field_at(1).string8(), "n");
}

#[test]
fn wide_structures_use_the_count_prefix() {
    let mut value = Value::new();
    value.to_structure(0x01, 20);
    let bytes = pack(&value);
    assert_eq!(&bytes[..3], &[0xDC, 0x14, 0x01]);
    let back = unpack(&bytes);
    assert_eq!(back.size(), 20);
}

#[test]
fn requests_and_summaries_share_the_structure_encoding() {
    let mut value = Value::new();
    value.to_request(0x10, 0);
    assert_eq!(pack(&value), vec![0xB0, 0x10]);
    value.to_summary(0x70, 0);
    assert_eq!(pack(&value), vec![0xB0, 0x70]);
}

#[test]
fn unload_reads_exactly_the_prefix() {
    let mut value = Value::new();
    value.to_list(2);
    value.list_at_mut(0).to_string8("prefix");
    value.list_at_mut(1).to_int64(65536);
    let mut stream = pack(&value);
    let junk = [0xDF, 0x00, 0x13, 0x37];
    stream.extend_from_slice(&junk);

    let mut buffer = Buffer::with_capacity(64);
    buffer.load(&stream);
    let mut target = Value::new();
    unload(&mut buffer, &mut target).unwrap();
    assert_eq!(target, value.clone());
    assert_eq!(buffer.peek(), &junk, "junk must be left untouched");
}

#[test]
fn truncated_frames_are_protocol_violations() {
    let truncated: &[&[u8]] = &[
        &[0xC9, 0x01],             // INT_16 missing a byte
        &[0xC1, 0x00, 0x00],       // FLOAT64 cut short
        &[0x84, 0x61],             // tiny string shorter than its length
        &[0xD0, 0x05, 0x61],       // 8-bit string shorter than its length
        &[0x92, 0x01],             // list missing an element
        &[0xB2, 0x4E, 0x01],       // structure missing a field
        &[0xCC, 0x04, 0x01, 0x02], // bytes shorter than the prefix
        &[],                       // nothing at all
    ];
    for frame in truncated {
        let mut buffer = Buffer::with_capacity(16);
        buffer.load(frame);
        let mut value = Value::new();
        assert_eq!(
            unload(&mut buffer, &mut value),
            Err(BoltError::ProtocolViolation),
            "frame {frame:X?}"
        );
    }
}

#[test]
fn reserved_markers_are_protocol_violations() {
    for marker in [0xC4u8, 0xC5, 0xC6, 0xC7, 0xCF, 0xD3, 0xD7, 0xDB, 0xDE, 0xDF] {
        let mut buffer = Buffer::with_capacity(4);
        buffer.load(&[marker]);
        let mut value = Value::new();
        assert_eq!(
            unload(&mut buffer, &mut value),
            Err(BoltError::ProtocolViolation),
            "marker {marker:#04X}"
        );
    }
}

#[test]
fn kinds_outside_the_wire_grammar_do_not_load() {
    let mut buffer = Buffer::with_capacity(16);
    let mut value = Value::new();
    let mutations: &[fn(&mut Value)] = &[
        |v| v.to_byte(7),
        |v| v.to_num8(7),
        |v| v.to_num64(7),
        |v| v.to_num16_array(&[7]),
        |v| v.to_int8_array(&[7]),
        |v| v.to_int64_array(&[7]),
        |v| v.to_float32(7.0),
        |v| v.to_float32_array(&[7.0]),
        |v| v.to_float64_array(&[7.0]),
        |v| v.to_bit_array(&[1]),
        |v| v.to_string8_array(1),
        |v| v.to_structure_array(0x4E, 1),
    ];
    for mutate in mutations {
        mutate(&mut value);
        assert_eq!(
            load(&mut buffer, &value),
            Err(BoltError::ProtocolViolation),
            "kind {:?}",
            value.kind()
        );
    }
}
