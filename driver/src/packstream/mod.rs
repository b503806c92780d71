/*
 * Created on Mon Jan 15 2024
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

//! # The PackStream codec
//!
//! PackStream is the self-describing binary encoding carried inside Bolt message frames.
//! Every item starts with a marker byte: the high nibble classifies the item and the low
//! nibble carries either a short length or, for small integers, the value itself. Longer
//! items follow the marker with an 8-, 16- or 32-bit big-endian length prefix.
//!
//! [`load`] serializes a [`Value`] into a [`Buffer`], always choosing the narrowest
//! integer width and the smallest length prefix that fit. [`unload`] reads exactly one
//! item (recursively) from a [`Buffer`], leaving any trailing bytes untouched. Kinds that
//! are not part of the wire grammar are rejected with
//! [`BoltError::ProtocolViolation`].

#[cfg(test)]
mod tests;

use {
    crate::{
        buffer::Buffer,
        error::{BoltError, BoltResult},
        values::Value,
    },
    core::str,
};

consts! {
    pub MARKER_NULL: u8 = 0xC0;
    pub MARKER_FLOAT64: u8 = 0xC1;
    pub MARKER_FALSE: u8 = 0xC2;
    pub MARKER_TRUE: u8 = 0xC3;
    pub MARKER_INT8: u8 = 0xC8;
    pub MARKER_INT16: u8 = 0xC9;
    pub MARKER_INT32: u8 = 0xCA;
    pub MARKER_INT64: u8 = 0xCB;
    pub MARKER_BYTES8: u8 = 0xCC;
    pub MARKER_BYTES16: u8 = 0xCD;
    pub MARKER_BYTES32: u8 = 0xCE;
    pub MARKER_TINY_STRING: u8 = 0x80;
    pub MARKER_STRING8: u8 = 0xD0;
    pub MARKER_STRING16: u8 = 0xD1;
    pub MARKER_STRING32: u8 = 0xD2;
    pub MARKER_TINY_LIST: u8 = 0x90;
    pub MARKER_LIST8: u8 = 0xD4;
    pub MARKER_LIST16: u8 = 0xD5;
    pub MARKER_LIST32: u8 = 0xD6;
    pub MARKER_TINY_MAP: u8 = 0xA0;
    pub MARKER_MAP8: u8 = 0xD8;
    pub MARKER_MAP16: u8 = 0xD9;
    pub MARKER_MAP32: u8 = 0xDA;
    pub MARKER_TINY_STRUCT: u8 = 0xB0;
    pub MARKER_STRUCT8: u8 = 0xDC;
    pub MARKER_STRUCT16: u8 = 0xDD;
    /// Largest value that packs into a bare marker byte
    TINY_INT_MAX: i64 = 127;
    /// Smallest value that packs into a bare marker byte (the 0xF0..=0xFF range)
    TINY_INT_MIN: i64 = -16;
}

#[inline(always)]
fn need<T>(read: Option<T>) -> BoltResult<T> {
    // a short read at this layer means the frame was truncated
    read.ok_or(BoltError::ProtocolViolation)
}

/*
    load
*/

/// Serialize one value into the buffer
pub fn load(buffer: &mut Buffer, value: &Value) -> BoltResult<()> {
    match value {
        Value::Null => {
            buffer.load_u8(MARKER_NULL);
            Ok(())
        }
        Value::Bit(x) => {
            buffer.load_u8(if *x == 0 { MARKER_FALSE } else { MARKER_TRUE });
            Ok(())
        }
        Value::Int8(x) => {
            load_integer(buffer, *x as i64);
            Ok(())
        }
        Value::Int16(x) => {
            load_integer(buffer, *x as i64);
            Ok(())
        }
        Value::Int32(x) => {
            load_integer(buffer, *x as i64);
            Ok(())
        }
        Value::Int64(x) => {
            load_integer(buffer, *x);
            Ok(())
        }
        Value::Float64(x) => {
            buffer.load_u8(MARKER_FLOAT64);
            buffer.load_f64_be(*x);
            Ok(())
        }
        Value::String8(s) => load_string(buffer, s.as_str().as_bytes()),
        Value::ByteArray(b) => load_bytes(buffer, b.as_slice()),
        Value::List(items) => {
            load_size_header(buffer, items.len(), MARKER_TINY_LIST, MARKER_LIST8)?;
            for item in items {
                load(buffer, item)?;
            }
            Ok(())
        }
        Value::Dictionary8(pairs) => {
            load_size_header(buffer, pairs.len(), MARKER_TINY_MAP, MARKER_MAP8)?;
            for (key, item) in pairs {
                load_string(buffer, key.as_str().as_bytes())?;
                load(buffer, item)?;
            }
            Ok(())
        }
        Value::Structure(s) | Value::Request(s) | Value::Summary(s) => {
            load_struct_header(buffer, s.fields.len(), s.code)?;
            for field in &s.fields {
                load(buffer, field)?;
            }
            Ok(())
        }
        // everything else (Byte, the Num kinds, the fixed-width arrays, Float32,
        // BitArray, String8Array, StructureArray) has no wire encoding
        _ => Err(BoltError::ProtocolViolation),
    }
}

/// Pack an integer into the narrowest encoding that preserves its value
fn load_integer(buffer: &mut Buffer, x: i64) {
    if (TINY_INT_MIN..=TINY_INT_MAX).contains(&x) {
        buffer.load_u8(x as u8);
    } else if (i8::MIN as i64..=i8::MAX as i64).contains(&x) {
        buffer.load_u8(MARKER_INT8);
        buffer.load_i8_be(x as i8);
    } else if (i16::MIN as i64..=i16::MAX as i64).contains(&x) {
        buffer.load_u8(MARKER_INT16);
        buffer.load_i16_be(x as i16);
    } else if (i32::MIN as i64..=i32::MAX as i64).contains(&x) {
        buffer.load_u8(MARKER_INT32);
        buffer.load_i32_be(x as i32);
    } else {
        buffer.load_u8(MARKER_INT64);
        buffer.load_i64_be(x);
    }
}

fn load_string(buffer: &mut Buffer, b: &[u8]) -> BoltResult<()> {
    match b.len() {
        0..=0x0F => buffer.load_u8(MARKER_TINY_STRING | b.len() as u8),
        0x10..=0xFF => {
            buffer.load_u8(MARKER_STRING8);
            buffer.load_u8(b.len() as u8);
        }
        0x100..=0xFFFF => {
            buffer.load_u8(MARKER_STRING16);
            buffer.load_u16_be(b.len() as u16);
        }
        n if n <= u32::MAX as usize => {
            buffer.load_u8(MARKER_STRING32);
            buffer.load_u32_be(b.len() as u32);
        }
        _ => return Err(BoltError::ProtocolViolation),
    }
    buffer.load(b);
    Ok(())
}

fn load_bytes(buffer: &mut Buffer, b: &[u8]) -> BoltResult<()> {
    match b.len() {
        0..=0xFF => {
            buffer.load_u8(MARKER_BYTES8);
            buffer.load_u8(b.len() as u8);
        }
        0x100..=0xFFFF => {
            buffer.load_u8(MARKER_BYTES16);
            buffer.load_u16_be(b.len() as u16);
        }
        n if n <= u32::MAX as usize => {
            buffer.load_u8(MARKER_BYTES32);
            buffer.load_u32_be(b.len() as u32);
        }
        _ => return Err(BoltError::ProtocolViolation),
    }
    buffer.load(b);
    Ok(())
}

/// Emit a tiny/8/16/32 container header. `wide_base` is the 8-bit marker; the 16- and
/// 32-bit markers follow it consecutively
fn load_size_header(buffer: &mut Buffer, n: usize, tiny_base: u8, wide_base: u8) -> BoltResult<()> {
    match n {
        0..=0x0F => buffer.load_u8(tiny_base | n as u8),
        0x10..=0xFF => {
            buffer.load_u8(wide_base);
            buffer.load_u8(n as u8);
        }
        0x100..=0xFFFF => {
            buffer.load_u8(wide_base + 1);
            buffer.load_u16_be(n as u16);
        }
        n if n <= u32::MAX as usize => {
            buffer.load_u8(wide_base + 2);
            buffer.load_u32_be(n as u32);
        }
        _ => return Err(BoltError::ProtocolViolation),
    }
    Ok(())
}

fn load_struct_header(buffer: &mut Buffer, n: usize, code: i16) -> BoltResult<()> {
    match n {
        0..=0x0F => buffer.load_u8(MARKER_TINY_STRUCT | n as u8),
        0x10..=0xFF => {
            buffer.load_u8(MARKER_STRUCT8);
            buffer.load_u8(n as u8);
        }
        0x100..=0xFFFF => {
            buffer.load_u8(MARKER_STRUCT16);
            buffer.load_u16_be(n as u16);
        }
        _ => return Err(BoltError::ProtocolViolation),
    }
    buffer.load_u8(code as u8);
    Ok(())
}

/*
    unload
*/

/// Deserialize exactly one item from the buffer into `value`, recursively materializing
/// nested children. Trailing bytes past the item are left for the next read
pub fn unload(buffer: &mut Buffer, value: &mut Value) -> BoltResult<()> {
    let marker = need(buffer.unload_u8())?;
    match marker {
        MARKER_NULL => value.to_null(),
        MARKER_FALSE => value.to_bit(0),
        MARKER_TRUE => value.to_bit(1),
        MARKER_FLOAT64 => {
            let x = need(buffer.unload_f64_be())?;
            value.to_float64(x);
        }
        0x00..=0x7F => value.to_int64(marker as i64),
        0xF0..=0xFF => value.to_int64((marker as i8) as i64),
        MARKER_INT8 => {
            let x = need(buffer.unload_i8_be())?;
            value.to_int64(x as i64);
        }
        MARKER_INT16 => {
            let x = need(buffer.unload_i16_be())?;
            value.to_int64(x as i64);
        }
        MARKER_INT32 => {
            let x = need(buffer.unload_i32_be())?;
            value.to_int64(x as i64);
        }
        MARKER_INT64 => {
            let x = need(buffer.unload_i64_be())?;
            value.to_int64(x);
        }
        0x80..=0x8F => unload_string(buffer, value, (marker & 0x0F) as usize)?,
        MARKER_STRING8 => {
            let n = need(buffer.unload_u8())? as usize;
            unload_string(buffer, value, n)?;
        }
        MARKER_STRING16 => {
            let n = need(buffer.unload_u16_be())? as usize;
            unload_string(buffer, value, n)?;
        }
        MARKER_STRING32 => {
            let n = need(buffer.unload_u32_be())? as usize;
            unload_string(buffer, value, n)?;
        }
        MARKER_BYTES8 => {
            let n = need(buffer.unload_u8())? as usize;
            unload_byte_array(buffer, value, n)?;
        }
        MARKER_BYTES16 => {
            let n = need(buffer.unload_u16_be())? as usize;
            unload_byte_array(buffer, value, n)?;
        }
        MARKER_BYTES32 => {
            let n = need(buffer.unload_u32_be())? as usize;
            unload_byte_array(buffer, value, n)?;
        }
        0x90..=0x9F => unload_list(buffer, value, (marker & 0x0F) as usize)?,
        MARKER_LIST8 => {
            let n = need(buffer.unload_u8())? as usize;
            unload_list(buffer, value, n)?;
        }
        MARKER_LIST16 => {
            let n = need(buffer.unload_u16_be())? as usize;
            unload_list(buffer, value, n)?;
        }
        MARKER_LIST32 => {
            let n = need(buffer.unload_u32_be())? as usize;
            unload_list(buffer, value, n)?;
        }
        0xA0..=0xAF => unload_map(buffer, value, (marker & 0x0F) as usize)?,
        MARKER_MAP8 => {
            let n = need(buffer.unload_u8())? as usize;
            unload_map(buffer, value, n)?;
        }
        MARKER_MAP16 => {
            let n = need(buffer.unload_u16_be())? as usize;
            unload_map(buffer, value, n)?;
        }
        MARKER_MAP32 => {
            let n = need(buffer.unload_u32_be())? as usize;
            unload_map(buffer, value, n)?;
        }
        0xB0..=0xBF => unload_structure(buffer, value, (marker & 0x0F) as usize)?,
        MARKER_STRUCT8 => {
            let n = need(buffer.unload_u8())? as usize;
            unload_structure(buffer, value, n)?;
        }
        MARKER_STRUCT16 => {
            let n = need(buffer.unload_u16_be())? as usize;
            unload_structure(buffer, value, n)?;
        }
        _ => return Err(BoltError::ProtocolViolation),
    }
    Ok(())
}

fn unload_utf8<'a>(buffer: &'a mut Buffer, n: usize) -> BoltResult<&'a str> {
    let bytes = need(buffer.unload(n))?;
    str::from_utf8(bytes).map_err(|_| BoltError::ProtocolViolation)
}

fn unload_string(buffer: &mut Buffer, value: &mut Value, n: usize) -> BoltResult<()> {
    let s = unload_utf8(buffer, n)?;
    value.to_string8(s);
    Ok(())
}

fn unload_byte_array(buffer: &mut Buffer, value: &mut Value, n: usize) -> BoltResult<()> {
    let bytes = need(buffer.unload(n))?;
    value.to_byte_array(bytes);
    Ok(())
}

fn unload_list(buffer: &mut Buffer, value: &mut Value, n: usize) -> BoltResult<()> {
    value.to_list(n);
    for i in 0..n {
        unload(buffer, value.list_at_mut(i))?;
    }
    Ok(())
}

fn unload_map(buffer: &mut Buffer, value: &mut Value, n: usize) -> BoltResult<()> {
    value.to_dictionary8(n);
    for i in 0..n {
        // keys must be strings
        let marker = need(buffer.unload_u8())?;
        let len = match marker {
            0x80..=0x8F => (marker & 0x0F) as usize,
            MARKER_STRING8 => need(buffer.unload_u8())? as usize,
            MARKER_STRING16 => need(buffer.unload_u16_be())? as usize,
            MARKER_STRING32 => need(buffer.unload_u32_be())? as usize,
            _ => return Err(BoltError::ProtocolViolation),
        };
        let key = unload_utf8(buffer, len)?;
        value.dict_set_key(i, key);
        unload(buffer, value.dict_value_at_mut(i))?;
    }
    Ok(())
}

fn unload_structure(buffer: &mut Buffer, value: &mut Value, n: usize) -> BoltResult<()> {
    let code = need(buffer.unload_u8())? as i16;
    value.to_structure(code, n);
    for i in 0..n {
        unload(buffer, value.struct_field_at_mut(i))?;
    }
    Ok(())
}
