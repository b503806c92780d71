/*
 * Created on Wed Jan 10 2024
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

//! # The value system
//!
//! A [`Value`] is the dynamically typed container for everything that can cross the wire:
//! primitives, strings, byte arrays, homogeneous numeric arrays, lists, keyed
//! dictionaries and tagged structures. A value starts out as [`Value::Null`] and is only
//! ever changed through the `to_*` mutators, each of which destroys the previous payload
//! (including all transitively owned children) before installing the new one. Parents own
//! children exclusively; the ownership graph is always a tree.
//!
//! The numeric kinds ([`ValueKind::Num8`] and friends, the fixed-width integer arrays and
//! `Float32`) have no wire encoding. They exist so that callers can hold result data
//! without boxing; attempting to serialize one is a protocol violation.

mod inline;

pub use self::inline::{ArrBuf, Str8};
use core::fmt;

/// The type tag of a [`Value`]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
pub enum ValueKind {
    Null,
    Bit,
    Byte,
    BitArray,
    ByteArray,
    Num8,
    Num16,
    Num32,
    Num64,
    Num8Array,
    Num16Array,
    Num32Array,
    Num64Array,
    Int8,
    Int16,
    Int32,
    Int64,
    Int8Array,
    Int16Array,
    Int32Array,
    Int64Array,
    Float32,
    Float64,
    Float32Array,
    Float64Array,
    String8,
    String8Array,
    List,
    Dictionary8,
    Structure,
    StructureArray,
    Request,
    Summary,
}

/// A tagged structure: the one-byte signature code plus its fields
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    pub(crate) code: i16,
    pub(crate) fields: Vec<Value>,
}

/// An array of structures sharing one signature code
#[derive(Debug, Clone, PartialEq)]
pub struct StructureArray {
    pub(crate) code: i16,
    pub(crate) entries: Vec<Vec<Value>>,
}

/// A dynamically typed value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bit(u8),
    Byte(u8),
    BitArray(ArrBuf<16, u8>),
    ByteArray(ArrBuf<16, u8>),
    Num8(u8),
    Num16(u16),
    Num32(u32),
    Num64(u64),
    Num8Array(ArrBuf<16, u8>),
    Num16Array(ArrBuf<8, u16>),
    Num32Array(ArrBuf<4, u32>),
    Num64Array(ArrBuf<2, u64>),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Int8Array(ArrBuf<16, i8>),
    Int16Array(ArrBuf<8, i16>),
    Int32Array(ArrBuf<4, i32>),
    Int64Array(ArrBuf<2, i64>),
    Float32(f32),
    Float64(f64),
    Float32Array(ArrBuf<4, f32>),
    Float64Array(ArrBuf<2, f64>),
    String8(Str8),
    String8Array(Vec<Str8>),
    List(Vec<Value>),
    Dictionary8(Vec<(Str8, Value)>),
    Structure(Structure),
    StructureArray(StructureArray),
    Request(Structure),
    Summary(Structure),
}

macro_rules! scalar_mutators {
    ($($(#[$attr:meta])* $fn:ident($ty:ty) -> $variant:ident;)*) => {
        $(
            $(#[$attr])*
            pub fn $fn(&mut self, x: $ty) {
                *self = Value::$variant(x);
            }
        )*
    };
}

macro_rules! scalar_getters {
    ($($fn:ident: $variant:ident -> $ty:ty;)*) => {
        $(
            pub fn $fn(&self) -> $ty {
                match self {
                    Value::$variant(x) => *x,
                    _ => panic!("expected {}", stringify!($variant)),
                }
            }
        )*
    };
}

macro_rules! array_mutators {
    ($($(#[$attr:meta])* $fn:ident($ty:ty) -> $variant:ident;)*) => {
        $(
            $(#[$attr])*
            pub fn $fn(&mut self, array: &[$ty]) {
                *self = Value::$variant(ArrBuf::from_slice(array));
            }
        )*
    };
}

macro_rules! array_getters {
    ($($fn:ident: $variant:ident -> $ty:ty;)*) => {
        $(
            pub fn $fn(&self) -> &[$ty] {
                match self {
                    Value::$variant(a) => a.as_slice(),
                    _ => panic!("expected {}", stringify!($variant)),
                }
            }
        )*
    };
}

impl Value {
    /// Create a new value. The initial kind is always [`ValueKind::Null`]
    #[inline(always)]
    pub fn new() -> Self {
        Value::Null
    }
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bit(_) => ValueKind::Bit,
            Value::Byte(_) => ValueKind::Byte,
            Value::BitArray(_) => ValueKind::BitArray,
            Value::ByteArray(_) => ValueKind::ByteArray,
            Value::Num8(_) => ValueKind::Num8,
            Value::Num16(_) => ValueKind::Num16,
            Value::Num32(_) => ValueKind::Num32,
            Value::Num64(_) => ValueKind::Num64,
            Value::Num8Array(_) => ValueKind::Num8Array,
            Value::Num16Array(_) => ValueKind::Num16Array,
            Value::Num32Array(_) => ValueKind::Num32Array,
            Value::Num64Array(_) => ValueKind::Num64Array,
            Value::Int8(_) => ValueKind::Int8,
            Value::Int16(_) => ValueKind::Int16,
            Value::Int32(_) => ValueKind::Int32,
            Value::Int64(_) => ValueKind::Int64,
            Value::Int8Array(_) => ValueKind::Int8Array,
            Value::Int16Array(_) => ValueKind::Int16Array,
            Value::Int32Array(_) => ValueKind::Int32Array,
            Value::Int64Array(_) => ValueKind::Int64Array,
            Value::Float32(_) => ValueKind::Float32,
            Value::Float64(_) => ValueKind::Float64,
            Value::Float32Array(_) => ValueKind::Float32Array,
            Value::Float64Array(_) => ValueKind::Float64Array,
            Value::String8(_) => ValueKind::String8,
            Value::String8Array(_) => ValueKind::String8Array,
            Value::List(_) => ValueKind::List,
            Value::Dictionary8(_) => ValueKind::Dictionary8,
            Value::Structure(_) => ValueKind::Structure,
            Value::StructureArray(_) => ValueKind::StructureArray,
            Value::Request(_) => ValueKind::Request,
            Value::Summary(_) => ValueKind::Summary,
        }
    }
    /// Returns the signature code for the structure kinds
    pub fn subtype(&self) -> Option<i16> {
        match self {
            Value::Structure(s) | Value::Request(s) | Value::Summary(s) => Some(s.code),
            Value::StructureArray(sa) => Some(sa.code),
            _ => None,
        }
    }
    /// Element count for containers, length for strings and byte arrays, 1 for scalars
    pub fn size(&self) -> usize {
        match self {
            Value::Null => 0,
            Value::Bit(_)
            | Value::Byte(_)
            | Value::Num8(_)
            | Value::Num16(_)
            | Value::Num32(_)
            | Value::Num64(_)
            | Value::Int8(_)
            | Value::Int16(_)
            | Value::Int32(_)
            | Value::Int64(_)
            | Value::Float32(_)
            | Value::Float64(_) => 1,
            Value::BitArray(a) | Value::ByteArray(a) | Value::Num8Array(a) => a.len(),
            Value::Num16Array(a) => a.len(),
            Value::Num32Array(a) => a.len(),
            Value::Num64Array(a) => a.len(),
            Value::Int8Array(a) => a.len(),
            Value::Int16Array(a) => a.len(),
            Value::Int32Array(a) => a.len(),
            Value::Int64Array(a) => a.len(),
            Value::Float32Array(a) => a.len(),
            Value::Float64Array(a) => a.len(),
            Value::String8(s) => s.len(),
            Value::String8Array(a) => a.len(),
            Value::List(items) => items.len(),
            Value::Dictionary8(pairs) => pairs.len(),
            Value::Structure(s) | Value::Request(s) | Value::Summary(s) => s.fields.len(),
            Value::StructureArray(sa) => sa.entries.len(),
        }
    }

    /*
        mutators
    */

    pub fn to_null(&mut self) {
        *self = Value::Null;
    }
    scalar_mutators! {
        /// Mutate to a Bit. Any nonzero byte reads back as set
        to_bit(u8) -> Bit;
        to_byte(u8) -> Byte;
        to_num8(u8) -> Num8;
        to_num16(u16) -> Num16;
        to_num32(u32) -> Num32;
        to_num64(u64) -> Num64;
        to_int8(i8) -> Int8;
        to_int16(i16) -> Int16;
        to_int32(i32) -> Int32;
        to_int64(i64) -> Int64;
        to_float32(f32) -> Float32;
        to_float64(f64) -> Float64;
    }
    array_mutators! {
        to_bit_array(u8) -> BitArray;
        to_byte_array(u8) -> ByteArray;
        to_num8_array(u8) -> Num8Array;
        to_num16_array(u16) -> Num16Array;
        to_num32_array(u32) -> Num32Array;
        to_num64_array(u64) -> Num64Array;
        to_int8_array(i8) -> Int8Array;
        to_int16_array(i16) -> Int16Array;
        to_int32_array(i32) -> Int32Array;
        to_int64_array(i64) -> Int64Array;
        to_float32_array(f32) -> Float32Array;
        to_float64_array(f64) -> Float64Array;
    }
    pub fn to_string8(&mut self, s: &str) {
        *self = Value::String8(Str8::from(s));
    }
    pub fn to_string8_array(&mut self, size: usize) {
        *self = Value::String8Array(vec![Str8::new(); size]);
    }
    pub fn to_list(&mut self, size: usize) {
        *self = Value::List((0..size).map(|_| Value::Null).collect());
    }
    pub fn to_dictionary8(&mut self, size: usize) {
        *self = Value::Dictionary8((0..size).map(|_| (Str8::new(), Value::Null)).collect());
    }
    pub fn to_structure(&mut self, code: i16, size: usize) {
        *self = Value::Structure(Structure::with_size(code, size));
    }
    pub fn to_request(&mut self, code: i16, size: usize) {
        *self = Value::Request(Structure::with_size(code, size));
    }
    pub fn to_summary(&mut self, code: i16, size: usize) {
        *self = Value::Summary(Structure::with_size(code, size));
    }
    pub fn to_structure_array(&mut self, code: i16, size: usize) {
        *self = Value::StructureArray(StructureArray {
            code,
            entries: (0..size).map(|_| Vec::new()).collect(),
        });
    }

    /*
        scalar getters
    */

    scalar_getters! {
        bit: Bit -> u8;
        byte: Byte -> u8;
        num8: Num8 -> u8;
        num16: Num16 -> u16;
        num32: Num32 -> u32;
        num64: Num64 -> u64;
        int8: Int8 -> i8;
        int16: Int16 -> i16;
        int32: Int32 -> i32;
        int64: Int64 -> i64;
        float32: Float32 -> f32;
        float64: Float64 -> f64;
    }
    array_getters! {
        bit_array: BitArray -> u8;
        byte_array: ByteArray -> u8;
        num8_array: Num8Array -> u8;
        num16_array: Num16Array -> u16;
        num32_array: Num32Array -> u32;
        num64_array: Num64Array -> u64;
        int8_array: Int8Array -> i8;
        int16_array: Int16Array -> i16;
        int32_array: Int32Array -> i32;
        int64_array: Int64Array -> i64;
        float32_array: Float32Array -> f32;
        float64_array: Float64Array -> f64;
    }
    pub fn string8(&self) -> &str {
        match self {
            Value::String8(s) => s.as_str(),
            _ => panic!("expected String8"),
        }
    }

    /*
        string arrays
    */

    pub fn string8_array_at(&self, idx: usize) -> &str {
        match self {
            Value::String8Array(a) => a[idx].as_str(),
            _ => panic!("expected String8Array"),
        }
    }
    pub fn string8_array_put(&mut self, idx: usize, s: &str) {
        match self {
            Value::String8Array(a) => a[idx] = Str8::from(s),
            _ => panic!("expected String8Array"),
        }
    }

    /*
        lists
    */

    pub fn list_at(&self, idx: usize) -> &Value {
        match self {
            Value::List(items) => &items[idx],
            _ => panic!("expected List"),
        }
    }
    pub fn list_at_mut(&mut self, idx: usize) -> &mut Value {
        match self {
            Value::List(items) => &mut items[idx],
            _ => panic!("expected List"),
        }
    }
    /// Grow or shrink the list in place. New slots are Null; dropped slots are destroyed
    /// along with everything they own
    pub fn list_resize(&mut self, size: usize) {
        match self {
            Value::List(items) => items.resize_with(size, || Value::Null),
            _ => panic!("expected List"),
        }
    }

    /*
        dictionaries
    */

    pub fn dict_key_at(&self, idx: usize) -> &str {
        match self {
            Value::Dictionary8(pairs) => pairs[idx].0.as_str(),
            _ => panic!("expected Dictionary8"),
        }
    }
    pub fn dict_value_at(&self, idx: usize) -> &Value {
        match self {
            Value::Dictionary8(pairs) => &pairs[idx].1,
            _ => panic!("expected Dictionary8"),
        }
    }
    pub fn dict_value_at_mut(&mut self, idx: usize) -> &mut Value {
        match self {
            Value::Dictionary8(pairs) => &mut pairs[idx].1,
            _ => panic!("expected Dictionary8"),
        }
    }
    /// Replace the key in slot `idx`. The associated value slot is not touched
    pub fn dict_set_key(&mut self, idx: usize, key: &str) {
        match self {
            Value::Dictionary8(pairs) => pairs[idx].0 = Str8::from(key),
            _ => panic!("expected Dictionary8"),
        }
    }

    /*
        structures
    */

    pub fn struct_field_at(&self, idx: usize) -> &Value {
        match self {
            Value::Structure(s) | Value::Request(s) | Value::Summary(s) => &s.fields[idx],
            _ => panic!("expected a structure kind"),
        }
    }
    pub fn struct_field_at_mut(&mut self, idx: usize) -> &mut Value {
        match self {
            Value::Structure(s) | Value::Request(s) | Value::Summary(s) => &mut s.fields[idx],
            _ => panic!("expected a structure kind"),
        }
    }
    pub fn struct_array_at(&self, idx: usize, field: usize) -> &Value {
        match self {
            Value::StructureArray(sa) => &sa.entries[idx][field],
            _ => panic!("expected StructureArray"),
        }
    }
    pub fn struct_array_at_mut(&mut self, idx: usize, field: usize) -> &mut Value {
        match self {
            Value::StructureArray(sa) => &mut sa.entries[idx][field],
            _ => panic!("expected StructureArray"),
        }
    }
    pub fn struct_array_entry_count(&self, idx: usize) -> usize {
        match self {
            Value::StructureArray(sa) => sa.entries[idx].len(),
            _ => panic!("expected StructureArray"),
        }
    }
    /// Grow or shrink the array of structures in place
    pub fn struct_array_resize(&mut self, size: usize) {
        match self {
            Value::StructureArray(sa) => sa.entries.resize_with(size, Vec::new),
            _ => panic!("expected StructureArray"),
        }
    }
    /// Grow or shrink the field list of entry `idx` in place
    pub fn struct_array_entry_resize(&mut self, idx: usize, size: usize) {
        match self {
            Value::StructureArray(sa) => sa.entries[idx].resize_with(size, || Value::Null),
            _ => panic!("expected StructureArray"),
        }
    }
}

impl Structure {
    fn with_size(code: i16, size: usize) -> Self {
        Self {
            code,
            fields: (0..size).map(|_| Value::Null).collect(),
        }
    }
    pub fn code(&self) -> i16 {
        self.code
    }
}

fn write_fields(f: &mut fmt::Formatter, class: &str, s: &Structure) -> fmt::Result {
    write!(f, "{}<{:#04X}>(", class, s.code)?;
    for (i, field) in s.fields.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{}", field)?;
    }
    f.write_str(")")
}

fn write_array<T: fmt::Display>(f: &mut fmt::Formatter, prefix: &str, a: &[T]) -> fmt::Result {
    write!(f, "{}[", prefix)?;
    for (i, x) in a.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", x)?;
    }
    f.write_str("]")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bit(x) => write!(f, "bit({})", x),
            Value::Byte(x) => write!(f, "byte({:#04X})", x),
            Value::BitArray(a) => write_array(f, "bit", a.as_slice()),
            Value::ByteArray(a) => {
                f.write_str("byte[")?;
                for x in a.as_slice() {
                    write!(f, "{:02X}", x)?;
                }
                f.write_str("]")
            }
            Value::Num8(x) => write!(f, "{}", x),
            Value::Num16(x) => write!(f, "{}", x),
            Value::Num32(x) => write!(f, "{}", x),
            Value::Num64(x) => write!(f, "{}", x),
            Value::Num8Array(a) => write_array(f, "num", a.as_slice()),
            Value::Num16Array(a) => write_array(f, "num", a.as_slice()),
            Value::Num32Array(a) => write_array(f, "num", a.as_slice()),
            Value::Num64Array(a) => write_array(f, "num", a.as_slice()),
            Value::Int8(x) => write!(f, "{}", x),
            Value::Int16(x) => write!(f, "{}", x),
            Value::Int32(x) => write!(f, "{}", x),
            Value::Int64(x) => write!(f, "{}", x),
            Value::Int8Array(a) => write_array(f, "int", a.as_slice()),
            Value::Int16Array(a) => write_array(f, "int", a.as_slice()),
            Value::Int32Array(a) => write_array(f, "int", a.as_slice()),
            Value::Int64Array(a) => write_array(f, "int", a.as_slice()),
            Value::Float32(x) => write!(f, "{}", x),
            Value::Float64(x) => write!(f, "{}", x),
            Value::Float32Array(a) => write_array(f, "float", a.as_slice()),
            Value::Float64Array(a) => write_array(f, "float", a.as_slice()),
            Value::String8(s) => write!(f, "{:?}", s.as_str()),
            Value::String8Array(a) => {
                f.write_str("str[")?;
                for (i, s) in a.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}", s.as_str())?;
                }
                f.write_str("]")
            }
            Value::List(items) => write_array(f, "", items),
            Value::Dictionary8(pairs) => {
                f.write_str("{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}: {}", k.as_str(), v)?;
                }
                f.write_str("}")
            }
            Value::Structure(s) => write_fields(f, "struct", s),
            Value::StructureArray(sa) => {
                write!(f, "struct<{:#04X}>[", sa.code)?;
                for (i, entry) in sa.entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str("(")?;
                    for (j, field) in entry.iter().enumerate() {
                        if j > 0 {
                            f.write_str(" ")?;
                        }
                        write!(f, "{}", field)?;
                    }
                    f.write_str(")")?;
                }
                f.write_str("]")
            }
            Value::Request(s) => write_fields(f, "request", s),
            Value::Summary(s) => write_fields(f, "summary", s),
        }
    }
}
