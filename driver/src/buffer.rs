/*
 * Created on Thu Jan 11 2024
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

//! # The byte buffer
//!
//! A growable FIFO over [`BytesMut`] with two positions: bytes in `[cursor, extent)` are
//! readable, `[extent, capacity)` is writable. Loading appends at the extent (growing by
//! doubling when free space runs out), unloading reads at the cursor. [`Buffer::compact`]
//! shifts the readable region to the front and resets the cursor so released space can be
//! reused. All multi-byte load/unload helpers are big-endian; nothing here depends on
//! host byte order.

use bytes::{Buf, BytesMut};

macro_rules! load_be {
    ($($fn:ident: $ty:ty;)*) => {
        $(
            pub fn $fn(&mut self, x: $ty) {
                self.data.extend_from_slice(&x.to_be_bytes());
            }
        )*
    };
}

macro_rules! unload_be {
    ($($fn:ident: $ty:ty = $n:expr;)*) => {
        $(
            pub fn $fn(&mut self) -> Option<$ty> {
                self.unload($n).map(|b| {
                    let mut raw = [0u8; $n];
                    raw.copy_from_slice(b);
                    <$ty>::from_be_bytes(raw)
                })
            }
        )*
    };
}

#[derive(Debug)]
pub struct Buffer {
    data: BytesMut,
    cursor: usize,
}

impl Buffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity),
            cursor: 0,
        }
    }
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }
    pub fn extent(&self) -> usize {
        self.data.len()
    }
    pub fn cursor(&self) -> usize {
        self.cursor
    }
    /// Free space at the back, before any growth kicks in
    pub fn loadable(&self) -> usize {
        self.data.capacity() - self.data.len()
    }
    /// Readable bytes between the cursor and the extent
    pub fn unloadable(&self) -> usize {
        self.data.len() - self.cursor
    }
    pub fn is_empty(&self) -> bool {
        self.unloadable() == 0
    }

    /*
        loading
    */

    pub fn load(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }
    pub fn load_u8(&mut self, x: u8) {
        self.data.extend_from_slice(&[x]);
    }
    load_be! {
        load_u16_be: u16;
        load_u32_be: u32;
        load_i8_be: i8;
        load_i16_be: i16;
        load_i32_be: i32;
        load_i64_be: i64;
        load_f64_be: f64;
    }
    /// Reserve `n` writable bytes at the extent and return them. The caller fills the
    /// slice (or part of it) and calls [`Buffer::retract`] with whatever was left unused
    pub fn load_target(&mut self, n: usize) -> &mut [u8] {
        let start = self.data.len();
        self.data.resize(start + n, 0);
        &mut self.data[start..]
    }
    /// Give back the trailing `n` bytes of the extent
    pub fn retract(&mut self, n: usize) {
        let extent = self.data.len() - n;
        self.data.truncate(extent);
    }

    /*
        unloading
    */

    /// Read `n` bytes at the cursor, advancing it. Returns `None` without moving the
    /// cursor if fewer than `n` bytes are readable
    pub fn unload(&mut self, n: usize) -> Option<&[u8]> {
        if self.unloadable() < n {
            return None;
        }
        let start = self.cursor;
        self.cursor += n;
        Some(&self.data[start..start + n])
    }
    pub fn unload_u8(&mut self) -> Option<u8> {
        self.unload(1).map(|b| b[0])
    }
    unload_be! {
        unload_u16_be: u16 = 2;
        unload_u32_be: u32 = 4;
        unload_i8_be: i8 = 1;
        unload_i16_be: i16 = 2;
        unload_i32_be: i32 = 4;
        unload_i64_be: i64 = 8;
        unload_f64_be: f64 = 8;
    }
    /// The readable region, without advancing the cursor
    pub fn peek(&self) -> &[u8] {
        &self.data[self.cursor..]
    }
    /// Advance the cursor by up to `n` bytes
    pub fn skip(&mut self, n: usize) {
        self.cursor += n.min(self.unloadable());
    }

    /// Shift `[cursor, extent)` to the front and reset the cursor to 0
    pub fn compact(&mut self) {
        self.data.advance(self.cursor);
        self.cursor = 0;
    }
    pub fn clear(&mut self) {
        self.data.clear();
        self.cursor = 0;
    }
}
