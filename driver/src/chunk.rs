/*
 * Created on Wed Jan 17 2024
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

//! # Chunked message framing
//!
//! On the wire a message is a sequence of chunks, each prefixed by a 16-bit big-endian
//! length, terminated by a zero-length chunk. Chunking lets one TCP stream carry message
//! boundaries without committing to a total length up front.
//!
//! The inbound side is a resumable state machine: [`Dechunker::step`] consumes whatever
//! is buffered and either completes a message or reports how many more bytes it needs,
//! so the caller can interleave socket reads at its own pace. A stream that ends while
//! the dechunker still wants bytes is an [`end of transmission`](crate::BoltError).

use crate::buffer::Buffer;

consts! {
    /// The largest chunk the 16-bit length prefix can describe
    pub MAX_CHUNK: usize = 65535;
    /// The chunk size used for outbound messages
    pub DEFAULT_MAX_CHUNK: usize = 8192;
}

/// Split `payload` into chunks of at most `max_chunk` bytes and load them into `dst`,
/// followed by the zero-length terminator
pub fn write_message(dst: &mut Buffer, payload: &[u8], max_chunk: usize) {
    let max_chunk = max_chunk.clamp(1, MAX_CHUNK);
    for chunk in payload.chunks(max_chunk) {
        dst.load_u16_be(chunk.len() as u16);
        dst.load(chunk);
    }
    dst.load_u16_be(0);
}

/// What a dechunker step found
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Dechunk {
    /// The source needs at least this many more bytes
    NeedMore(usize),
    /// A full message landed in the destination buffer
    Message,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum DechunkState {
    Header,
    Payload(u16),
}

/// The inbound half of the framing layer
#[derive(Debug)]
pub struct Dechunker {
    state: DechunkState,
}

impl Dechunker {
    pub const fn new() -> Self {
        Self {
            state: DechunkState::Header,
        }
    }
    /// Consume as many chunks from `src` as are fully buffered, appending their payloads
    /// to `dst`. Returns [`Dechunk::Message`] once the terminator is seen; the next call
    /// starts a fresh message
    pub fn step(&mut self, src: &mut Buffer, dst: &mut Buffer) -> Dechunk {
        loop {
            match self.state {
                DechunkState::Header => match src.unload_u16_be() {
                    Some(0) => return Dechunk::Message,
                    Some(size) => self.state = DechunkState::Payload(size),
                    None => return Dechunk::NeedMore(2 - src.unloadable()),
                },
                DechunkState::Payload(size) => match src.unload(size as usize) {
                    Some(payload) => {
                        dst.load(payload);
                        self.state = DechunkState::Header;
                    }
                    None => return Dechunk::NeedMore(size as usize - src.unloadable()),
                },
            }
        }
    }
}

impl Default for Dechunker {
    fn default() -> Self {
        Self::new()
    }
}
