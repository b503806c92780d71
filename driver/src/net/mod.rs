/*
 * Created on Mon Jan 29 2024
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

//! # The transport layer
//!
//! Blocking sockets only: every call here may block for as long as the peer pleases, and
//! the one cancellation mechanism is closing the socket from outside. A connection is
//! strictly single-task; run independent connections on independent threads if you need
//! parallelism.

pub mod addr;
pub mod connection;
mod tcp;
mod tls;

pub use self::{
    addr::Address,
    connection::{Connection, Fetched, Status, Transport},
};

use std::{
    io::{Read, Write},
    net::{Shutdown, TcpStream},
};

pub type IoResult<T> = Result<T, std::io::Error>;

/// A connected stream, plaintext or TLS-wrapped
#[derive(Debug)]
pub(crate) enum BoltStream {
    Tcp(TcpStream),
    Tls(openssl::ssl::SslStream<TcpStream>),
}

impl BoltStream {
    /// Shut the stream down, sending the TLS close-notify first where applicable.
    /// Shutdown failures are ignored: the peer may already be gone
    pub(crate) fn close(mut self) {
        match &mut self {
            BoltStream::Tcp(stream) => {
                let _ = stream.shutdown(Shutdown::Both);
            }
            BoltStream::Tls(stream) => {
                let _ = stream.shutdown();
                let _ = stream.get_ref().shutdown(Shutdown::Both);
            }
        }
    }
}

impl Read for BoltStream {
    fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        match self {
            BoltStream::Tcp(stream) => stream.read(buf),
            BoltStream::Tls(stream) => stream.read(buf),
        }
    }
}

impl Write for BoltStream {
    fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
        match self {
            BoltStream::Tcp(stream) => stream.write(buf),
            BoltStream::Tls(stream) => stream.write(buf),
        }
    }
    fn flush(&mut self) -> IoResult<()> {
        match self {
            BoltStream::Tcp(stream) => stream.flush(),
            BoltStream::Tls(stream) => stream.flush(),
        }
    }
}
