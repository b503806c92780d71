/*
 * Created on Thu Jan 18 2024
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

//! # Driver errors
//!
//! The taxonomy is OS-neutral: platform error codes are mapped into it at the socket
//! boundary and TLS failures are folded into one kind, so callers never match on raw
//! `errno` values. Fallible connection operations return a [`BoltResult`] *and* record
//! the same error on the connection itself, where it stays readable after the fact.

use {core::fmt, std::io};

pub type BoltResult<T> = Result<T, BoltError>;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
/// Everything that can go wrong below the query layer
pub enum BoltError {
    /// socket or TLS permission refused, or the server rejected the credentials
    PermissionDenied,
    /// address family, socket flags or protocol version not supported
    Unsupported,
    /// process or system file-descriptor table exhausted
    OutOfFiles,
    /// allocator or kernel buffer exhaustion
    OutOfMemory,
    /// no ephemeral ports left
    OutOfPorts,
    /// nobody listening at the remote end
    ConnectionRefused,
    /// a signal landed mid-call
    Interrupted,
    /// no route to the network
    NetworkUnreachable,
    /// the peer took too long
    TimedOut,
    /// any TLS failure
    TlsError,
    /// the peer closed the stream cleanly mid-message
    EndOfTransmission,
    /// resolution produced no usable addresses
    UnresolvedAddress,
    /// invalid marker, truncated frame or unknown summary code
    ProtocolViolation,
    /// the catch-all
    UnknownError,
}

impl BoltError {
    /// Map an error raised by socket creation or connect
    pub(crate) fn from_connect_err(e: &io::Error) -> Self {
        match Self::errno_on_connect(e) {
            Some(mapped) => mapped,
            None => Self::from_io_kind(e.kind()),
        }
    }
    /// Map an error raised mid-stream by transmit or receive
    pub(crate) fn from_io_err(e: &io::Error) -> Self {
        match Self::errno_on_stream(e) {
            Some(mapped) => mapped,
            None => Self::from_io_kind(e.kind()),
        }
    }
    #[cfg(unix)]
    fn errno_on_connect(e: &io::Error) -> Option<Self> {
        e.raw_os_error().map(|errno| match errno {
            libc::EACCES | libc::EPERM => BoltError::PermissionDenied,
            libc::EAFNOSUPPORT | libc::EINVAL | libc::EPROTONOSUPPORT => BoltError::Unsupported,
            libc::EMFILE | libc::ENFILE => BoltError::OutOfFiles,
            libc::ENOBUFS | libc::ENOMEM => BoltError::OutOfMemory,
            libc::EAGAIN => BoltError::OutOfPorts,
            libc::ECONNREFUSED => BoltError::ConnectionRefused,
            libc::EINTR => BoltError::Interrupted,
            libc::ENETUNREACH => BoltError::NetworkUnreachable,
            libc::ETIMEDOUT => BoltError::TimedOut,
            _ => BoltError::UnknownError,
        })
    }
    #[cfg(not(unix))]
    fn errno_on_connect(_: &io::Error) -> Option<Self> {
        None
    }
    #[cfg(unix)]
    fn errno_on_stream(e: &io::Error) -> Option<Self> {
        e.raw_os_error().map(|errno| match errno {
            libc::EINTR => BoltError::Interrupted,
            libc::ETIMEDOUT => BoltError::TimedOut,
            libc::ENOBUFS | libc::ENOMEM => BoltError::OutOfMemory,
            _ => BoltError::UnknownError,
        })
    }
    #[cfg(not(unix))]
    fn errno_on_stream(_: &io::Error) -> Option<Self> {
        None
    }
    fn from_io_kind(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::PermissionDenied => BoltError::PermissionDenied,
            io::ErrorKind::ConnectionRefused => BoltError::ConnectionRefused,
            io::ErrorKind::Interrupted => BoltError::Interrupted,
            io::ErrorKind::TimedOut => BoltError::TimedOut,
            io::ErrorKind::UnexpectedEof => BoltError::EndOfTransmission,
            _ => BoltError::UnknownError,
        }
    }
}

impl fmt::Display for BoltError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match self {
            BoltError::PermissionDenied => "permission denied",
            BoltError::Unsupported => "unsupported protocol or address family",
            BoltError::OutOfFiles => "too many open files",
            BoltError::OutOfMemory => "out of memory",
            BoltError::OutOfPorts => "out of local ports",
            BoltError::ConnectionRefused => "connection refused",
            BoltError::Interrupted => "interrupted",
            BoltError::NetworkUnreachable => "network unreachable",
            BoltError::TimedOut => "timed out",
            BoltError::TlsError => "TLS failure",
            BoltError::EndOfTransmission => "end of transmission",
            BoltError::UnresolvedAddress => "address did not resolve",
            BoltError::ProtocolViolation => "protocol violation",
            BoltError::UnknownError => "unknown error",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for BoltError {}
