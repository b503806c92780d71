/*
 * Created on Sun Jan 07 2024
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

//! # Skybolt
//!
//! Skybolt is a client driver for the Bolt graph database wire protocol (version 1). The
//! driver opens a TCP (optionally TLS-wrapped) connection, negotiates a protocol version,
//! and exchanges framed, PackStream-encoded messages carrying statements, parameters,
//! records and summaries.
//!
//! The layering, bottom to top:
//! - [`values`]: the dynamically typed value system with the 16-byte inline optimization
//! - [`buffer`]: the cursor/extent byte FIFO underpinning everything that touches bytes
//! - [`packstream`]: the self-describing binary codec
//! - [`chunk`]: 16-bit length-prefixed message framing
//! - [`net`]: address resolution, blocking TCP/TLS transport, the connection state
//!   machine
//! - [`protocol`]: the per-version request templates and request/response pairing
//!
//! Everything is blocking and single-task by design. Logging goes through the `log`
//! facade; with no logger installed the driver is silent.

#[macro_use]
mod util;
pub mod buffer;
pub mod chunk;
pub mod config;
pub mod error;
pub mod mem;
pub mod net;
pub mod packstream;
pub mod protocol;
pub mod values;

pub use self::{
    error::{BoltError, BoltResult},
    net::{Address, Connection, Fetched, Status, Transport},
    values::{Value, ValueKind},
};
