/*
 * Created on Tue Jan 30 2024
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
    crate::error::BoltError,
    std::net::{SocketAddr, TcpStream},
};

/// Open a blocking TCP stream to the given address. Deadlines are the caller's business:
/// set socket options on the returned stream before driving any traffic through it
pub(super) fn open_stream(sa: &SocketAddr) -> Result<TcpStream, BoltError> {
    match sa {
        SocketAddr::V4(v4) => log::info!("bolt: Opening IPv4 connection to {}", v4.ip()),
        SocketAddr::V6(v6) => log::info!("bolt: Opening IPv6 connection to {}", v6.ip()),
    }
    TcpStream::connect(sa).map_err(|e| {
        log::error!("bolt: Socket error on connect: {}", e);
        BoltError::from_connect_err(&e)
    })
}
