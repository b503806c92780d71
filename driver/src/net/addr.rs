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

//! # Address resolution
//!
//! An [`Address`] is a (host, port) pair plus the ordered list of addresses it resolved
//! to. Every resolved address is held in the 16-byte IPv6 layout; IPv4 results are
//! v4-mapped (`::ffff:a.b.c.d`) so the rest of the driver only ever deals with one
//! width. The port may be given numerically or as a service name.

use {
    crate::error::{BoltError, BoltResult},
    core::fmt,
    std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6, ToSocketAddrs},
};

/// The v4-mapped prefix: ten zero bytes followed by 0xFFFF
const V4_MAPPED_PREFIX: [u8; 12] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xFF, 0xFF];

pub struct Address {
    host: String,
    port: String,
    resolved_hosts: Vec<[u8; 16]>,
    resolved_port: u16,
}

fn map_octets(sa: &SocketAddr) -> [u8; 16] {
    match sa {
        SocketAddr::V4(v4) => {
            let mut bytes = [0u8; 16];
            bytes[..12].copy_from_slice(&V4_MAPPED_PREFIX);
            bytes[12..].copy_from_slice(&v4.ip().octets());
            bytes
        }
        SocketAddr::V6(v6) => v6.ip().octets(),
    }
}

impl Address {
    pub fn new(host: &str, port: &str) -> Self {
        Self {
            host: host.to_owned(),
            port: port.to_owned(),
            resolved_hosts: Vec::new(),
            resolved_port: 0,
        }
    }
    pub fn host(&self) -> &str {
        &self.host
    }
    pub fn port(&self) -> &str {
        &self.port
    }
    /// Resolve the host (blocking), replacing any previously resolved list
    pub fn resolve(&mut self) -> BoltResult<()> {
        self.resolved_hosts.clear();
        match self.port.parse::<u16>() {
            Ok(port) => {
                self.resolved_port = port;
                let resolved = (self.host.as_str(), port)
                    .to_socket_addrs()
                    .map_err(|_| BoltError::UnresolvedAddress)?;
                self.resolved_hosts.extend(resolved.map(|sa| map_octets(&sa)));
            }
            Err(_) => {
                // not numeric, let the resolver look the service name up too
                let resolved = format!("{}:{}", self.host, self.port)
                    .to_socket_addrs()
                    .map_err(|_| BoltError::UnresolvedAddress)?;
                for sa in resolved {
                    self.resolved_port = sa.port();
                    self.resolved_hosts.push(map_octets(&sa));
                }
            }
        }
        log::info!(
            "bolt: Resolved '{}' to {} addresses",
            self.host,
            self.resolved_hosts.len()
        );
        Ok(())
    }
    pub fn resolved_count(&self) -> usize {
        self.resolved_hosts.len()
    }
    pub fn resolved_host(&self, idx: usize) -> &[u8; 16] {
        &self.resolved_hosts[idx]
    }
    pub fn resolved_port(&self) -> u16 {
        self.resolved_port
    }
    pub fn resolved_host_is_ipv4(&self, idx: usize) -> bool {
        self.resolved_hosts[idx][..12] == V4_MAPPED_PREFIX
    }
    /// The resolved address at `idx`, in the form the socket layer wants
    pub(crate) fn socket_addr(&self, idx: usize) -> SocketAddr {
        let bytes = &self.resolved_hosts[idx];
        if self.resolved_host_is_ipv4(idx) {
            let ip = Ipv4Addr::new(bytes[12], bytes[13], bytes[14], bytes[15]);
            SocketAddr::V4(SocketAddrV4::new(ip, self.resolved_port))
        } else {
            SocketAddr::V6(SocketAddrV6::new(
                Ipv6Addr::from(*bytes),
                self.resolved_port,
                0,
                0,
            ))
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Address(host=\"{}\" port=\"{}\" resolved_hosts=IPv6[",
            self.host, self.port
        )?;
        for (i, bytes) in self.resolved_hosts.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "\"{}\"", Ipv6Addr::from(*bytes))?;
        }
        write!(f, "] resolved_port={})", self.resolved_port)
    }
}
