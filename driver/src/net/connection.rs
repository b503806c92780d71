/*
 * Created on Wed Jan 31 2024
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

//! # The connection
//!
//! A [`Connection`] owns one socket (optionally TLS-wrapped), the framed TX/RX buffers,
//! and the negotiated protocol state. Opening walks the resolved address list in order,
//! wraps the first socket that connects, and performs the Bolt handshake. From there the
//! caller mutates the protocol's request templates, loads them, sends, and fetches one
//! message per call.
//!
//! Fallible operations report errors twice: in the returned result and in
//! `(status, error)` on the connection. Once the status is [`Status::Defunct`] every
//! operation short-circuits; the only way forward is [`Connection::close`].

use {
    super::{addr::Address, tcp, tls, BoltStream},
    crate::{
        buffer::Buffer,
        chunk::{self, Dechunk, Dechunker},
        error::{BoltError, BoltResult},
        protocol::{
            v1::{self, ProtocolV1State, Template},
            SUMMARY_FAILURE, SUMMARY_IGNORED, SUMMARY_SUCCESS,
        },
        values::Value,
    },
    libbolt::BUF_CAP,
    std::io::{ErrorKind, Read, Write},
};

/// The Bolt preamble, sent ahead of the four version proposals
const PREAMBLE: [u8; 4] = [0x60, 0x60, 0xB0, 0x17];

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Transport {
    Insecure,
    Secure,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Status {
    Disconnected,
    Connected,
    Ready,
    Failed,
    Defunct,
}

/// What one [`Connection::fetch`] call decoded
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Fetched {
    /// A record landed; more messages follow for this request
    Record,
    /// The summary landed; this request is complete
    Summary,
}

pub struct Connection {
    transport: Transport,
    stream: Option<BoltStream>,
    tx_buffer: Buffer,
    rx_buffer: Buffer,
    dechunker: Dechunker,
    protocol_version: u32,
    protocol: Option<ProtocolV1State>,
    status: Status,
    error: Option<BoltError>,
}

impl Connection {
    fn create(transport: Transport) -> Self {
        Self {
            transport,
            stream: None,
            tx_buffer: Buffer::with_capacity(BUF_CAP),
            rx_buffer: Buffer::with_capacity(BUF_CAP),
            dechunker: Dechunker::new(),
            protocol_version: 0,
            protocol: None,
            status: Status::Disconnected,
            error: None,
        }
    }
    #[cfg(test)]
    /// A connection that pretends to have negotiated v1, with no socket behind it
    pub(crate) fn stub_v1() -> Self {
        let mut connection = Self::create(Transport::Insecure);
        connection.protocol_version = 1;
        connection.protocol = Some(ProtocolV1State::new());
        connection
    }

    /// Open a connection to the first resolved address that accepts, then negotiate the
    /// protocol. The outcome is carried on the returned connection: check
    /// [`Connection::status`] and [`Connection::error`]
    pub fn open(transport: Transport, address: &Address) -> Connection {
        let mut connection = Connection::create(transport);
        if address.resolved_count() == 0 {
            connection.set_status(Status::Defunct, Some(BoltError::UnresolvedAddress));
            return connection;
        }
        for i in 0..address.resolved_count() {
            match tcp::open_stream(&address.socket_addr(i)) {
                Ok(stream) => {
                    connection.stream = Some(BoltStream::Tcp(stream));
                    connection.set_status(Status::Connected, None);
                    let secured = match connection.transport {
                        Transport::Secure => connection.secure(address.host()),
                        Transport::Insecure => Ok(()),
                    };
                    if secured.is_ok() {
                        let _ = connection.handshake([1, 0, 0, 0]);
                    }
                    break;
                }
                Err(e) => {
                    // move on to the next resolved address
                    connection.set_status(Status::Defunct, Some(e));
                }
            }
        }
        connection
    }

    pub fn status(&self) -> Status {
        self.status
    }
    pub fn error(&self) -> Option<BoltError> {
        self.error
    }
    pub fn transport(&self) -> Transport {
        self.transport
    }
    pub fn protocol_version(&self) -> u32 {
        self.protocol_version
    }
    /// The most recently decoded message, once the handshake has picked a version
    pub fn fetched(&self) -> Option<&Value> {
        self.protocol.as_ref().map(|state| state.fetched())
    }

    /// Shut the transport down and return to [`Status::Disconnected`]
    pub fn close(&mut self) {
        if self.status != Status::Disconnected {
            log::info!("bolt: Closing connection");
            if let Some(stream) = self.stream.take() {
                stream.close();
            }
            self.set_status(Status::Disconnected, None);
        }
    }

    fn set_status(&mut self, status: Status, error: Option<BoltError>) {
        self.status = status;
        self.error = error;
        match self.status {
            Status::Disconnected => log::info!("bolt: Disconnected"),
            Status::Connected => log::info!("bolt: Connected"),
            Status::Ready => log::info!("bolt: Ready"),
            Status::Failed => log::info!("bolt: FAILED"),
            Status::Defunct => log::info!("bolt: DEFUNCT"),
        }
    }
    fn guard(&self) -> BoltResult<()> {
        if self.status == Status::Defunct {
            return Err(self.error.unwrap_or(BoltError::UnknownError));
        }
        Ok(())
    }
    fn proto_mut(&mut self) -> BoltResult<&mut ProtocolV1State> {
        self.protocol.as_mut().ok_or(BoltError::Unsupported)
    }

    /*
        transport plumbing
    */

    fn secure(&mut self, host: &str) -> BoltResult<()> {
        let stream = match self.stream.take() {
            Some(BoltStream::Tcp(stream)) => stream,
            other => {
                self.stream = other;
                self.set_status(Status::Defunct, Some(BoltError::TlsError));
                return Err(BoltError::TlsError);
            }
        };
        match tls::secure_stream(stream, host) {
            Ok(secured) => {
                self.stream = Some(BoltStream::Tls(secured));
                Ok(())
            }
            Err(e) => {
                self.set_status(Status::Defunct, Some(e));
                Err(e)
            }
        }
    }

    fn handshake(&mut self, proposals: [u32; 4]) -> BoltResult<()> {
        log::info!("bolt: Performing handshake");
        let mut packet = [0u8; 20];
        packet[..4].copy_from_slice(&PREAMBLE);
        for (i, proposal) in proposals.iter().enumerate() {
            packet[4 + 4 * i..8 + 4 * i].copy_from_slice(&proposal.to_be_bytes());
        }
        self.transmit_raw(&packet)?;
        self.fill_rx(4)?;
        let version = match self.rx_buffer.unload_u32_be() {
            Some(version) => version,
            None => return Err(BoltError::ProtocolViolation),
        };
        self.rx_buffer.compact();
        self.protocol_version = version;
        log::info!("bolt: Using Bolt v{}", version);
        match version {
            1 => {
                self.protocol = Some(ProtocolV1State::new());
                Ok(())
            }
            _ => {
                self.close();
                self.set_status(Status::Defunct, Some(BoltError::Unsupported));
                Err(BoltError::Unsupported)
            }
        }
    }

    /// Write all of `data`, resuming partial writes and retrying interrupted calls
    fn transmit_raw(&mut self, data: &[u8]) -> BoltResult<()> {
        let mut total = 0;
        while total < data.len() {
            let written = match self.stream.as_mut() {
                Some(stream) => stream.write(&data[total..]),
                None => return Err(self.fail_transport(BoltError::EndOfTransmission)),
            };
            match written {
                Ok(0) => return Err(self.fail_transport(BoltError::EndOfTransmission)),
                Ok(n) => total += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::error!("bolt: Socket error on transmit: {}", e);
                    return Err(self.fail_transport(self.map_stream_err(&e)));
                }
            }
        }
        log::info!("bolt: Sent {} of {} bytes", total, data.len());
        Ok(())
    }

    /// Pull bytes off the socket until at least `min` are readable in the RX buffer
    fn fill_rx(&mut self, min: usize) -> BoltResult<()> {
        while self.rx_buffer.unloadable() < min {
            if self.stream.is_none() {
                return Err(self.fail_transport(BoltError::EndOfTransmission));
            }
            let read = {
                let Self {
                    stream, rx_buffer, ..
                } = self;
                let want = min - rx_buffer.unloadable();
                let target = rx_buffer.load_target(want);
                let read = match stream.as_mut() {
                    Some(stream) => stream.read(target),
                    None => Ok(0),
                };
                let got = match &read {
                    Ok(n) => *n,
                    Err(_) => 0,
                };
                rx_buffer.retract(want - got);
                read
            };
            match read {
                Ok(0) => {
                    log::info!("bolt: Detected end of transmission");
                    self.set_status(Status::Disconnected, Some(BoltError::EndOfTransmission));
                    return Err(BoltError::EndOfTransmission);
                }
                Ok(received) => log::info!("bolt: Received {} bytes", received),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::error!("bolt: Socket error on receive: {}", e);
                    return Err(self.fail_transport(self.map_stream_err(&e)));
                }
            }
        }
        Ok(())
    }

    fn fail_transport(&mut self, error: BoltError) -> BoltError {
        self.set_status(Status::Defunct, Some(error));
        error
    }
    fn map_stream_err(&self, e: &std::io::Error) -> BoltError {
        match self.transport {
            Transport::Insecure => BoltError::from_io_err(e),
            Transport::Secure => BoltError::TlsError,
        }
    }

    /*
        message loading
    */

    fn load(&mut self, template: Template) -> BoltResult<i32> {
        self.guard()?;
        let id = self.proto_mut()?.load_template(template)?;
        self.enqueue_message();
        Ok(id)
    }
    /// Frame the message sitting in the protocol's TX buffer into the connection's
    fn enqueue_message(&mut self) {
        let Self {
            tx_buffer, protocol, ..
        } = self;
        if let Some(state) = protocol.as_mut() {
            let message = state.tx_buffer_mut();
            chunk::write_message(tx_buffer, message.peek(), chunk::DEFAULT_MAX_CHUNK);
            message.clear();
        }
    }

    pub fn set_statement(&mut self, statement: &str) -> BoltResult<()> {
        self.proto_mut()?.set_statement(statement);
        Ok(())
    }
    pub fn set_parameter_count(&mut self, n: usize) -> BoltResult<()> {
        self.proto_mut()?.set_parameter_count(n);
        Ok(())
    }
    pub fn set_parameter_key(&mut self, idx: usize, key: &str) -> BoltResult<()> {
        self.proto_mut()?.set_parameter_key(idx, key);
        Ok(())
    }
    /// The value slot paired with parameter key `idx`, ready to be mutated in place
    pub fn parameter_value_slot(&mut self, idx: usize) -> BoltResult<&mut Value> {
        Ok(self.proto_mut()?.parameter_value_slot(idx))
    }

    pub fn load_run_request(&mut self) -> BoltResult<i32> {
        self.load(Template::Run)
    }
    pub fn load_begin_request(&mut self) -> BoltResult<i32> {
        self.load(Template::Begin)?;
        self.load(Template::Discard)
    }
    pub fn load_commit_request(&mut self) -> BoltResult<i32> {
        self.load(Template::Commit)?;
        self.load(Template::Discard)
    }
    pub fn load_rollback_request(&mut self) -> BoltResult<i32> {
        self.load(Template::Rollback)?;
        self.load(Template::Discard)
    }
    /// The protocol has no bounded DISCARD; only the pass-through `n < 0` is accepted
    pub fn load_discard_request(&mut self, n: i32) -> BoltResult<i32> {
        if n >= 0 {
            return Err(BoltError::ProtocolViolation);
        }
        self.load(Template::Discard)
    }
    /// The protocol has no bounded PULL; only the pass-through `n < 0` is accepted
    pub fn load_pull_request(&mut self, n: i32) -> BoltResult<i32> {
        if n >= 0 {
            return Err(BoltError::ProtocolViolation);
        }
        self.load(Template::Pull)
    }

    /*
        send/fetch
    */

    /// Flush everything loaded so far. Returns the highest request id on the wire
    pub fn send(&mut self) -> BoltResult<i32> {
        self.guard()?;
        let data = self.tx_buffer.peek().to_vec();
        self.transmit_raw(&data)?;
        self.tx_buffer.skip(data.len());
        self.tx_buffer.compact();
        match &self.protocol {
            Some(state) => {
                let id = state.next_request_id() - 1;
                log::info!("bolt: Sent up to request #{}", id);
                Ok(id)
            }
            None => Ok(0),
        }
    }

    /// Read exactly one message. Returns [`Fetched::Record`] if it was a record for the
    /// current stream, [`Fetched::Summary`] once a request completes
    pub fn fetch(&mut self, request_id: i32) -> BoltResult<Fetched> {
        self.guard()?;
        if self.protocol.is_none() {
            return Err(BoltError::Unsupported);
        }
        // reassemble one dechunked message
        loop {
            let outcome = {
                let Self {
                    rx_buffer,
                    protocol,
                    dechunker,
                    ..
                } = self;
                match protocol.as_mut() {
                    Some(state) => dechunker.step(rx_buffer, state.rx_buffer_mut()),
                    None => return Err(BoltError::Unsupported),
                }
            };
            match outcome {
                Dechunk::Message => break,
                Dechunk::NeedMore(n) => self.fill_rx(n)?,
            }
        }
        self.rx_buffer.compact();
        // decode it
        let unloaded = match self.protocol.as_mut() {
            Some(state) => state.unload(),
            None => return Err(BoltError::Unsupported),
        };
        if let Err(e) = unloaded {
            self.set_status(Status::Defunct, Some(e));
            return Err(e);
        }
        let code = match self.fetched() {
            Some(Value::Summary(s)) => s.code(),
            _ => return Ok(Fetched::Record),
        };
        let response_id = match self.protocol.as_mut() {
            Some(state) => state.bump_response(),
            None => return Err(BoltError::Unsupported),
        };
        if response_id != request_id {
            log::info!(
                "bolt: Passed response #{} while seeking request #{}",
                response_id,
                request_id
            );
        }
        match code {
            SUMMARY_SUCCESS => {
                log::info!("bolt: Request #{} succeeded", response_id);
                self.set_status(Status::Ready, None);
            }
            SUMMARY_IGNORED => log::info!("bolt: Request #{} ignored", response_id),
            SUMMARY_FAILURE => {
                log::error!("bolt: Request #{} failed", response_id);
                self.set_status(Status::Failed, Some(BoltError::UnknownError));
            }
            code => {
                log::error!("bolt: Protocol violation (received summary code {})", code);
                self.set_status(Status::Defunct, Some(BoltError::ProtocolViolation));
                return Err(BoltError::ProtocolViolation);
            }
        }
        Ok(Fetched::Summary)
    }

    /// Keep fetching until the summary for `request_id` lands. Returns the number of
    /// records seen along the way
    pub fn fetch_summary(&mut self, request_id: i32) -> BoltResult<i32> {
        let mut records = 0;
        loop {
            match self.fetch(request_id)? {
                Fetched::Record => records += 1,
                Fetched::Summary => {
                    let done = match self.protocol.as_ref() {
                        Some(state) => state.response_counter() > request_id,
                        None => true,
                    };
                    if done {
                        break;
                    }
                }
            }
        }
        Ok(records)
    }

    /// Authenticate. On SUCCESS the connection is [`Status::Ready`]; a FAILURE here is
    /// terminal for the connection
    pub fn init(&mut self, user_agent: &str, user: &str, password: &str) -> BoltResult<()> {
        self.guard()?;
        log::info!("bolt: Initialising connection for user '{}'", user);
        if self.protocol.is_none() {
            self.set_status(Status::Defunct, Some(BoltError::Unsupported));
            return Err(BoltError::Unsupported);
        }
        let mut init = Value::new();
        v1::compile_init(&mut init, user_agent, user, password);
        let init_id = {
            let id = self.proto_mut()?.load_request(&init)?;
            self.enqueue_message();
            id
        };
        self.send()?;
        self.fetch_summary(init_id)?;
        let code = match self.fetched() {
            Some(Value::Summary(s)) => s.code(),
            _ => -1,
        };
        match code {
            SUMMARY_SUCCESS => {
                log::info!("bolt: Initialisation SUCCESS");
                self.set_status(Status::Ready, None);
                Ok(())
            }
            SUMMARY_FAILURE => {
                log::error!("bolt: Initialisation FAILURE");
                self.set_status(Status::Defunct, Some(BoltError::PermissionDenied));
                Err(BoltError::PermissionDenied)
            }
            code => {
                log::error!("bolt: Protocol violation (received summary code {})", code);
                self.set_status(Status::Defunct, Some(BoltError::ProtocolViolation));
                Err(BoltError::ProtocolViolation)
            }
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}
