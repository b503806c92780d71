/*
 * Created on Thu Jan 25 2024
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

//! # Bolt v1
//!
//! The per-connection protocol state: prebuilt request templates that callers mutate in
//! place, the request-id and response counters that pair every request with its summary,
//! and the single reusable value that the most recently decoded message is materialized
//! into. The secondary buffers here carry message payloads *without* chunk headers; the
//! connection owns the framed buffers.

use {
    super::{
        MESSAGE_RECORD, REQUEST_DISCARD_ALL, REQUEST_INIT, REQUEST_PULL_ALL, REQUEST_RUN,
        SUMMARY_FAILURE, SUMMARY_IGNORED, SUMMARY_SUCCESS,
    },
    crate::{
        buffer::Buffer,
        error::{BoltError, BoltResult},
        packstream,
        values::Value,
    },
    core::mem,
    libbolt::BUF_CAP,
};

/// The prebuilt request templates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Run,
    Begin,
    Commit,
    Rollback,
    Discard,
    Pull,
}

/// Protocol state for a connection that negotiated Bolt v1
#[derive(Debug)]
pub struct ProtocolV1State {
    // these buffers exclude chunk headers
    tx_buffer: Buffer,
    rx_buffer: Buffer,
    next_request_id: i32,
    response_counter: i32,
    run: Value,
    begin: Value,
    commit: Value,
    rollback: Value,
    discard: Value,
    pull: Value,
    /// holder for fetched data and metadata
    fetched: Value,
}

fn run_template(statement: &str) -> Value {
    let mut value = Value::new();
    value.to_request(REQUEST_RUN, 2);
    value.struct_field_at_mut(0).to_string8(statement);
    value.struct_field_at_mut(1).to_dictionary8(0);
    value
}

fn bare_template(code: i16) -> Value {
    let mut value = Value::new();
    value.to_request(code, 0);
    value
}

/// Compile an INIT request carrying the user agent and a basic-auth token
pub fn compile_init(value: &mut Value, user_agent: &str, user: &str, password: &str) {
    value.to_request(REQUEST_INIT, 2);
    value.struct_field_at_mut(0).to_string8(user_agent);
    let token = value.struct_field_at_mut(1);
    token.to_dictionary8(3);
    token.dict_set_key(0, "scheme");
    token.dict_value_at_mut(0).to_string8("basic");
    token.dict_set_key(1, "principal");
    token.dict_value_at_mut(1).to_string8(user);
    token.dict_set_key(2, "credentials");
    token.dict_value_at_mut(2).to_string8(password);
}

impl ProtocolV1State {
    pub fn new() -> Self {
        Self {
            tx_buffer: Buffer::with_capacity(BUF_CAP),
            rx_buffer: Buffer::with_capacity(BUF_CAP),
            next_request_id: 0,
            response_counter: 0,
            run: run_template(""),
            begin: run_template("BEGIN"),
            commit: run_template("COMMIT"),
            rollback: run_template("ROLLBACK"),
            discard: bare_template(REQUEST_DISCARD_ALL),
            pull: bare_template(REQUEST_PULL_ALL),
            fetched: Value::new(),
        }
    }
    pub fn next_request_id(&self) -> i32 {
        self.next_request_id
    }
    pub fn response_counter(&self) -> i32 {
        self.response_counter
    }
    /// The most recently decoded message
    pub fn fetched(&self) -> &Value {
        &self.fetched
    }
    pub(crate) fn tx_buffer_mut(&mut self) -> &mut Buffer {
        &mut self.tx_buffer
    }
    pub(crate) fn rx_buffer_mut(&mut self) -> &mut Buffer {
        &mut self.rx_buffer
    }
    /// Consume one response slot, returning the response id it pairs with
    pub(crate) fn bump_response(&mut self) -> i32 {
        let id = self.response_counter;
        self.response_counter += 1;
        id
    }

    /*
        request templates
    */

    pub fn set_statement(&mut self, statement: &str) {
        self.run.struct_field_at_mut(0).to_string8(statement);
    }
    pub fn set_parameter_count(&mut self, n: usize) {
        self.run.struct_field_at_mut(1).to_dictionary8(n);
    }
    pub fn set_parameter_key(&mut self, idx: usize, key: &str) {
        self.run.struct_field_at_mut(1).dict_set_key(idx, key);
    }
    pub fn parameter_value_slot(&mut self, idx: usize) -> &mut Value {
        self.run.struct_field_at_mut(1).dict_value_at_mut(idx)
    }

    /*
        load/unload
    */

    /// Pack one template into the message buffer and assign it the next request id
    pub fn load_template(&mut self, template: Template) -> BoltResult<i32> {
        {
            let Self {
                tx_buffer,
                run,
                begin,
                commit,
                rollback,
                discard,
                pull,
                ..
            } = self;
            let value = match template {
                Template::Run => &*run,
                Template::Begin => &*begin,
                Template::Commit => &*commit,
                Template::Rollback => &*rollback,
                Template::Discard => &*discard,
                Template::Pull => &*pull,
            };
            packstream::load(tx_buffer, value)?;
        }
        self.assign_request_id()
    }
    /// Pack a caller-built request (INIT) into the message buffer
    pub fn load_request(&mut self, value: &Value) -> BoltResult<i32> {
        packstream::load(&mut self.tx_buffer, value)?;
        self.assign_request_id()
    }
    fn assign_request_id(&mut self) -> BoltResult<i32> {
        let id = self.next_request_id;
        self.next_request_id += 1;
        Ok(id)
    }

    /// Decode one dechunked message into `fetched`. A RECORD materializes as its fields
    /// list; SUCCESS, IGNORED and FAILURE materialize as summaries; anything else at the
    /// top level is a protocol violation
    pub fn unload(&mut self) -> BoltResult<()> {
        {
            let Self {
                rx_buffer, fetched, ..
            } = self;
            packstream::unload(rx_buffer, fetched)?;
        }
        self.rx_buffer.compact();
        match mem::take(&mut self.fetched) {
            Value::Structure(s) => match s.code {
                MESSAGE_RECORD => {
                    self.fetched = s.fields.into_iter().next().unwrap_or(Value::Null);
                    Ok(())
                }
                SUMMARY_SUCCESS | SUMMARY_IGNORED | SUMMARY_FAILURE => {
                    self.fetched = Value::Summary(s);
                    Ok(())
                }
                code => {
                    log::error!("bolt: Protocol violation (received summary code {})", code);
                    Err(BoltError::ProtocolViolation)
                }
            },
            _ => {
                log::error!("bolt: Protocol violation (message is not a structure)");
                Err(BoltError::ProtocolViolation)
            }
        }
    }
}

impl Default for ProtocolV1State {
    fn default() -> Self {
        Self::new()
    }
}
