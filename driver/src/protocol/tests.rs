/*
 * Created on Fri Jan 26 2024
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
    super::{
        request_name, structure_name, summary_name,
        v1::{compile_init, ProtocolV1State, Template},
        REQUEST_RUN, SUMMARY_SUCCESS,
    },
    crate::{
        buffer::Buffer,
        error::BoltError,
        packstream,
        values::{Value, ValueKind},
    },
};

fn pack(value: &Value) -> Vec<u8> {
    let mut buffer = Buffer::with_capacity(64);
    packstream::load(&mut buffer, value).unwrap();
    buffer.peek().to_vec()
}

#[test]
fn init_compiles_to_a_two_field_request() {
    let mut init = Value::new();
    compile_init(&mut init, "Test/1.0", "neo4j", "x");
    assert_eq!(init.kind(), ValueKind::Request);
    assert_eq!(init.subtype(), Some(0x01));
    assert_eq!(init.struct_field_at(0).string8(), "Test/1.0");
    let token = init.struct_field_at(1);
    assert_eq!(token.dict_key_at(0), "scheme");
    assert_eq!(token.dict_value_at(0).string8(), "basic");
    assert_eq!(token.dict_key_at(1), "principal");
    assert_eq!(token.dict_value_at(1).string8(), "neo4j");
    assert_eq!(token.dict_key_at(2), "credentials");
    assert_eq!(token.dict_value_at(2).string8(), "x");

    let bytes = pack(&init);
    // tiny struct, two fields, signature 0x01
    assert_eq!(&bytes[..2], &[0xB2, 0x01]);
    // the user agent follows immediately as a tiny string
    assert_eq!(&bytes[2..11], &[0x88, b'T', b'e', b's', b't', b'/', b'1', b'.', b'0']);
}

#[test]
fn run_template_packs_statement_and_parameters() {
    let mut state = ProtocolV1State::new();
    state.set_statement("RETURN 1");
    state.set_parameter_count(0);
    state.load_template(Template::Run).unwrap();
    let bytes = state.tx_buffer_mut().peek().to_vec();
    let mut expected = vec![0xB2, 0x10, 0x88];
    expected.extend_from_slice(b"RETURN 1");
    expected.push(0xA0);
    assert_eq!(bytes, expected);
}

#[test]
fn parameters_pack_in_slot_order() {
    let mut state = ProtocolV1State::new();
    state.set_statement("RETURN $x");
    state.set_parameter_count(1);
    state.set_parameter_key(0, "x");
    state.parameter_value_slot(0).to_int64(7);
    state.load_template(Template::Run).unwrap();
    let bytes = state.tx_buffer_mut().peek().to_vec();
    // ... A1 81 'x' 07
    assert_eq!(&bytes[bytes.len() - 4..], &[0xA1, 0x81, b'x', 0x07]);
}

#[test]
fn fixed_statement_templates() {
    let mut state = ProtocolV1State::new();
    for (template, statement) in [
        (Template::Begin, &b"BEGIN"[..]),
        (Template::Commit, b"COMMIT"),
        (Template::Rollback, b"ROLLBACK"),
    ] {
        state.load_template(template).unwrap();
        let bytes = state.tx_buffer_mut().peek().to_vec();
        state.tx_buffer_mut().clear();
        assert_eq!(&bytes[..2], &[0xB2, 0x10]);
        assert_eq!(bytes[2], 0x80 | statement.len() as u8);
        assert_eq!(&bytes[3..3 + statement.len()], statement);
        // empty parameter map
        assert_eq!(bytes[3 + statement.len()], 0xA0);
    }
}

#[test]
fn bare_templates_have_no_fields() {
    let mut state = ProtocolV1State::new();
    state.load_template(Template::Discard).unwrap();
    assert_eq!(state.tx_buffer_mut().peek(), &[0xB0, 0x2F]);
    state.tx_buffer_mut().clear();
    state.load_template(Template::Pull).unwrap();
    assert_eq!(state.tx_buffer_mut().peek(), &[0xB0, 0x3F]);
}

#[test]
fn request_ids_increase_monotonically() {
    let mut state = ProtocolV1State::new();
    assert_eq!(state.next_request_id(), 0);
    assert_eq!(state.load_template(Template::Run).unwrap(), 0);
    assert_eq!(state.load_template(Template::Pull).unwrap(), 1);
    let mut init = Value::new();
    compile_init(&mut init, "Test/1.0", "u", "p");
    assert_eq!(state.load_request(&init).unwrap(), 2);
    assert_eq!(state.next_request_id(), 3);
    assert_eq!(state.response_counter(), 0);
}

#[test]
fn unload_record_materializes_the_fields_list() {
    let mut state = ProtocolV1State::new();
    // RECORD([1])
    state.rx_buffer_mut().load(&[0xB1, 0x71, 0x91, 0x01]);
    state.unload().unwrap();
    let fetched = state.fetched();
    assert_eq!(fetched.kind(), ValueKind::List);
    assert_eq!(fetched.size(), 1);
    assert_eq!(fetched.list_at(0).int64(), 1);
}

#[test]
fn unload_success_materializes_a_summary() {
    let mut state = ProtocolV1State::new();
    // SUCCESS({})
    state.rx_buffer_mut().load(&[0xB1, 0x70, 0xA0]);
    state.unload().unwrap();
    let fetched = state.fetched();
    assert_eq!(fetched.kind(), ValueKind::Summary);
    assert_eq!(fetched.subtype(), Some(SUMMARY_SUCCESS));
    assert_eq!(fetched.struct_field_at(0).kind(), ValueKind::Dictionary8);
}

#[test]
fn unload_unknown_signature_is_a_protocol_violation() {
    let mut state = ProtocolV1State::new();
    state.rx_buffer_mut().load(&[0xB1, 0x66, 0xA0]);
    assert_eq!(state.unload(), Err(BoltError::ProtocolViolation));
}

#[test]
fn unload_non_structure_is_a_protocol_violation() {
    let mut state = ProtocolV1State::new();
    state.rx_buffer_mut().load(&[0x01]);
    assert_eq!(state.unload(), Err(BoltError::ProtocolViolation));
}

#[test]
fn name_tables() {
    assert_eq!(request_name(REQUEST_RUN), "RUN");
    assert_eq!(request_name(0x0F), "RESET");
    assert_eq!(summary_name(0x7E), "IGNORED");
    assert_eq!(structure_name(0x4E), "Node");
    assert_eq!(summary_name(0x00), "?");
}
