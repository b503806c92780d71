/*
 * Created on Wed Jan 24 2024
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

//! # The Bolt message vocabulary
//!
//! Message and structure signatures shared by every protocol version, plus the name
//! tables used for logging and debug output. The version-specific machinery lives in the
//! per-version modules ([`v1`]).

pub mod v1;
#[cfg(test)]
mod tests;

consts! {
    // client requests
    pub REQUEST_INIT: i16 = 0x01;
    pub REQUEST_ACK_FAILURE: i16 = 0x0E;
    pub REQUEST_RESET: i16 = 0x0F;
    pub REQUEST_RUN: i16 = 0x10;
    pub REQUEST_DISCARD_ALL: i16 = 0x2F;
    pub REQUEST_PULL_ALL: i16 = 0x3F;
    // server messages
    pub MESSAGE_RECORD: i16 = 0x71;
    pub SUMMARY_SUCCESS: i16 = 0x70;
    pub SUMMARY_IGNORED: i16 = 0x7E;
    pub SUMMARY_FAILURE: i16 = 0x7F;
    // graph structures
    pub STRUCTURE_NODE: i16 = 0x4E;
    pub STRUCTURE_RELATIONSHIP: i16 = 0x52;
    pub STRUCTURE_PATH: i16 = 0x50;
    pub STRUCTURE_UNBOUND_RELATIONSHIP: i16 = 0x72;
}

pub fn request_name(code: i16) -> &'static str {
    match code {
        REQUEST_INIT => "INIT",
        REQUEST_ACK_FAILURE => "ACK_FAILURE",
        REQUEST_RESET => "RESET",
        REQUEST_RUN => "RUN",
        REQUEST_DISCARD_ALL => "DISCARD_ALL",
        REQUEST_PULL_ALL => "PULL_ALL",
        _ => "?",
    }
}

pub fn summary_name(code: i16) -> &'static str {
    match code {
        SUMMARY_SUCCESS => "SUCCESS",
        SUMMARY_IGNORED => "IGNORED",
        SUMMARY_FAILURE => "FAILURE",
        _ => "?",
    }
}

pub fn structure_name(code: i16) -> &'static str {
    match code {
        STRUCTURE_NODE => "Node",
        STRUCTURE_RELATIONSHIP => "Relationship",
        STRUCTURE_PATH => "Path",
        STRUCTURE_UNBOUND_RELATIONSHIP => "UnboundRelationship",
        _ => "?",
    }
}
