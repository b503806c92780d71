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
    openssl::ssl::{SslConnector, SslMethod, SslStream, SslVersion},
    parking_lot::Once,
    std::net::TcpStream,
};

// error tables and default verify paths are process-wide; initialize them exactly once
static TLS_INIT: Once = Once::new();

/// Wrap a connected socket in a client-side TLS session: TLS 1.2 or newer, the system
/// trust store, hostname verification against `host`
pub(super) fn secure_stream(
    stream: TcpStream,
    host: &str,
) -> Result<SslStream<TcpStream>, BoltError> {
    TLS_INIT.call_once(openssl::init);
    log::info!("bolt: Securing socket");
    let connector = {
        let mut builder =
            SslConnector::builder(SslMethod::tls_client()).map_err(|e| tls_error(&e))?;
        builder
            .set_min_proto_version(Some(SslVersion::TLS1_2))
            .map_err(|e| tls_error(&e))?;
        builder.build()
    };
    connector.connect(host, stream).map_err(|e| tls_error(&e))
}

fn tls_error<E: core::fmt::Display>(e: &E) -> BoltError {
    log::error!("bolt: TLS error: {}", e);
    BoltError::TlsError
}
