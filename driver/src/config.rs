/*
 * Created on Mon Jan 22 2024
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

//! # Driver configuration
//!
//! Embedding applications describe the endpoint, credentials and user agent either in
//! code, in a YAML document, or through `SKYBOLT_*` environment variables. The layering
//! is: defaults, then the YAML source (if any), then the environment. The connection API
//! itself never reads configuration; callers decode a [`DriverConfig`] and hand its
//! pieces to [`Address`](crate::net::Address) and
//! [`Connection`](crate::net::Connection).

use {
    libbolt::{TResult, VERSION},
    serde::Deserialize,
    std::{env, fs},
};

fn default_user_agent() -> String {
    format!("skybolt/{}", VERSION)
}

#[derive(Debug, PartialEq, Deserialize)]
/// The decoded driver configuration
pub struct DriverConfig {
    pub endpoint: ConfigEndpoint,
    #[serde(default)]
    pub auth: Option<ConfigAuth>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, PartialEq, Deserialize)]
/// Where to connect, and whether to wrap the socket in TLS
pub struct ConfigEndpoint {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub secure: bool,
}

#[derive(Debug, PartialEq, Deserialize)]
/// Basic-auth credentials
pub struct ConfigAuth {
    pub user: String,
    pub password: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            endpoint: ConfigEndpoint {
                host: Self::DEFAULT_HOST.to_owned(),
                port: Self::DEFAULT_PORT,
                secure: false,
            },
            auth: None,
            user_agent: default_user_agent(),
        }
    }
}

impl DriverConfig {
    const DEFAULT_HOST: &'static str = "127.0.0.1";
    const DEFAULT_PORT: u16 = 7687;

    pub fn decode_yaml(raw: &str) -> TResult<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }
    pub fn from_file(path: &str) -> TResult<Self> {
        Self::decode_yaml(&fs::read_to_string(path)?)
    }
    /// Layer the `SKYBOLT_*` environment variables on top of this configuration.
    /// Unset or unparseable variables leave the current value alone
    pub fn apply_env(&mut self) {
        if let Ok(host) = env::var("SKYBOLT_HOST") {
            self.endpoint.host = host;
        }
        if let Ok(port) = env::var("SKYBOLT_PORT") {
            if let Ok(port) = port.parse() {
                self.endpoint.port = port;
            }
        }
        if let Ok(tls) = env::var("SKYBOLT_TLS") {
            self.endpoint.secure = tls == "1" || tls.eq_ignore_ascii_case("true");
        }
        if let Ok(user_agent) = env::var("SKYBOLT_USER_AGENT") {
            self.user_agent = user_agent;
        }
        if let (Ok(user), Ok(password)) = (env::var("SKYBOLT_USER"), env::var("SKYBOLT_PASSWORD")) {
            self.auth = Some(ConfigAuth { user, password });
        }
    }
    /// The full layering: start from the defaults, read the file named by
    /// `SKYBOLT_CONFIG` if it is set, then apply the remaining environment overrides
    pub fn resolve() -> TResult<Self> {
        let mut config = match env::var("SKYBOLT_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigAuth, ConfigEndpoint, DriverConfig};

    #[test]
    fn decode_full_document() {
        let raw = "\
endpoint:
  host: graph.example.com
  port: 7473
  secure: true
auth:
  user: neo4j
  password: hunter2
user_agent: MyApp/1.0
";
        let config = DriverConfig::decode_yaml(raw).unwrap();
        assert_eq!(
            config,
            DriverConfig {
                endpoint: ConfigEndpoint {
                    host: "graph.example.com".to_owned(),
                    port: 7473,
                    secure: true,
                },
                auth: Some(ConfigAuth {
                    user: "neo4j".to_owned(),
                    password: "hunter2".to_owned(),
                }),
                user_agent: "MyApp/1.0".to_owned(),
            }
        );
    }

    #[test]
    fn decode_minimal_document_fills_defaults() {
        let raw = "\
endpoint:
  host: localhost
  port: 7687
";
        let config = DriverConfig::decode_yaml(raw).unwrap();
        assert!(!config.endpoint.secure);
        assert!(config.auth.is_none());
        assert_eq!(config.user_agent, format!("skybolt/{}", libbolt::VERSION));
    }

    #[test]
    fn env_overrides_win() {
        std::env::set_var("SKYBOLT_HOST", "10.0.0.9");
        std::env::set_var("SKYBOLT_PORT", "9999");
        std::env::set_var("SKYBOLT_TLS", "true");
        let mut config = DriverConfig::default();
        config.apply_env();
        assert_eq!(config.endpoint.host, "10.0.0.9");
        assert_eq!(config.endpoint.port, 9999);
        assert!(config.endpoint.secure);
        std::env::remove_var("SKYBOLT_HOST");
        std::env::remove_var("SKYBOLT_PORT");
        std::env::remove_var("SKYBOLT_TLS");
    }
}
