// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for keys, blobs and the access log | `./data` |
//! | `KEY_FILE` | Override for the storage key location | `{DATA_DIR}/key.key` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `5000` |
//! | `MAX_UPLOAD_BYTES` | Request body limit for uploads | `67108864` |
//! | `TLS_CERT_PATH` | PEM certificate chain; enables HTTPS with `TLS_KEY_PATH` | unset |
//! | `TLS_KEY_PATH` | PEM private key; enables HTTPS with `TLS_CERT_PATH` | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::storage::{paths::DATA_ROOT, StoragePaths};

/// Environment variable name for the data directory path.
pub const DATA_DIR_ENV: &str = "DATA_DIR";
/// Environment variable name for the key file override.
pub const KEY_FILE_ENV: &str = "KEY_FILE";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const MAX_UPLOAD_BYTES_ENV: &str = "MAX_UPLOAD_BYTES";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
/// 64 MiB. Uploads are encrypted in memory, so this also bounds memory use.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;
/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Certificate and key locations for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub key_file: Option<PathBuf>,
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    /// HTTPS is enabled only when both paths are set.
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DATA_ROOT),
            key_file: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            tls: None,
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Unparseable numeric values fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let tls = match (lookup(TLS_CERT_PATH_ENV), lookup(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
            }),
            _ => None,
        };

        Self {
            data_dir: lookup(DATA_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            key_file: lookup(KEY_FILE_ENV).map(PathBuf::from),
            host: lookup(HOST_ENV).unwrap_or(defaults.host),
            port: lookup(PORT_ENV)
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            max_upload_bytes: lookup(MAX_UPLOAD_BYTES_ENV)
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
            tls,
            log_format: lookup(LOG_FORMAT_ENV)
                .map(|s| LogFormat::parse(&s))
                .unwrap_or(defaults.log_format),
        }
    }

    /// Storage layout rooted at `data_dir`.
    pub fn storage_paths(&self) -> StoragePaths {
        let paths = StoragePaths::new(&self.data_dir);
        match &self.key_file {
            Some(key_file) => paths.with_key_file(key_file),
            None => paths,
        }
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = config_from(&[]);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.port, 5000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.tls.is_none());
        assert_eq!(
            config.storage_paths().key_file(),
            PathBuf::from("./data/key.key")
        );
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            (DATA_DIR_ENV, "/srv/exchange"),
            (KEY_FILE_ENV, "/etc/exchange/key.key"),
            (PORT_ENV, "8443"),
            (HOST_ENV, "127.0.0.1"),
            (MAX_UPLOAD_BYTES_ENV, "1024"),
            (LOG_FORMAT_ENV, "JSON"),
        ]);

        assert_eq!(config.data_dir, PathBuf::from("/srv/exchange"));
        assert_eq!(config.port, 8443);
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:8443");
        assert_eq!(
            config.storage_paths().key_file(),
            PathBuf::from("/etc/exchange/key.key")
        );
    }

    #[test]
    fn invalid_port_falls_back_to_default() {
        let config = config_from(&[(PORT_ENV, "not-a-port")]);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn tls_requires_both_paths() {
        assert!(config_from(&[(TLS_CERT_PATH_ENV, "/certs/server.pem")])
            .tls
            .is_none());

        let config = config_from(&[
            (TLS_CERT_PATH_ENV, "/certs/server.pem"),
            (TLS_KEY_PATH_ENV, "/certs/server.key"),
        ]);
        assert_eq!(
            config.tls,
            Some(TlsPaths {
                cert: PathBuf::from("/certs/server.pem"),
                key: PathBuf::from("/certs/server.key"),
            })
        );
    }
}
