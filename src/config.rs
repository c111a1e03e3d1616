// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory holding `notes.redb` | `./data` |
//! | `JWT_SECRET` | HS256 signing key for session tokens | Required |
//! | `ACCESS_TOKEN_EXPIRE_MINUTES` | Session token lifetime | `30` |
//! | `CORS_ORIGINS` | Comma-separated origins, or `*` | `*` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM certificate and key; HTTPS when both set | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the data directory.
///
/// The datastore file `notes.redb` is created inside it on first start.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the token signing key.
///
/// Anyone holding this value can mint valid session tokens.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

pub const TOKEN_TTL_ENV: &str = "ACCESS_TOKEN_EXPIRE_MINUTES";
pub const CORS_ORIGINS_ENV: &str = "CORS_ORIGINS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// Secrets shorter than this are accepted but logged as weak.
pub const MIN_RECOMMENDED_SECRET_BYTES: usize = 32;

/// File name of the datastore inside `DATA_DIR`.
pub const DATABASE_FILE: &str = "notes.redb";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// PEM certificate chain and private key for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = non_empty(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match non_empty(PORT_ENV) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let data_dir = PathBuf::from(non_empty(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()));

        let jwt_secret = non_empty(JWT_SECRET_ENV).ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;

        let token_ttl_minutes = match non_empty(TOKEN_TTL_ENV) {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(minutes) if minutes > 0 => minutes,
                Ok(_) => {
                    return Err(ConfigError::Invalid {
                        name: TOKEN_TTL_ENV,
                        reason: "must be greater than zero".to_string(),
                    })
                }
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        name: TOKEN_TTL_ENV,
                        reason: e.to_string(),
                    })
                }
            },
            None => DEFAULT_TOKEN_TTL_MINUTES,
        };

        let cors_origins = parse_origins(non_empty(CORS_ORIGINS_ENV).as_deref().unwrap_or("*"));

        let tls = match (non_empty(TLS_CERT_PATH_ENV), non_empty(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::Invalid {
                    name: TLS_CERT_PATH_ENV,
                    reason: format!("{TLS_CERT_PATH_ENV} and {TLS_KEY_PATH_ENV} must be set together"),
                })
            }
        };

        let log_format = match non_empty(LOG_FORMAT_ENV).map(|v| v.trim().to_ascii_lowercase()) {
            None => LogFormat::default(),
            Some(v) if v == "json" => LogFormat::Json,
            Some(v) if v == "pretty" => LogFormat::Pretty,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    reason: format!("expected 'json' or 'pretty', got '{other}'"),
                })
            }
        };

        Ok(Self {
            host,
            port,
            data_dir,
            jwt_secret,
            token_ttl_minutes,
            cors_origins,
            tls,
            log_format,
        })
    }

    /// Socket address to bind. `HOST` may be IPv4 or IPv6 (`::`, `[::1]`).
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let host = self.host.trim();
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        let ip: IpAddr = host.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            name: HOST_ENV,
            reason: e.to_string(),
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.token_ttl_minutes)
    }

    pub fn has_weak_secret(&self) -> bool {
        self.jwt_secret.len() < MIN_RECOMMENDED_SECRET_BYTES
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("data_dir", &self.data_dir)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("cors_origins", &self.cors_origins)
            .field("tls", &self.tls)
            .field("log_format", &self.log_format)
            .finish()
    }
}

/// `*` (alone or in the list) means any origin and yields an empty list.
fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if origins.iter().any(|o| o == "*") {
        Vec::new()
    } else {
        origins
    }
}
