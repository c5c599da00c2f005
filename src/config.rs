// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment exactly once at startup and
//! handed to the services that need it. Request handling never reads the
//! environment.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `TOKEN_SECRET_KEY` | HMAC secret used to sign tokens | Required |
//! | `CIPHER_KEY` | 32-byte key for the subject cipher | Required |
//! | `CIPHER_IV_LENGTH` | Cipher IV length (must be `16`) | `16` |
//! | `TOKEN_TTL_HOURS` | Default token lifetime in hours | `24` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `TLS_CERT_PATH` | PEM certificate chain (enables HTTPS) | Optional |
//! | `TLS_KEY_PATH` | PEM private key (enables HTTPS) | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//!
//! Rotating `TOKEN_SECRET_KEY` or `CIPHER_KEY` invalidates every token
//! issued before the restart.

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::TimeDelta;

use crate::auth::cipher::{IV_LENGTH, KEY_LENGTH};

pub const TOKEN_SECRET_KEY_ENV: &str = "TOKEN_SECRET_KEY";
pub const CIPHER_KEY_ENV: &str = "CIPHER_KEY";
pub const CIPHER_IV_LENGTH_ENV: &str = "CIPHER_IV_LENGTH";
pub const TOKEN_TTL_HOURS_ENV: &str = "TOKEN_TTL_HOURS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            name,
            reason: reason.into(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// Parse a `LOG_FORMAT` value; anything but `json` means pretty.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }

    pub fn from_env() -> Self {
        Self::parse(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
    }
}

/// Certificate and key for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Process configuration.
#[derive(Clone)]
pub struct Config {
    /// Token signing secret
    pub secret_key: String,
    /// Subject cipher key (raw bytes)
    pub cipher_key: Vec<u8>,
    pub iv_length: usize,
    /// Default lifetime of issued tokens
    pub token_ttl: TimeDelta,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub tls: Option<TlsPaths>,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_key = lookup(TOKEN_SECRET_KEY_ENV)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing(TOKEN_SECRET_KEY_ENV))?;

        let cipher_key = lookup(CIPHER_KEY_ENV)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing(CIPHER_KEY_ENV))?
            .into_bytes();
        if cipher_key.len() != KEY_LENGTH {
            return Err(ConfigError::invalid(
                CIPHER_KEY_ENV,
                format!("expected {KEY_LENGTH} bytes, got {}", cipher_key.len()),
            ));
        }

        let iv_length = match lookup(CIPHER_IV_LENGTH_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|e| ConfigError::invalid(CIPHER_IV_LENGTH_ENV, e.to_string()))?,
            None => IV_LENGTH,
        };
        if iv_length != IV_LENGTH {
            return Err(ConfigError::invalid(
                CIPHER_IV_LENGTH_ENV,
                format!("must be {IV_LENGTH}, got {iv_length}"),
            ));
        }

        let ttl_hours = match lookup(TOKEN_TTL_HOURS_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map_err(|e| ConfigError::invalid(TOKEN_TTL_HOURS_ENV, e.to_string()))?,
            None => DEFAULT_TOKEN_TTL_HOURS,
        };
        let token_ttl = TimeDelta::try_hours(ttl_hours)
            .filter(|ttl| *ttl > TimeDelta::zero())
            .ok_or_else(|| ConfigError::invalid(TOKEN_TTL_HOURS_ENV, "must be a positive hour count"))?;

        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup(PORT_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid(PORT_ENV, e.to_string()))?,
            None => DEFAULT_PORT,
        };

        let tls = match (lookup(TLS_CERT_PATH_ENV), lookup(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert_path: cert.into(),
                key_path: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        Ok(Self {
            secret_key,
            cipher_key,
            iv_length,
            token_ttl,
            host,
            port,
            log_format: LogFormat::parse(lookup(LOG_FORMAT_ENV).as_deref()),
            tls,
        })
    }

    /// Socket address to bind the server to.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::invalid(HOST_ENV, e.to_string()))
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("secret_key", &"<redacted>")
            .field("cipher_key", &"<redacted>")
            .field("iv_length", &self.iv_length)
            .field("token_ttl", &self.token_ttl)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_format", &self.log_format)
            .field("tls", &self.tls)
            .finish()
    }
}
