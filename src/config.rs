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
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `FAUCET_PROVIDER_URL` | Ledger node API endpoint | `https://comnet.iota.works` |
//! | `FAUCET_SEED` | Seed for a newly created wallet record | built-in testnet seed |
//! | `FAUCET_DEFAULT_AMOUNT` | Default dispense amount for a new record | `20000` |
//! | `FAUCET_CACHE_DIR` | Directory holding the `.wallet` cache | user home |
//! | `FAUCET_POLL_INTERVAL_SECS` | Delay between inclusion polls | `10` |
//! | `FAUCET_NODE_TIMEOUT_SECS` | HTTP timeout for node calls | `30` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | Serve HTTPS when both are set | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::ledger::{Seed, COMNET};
use crate::logging::LogFormat;
use crate::storage::CachePaths;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const PROVIDER_URL_ENV: &str = "FAUCET_PROVIDER_URL";
/// Only read when the wallet record is first created; an existing record
/// keeps its own seed.
pub const SEED_ENV: &str = "FAUCET_SEED";
pub const DEFAULT_AMOUNT_ENV: &str = "FAUCET_DEFAULT_AMOUNT";
pub const CACHE_DIR_ENV: &str = "FAUCET_CACHE_DIR";
pub const POLL_INTERVAL_ENV: &str = "FAUCET_POLL_INTERVAL_SECS";
pub const NODE_TIMEOUT_ENV: &str = "FAUCET_NODE_TIMEOUT_SECS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_AMOUNT: u64 = 20_000;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_NODE_TIMEOUT_SECS: u64 = 30;

/// Testnet seed the faucet has always shipped with.
pub const DEFAULT_SEED: &str =
    "NLRMWYYCDUVF9XQJYDFNNYTBSKPFKNHSDZWLLJOEDMDFRTDAZEPKYIHCTURJYYHHYQBMMYO9HOCBFDKSK";

/// Errors raised while reading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is not a valid {expected}: {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{0} and {1} must be set together")]
    Incomplete(&'static str, &'static str),
}

/// TLS certificate and key files (PEM).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone)]
pub struct FaucetConfig {
    pub bind_addr: SocketAddr,
    pub provider_url: url::Url,
    pub seed: Seed,
    pub default_amount: u64,
    pub cache_paths: CachePaths,
    pub poll_interval: Duration,
    pub node_timeout: Duration,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl FaucetConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let or_default =
            |name: &str, default: &str| optional(name).unwrap_or_else(|| default.to_string());

        let host = or_default(HOST_ENV, DEFAULT_HOST);
        let port: u16 = parse(PORT_ENV, optional(PORT_ENV), DEFAULT_PORT, "port")?;
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|_| ConfigError::Invalid {
                    name: HOST_ENV,
                    expected: "bind address",
                    value: host.clone(),
                })?;

        let raw_url = or_default(PROVIDER_URL_ENV, COMNET.provider_url);
        let provider_url = url::Url::parse(&raw_url).map_err(|_| ConfigError::Invalid {
            name: PROVIDER_URL_ENV,
            expected: "URL",
            value: raw_url.clone(),
        })?;

        let raw_seed = or_default(SEED_ENV, DEFAULT_SEED);
        let seed = Seed::new(raw_seed).map_err(|_| ConfigError::Invalid {
            name: SEED_ENV,
            expected: "81-tryte seed",
            value: "<redacted>".to_string(),
        })?;

        let default_amount = parse(
            DEFAULT_AMOUNT_ENV,
            optional(DEFAULT_AMOUNT_ENV),
            DEFAULT_AMOUNT,
            "amount",
        )?;

        let cache_paths = optional(CACHE_DIR_ENV)
            .map(CachePaths::new)
            .unwrap_or_default();

        let poll_interval = Duration::from_secs(parse(
            POLL_INTERVAL_ENV,
            optional(POLL_INTERVAL_ENV),
            DEFAULT_POLL_INTERVAL_SECS,
            "number of seconds",
        )?);
        let node_timeout = Duration::from_secs(parse(
            NODE_TIMEOUT_ENV,
            optional(NODE_TIMEOUT_ENV),
            DEFAULT_NODE_TIMEOUT_SECS,
            "number of seconds",
        )?);

        let tls = match (optional(TLS_CERT_PATH_ENV), optional(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::Incomplete(TLS_CERT_PATH_ENV, TLS_KEY_PATH_ENV)),
        };

        let log_format = match optional(LOG_FORMAT_ENV) {
            None => LogFormat::Pretty,
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: LOG_FORMAT_ENV,
                expected: "log format (json or pretty)",
                value: raw.clone(),
            })?,
        };

        Ok(Self {
            bind_addr,
            provider_url,
            seed,
            default_amount,
            cache_paths,
            poll_interval,
            node_timeout,
            tls,
            log_format,
        })
    }
}

fn parse<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
    }
}
