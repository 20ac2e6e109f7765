// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup and carried
//! as an immutable [`AppConfig`]. The shared token secret is handed to the
//! token codec explicitly; nothing here is a mutable global.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory holding the ledger database file | `/data` |
//! | `TOKEN_SECRET` | Base64-encoded HS256 signing secret, identical across services | Required |
//! | `TOKEN_TTL_SECS` | Issued token lifetime in seconds | `86400` |
//! | `SWEEP_INTERVAL_SECS` | Interval between expired-limit sweeps | `86400` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable name for the ledger database directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the shared base64 signing secret.
///
/// The same value must be provisioned to the tracker service and the edge
/// gateway; both validate tokens independently against it.
pub const TOKEN_SECRET_ENV: &str = "TOKEN_SECRET";

/// File name of the redb database inside `DATA_DIR`.
pub const LEDGER_DB_FILE: &str = "ledger.redb";

/// Default token lifetime (24 hours).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(86_400);

/// Default interval between expired-limit sweeps (daily).
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(86_400);

/// Process-wide immutable configuration for the tracker service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Directory holding the ledger database file.
    pub data_dir: PathBuf,
    /// Base64-encoded HS256 signing secret.
    pub token_secret: String,
    /// Lifetime of issued tokens.
    pub token_ttl: Duration,
    /// Interval between expired-limit sweeps.
    pub sweep_interval: Duration,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// Fails when `TOKEN_SECRET` is absent: the service cannot issue or
    /// validate credentials without the shared secret.
    pub fn from_env() -> Result<Self, String> {
        let token_secret = env::var(TOKEN_SECRET_ENV)
            .map_err(|_| format!("{TOKEN_SECRET_ENV} must be set"))?;

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env_or("PORT", 8080),
            data_dir: env::var(DATA_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/data")),
            token_secret,
            token_ttl: Duration::from_secs(parse_env_or(
                "TOKEN_TTL_SECS",
                DEFAULT_TOKEN_TTL.as_secs(),
            )),
            sweep_interval: Duration::from_secs(parse_env_or(
                "SWEEP_INTERVAL_SECS",
                DEFAULT_SWEEP_INTERVAL.as_secs(),
            )),
        })
    }

    /// Path of the redb database file.
    pub fn ledger_db_path(&self) -> PathBuf {
        self.data_dir.join(LEDGER_DB_FILE)
    }
}

fn parse_env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}
