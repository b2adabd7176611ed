// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the configuration structs
//! loaded once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for the JSON entity store | `/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `APP_ENV` | Deployment environment (`production` enables strict checks) | `development` |
//! | `ATTESTATION_SECRET` | HMAC secret for attestation proofs | Dev default (non-production only) |
//! | `RATE_LIMIT_PER_MINUTE` | Fixed-window request budget per caller | `60` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;

use tracing::warn;

/// Environment variable name for the data directory path.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the bind address.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the bind port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the deployment environment.
pub const APP_ENV_ENV: &str = "APP_ENV";

/// Environment variable name for the attestation signing secret.
pub const ATTESTATION_SECRET_ENV: &str = "ATTESTATION_SECRET";

/// Environment variable name for the per-caller rate limit.
pub const RATE_LIMIT_ENV: &str = "RATE_LIMIT_PER_MINUTE";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Development-only attestation secret. Attestations signed with this key
/// are forgeable by anyone reading the source; production startup refuses
/// to run with it.
pub const DEFAULT_ATTESTATION_SECRET: &str = "kite-dev-attestation-secret";

/// Default per-caller request budget per minute.
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 60;

/// Configuration errors are fatal at process start.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "ATTESTATION_SECRET must be set to a non-default value when APP_ENV=production; \
         refusing to issue forgeable attestations"
    )]
    ForgeableSecret,

    #[error("invalid {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Attestation signing configuration, loaded once at startup and shared
/// read-only across all requests.
#[derive(Debug, Clone)]
pub struct SigningConfig {
    secret: String,
    /// True in production: the default secret is a startup error instead of
    /// a logged warning.
    pub strict: bool,
}

impl SigningConfig {
    /// Load from the environment.
    ///
    /// In strict (production) mode an unset or default secret is fatal.
    /// Outside production the default is allowed with a logged warning so
    /// local development works out of the box.
    pub fn from_env(strict: bool) -> Result<Self, ConfigError> {
        let secret = env::var(ATTESTATION_SECRET_ENV)
            .unwrap_or_else(|_| DEFAULT_ATTESTATION_SECRET.to_string());

        if secret == DEFAULT_ATTESTATION_SECRET || secret.is_empty() {
            if strict {
                return Err(ConfigError::ForgeableSecret);
            }
            warn!("using the development attestation secret; attestations are forgeable");
        }

        Ok(Self { secret, strict })
    }

    /// Build with an explicit secret (tests, embedded use).
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            strict: false,
        }
    }

    /// The signing secret bytes. Never logged or serialized.
    pub fn secret_bytes(&self) -> &[u8] {
        self.secret.as_bytes()
    }

    /// Whether the development default secret is in use.
    pub fn is_default_secret(&self) -> bool {
        self.secret == DEFAULT_ATTESTATION_SECRET
    }
}

/// Full server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: String,
    pub rate_limit_per_minute: u32,
    pub signing: SigningConfig,
}

impl Config {
    /// Load all configuration from the environment. Fails fast on a
    /// forgeable signing secret in production.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = env::var(APP_ENV_ENV).unwrap_or_else(|_| "development".to_string());
        let strict = environment == "production";

        let host = env::var(HOST_ENV).unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = match env::var(PORT_ENV) {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                value: raw,
            })?,
            Err(_) => 8080,
        };
        let data_dir = env::var(DATA_DIR_ENV).unwrap_or_else(|_| "/data".to_string());
        let rate_limit_per_minute = match env::var(RATE_LIMIT_ENV) {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                name: "RATE_LIMIT_PER_MINUTE",
                value: raw,
            })?,
            Err(_) => DEFAULT_RATE_LIMIT_PER_MINUTE,
        };

        Ok(Self {
            host,
            port,
            data_dir,
            rate_limit_per_minute,
            signing: SigningConfig::from_env(strict)?,
        })
    }
}
