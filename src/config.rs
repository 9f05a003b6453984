// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! validated [`AuthSettings`] loaded from the environment at startup. Any
//! error here is fatal: the service must not accept traffic with an insecure
//! or missing signing key.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AUTH_SIGNING_KEY` | Base64 HS256 key material (at least 32 bytes decoded) | Required |
//! | `AUTH_TOKEN_TTL_SECS` | Lifetime of issued tokens | `3600` |
//! | `AUTH_REVOCATION_TIMEOUT_MS` | Upper bound on a revocation lookup | `250` |
//! | `AUTH_REVOCATION_SWEEP_SECS` | Interval between expired-revocation purges | `60` |
//! | `DEV_USERS` | Static principals, `subject=ROLE[+ROLE],...` | Empty |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::time::Duration;

use crate::auth::codec::{SigningKey, MIN_SIGNING_KEY_BYTES};

/// Environment variable holding the base64-encoded token signing key.
pub const SIGNING_KEY_ENV: &str = "AUTH_SIGNING_KEY";

/// Environment variable for the token lifetime in seconds.
pub const TOKEN_TTL_ENV: &str = "AUTH_TOKEN_TTL_SECS";

/// Environment variable for the revocation lookup timeout in milliseconds.
pub const REVOCATION_TIMEOUT_ENV: &str = "AUTH_REVOCATION_TIMEOUT_MS";

/// Environment variable for the revocation sweep interval in seconds.
pub const REVOCATION_SWEEP_ENV: &str = "AUTH_REVOCATION_SWEEP_SECS";

/// Environment variable listing static principals for the bundled resolver.
pub const DEV_USERS_ENV: &str = "DEV_USERS";

/// Environment variable selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default token lifetime (one hour).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Longest token lifetime accepted from configuration (30 days).
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(30 * 24 * 3600);

/// Default bound on a single revocation lookup.
pub const DEFAULT_REVOCATION_TIMEOUT: Duration = Duration::from_millis(250);

/// Default interval between revocation sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Startup configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("{0} must be set")]
    Missing(&'static str),

    /// The signing key is not valid base64
    #[error("signing key is not valid base64")]
    KeyEncoding,

    /// The decoded signing key is too short
    #[error("signing key must be at least {min} bytes after decoding, got {actual}")]
    KeyTooShort { min: usize, actual: usize },

    /// A variable has a value that cannot be used
    #[error("{var} has invalid value {value:?}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Validated authentication settings.
#[derive(Clone)]
pub struct AuthSettings {
    /// HS256 key used to sign and verify tokens
    pub signing_key: SigningKey,
    /// Lifetime of issued tokens
    pub token_ttl: Duration,
    /// Upper bound on a single revocation lookup
    pub revocation_timeout: Duration,
    /// Interval between background purges of expired revocations
    pub sweep_interval: Duration,
}

impl AuthSettings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let encoded_key = lookup(SIGNING_KEY_ENV)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::Missing(SIGNING_KEY_ENV))?;
        let signing_key = SigningKey::from_base64(&encoded_key)?;

        let token_ttl = parse_duration(&lookup, TOKEN_TTL_ENV, Duration::from_secs)?
            .unwrap_or(DEFAULT_TOKEN_TTL);
        if token_ttl > MAX_TOKEN_TTL {
            return Err(ConfigError::InvalidValue {
                var: TOKEN_TTL_ENV,
                value: token_ttl.as_secs().to_string(),
                reason: "exceeds the 30 day maximum",
            });
        }

        let revocation_timeout =
            parse_duration(&lookup, REVOCATION_TIMEOUT_ENV, Duration::from_millis)?
                .unwrap_or(DEFAULT_REVOCATION_TIMEOUT);
        let sweep_interval = parse_duration(&lookup, REVOCATION_SWEEP_ENV, Duration::from_secs)?
            .unwrap_or(DEFAULT_SWEEP_INTERVAL);

        Ok(Self {
            signing_key,
            token_ttl,
            revocation_timeout,
            sweep_interval,
        })
    }
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("signing_key", &format_args!("<{MIN_SIGNING_KEY_BYTES}+ bytes>"))
            .field("token_ttl", &self.token_ttl)
            .field("revocation_timeout", &self.revocation_timeout)
            .field("sweep_interval", &self.sweep_interval)
            .finish()
    }
}

/// Parse a positive integer variable into a duration.
fn parse_duration<F>(
    lookup: &F,
    var: &'static str,
    unit: fn(u64) -> Duration,
) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    let value: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: raw.clone(),
        reason: "expected a positive integer",
    })?;
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            var,
            value: raw,
            reason: "must be greater than zero",
        });
    }
    Ok(Some(unit(value)))
}
