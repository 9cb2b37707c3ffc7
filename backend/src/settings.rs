//! Application configuration loaded via OrthoConfig.
//!
//! Values come from `TASKFLOW_*` environment variables or the matching
//! command-line flags. Numeric knobs carry loader defaults; the remaining
//! values are optional and the accessors apply fallbacks and reject malformed
//! input.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

/// Listen address used when none is configured.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
/// Pool size used when none is configured.
pub const DEFAULT_POOL_MAX_SIZE: u32 = 10;
/// Access-token lifetime used when none is configured.
pub const DEFAULT_TOKEN_TTL_MINUTES: u64 = 30;
/// Browser origin allowed when none is configured.
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Configuration values rejected by the accessors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("bind address {value:?} is not a socket address: {message}")]
    InvalidBindAddr { value: String, message: String },
    #[error("token lifetime must be at least one minute")]
    ZeroTokenTtl,
}

/// Runtime configuration for the task server and its tools.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TASKFLOW")]
pub struct AppSettings {
    /// PostgreSQL connection URL. Without it tasks live in memory.
    pub database_url: Option<String>,
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Shared HS256 secret for bearer tokens.
    pub jwt_secret: Option<String>,
    /// Upper bound on pooled database connections.
    #[ortho_config(default = 10)]
    pub pool_max_size: u32,
    /// Lifetime of tokens minted by `issue-token`, in minutes.
    #[ortho_config(default = 30)]
    pub token_ttl_minutes: u64,
    /// Comma-separated browser origins allowed to call the API.
    pub cors_allowed_origins: Option<String>,
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("pool_max_size", &self.pool_max_size)
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .finish()
    }
}

impl AppSettings {
    /// Database URL, ignoring blank values.
    #[must_use]
    pub fn database_url(&self) -> Option<&str> {
        non_blank(self.database_url.as_deref())
    }

    /// Bearer-token secret, ignoring blank values.
    #[must_use]
    pub fn jwt_secret(&self) -> Option<&str> {
        non_blank(self.jwt_secret.as_deref())
    }

    /// Parsed listen address, defaulting to [`DEFAULT_BIND_ADDR`].
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = non_blank(self.bind_addr.as_deref()).unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse()
            .map_err(|err: std::net::AddrParseError| SettingsError::InvalidBindAddr {
                value: raw.to_owned(),
                message: err.to_string(),
            })
    }

    #[must_use]
    pub const fn pool_max_size(&self) -> u32 {
        self.pool_max_size
    }

    /// Allowed CORS origins, falling back to [`DEFAULT_CORS_ORIGIN`].
    ///
    /// Entries are trimmed and blanks dropped, so `"a, ,b"` yields two origins.
    #[must_use]
    pub fn cors_allowed_origins(&self) -> Vec<String> {
        let origins: Vec<String> = self
            .cors_allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(|origin| non_blank(Some(origin)))
            .map(str::to_owned)
            .collect();
        if origins.is_empty() {
            vec![DEFAULT_CORS_ORIGIN.to_owned()]
        } else {
            origins
        }
    }

    /// Lifetime for minted tokens, defaulting to thirty minutes.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroTokenTtl`] when configured as zero.
    pub fn token_ttl(&self) -> Result<Duration, SettingsError> {
        match self.token_ttl_minutes {
            0 => Err(SettingsError::ZeroTokenTtl),
            minutes => Ok(Duration::from_secs(minutes.saturating_mul(60))),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
