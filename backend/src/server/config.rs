//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use taskflow::domain::ports::AccessTokenVerifier;
use taskflow::outbound::persistence::DbPool;
use taskflow::settings::DEFAULT_CORS_ORIGIN;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) tokens: Arc<dyn AccessTokenVerifier>,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) cors_origins: Vec<String>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Configuration listening on `bind_addr` and verifying tokens with
    /// `tokens`. Tasks are kept in memory until a pool is attached.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, tokens: Arc<dyn AccessTokenVerifier>) -> Self {
        Self {
            bind_addr,
            tokens,
            db_pool: None,
            cors_origins: vec![DEFAULT_CORS_ORIGIN.to_owned()],
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Attach a database pool so tasks are persisted in PostgreSQL.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Browser origins allowed by the CORS layer.
    #[must_use]
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
