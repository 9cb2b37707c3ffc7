//! Task server entry point: loads settings, prepares storage and serves the
//! REST API.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

use server::{ServerConfig, create_server};
use taskflow::domain::ports::AccessTokenVerifier;
use taskflow::inbound::http::health::HealthState;
use taskflow::outbound::auth::JwtAccessTokens;
use taskflow::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use taskflow::settings::AppSettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load configuration: {err}"))?;
    info!(?settings, "configuration loaded");

    let config = ServerConfig::new(settings.bind_addr()?, build_tokens(&settings)?)
        .with_cors_origins(settings.cors_allowed_origins());
    let config = match settings.database_url() {
        Some(url) => config.with_db_pool(prepare_database(url, settings.pool_max_size()).await?),
        None => config,
    };
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(server::build_metrics()?));

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    let outcome = server.await;
    health_state.mark_unhealthy();
    outcome.wrap_err("server terminated with an error")
}

/// Apply pending migrations, then open the pool.
async fn prepare_database(url: &str, max_size: u32) -> Result<DbPool> {
    let migration_url = url.to_owned();
    let applied = tokio::task::spawn_blocking(move || run_migrations(&migration_url))
        .await
        .wrap_err("migration task panicked")??;
    info!(applied, "database schema is up to date");

    let pool = DbPool::new(PoolConfig::new(url).with_max_size(max_size)).await?;
    Ok(pool)
}

/// Token verifier keyed by the configured secret.
///
/// Debug builds without a secret fall back to a random one so local runs work;
/// tokens minted elsewhere will not verify against it.
fn build_tokens(settings: &AppSettings) -> Result<Arc<dyn AccessTokenVerifier>> {
    if let Some(secret) = settings.jwt_secret() {
        return Ok(Arc::new(JwtAccessTokens::new(secret)));
    }
    if cfg!(debug_assertions) {
        warn!("TASKFLOW_JWT_SECRET not set; using an ephemeral secret (dev only)");
        let secret = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        return Ok(Arc::new(JwtAccessTokens::new(secret)));
    }
    Err(eyre!("TASKFLOW_JWT_SECRET must be set"))
}
