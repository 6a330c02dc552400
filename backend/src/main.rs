//! MindTrack server entry point: loads settings, prepares storage and serves
//! the REST API.

mod server;

use actix_web::cookie::SameSite;
use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use mindtrack::inbound::http::health::HealthState;
use mindtrack::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{AppSettings, ServerConfig, create_server};

async fn connect(settings: &AppSettings, database_url: &str) -> Result<DbPool> {
    if settings.run_migrations() {
        let applied = run_pending_migrations(database_url, None)
            .await
            .wrap_err("running database migrations")?;
        info!(applied, "database migrations complete");
    }
    let mut pool_config = PoolConfig::new(database_url);
    if let Some(max) = settings.db_max_connections {
        pool_config = pool_config.with_max_size(max);
    }
    DbPool::new(pool_config)
        .await
        .wrap_err("creating database pool")
}

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

    let settings = AppSettings::load().wrap_err("loading settings")?;
    let key = settings.session_key()?;
    let bind_addr = settings.bind_addr()?;

    let mut config = ServerConfig::new(key, settings.cookie_secure(), SameSite::Lax, bind_addr);
    if let Some(url) = settings.database_url.as_deref() {
        config = config.with_db_pool(connect(&settings, url).await?);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "listening");
    server.await?;
    health_state.mark_unhealthy();
    Ok(())
}
