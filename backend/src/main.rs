//! Backend entry-point: loads configuration, prepares storage and serves the
//! REST API.

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use homecafe::domain::ports::{NoOpPushSender, PushSender};
use homecafe::inbound::http::health::HealthState;
use homecafe::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use homecafe::outbound::push::ExpoPushSender;
use homecafe::server::{ServerConfig, create_server};
use homecafe::settings::{AppSettings, BuildMode};

fn build_push_sender(settings: &AppSettings) -> Result<Arc<dyn PushSender>> {
    if !settings.push_enabled() {
        info!("push delivery disabled");
        return Ok(Arc::new(NoOpPushSender));
    }
    let endpoint = settings.expo_endpoint()?;
    let sender = ExpoPushSender::new(endpoint, settings.push_timeout())
        .wrap_err("failed to build Expo push client")?;
    Ok(Arc::new(sender))
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

    let settings =
        AppSettings::load().map_err(|err| eyre!("failed to load configuration: {err}"))?;
    let session = settings
        .session(BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    let bind_addr = settings.bind_addr()?;

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
    )
    .with_push_sender(build_push_sender(&settings)?);

    if let Some(database_url) = settings.database_url() {
        run_pending_migrations(database_url)
            .await
            .wrap_err("failed to run database migrations")?;
        let pool = DbPool::new(PoolConfig::new(database_url))
            .await
            .wrap_err("failed to build database pool")?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)
        .await
        .wrap_err("failed to start server")?;
    server.await.wrap_err("server terminated with an error")
}
