//! CRM backend entry-point: configuration, schema migrations, and server startup.

use std::net::SocketAddr;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use crm_backend::inbound::http::health::HealthState;
use crm_backend::inbound::http::session_config::{
    BuildMode, key_fingerprint, session_settings_from_env,
};
use crm_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use crm_backend::server::{AppSettings, GeocodingConfig, ServerConfig, create_server};

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

    let settings = AppSettings::load().wrap_err("failed to load application settings")?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    info!(
        key_fingerprint = %key_fingerprint(&session.key),
        "session key loaded"
    );

    let bind_addr = SocketAddr::new(
        settings
            .host()
            .parse()
            .wrap_err("CRM_HOST must be an IP address")?,
        settings.port(),
    );

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
    );

    if let Some(database_url) = settings.database_url.clone() {
        // Diesel migrations run over a synchronous connection; keep that
        // off the async runtime's worker threads.
        let migration_url = database_url.clone();
        let applied =
            tokio::task::spawn_blocking(move || run_pending_migrations(&migration_url))
                .await
                .wrap_err("migration task failed")?
                .wrap_err("schema migrations failed")?;
        info!(applied, "schema migrations applied");

        let pool = DbPool::new(PoolConfig::new(database_url))
            .await
            .wrap_err("failed to build the database pool")?;
        config = config.with_db_pool(pool);
    } else {
        warn!("CRM_DATABASE_URL not set; serving fixture data");
    }

    if let Some(api_key) = settings.google_maps_api_key.clone() {
        let endpoint = settings
            .google_maps_endpoint()
            .parse()
            .wrap_err("CRM_GOOGLE_MAPS_ENDPOINT must be a valid URL")?;
        config = config.with_geocoding(GeocodingConfig::new(api_key, endpoint));
    } else {
        warn!("CRM_GOOGLE_MAPS_API_KEY not set; geocoding answers from fixtures");
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).wrap_err("failed to start the HTTP server")?;
    info!(%bind_addr, "server listening");
    server.await.wrap_err("server terminated abnormally")
}
