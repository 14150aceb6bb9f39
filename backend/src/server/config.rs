//! HTTP server configuration and deployment settings.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::outbound::geocoding::DEFAULT_GOOGLE_GEOCODING_ENDPOINT;
use crate::outbound::persistence::DbPool;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Deployment settings loaded from CLI flags, environment, and config files.
///
/// Every field is optional so a bare `crm-backend` invocation starts a
/// fixture-backed server; production deployments set `CRM_DATABASE_URL`
/// and `CRM_GOOGLE_MAPS_API_KEY`.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CRM")]
pub struct AppSettings {
    /// Interface the HTTP listener binds to.
    pub host: Option<String>,
    /// Port the HTTP listener binds to.
    pub port: Option<u16>,
    /// Postgres connection string; fixture ports serve requests when unset.
    pub database_url: Option<String>,
    /// Geocoding provider key; the fixture geocoder answers when unset.
    pub google_maps_api_key: Option<String>,
    /// Geocoding endpoint override for tests and proxies.
    pub google_maps_endpoint: Option<String>,
}

impl AppSettings {
    /// Return the configured bind host, falling back to all interfaces.
    #[must_use]
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    /// Return the configured bind port, falling back to the default.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Return the configured geocoding endpoint, falling back to the
    /// provider default.
    #[must_use]
    pub fn google_maps_endpoint(&self) -> &str {
        self.google_maps_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_GOOGLE_GEOCODING_ENDPOINT)
    }
}

/// Credentials and endpoint for the external geocoding provider.
pub struct GeocodingConfig {
    pub(crate) api_key: String,
    pub(crate) endpoint: Url,
}

impl GeocodingConfig {
    /// Bundle a provider key with the endpoint it is valid for.
    #[must_use]
    pub fn new(api_key: impl Into<String>, endpoint: Url) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint,
        }
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) geocoding: Option<GeocodingConfig>,
}

impl ServerConfig {
    /// Construct a server configuration using application preferences.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            geocoding: None,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When provided, the server uses database-backed implementations for
    /// the login, client, and member ports.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach external geocoding credentials.
    ///
    /// When provided, address lookups call the real provider instead of
    /// the fixture geocoder.
    #[must_use]
    pub fn with_geocoding(mut self, geocoding: GeocodingConfig) -> Self {
        self.geocoding = Some(geocoding);
        self
    }

    /// Return the socket address the server will bind to.
    #[cfg_attr(
        not(any(test, doctest)),
        expect(
            dead_code,
            reason = "Exercised by integration tests; retained for fixture access"
        )
    )]
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
