//! HTTP server assembly: state selection, session setup, middleware stack,
//! and the route table.

mod config;

pub use config::{AppSettings, GeocodingConfig, ServerConfig};

use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::body::{BoxBody, EitherBody};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::Geocoder;
use crate::inbound::http::auth::{sign_in, sign_out};
use crate::inbound::http::clients::{
    add_contact, add_meeting, create_client, delete_client, get_client, list_clients,
    remove_contact, remove_meeting, update_address, update_client, update_client_summary,
    update_contact, update_meeting,
};
use crate::inbound::http::geocode::geocode;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::members::{
    create_member, delete_member, get_member, list_teams, update_member,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::middleware::{AccessGate, Trace};
use crate::outbound::geocoding::GoogleGeocoder;
use crate::outbound::persistence::{
    DieselClientRepository, DieselLoginService, DieselMemberRepository,
};
use crate::pages;

/// Select the geocoding port based on configuration.
///
/// Uses the real provider client when credentials are configured, otherwise
/// falls back to the fixture geocoder.
///
/// # Errors
/// Returns [`std::io::Error`] when the provider HTTP client cannot be built.
fn build_geocoder(config: &ServerConfig) -> std::io::Result<Arc<dyn Geocoder>> {
    match &config.geocoding {
        Some(geocoding) => {
            let geocoder = GoogleGeocoder::new(geocoding.api_key.clone(), geocoding.endpoint.clone())
                .map_err(|e| {
                    std::io::Error::other(format!("geocoding client construction failed: {e}"))
                })?;
            Ok(Arc::new(geocoder))
        }
        None => Ok(Arc::new(crate::domain::ports::FixtureGeocoder)),
    }
}

/// Select the port implementations and wrap them in shared handler state.
///
/// Storage-backed ports are selected together: either a pool is configured
/// and login, clients, and members all read from Postgres, or none do and
/// the in-memory fixtures serve requests. The geocoder is selected
/// independently so a fixture deployment can still exercise real lookups.
fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let geocoder = build_geocoder(config)?;
    let ports = match &config.db_pool {
        Some(pool) => HttpStatePorts {
            login: Arc::new(DieselLoginService::new(pool.clone())),
            clients: Arc::new(DieselClientRepository::new(pool.clone())),
            members: Arc::new(DieselMemberRepository::new(pool.clone())),
            geocoder,
        },
        None => HttpStatePorts {
            geocoder,
            ..HttpStatePorts::default()
        },
    };
    Ok(web::Data::new(HttpState::new(ports)))
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1")
        .service(sign_in)
        .service(sign_out)
        .service(create_client)
        .service(list_clients)
        .service(get_client)
        .service(update_client)
        .service(update_client_summary)
        .service(delete_client)
        .service(add_contact)
        .service(update_contact)
        .service(remove_contact)
        .service(update_address)
        .service(add_meeting)
        .service(update_meeting)
        .service(remove_meeting)
        .service(list_teams)
        .service(get_member)
        .service(create_member)
        .service(update_member)
        .service(delete_member)
        .service(geocode);

    // Session state is read by the page gate, so the session middleware
    // wraps the whole application rather than the API scope alone. Later
    // `wrap` calls run earlier, leaving the gate innermost.
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(AccessGate)
        .wrap(session)
        .wrap(Trace)
        .service(api)
        .service(pages::root)
        .service(pages::sign_in_user)
        .service(pages::sign_in_admin)
        .service(pages::admin_home)
        .service(pages::admin_member)
        .service(pages::sales_root)
        .service(pages::sales_overview)
        .service(pages::sales_leads)
        .service(pages::sales_lead_detail)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Build and start the HTTP server for `config`.
///
/// The returned [`Server`] is already listening and must be awaited to
/// drive the connection loop. `health_state` flips to ready once the
/// listener is bound, so orchestrators hold traffic until then.
///
/// # Errors
/// Propagates [`std::io::Error`] when building the geocoding client, binding
/// the socket, or starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config)?;
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
        geocoding: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
