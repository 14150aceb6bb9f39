//! Shared harness assembling the production route table and middleware
//! order over substitutable ports.
//!
//! The stack mirrors `create_server`: the access gate runs inside the
//! session middleware, which runs inside tracing, so these suites exercise
//! the same request path a deployed binary serves. Only the cookie `Secure`
//! flag differs, since the test client speaks plain HTTP.

use actix_session::SessionMiddleware;
use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_web::body::{BoxBody, EitherBody};
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use crm_backend::inbound::http::auth::{sign_in, sign_out};
use crm_backend::inbound::http::clients::{
    add_contact, add_meeting, create_client, delete_client, get_client, list_clients,
    remove_contact, remove_meeting, update_address, update_client, update_client_summary,
    update_contact, update_meeting,
};
use crm_backend::inbound::http::geocode::geocode;
use crm_backend::inbound::http::health::{HealthState, live, ready};
use crm_backend::inbound::http::members::{
    create_member, delete_member, get_member, list_teams, update_member,
};
use crm_backend::inbound::http::state::{HttpState, HttpStatePorts};
use crm_backend::pages;
use crm_backend::{AccessGate, Trace};
use serde_json::{Value, json};

/// Session middleware in the production shape, minus the `Secure` flag.
fn session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(false)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build()
}

/// The full application: API scope, page shells, and health probes behind
/// the production middleware order.
pub fn gate_app(
    ports: HttpStatePorts,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let health_state = web::Data::new(HealthState::new());
    health_state.mark_ready();
    let http_state = web::Data::new(HttpState::new(ports));

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

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(AccessGate)
        .wrap(session_middleware())
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
        .service(live)
}

/// Pull the `session` cookie out of a response.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// Sign in through the real endpoint and hand back the session cookie.
pub async fn sign_in_as(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
    >,
    username: &str,
    portal: &str,
) -> Cookie<'static> {
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/signin")
            .set_json(json!({
                "username": username,
                "password": "password",
                "portal": portal,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK, "fixture sign-in succeeds");
    session_cookie(&res)
}

/// Assert a status and decode the JSON body.
pub async fn expect_json(res: ServiceResponse<EitherBody<BoxBody>>, status: StatusCode) -> Value {
    assert_eq!(res.status(), status);
    actix_test::read_body_json(res).await
}

/// The `Location` header of a redirect response.
pub fn location_of<B>(res: &ServiceResponse<B>) -> &str {
    res.headers()
        .get(actix_web::http::header::LOCATION)
        .expect("redirect location")
        .to_str()
        .expect("ascii location")
}
