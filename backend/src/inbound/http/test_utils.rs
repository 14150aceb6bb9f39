//! Shared fixtures for HTTP-level tests.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;

use crate::domain::auth::{Role, SessionClaims};

/// Session middleware with a throwaway key and no `Secure` flag, so tests
/// can run over plain HTTP. The cookie keeps its production name.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    let throwaway = Key::generate();
    SessionMiddleware::builder(CookieSessionStore::default(), throwaway)
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Claims for a signed-in test caller with the given role.
#[must_use]
pub fn claims_for(role: Role) -> SessionClaims {
    match role {
        Role::Admin => SessionClaims {
            user_id: 1,
            role,
            username: "admin".into(),
            display_name: "Administrator".into(),
        },
        Role::Sales => SessionClaims {
            user_id: 7,
            role,
            username: "asmith".into(),
            display_name: "Anita Smith".into(),
        },
    }
}

/// Pull the `session` cookie out of a response, panicking when absent.
#[must_use]
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}
