//! Session-scoped gate over the page-serving routes.
//!
//! Runs inside the session middleware, reads the claims leniently (an
//! unreadable cookie counts as signed out), and asks
//! [`crate::domain::access::decide`] whether the page may be served.
//! Redirects are issued as `307 Temporary Redirect` so browsers re-issue
//! the original method against the target. API, health, docs, and favicon
//! paths bypass the gate; the API carries its own per-route session checks.

use std::task::{Context, Poll};

use actix_session::SessionExt;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{Error, HttpResponse};
use futures_util::future::{LocalBoxFuture, Ready, ready};

use crate::domain::access::{RouteDecision, decide, is_gate_exempt};
use crate::inbound::http::session::peek_claims;

/// Middleware enforcing page entitlement per session role.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use crm_backend::middleware::AccessGate;
///
/// let app = App::new().wrap(AccessGate);
/// ```
#[derive(Clone)]
pub struct AccessGate;

impl<S, B> Transform<S, ServiceRequest> for AccessGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AccessGateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessGateMiddleware { service }))
    }
}

/// Service wrapper produced by [`AccessGate`].
///
/// Applications should not use this type directly.
pub struct AccessGateMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AccessGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if is_gate_exempt(req.path()) {
            let fut = self.service.call(req);
            return Box::pin(async move { Ok(fut.await?.map_into_left_body()) });
        }

        let claims = peek_claims(&req.get_session());
        match decide(claims.as_ref(), req.path()) {
            RouteDecision::Proceed => {
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            RouteDecision::Redirect(target) => {
                tracing::debug!(path = %req.path(), target, "page request redirected");
                let (req, _payload) = req.into_parts();
                let response = HttpResponse::TemporaryRedirect()
                    .insert_header((header::LOCATION, target))
                    .finish()
                    .map_into_right_body();
                Box::pin(ready(Ok(ServiceResponse::new(req, response))))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::BoxBody;
    use actix_web::dev::ServiceFactory;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    use super::*;
    use crate::domain::auth::Role;
    use crate::inbound::http::ApiResult;
    use crate::inbound::http::session::SessionContext;
    use crate::inbound::http::test_utils::{claims_for, session_cookie, test_session_middleware};

    async fn start_session(
        session: SessionContext,
        role: web::Path<String>,
    ) -> ApiResult<HttpResponse> {
        let role = match role.as_str() {
            "admin" => Role::Admin,
            _ => Role::Sales,
        };
        session.sign_in(&claims_for(role))?;
        Ok(HttpResponse::NoContent().finish())
    }

    fn gate_app() -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<EitherBody<BoxBody>>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        // The sign-in helper sits under /api so the gate leaves it alone.
        App::new()
            .wrap(AccessGate)
            .wrap(test_session_middleware())
            .route("/api/test/session/{role}", web::post().to(start_session))
            .default_service(web::to(|| async { HttpResponse::Ok().finish() }))
    }

    async fn cookie_for(
        app: &impl Service<
            actix_http::Request,
            Response = ServiceResponse<EitherBody<BoxBody>>,
            Error = actix_web::Error,
        >,
        role: &str,
    ) -> actix_web::cookie::Cookie<'static> {
        let res = test::call_service(
            app,
            test::TestRequest::post()
                .uri(&format!("/api/test/session/{role}"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        session_cookie(&res)
    }

    fn location_of<B>(res: &ServiceResponse<B>) -> &str {
        res.headers()
            .get(header::LOCATION)
            .expect("redirect location")
            .to_str()
            .expect("ascii location")
    }

    #[rstest]
    #[case("/")]
    #[case("/admin")]
    #[case("/sales/overview")]
    #[case("/profile")]
    #[actix_web::test]
    async fn anonymous_page_requests_redirect_to_user_sign_in(#[case] path: &str) {
        let app = test::init_service(gate_app()).await;
        let res = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location_of(&res), "/signin/user");
    }

    #[rstest]
    #[case("/signin/user")]
    #[case("/signin/admin")]
    #[actix_web::test]
    async fn anonymous_visitors_reach_the_sign_in_pages(#[case] path: &str) {
        let app = test::init_service(gate_app()).await;
        let res = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[rstest]
    #[case("/api/v1/clients")]
    #[case("/health/live")]
    #[case("/docs")]
    #[case("/favicon.ico")]
    #[actix_web::test]
    async fn exempt_surfaces_bypass_the_gate(#[case] path: &str) {
        let app = test::init_service(gate_app()).await;
        let res = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[rstest]
    #[case("/admin")]
    #[case("/admin/member/3")]
    #[actix_web::test]
    async fn admin_sessions_reach_admin_pages(#[case] path: &str) {
        let app = test::init_service(gate_app()).await;
        let cookie = cookie_for(&app, "admin").await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri(path).cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[rstest]
    #[case("/sales/overview")]
    #[case("/signin/admin")]
    #[case("/")]
    #[actix_web::test]
    async fn admin_sessions_are_sent_home_from_everything_else(#[case] path: &str) {
        let app = test::init_service(gate_app()).await;
        let cookie = cookie_for(&app, "admin").await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri(path).cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location_of(&res), "/admin");
    }

    #[rstest]
    #[case("/sales/overview")]
    #[case("/sales/leads")]
    #[case("/sales/leads/42")]
    #[actix_web::test]
    async fn sales_sessions_reach_allow_listed_pages(#[case] path: &str) {
        let app = test::init_service(gate_app()).await;
        let cookie = cookie_for(&app, "sales").await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri(path).cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[rstest]
    #[case("/admin")]
    #[case("/sales/profile")]
    #[case("/signin/user")]
    #[actix_web::test]
    async fn sales_sessions_are_sent_home_from_everything_else(#[case] path: &str) {
        let app = test::init_service(gate_app()).await;
        let cookie = cookie_for(&app, "sales").await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri(path).cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location_of(&res), "/sales/overview");
    }

    #[actix_web::test]
    async fn garbage_cookies_degrade_to_the_signed_out_flow() {
        let app = test::init_service(gate_app()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/admin")
                .cookie(actix_web::cookie::Cookie::new("session", "garbage"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location_of(&res), "/signin/user");
    }
}
