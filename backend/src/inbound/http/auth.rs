//! Authentication API handlers.
//!
//! ```text
//! POST /api/v1/signin  {"username":"asmith","password":"secret","portal":"user"}
//! POST /api/v1/signout
//! ```
//!
//! Sign-in writes the claims into the cookie session; sign-out purges the
//! session unconditionally so it is safe to call signed out.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::auth::{
    Credentials, CredentialsValidationError, SessionClaims, SignInPortal,
};
use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Sign-in request body for `POST /api/v1/signin`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
    /// Which portal the caller is signing in through.
    #[schema(value_type = crate::inbound::http::schemas::SignInPortalSchema)]
    pub portal: SignInPortal,
}

/// Claims echoed back after a successful sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClaimsResponse {
    pub user_id: i32,
    /// Role as its integer team code: `0` admin, `1` sales.
    pub role: i32,
    pub username: String,
    pub display_name: String,
}

impl From<SessionClaims> for ClaimsResponse {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.user_id,
            role: claims.role.code(),
            username: claims.username,
            display_name: claims.display_name,
        }
    }
}

fn map_credentials_validation_error(err: CredentialsValidationError) -> Error {
    let code = match err {
        CredentialsValidationError::EmptyUsername => "empty_username",
        CredentialsValidationError::PasswordTooShort => "password_too_short",
        CredentialsValidationError::PasswordTooLong => "password_too_long",
    };
    let field = match err {
        CredentialsValidationError::EmptyUsername => "username",
        _ => "password",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

/// Verify credentials against the requested portal and open a session.
#[utoipa::path(
    post,
    path = "/api/v1/signin",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = ClaimsResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 401, description = "Invalid credentials", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 503, description = "Directory unavailable", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "signIn",
    security([])
)]
#[post("/signin")]
pub async fn sign_in(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SignInRequest>,
) -> ApiResult<HttpResponse> {
    let SignInRequest {
        username,
        password,
        portal,
    } = payload.into_inner();
    let credentials = Credentials::try_from_parts(&username, &password)
        .map_err(map_credentials_validation_error)?;

    let user = state.login.authenticate(portal, &credentials).await?;
    let claims = user.into_claims();
    session.sign_in(&claims)?;
    Ok(HttpResponse::Ok().json(ClaimsResponse::from(claims)))
}

/// Close the caller's session, expiring the cookie.
#[utoipa::path(
    post,
    path = "/api/v1/signout",
    responses(
        (status = 204, description = "Signed out")
    ),
    tags = ["auth"],
    operation_id = "signOut",
    security([])
)]
#[post("/signout")]
pub async fn sign_out(session: SessionContext) -> HttpResponse {
    session.sign_out();
    HttpResponse::NoContent().finish()
}
