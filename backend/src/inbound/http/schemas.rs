//! OpenAPI wrappers for framework-free domain types.
//!
//! The domain never derives `ToSchema`; these stand-in types register the
//! same wire shapes with utoipa from the adapter layer, keeping the
//! documentation concern out of `crate::domain`.

use utoipa::ToSchema;

/// Mirror of [`crate::domain::ErrorCode`] for the OpenAPI document.
///
/// Lists the failure categories error payloads carry.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request payload or parameters fail validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// No authenticated session, or the credentials were rejected.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The session is authenticated but lacks the required role.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// No resource exists at the requested identifier.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with an invariant the server maintains.
    #[schema(rename = "conflict")]
    Conflict,
    /// A backing service is unavailable; the request may be retried.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// A failure the server cannot attribute to the request.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// Mirror of [`crate::domain::Error`] for the OpenAPI document.
///
/// Documents the wire shape of every error response body.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// The failure category.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// The text shown to a client.
    #[schema(example = "client not found")]
    message: String,
    /// Identifier of the request that raised the error.
    #[schema(rename = "traceId", example = "00000000-0000-0000-0000-000000000000")]
    trace_id: Option<String>,
    /// Structured payload accompanying the message, if any.
    details: Option<serde_json::Value>,
}

/// Mirror of [`crate::domain::SignInPortal`] for the OpenAPI document.
///
/// The two sign-in surfaces; each only admits its own population.
#[derive(ToSchema)]
#[schema(as = crate::domain::SignInPortal)]
pub enum SignInPortalSchema {
    /// Administrator console sign-in.
    #[schema(rename = "admin")]
    Admin,
    /// Sales member sign-in.
    #[schema(rename = "user")]
    User,
}
