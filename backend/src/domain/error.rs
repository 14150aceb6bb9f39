//! Failure vocabulary shared by every layer of the backend.
//!
//! [`Error`] is transport agnostic. Domain services raise it, outbound
//! adapters translate infrastructure faults into it through their port error
//! types, and the HTTP layer decides status codes and redaction when it
//! renders one.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::TraceId;

/// Machine-readable failure category a client can branch on without parsing
/// the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request payload or parameters fail validation.
    InvalidRequest,
    /// No authenticated session, or the credentials were rejected.
    Unauthorized,
    /// The session is authenticated but lacks the required role.
    Forbidden,
    /// No resource exists at the requested identifier.
    NotFound,
    /// Applying the request would break an invariant the server maintains.
    Conflict,
    /// A dependency is unreachable; the request may succeed on retry.
    ServiceUnavailable,
    /// A failure the server cannot attribute to the request.
    InternalError,
}

/// Error payload carried from the point of failure to the client.
///
/// Pairs a stable [`ErrorCode`] with a human-readable message, optional
/// structured details, and the trace identifier that was in scope when the
/// failure was raised.
///
/// # Examples
/// ```
/// use crm_backend::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("client 42 not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(alias = "trace_id")]
    trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Builds an error, capturing the trace identifier currently in scope so
    /// the payload correlates with the request logs on its own.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let trace_id = TraceId::current().map(|id| id.to_string());
        Self {
            code,
            message: message.into(),
            trace_id,
            details: None,
        }
    }

    /// The failure category.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// The text shown to a client.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Identifier of the request that raised the error, when one was in
    /// scope at construction or attached afterwards.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Structured payload accompanying the message, if any.
    #[must_use]
    pub const fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Overrides the captured trace identifier.
    #[must_use]
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    /// Attaches a structured payload describing the failure.
    ///
    /// # Examples
    /// ```
    /// use crm_backend::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("bad").with_details(json!({ "field": "number" }));
    /// assert!(err.details().is_some());
    /// ```
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Shorthand for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Shorthand for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Shorthand for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Shorthand for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Shorthand for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Shorthand for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Shorthand for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}
