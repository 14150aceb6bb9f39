//! Renders domain errors as HTTP responses.
//!
//! The domain error type knows nothing about HTTP; this adapter owns the
//! status mapping, echoes the correlation header, and redacts internal
//! messages before they reach a client.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Result alias handlers return; the error half renders itself through
/// [`ResponseError`].
pub type ApiResult<T> = Result<T, Error>;

fn http_status(error: &Error) -> StatusCode {
    match error.code() {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The payload a client may see. Internal errors are replaced wholesale,
/// keeping only the trace id; every other code passes through untouched.
fn client_facing(error: &Error) -> Error {
    match error.code() {
        ErrorCode::InternalError => {
            let replacement = Error::internal("Internal server error");
            match error.trace_id() {
                Some(id) => replacement.with_trace_id(id.to_owned()),
                None => replacement,
            }
        }
        _ => error.clone(),
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        http_status(self)
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(http_status(self));
        if let Some(id) = self.trace_id() {
            response.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        response.json(client_facing(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Framework failures never carry their own text to a client.
        error!(error = %err, "framework error replaced with redacted internal error");
        Error::internal("Internal server error")
    }
}

#[cfg(test)]
mod tests;
