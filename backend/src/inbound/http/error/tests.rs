//! Coverage for the HTTP rendering of domain errors.

use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::rstest;
use serde_json::json;

use super::*;
use crate::domain::Error;

const FIXED_TRACE: &str = "00000000-0000-0000-0000-000000000000";

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("sign in required"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("taken"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn each_code_renders_its_status(#[case] err: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&err), status);
}

async fn decode_error_response(error: Error, status: StatusCode, trace: Option<&str>) -> Error {
    let response = ResponseError::error_response(&error);
    assert_eq!(response.status(), status);

    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .map(|value| value.to_str().expect("ascii header").to_owned());
    assert_eq!(header.as_deref(), trace);

    let bytes = to_bytes(response.into_body()).await.expect("body read");
    serde_json::from_slice(&bytes).expect("error JSON decodes")
}

#[actix_web::test]
async fn internal_errors_are_redacted_but_keep_their_trace_id() {
    let error = Error::internal("pool exhausted")
        .with_trace_id(FIXED_TRACE)
        .with_details(json!({"secret": "x"}));

    let redacted =
        decode_error_response(error, StatusCode::INTERNAL_SERVER_ERROR, Some(FIXED_TRACE)).await;
    assert_eq!(redacted.code(), ErrorCode::InternalError);
    assert_eq!(redacted.message(), "Internal server error");
    assert!(redacted.details().is_none());
}

#[actix_web::test]
async fn client_errors_keep_their_message_and_details() {
    let error = Error::invalid_request("bad")
        .with_trace_id(FIXED_TRACE)
        .with_details(json!({"field": "name"}));

    let payload = decode_error_response(error, StatusCode::BAD_REQUEST, Some(FIXED_TRACE)).await;
    assert_eq!(payload.code(), ErrorCode::InvalidRequest);
    assert_eq!(payload.message(), "bad");
    assert_eq!(payload.details(), Some(&json!({"field": "name"})));
}

#[actix_web::test]
async fn error_without_trace_id_omits_the_header() {
    let error = Error::conflict("username taken");

    let payload = decode_error_response(error, StatusCode::CONFLICT, None).await;
    assert_eq!(payload.code(), ErrorCode::Conflict);
    assert_eq!(payload.trace_id(), None);
}

#[test]
fn framework_errors_collapse_to_a_redacted_internal_error() {
    let err = Error::from(actix_web::error::ErrorBadRequest("boom"));

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
    assert!(err.trace_id().is_none());
    assert!(err.details().is_none());
}
