//! Forward geocoding HTTP handler.
//!
//! Thin pass-through to the geocoding port so the address form can offer
//! coordinates before they are written to a client's address.

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::client::Coordinates;
use crate::domain::ports::GeocoderError;
use crate::domain::{Error, auth::Role};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Request payload naming the address to resolve.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeRequest {
    #[serde(default)]
    pub door_number: String,
    pub address: String,
}

/// A resolved coordinate pair.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResponse {
    pub lat: f64,
    pub lng: f64,
}

fn map_geocoder_error(err: GeocoderError) -> Error {
    tracing::error!(error = %err, "geocoding failure");
    match err {
        GeocoderError::Transport { .. } => {
            Error::service_unavailable("geocoding is temporarily unavailable")
        }
        GeocoderError::MalformedResponse { .. } => Error::internal("geocoding failed"),
    }
}

/// Resolve a free-text address to coordinates.
#[utoipa::path(
    post,
    path = "/api/v1/geocode",
    request_body = GeocodeRequest,
    responses(
        (status = 200, description = "Resolved coordinates", body = GeocodeResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Address did not resolve", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["geocode"],
    operation_id = "geocodeAddress",
    security(("SessionCookie" = []))
)]
#[post("/geocode")]
pub async fn geocode(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<GeocodeRequest>,
) -> ApiResult<web::Json<GeocodeResponse>> {
    session.require_role(Role::Sales)?;
    if payload.address.trim().is_empty() {
        return Err(Error::invalid_request("address must not be empty")
            .with_details(json!({ "field": "address", "code": "empty_address" })));
    }

    let found = state
        .geocoder
        .geocode(&payload.door_number, &payload.address)
        .await
        .map_err(map_geocoder_error)?;
    let Coordinates { lat, lng } =
        found.ok_or_else(|| Error::not_found("no coordinates found for that address"))?;
    Ok(web::Json(GeocodeResponse { lat, lng }))
}
