//! Reqwest-backed Google geocoding adapter.
//!
//! This adapter owns transport details only: query composition, timeout
//! and HTTP error mapping, and JSON decoding into coordinates. Provider
//! statuses other than `OK` and `ZERO_RESULTS` read as malformed
//! responses because the port has nothing more precise to say about a
//! misconfigured key or an exhausted quota.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::dto::GeocodeResponseDto;
use crate::domain::client::Coordinates;
use crate::domain::ports::{Geocoder, GeocoderError};

/// Documented endpoint of the Google Geocoding API; overridable so tests
/// and proxies can point the adapter elsewhere.
pub const DEFAULT_GOOGLE_GEOCODING_ENDPOINT: &str =
    "https://maps.googleapis.com/maps/api/geocode/json";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Geocoder adapter that performs HTTP GET requests against one endpoint.
pub struct GoogleGeocoder {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl GoogleGeocoder {
    /// Build an adapter using a reqwest client with a ten-second request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(api_key: impl Into<String>, endpoint: Url) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(DEFAULT_REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
        })
    }
}

/// Join the door number and street into one provider query, skipping the
/// door number when it is blank.
fn compose_query(door_number: &str, street_address: &str) -> String {
    let door = door_number.trim();
    let street = street_address.trim();
    if door.is_empty() {
        street.to_owned()
    } else {
        format!("{door}, {street}")
    }
}

fn map_transport_error(error: reqwest::Error) -> GeocoderError {
    // The request URL carries the API key; strip it before the message
    // escapes into logs or responses.
    GeocoderError::transport(error.without_url().to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> GeocoderError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    };
    GeocoderError::transport(message)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 120;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        let preview: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
        format!("{preview}...")
    } else {
        compact
    }
}

fn decode_response(body: &[u8]) -> Result<Option<Coordinates>, GeocoderError> {
    let decoded: GeocodeResponseDto = serde_json::from_slice(body).map_err(|error| {
        GeocoderError::malformed_response(format!("invalid geocoding JSON payload: {error}"))
    })?;
    match decoded.status.as_str() {
        "OK" => {
            let first = decoded
                .results
                .first()
                .ok_or_else(|| GeocoderError::malformed_response("status OK with no results"))?;
            Ok(Some(Coordinates {
                lat: first.geometry.location.lat,
                lng: first.geometry.location.lng,
            }))
        }
        "ZERO_RESULTS" => Ok(None),
        status => Err(GeocoderError::malformed_response(
            match decoded.error_message {
                Some(message) => format!("provider status {status}: {message}"),
                None => format!("provider status {status}"),
            },
        )),
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(
        &self,
        door_number: &str,
        street_address: &str,
    ) -> Result<Option<Coordinates>, GeocoderError> {
        let query = compose_query(door_number, street_address);
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("address", query.as_str()), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        decode_response(body.as_ref())
    }
}
