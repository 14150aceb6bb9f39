//! DTOs for decoding Google Geocoding API responses.
//!
//! The adapter decodes into these transport DTOs first, then maps the
//! first result into domain [`Coordinates`]
//! (`crate::domain::client::Coordinates`) in one pass.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct GeocodeResponseDto {
    pub(super) status: String,
    #[serde(default)]
    pub(super) error_message: Option<String>,
    #[serde(default)]
    pub(super) results: Vec<GeocodeResultDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GeocodeResultDto {
    pub(super) geometry: GeometryDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct GeometryDto {
    pub(super) location: LocationDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct LocationDto {
    pub(super) lat: f64,
    pub(super) lng: f64,
}
