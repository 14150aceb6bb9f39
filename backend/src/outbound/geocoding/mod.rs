//! Geocoding outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `Geocoder`
//! port against the Google Maps Geocoding API.

mod dto;
mod google;

pub use google::{DEFAULT_GOOGLE_GEOCODING_ENDPOINT, GoogleGeocoder};
