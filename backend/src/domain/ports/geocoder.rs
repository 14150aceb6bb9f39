//! Driven port for forward geocoding of client addresses.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::client::Coordinates;

define_port_error! {
    /// Errors raised by [`Geocoder`] adapters.
    pub enum GeocoderError {
        /// The provider could not be reached.
        #[error("geocoding transport failed: {message}")]
        Transport { message: String },
        /// The provider answered with something unexpected.
        #[error("geocoding response malformed: {message}")]
        MalformedResponse { message: String },
    }
}

/// Resolves a free-text address to coordinates.
///
/// `Ok(None)` means the provider answered but found nothing; only
/// transport and decoding failures surface as errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Looks up `door_number` and `street_address` as one query.
    async fn geocode(
        &self,
        door_number: &str,
        street_address: &str,
    ) -> Result<Option<Coordinates>, GeocoderError>;
}

/// Geocoder that never finds anything, for tests that wire the port
/// without exercising it.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureGeocoder;

#[async_trait]
impl Geocoder for FixtureGeocoder {
    async fn geocode(
        &self,
        _door_number: &str,
        _street_address: &str,
    ) -> Result<Option<Coordinates>, GeocoderError> {
        Ok(None)
    }
}
