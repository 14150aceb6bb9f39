//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports describe how the domain expects to talk to persistence and
//! external services; the driving login port lets inbound adapters
//! authenticate without importing infrastructure. Each port exposes
//! strongly typed errors so adapters map their failures into predictable
//! variants, and each ships a fixture implementation for tests that do not
//! exercise it.

pub(crate) mod macros;

mod client_repository;
mod geocoder;
mod login_service;
mod member_repository;

pub use client_repository::{
    ClientRepository, ClientRepositoryError, ContactRemoval, FixtureClientRepository,
};
pub use geocoder::{FixtureGeocoder, Geocoder, GeocoderError};
pub use login_service::{FixtureLoginService, INVALID_CREDENTIALS_MESSAGE, LoginService};
pub use member_repository::{FixtureMemberRepository, MemberRepository, MemberRepositoryError};

#[cfg(test)]
pub use client_repository::MockClientRepository;
#[cfg(test)]
pub use geocoder::MockGeocoder;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use member_repository::MockMemberRepository;

pub(crate) use macros::define_port_error;
