//! Dependency wiring for the HTTP surface.
//!
//! Handlers receive [`HttpState`] through `actix_web::web::Data`, so they
//! see domain services and ports only and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    ClientRepository, FixtureClientRepository, FixtureGeocoder, FixtureLoginService,
    FixtureMemberRepository, Geocoder, LoginService, MemberRepository,
};
use crate::domain::{ClientService, MemberService};

/// Parameter object bundling the port implementations behind the API.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub clients: Arc<dyn ClientRepository>,
    pub members: Arc<dyn MemberRepository>,
    pub geocoder: Arc<dyn Geocoder>,
}

impl Default for HttpStatePorts {
    /// Fixture-backed bundle for tests that exercise routing and session
    /// plumbing rather than storage.
    fn default() -> Self {
        Self {
            login: Arc::new(FixtureLoginService),
            clients: Arc::new(FixtureClientRepository),
            members: Arc::new(FixtureMemberRepository),
            geocoder: Arc::new(FixtureGeocoder),
        }
    }
}

/// Services and ports the handlers pull their work through.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub clients: ClientService,
    pub members: MemberService,
    pub geocoder: Arc<dyn Geocoder>,
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```
    /// use crm_backend::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// let state = HttpState::new(HttpStatePorts::default());
    /// let _login = state.login.clone();
    /// ```
    #[must_use]
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            clients,
            members,
            geocoder,
        } = ports;
        Self {
            login,
            clients: ClientService::new(clients),
            members: MemberService::new(members),
            geocoder,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
