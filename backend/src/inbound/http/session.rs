//! Domain-facing view of the cookie session.
//!
//! Handlers never touch `actix_session` directly; [`SessionContext`] turns
//! the raw cookie into [`SessionClaims`] and enforces the sign-in and role
//! checks. Reads are deliberately lenient: a cookie that fails to decode is
//! treated as no session at all, so a tampered or stale cookie degrades to
//! the signed-out flow.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::Error;
use crate::domain::auth::{Role, SessionClaims};

pub(crate) const CLAIMS_KEY: &str = "claims";

/// Reads claims from a raw session, treating decode failures as absence.
pub(crate) fn peek_claims(session: &Session) -> Option<SessionClaims> {
    match session.get::<SessionClaims>(CLAIMS_KEY) {
        Ok(claims) => claims,
        Err(error) => {
            tracing::warn!(%error, "unreadable claims in session cookie");
            None
        }
    }
}

/// Session operations phrased in domain terms.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wraps the raw Actix session.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Current claims, if a readable session is present.
    #[must_use]
    pub fn claims(&self) -> Option<SessionClaims> {
        peek_claims(&self.0)
    }

    /// Require a signed-in caller or return `401 Unauthorized`.
    pub fn require_claims(&self) -> Result<SessionClaims, Error> {
        self.claims()
            .ok_or_else(|| Error::unauthorized("sign in required"))
    }

    /// Require a signed-in caller holding `role` or return `403 Forbidden`.
    pub fn require_role(&self, role: Role) -> Result<SessionClaims, Error> {
        let claims = self.require_claims()?;
        if claims.role == role {
            Ok(claims)
        } else {
            let needed = match role {
                Role::Admin => "administrator access required",
                Role::Sales => "sales access required",
            };
            Err(Error::forbidden(needed))
        }
    }

    /// Store claims for a fresh sign-in, rotating the session id.
    pub fn sign_in(&self, claims: &SessionClaims) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(CLAIMS_KEY, claims)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Drop the session and expire its cookie.
    pub fn sign_out(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = Session::from_request(req, payload);
        Box::pin(async move { Ok(Self::new(session.await?)) })
    }
}
