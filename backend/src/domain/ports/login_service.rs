//! Driving port for credential verification.

use async_trait::async_trait;

use crate::domain::auth::{AuthenticatedUser, Credentials, Role, SignInPortal};
use crate::domain::error::Error;

/// Uniform rejection message for failed sign-ins.
///
/// The same text covers unknown usernames, wrong passwords, and portal
/// mismatches so responses do not reveal which part failed.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "invalid username or password";

/// Verifies credentials against one sign-in portal.
///
/// The admin portal only ever yields administrators and the user portal
/// only ever yields sales members; a valid account presented to the wrong
/// portal is rejected exactly like a bad password.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Resolves credentials to an authenticated user or a domain error.
    async fn authenticate(
        &self,
        portal: SignInPortal,
        credentials: &Credentials,
    ) -> Result<AuthenticatedUser, Error>;
}

/// Canned accounts for tests: `admin`/`password` on the admin portal and
/// `asmith`/`password` on the user portal.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(
        &self,
        portal: SignInPortal,
        credentials: &Credentials,
    ) -> Result<AuthenticatedUser, Error> {
        let known = match portal {
            SignInPortal::Admin => AuthenticatedUser {
                id: 1,
                role: Role::Admin,
                username: "admin".to_owned(),
                display_name: "Administrator".to_owned(),
            },
            SignInPortal::User => AuthenticatedUser {
                id: 7,
                role: Role::Sales,
                username: "asmith".to_owned(),
                display_name: "Anita Smith".to_owned(),
            },
        };
        if credentials.username() == known.username && credentials.password() == "password" {
            Ok(known)
        } else {
            Err(Error::unauthorized(INVALID_CREDENTIALS_MESSAGE))
        }
    }
}
