//! Diesel-backed `LoginService` over the two directory tables.
//!
//! The admin portal reads `admins`, the user portal reads `members`; a
//! known account presented to the wrong portal misses its table and is
//! rejected exactly like a bad password. Infrastructure failures map to
//! domain errors here because this is a driving port: handlers pass its
//! errors straight through.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::error;
use zeroize::Zeroizing;

use crate::domain::auth::{AuthenticatedUser, Credentials, Role, SignInPortal};
use crate::domain::error::Error;
use crate::domain::ports::{INVALID_CREDENTIALS_MESSAGE, LoginService};

use super::models::{AdminLoginRow, MemberLoginRow};
use super::pool::{DbPool, PoolError};
use super::schema::{admins, members};

const LOOKUP_UNAVAILABLE_MESSAGE: &str = "sign-in is temporarily unavailable";

/// Diesel-backed implementation of the `LoginService` port.
#[derive(Clone)]
pub struct DieselLoginService {
    pool: DbPool,
}

impl DieselLoginService {
    /// Create a new service with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_lookup_pool_error(err: PoolError) -> Error {
    error!(error = %err, "credential lookup could not reach the store");
    Error::service_unavailable(LOOKUP_UNAVAILABLE_MESSAGE)
}

fn map_lookup_diesel_error(err: diesel::result::Error) -> Error {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    error!(error = %err, "credential lookup failed");
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            Error::service_unavailable(LOOKUP_UNAVAILABLE_MESSAGE)
        }
        _ => Error::internal("credential lookup failed"),
    }
}

/// Directory identity plus the stored credential to compare against.
struct DirectoryHit {
    user: AuthenticatedUser,
    stored_password: Zeroizing<String>,
}

#[async_trait]
impl LoginService for DieselLoginService {
    async fn authenticate(
        &self,
        portal: SignInPortal,
        credentials: &Credentials,
    ) -> Result<AuthenticatedUser, Error> {
        let mut conn = self.pool.get().await.map_err(map_lookup_pool_error)?;

        let hit = match portal {
            SignInPortal::Admin => {
                let row: Option<AdminLoginRow> = admins::table
                    .filter(admins::username.eq(credentials.username()))
                    .select(AdminLoginRow::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(map_lookup_diesel_error)?;
                row.map(|row| DirectoryHit {
                    user: AuthenticatedUser {
                        id: row.id,
                        role: Role::Admin,
                        username: row.username,
                        display_name: row.name,
                    },
                    stored_password: Zeroizing::new(row.password),
                })
            }
            SignInPortal::User => {
                let row: Option<MemberLoginRow> = members::table
                    .filter(members::username.eq(credentials.username()))
                    .select(MemberLoginRow::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(map_lookup_diesel_error)?;
                row.map(|row| DirectoryHit {
                    user: AuthenticatedUser {
                        id: row.id,
                        role: Role::Sales,
                        username: row.username,
                        display_name: format!("{} {}", row.firstname, row.lastname),
                    },
                    stored_password: Zeroizing::new(row.password),
                })
            }
        };

        let Some(hit) = hit else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS_MESSAGE));
        };
        if hit.stored_password.as_str() != credentials.password() {
            return Err(Error::unauthorized(INVALID_CREDENTIALS_MESSAGE));
        }
        Ok(hit.user)
    }
}
