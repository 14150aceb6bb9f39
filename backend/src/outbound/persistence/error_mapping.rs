//! Shared mapping from pool and Diesel failures onto port errors.
//!
//! Every repository port distinguishes connection loss from query
//! failure; this module folds the infrastructure error types into that
//! split once so the adapters stay on their queries. Messages are kept
//! generic here, SQL details go to the debug log only.

use tracing::debug;

use crate::domain::ports::{ClientRepositoryError, MemberRepositoryError};

use super::pool::PoolError;

/// Port error types with a connection/query split.
pub(crate) trait StoreError: Sized {
    fn connection_failure(message: String) -> Self;
    fn query_failure(message: String) -> Self;
}

impl StoreError for ClientRepositoryError {
    fn connection_failure(message: String) -> Self {
        Self::connection(message)
    }

    fn query_failure(message: String) -> Self {
        Self::query(message)
    }
}

impl StoreError for MemberRepositoryError {
    fn connection_failure(message: String) -> Self {
        Self::connection(message)
    }

    fn query_failure(message: String) -> Self {
        Self::query(message)
    }
}

/// Pool failures always read as the store being unreachable.
pub(crate) fn map_pool_error<E: StoreError>(error: PoolError) -> E {
    match error {
        PoolError::Checkout(message) | PoolError::Build(message) => {
            E::connection_failure(message)
        }
    }
}

/// Classify a Diesel error as connection loss or query failure.
pub(crate) fn map_diesel_error<E: StoreError>(error: diesel::result::Error) -> E {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            E::connection_failure("database connection error".to_string())
        }
        DieselError::DatabaseError(..) => E::query_failure("database error".to_string()),
        other => E::query_failure(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    use super::*;

    #[test]
    fn pool_failures_map_to_connection_errors() {
        let mapped: ClientRepositoryError = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(mapped, ClientRepositoryError::connection("timed out"));
    }

    #[test]
    fn closed_connections_map_to_connection_errors() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("server closed the connection".to_string()),
        );
        let mapped: MemberRepositoryError = map_diesel_error(error);
        assert!(matches!(mapped, MemberRepositoryError::Connection { .. }));
    }

    #[test]
    fn other_database_errors_map_to_query_errors_without_sql_details() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::CheckViolation,
            Box::new("value violates check constraint \"secret\"".to_string()),
        );
        let mapped: ClientRepositoryError = map_diesel_error(error);
        assert_eq!(mapped, ClientRepositoryError::query("database error"));
    }
}
