//! Embedded schema migrations applied at startup.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying schema migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationsError {
    /// The migration connection could not be opened.
    #[error("failed to connect for migrations: {message}")]
    Connect { message: String },
    /// A migration failed to apply.
    #[error("failed to apply migrations: {message}")]
    Apply { message: String },
}

/// Run all pending migrations over a blocking connection.
///
/// Runs before the async pool exists, so it opens its own short-lived
/// synchronous connection. Callers on an async runtime should move this
/// onto a blocking thread.
///
/// # Errors
/// Returns [`MigrationsError`] when connecting or applying fails.
pub fn run_pending_migrations(database_url: &str) -> Result<usize, MigrationsError> {
    let mut conn = PgConnection::establish(database_url).map_err(|err| {
        MigrationsError::Connect {
            message: err.to_string(),
        }
    })?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationsError::Apply {
            message: err.to_string(),
        })?;
    Ok(applied.len())
}
