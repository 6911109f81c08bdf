//! SQLite storage backend for the dealerdesk CRM.
//!
//! ```rust,no_run
//! use dealerdesk_core::RepositoryProvider;
//! use dealerdesk_storage_sqlite::SqliteRepositoryProvider;
//!
//! # async fn run() -> Result<(), dealerdesk_core::Error> {
//! let repositories = SqliteRepositoryProvider::connect("sqlite://dealerdesk.db?mode=rwc").await?;
//! repositories.migrate().await?;
//! # Ok(())
//! # }
//! ```
pub mod migrations;
pub mod repositories;

pub use repositories::SqliteRepositoryProvider;

use dealerdesk_core::{Error, error::StorageError};
use sqlx::error::ErrorKind;

/// Maps a driver error, logging it with `context`.
///
/// Integrity violations become [`StorageError::Constraint`]; everything else is
/// reported as a database failure without leaking driver details.
pub(crate) fn storage_error(context: &str, e: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db) = &e {
        match db.kind() {
            ErrorKind::UniqueViolation
            | ErrorKind::ForeignKeyViolation
            | ErrorKind::NotNullViolation
            | ErrorKind::CheckViolation => {
                tracing::warn!(error = %e, "{context}");
                return Error::Storage(StorageError::Constraint(format!(
                    "{context}: {}",
                    db.message()
                )));
            }
            _ => {}
        }
    }

    tracing::error!(error = %e, "{context}");
    Error::Storage(StorageError::Database(context.to_string()))
}
