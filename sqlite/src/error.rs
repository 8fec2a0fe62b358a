//! Error types for the SQLite backend.

use thiserror::Error;

/// Errors that can occur while migrating a SQLite database.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite database operation failure.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// The migration engine rejected or failed the run.
    #[error("migration error: {0}")]
    MigrationError(#[from] schema_ledger_db::MigrateError),
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;
