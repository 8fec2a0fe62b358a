//! Error types for statement compilation and migration.
//!
//! [`StatementError`] covers named-parameter statements. [`MigrateError`]
//! covers everything the engine can fail on, from I/O while loading a
//! migration set to a dirty history table.

use schema_ledger_core::Dialect;
use thiserror::Error;

use crate::executor::{BoxError, ValueError};
use crate::migration::MigrationStatus;

/// Errors raised by named-parameter statements.
#[derive(Debug, Error)]
pub enum StatementError {
    /// A placeholder is not declared, or a declared name is never used.
    #[error("parameter '{0}' is unmapped")]
    UnmappedParameter(String),

    /// Placeholder compilation for the dialect does not exist.
    #[error("placeholder compilation for {0} is not yet implemented")]
    UnsupportedDialect(Dialect),

    /// Number of arguments differs from the declared parameter list.
    #[error("expected {expected} arguments, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    /// The backend rejected the compiled statement.
    #[error("statement execution failed: {0}")]
    Execution(#[source] BoxError),
}

/// Errors raised by the migration engine.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A history statement could not be compiled or executed.
    #[error(transparent)]
    Statement(#[from] StatementError),

    /// A backend call outside of a migration failed.
    #[error("cannot {action}: {source}")]
    Database {
        action: &'static str,
        #[source]
        source: BoxError,
    },

    /// A history row could not be decoded.
    #[error("corrupt history row: {0}")]
    CorruptHistory(#[from] ValueError),

    /// The history contains a row that is not `success`.
    #[error(
        "migrations are dirty: {group} version {version} is {status}; needs manual fix"
    )]
    Dirty {
        group: String,
        version: i64,
        status: MigrationStatus,
    },

    /// An applied migration's statements have changed.
    #[error(
        "already applied migration {group} version {version} ({script}) has been modified: \
         checksum {actual} does not match {expected}"
    )]
    ChecksumMismatch {
        group: String,
        version: i64,
        script: String,
        expected: String,
        actual: String,
    },

    /// A migration is structurally unusable.
    #[error("invalid migration {group} version {version} ({script}): {reason}")]
    InvalidMigration {
        group: String,
        version: i64,
        script: String,
        reason: String,
    },

    /// Versions within a group are negative or not unique.
    #[error("invalid version {version} in group {group}: {reason}")]
    InvalidVersion {
        group: String,
        version: i64,
        reason: &'static str,
    },

    /// A migration statement failed. The history row is marked `failed`.
    #[error("failed to execute migration {group} version {version} ({script}): {source}")]
    Execution {
        group: String,
        version: i64,
        script: String,
        #[source]
        source: BoxError,
    },

    /// The server version banner matched no known dialect.
    #[error("cannot detect dialect from server version '{0}'")]
    UnknownServer(String),
}

impl MigrateError {
    pub(crate) fn database(action: &'static str) -> impl FnOnce(BoxError) -> Self {
        move |source| MigrateError::Database { action, source }
    }
}

/// Convenience alias for results with [`MigrateError`].
pub type Result<T> = std::result::Result<T, MigrateError>;
