//! Named-parameter statements and versioned schema migrations.
//!
//! This crate holds everything that talks to a database through the
//! [`Executor`] capability: compiling `:name` statements to a dialect's
//! positional form, detecting the server dialect, and applying migrations
//! while keeping a history ledger. Backends (see `schema-ledger-sqlite`)
//! only implement [`Executor`].
//!
//! # Quick start
//!
//! ```no_run
//! # fn connect() -> Box<dyn schema_ledger_db::Executor> { unimplemented!() }
//! use schema_ledger_db::{MigrationSet, Migrator, detect_dialect};
//!
//! let conn = connect();
//! let dialect = detect_dialect(&*conn).unwrap();
//!
//! let set = MigrationSet::load("migrations.yml").unwrap();
//! let migrator = Migrator::new(dialect).unwrap();
//! let report = migrator.apply(&*conn, &set.for_dialect(dialect)).unwrap();
//! println!("{} applied, {} up to date", report.applied.len(), report.skipped);
//! ```

mod config;
mod dialect;
mod error;
mod executor;
mod migration;
mod statement;

pub use config::{MigrationEntry, MigrationSet};
pub use dialect::detect_dialect;
pub use error::{MigrateError, Result, StatementError};
pub use executor::{BoxError, Executor, Row, Value, ValueError};
pub use migration::{
    ApplyReport, HISTORY_TABLE, Migration, MigrationState, MigrationStatus, MigrationStatusEntry,
    MigrationType, Migrator, PlannedMigration,
};
pub use schema_ledger_core::Dialect;
pub use statement::{DialectStatement, NamedStatement};
