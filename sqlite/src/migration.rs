//! Migration runs against a SQLite database.
//!
//! [`migrate`] applies a list of migrations inside one transaction: either
//! every pending migration is applied and recorded, or the database is left
//! exactly as it was. [`Ledger`] bundles a connection with a shared
//! [`Migrator`] for callers that run several operations on one database.
//!
//! # Example
//!
//! ```no_run
//! use schema_ledger_db::MigrationSet;
//! use schema_ledger_sqlite::Ledger;
//!
//! let mut ledger = Ledger::open("app.db").unwrap();
//! let set = MigrationSet::load("migrations.yml").unwrap();
//!
//! let report = ledger.apply(&set.for_dialect(ledger.dialect())).unwrap();
//! println!("applied {:?}", report.applied);
//!
//! for entry in ledger.history().unwrap() {
//!     println!("{} {} {}", entry.group, entry.version, entry.status);
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use rusqlite::{Connection, TransactionBehavior};
use schema_ledger_db::{
    ApplyReport, Dialect, Migration, MigrationStatusEntry, Migrator, PlannedMigration,
};
use tracing::warn;

use crate::error::Result;
use crate::executor::SqliteExecutor;

/// Dialect used for SQLite. Its `?` placeholders are what SQLite expects.
pub const SQLITE_DIALECT: Dialect = Dialect::MySql;

/// Opens a database file with foreign key enforcement turned on.
pub fn open(path: impl AsRef<Path>) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}

/// Applies `migrations` inside a single transaction.
///
/// The transaction is opened `IMMEDIATE`, so a second process migrating the
/// same file waits for this run to commit instead of reading stale history.
/// Commits when every pending migration succeeded. On any error the
/// transaction is rolled back, including the history rows written so far,
/// so no `failed` row survives. Use [`Ledger::apply_autocommit`] to keep it.
///
/// # Errors
///
/// Returns [`SqliteError::MigrationError`](crate::SqliteError::MigrationError)
/// for engine failures and
/// [`SqliteError::DatabaseError`](crate::SqliteError::DatabaseError) if the
/// transaction cannot be opened or committed.
pub fn migrate(
    conn: &mut Connection,
    migrator: &Migrator,
    migrations: &[Migration],
) -> Result<ApplyReport> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let result = migrator.apply(&SqliteExecutor::new(&tx), migrations);
    match result {
        Ok(report) => {
            tx.commit()?;
            Ok(report)
        }
        Err(e) => {
            warn!(error = %e, "Rolling back migration run");
            tx.rollback()?;
            Err(e.into())
        }
    }
}

/// A SQLite connection paired with a [`Migrator`].
///
/// # Examples
///
/// ```
/// use schema_ledger_db::Migration;
/// use schema_ledger_sqlite::Ledger;
///
/// let mut ledger = Ledger::open_in_memory().unwrap();
/// let migrations = [Migration::new("app", 0, "app.sql", ["CREATE TABLE t (id INTEGER)"])];
///
/// assert_eq!(ledger.apply(&migrations).unwrap().applied.len(), 1);
/// assert!(ledger.apply(&migrations).unwrap().applied.is_empty());
/// assert_eq!(ledger.history().unwrap().len(), 1);
/// ```
pub struct Ledger {
    conn: Connection,
    migrator: Arc<Migrator>,
}

impl Ledger {
    /// Wraps `conn` with a migrator of its own.
    pub fn new(conn: Connection) -> Result<Self> {
        let migrator = Migrator::new(SQLITE_DIALECT)?;
        Ok(Self::with_migrator(conn, Arc::new(migrator)))
    }

    /// Wraps `conn` with a shared migrator, so runs through other ledgers
    /// holding the same migrator are serialized with this one.
    pub fn with_migrator(conn: Connection, migrator: Arc<Migrator>) -> Self {
        Self { conn, migrator }
    }

    /// Opens a database file; see [`open`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::new(Connection::open_in_memory()?)
    }

    pub fn dialect(&self) -> Dialect {
        self.migrator.dialect()
    }

    /// Applies `migrations` atomically; see [`migrate`].
    pub fn apply(&mut self, migrations: &[Migration]) -> Result<ApplyReport> {
        migrate(&mut self.conn, &self.migrator, migrations)
    }

    /// Applies `migrations` without a surrounding transaction.
    ///
    /// Every statement commits on its own. A failing migration leaves its
    /// `failed` history row behind, as do the migrations applied before it.
    pub fn apply_autocommit(&self, migrations: &[Migration]) -> Result<ApplyReport> {
        Ok(self.migrator.apply(&self.executor(), migrations)?)
    }

    /// Returns the recorded history, ordered by group and version.
    pub fn history(&self) -> Result<Vec<MigrationStatusEntry>> {
        Ok(self.migrator.history(&self.executor())?)
    }

    /// Compares `migrations` with the recorded history.
    pub fn status(&self, migrations: &[Migration]) -> Result<Vec<PlannedMigration>> {
        Ok(self.migrator.status(&self.executor(), migrations)?)
    }

    pub fn executor(&self) -> SqliteExecutor<'_> {
        SqliteExecutor::new(&self.conn)
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Consumes the ledger and returns the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }
}
