//! SQLite backend for the schema-ledger migration engine.
//!
//! This crate implements [`Executor`](schema_ledger_db::Executor) over
//! rusqlite and adds transactional migration runs.
//!
//! # Architecture
//!
//! - **`executor`**: [`SqliteExecutor`], value mapping between the engine and
//!   SQLite
//! - **`migration`**: [`migrate`] and the [`Ledger`] convenience wrapper
//!
//! # Quick start
//!
//! ```no_run
//! use schema_ledger_db::{Migration, Migrator};
//! use schema_ledger_sqlite::{SQLITE_DIALECT, migrate, open};
//!
//! let mut conn = open("app.db").unwrap();
//! let migrator = Migrator::new(SQLITE_DIALECT).unwrap();
//! let migrations = [Migration::new("app", 0, "app.sql", [
//!     "CREATE TABLE account (id INTEGER PRIMARY KEY, email TEXT NOT NULL)",
//! ])];
//!
//! let report = migrate(&mut conn, &migrator, &migrations).unwrap();
//! println!("applied {} migrations", report.applied.len());
//! ```

mod error;
mod executor;
mod migration;

pub use error::{Result, SqliteError};
pub use executor::SqliteExecutor;
pub use migration::{Ledger, SQLITE_DIALECT, migrate, open};
