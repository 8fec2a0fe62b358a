//! Relational DDL model and its canonical text form.
//!
//! This crate defines the in-memory description of SQL tables and the
//! operations on it:
//!
//! - [`Table`], [`Column`], [`ForeignKeyConstraint`], [`Key`]: table
//!   definitions with a closed set of [`DataType`]s.
//! - [`AlterStatement`]: ADD/DROP COLUMN and ADD/DROP INDEX, applied to a
//!   [`Table`] in place.
//! - Validation ([`validate_table`], [`Table::validate`]) of identifiers,
//!   comments and key references.
//! - [`normalize`]: a deterministic rendering used for hashing and
//!   round-trip checks.
//! - [`parse()`]: a reader for the DDL the crate emits.
//! - [`Table::to_sql`]: executable DDL for a [`Dialect`].
//!
//! # Example
//!
//! ```
//! use schema_ledger_core::*;
//!
//! let mut users = Table::new("users")
//!     .with_column(Column::new("id", DataType::BigInt))
//!     .with_column(Column::new("email", DataType::Varchar(255)).unique())
//!     .with_primary_key(["id"]);
//! assert!(validate_table(&users).is_empty());
//!
//! AlterStatement::add_column_after("users", Column::new("name", DataType::Text).nullable(), "id")
//!     .apply_to(&mut users)
//!     .unwrap();
//!
//! let canonical = normalize::table(&users);
//! let reread = parse(&canonical).unwrap();
//! assert_eq!(normalize::tables(&reread.tables), canonical);
//! ```

mod alter;
mod dialect;
pub mod normalize;
mod parse;
mod render;
mod types;
mod validate;

pub use alter::{
    AddColumn, AddIndex, AlterError, AlterStatement, DropColumn, DropIndex, apply_alterations,
};
pub use dialect::{Dialect, UnknownDialect};
pub use parse::{ParseError, parse};
pub use render::{MYSQL_TABLE_OPTIONS, RenderError};
pub use types::*;
pub use validate::{
    ColumnError, MAX_COMMENT_LEN, MAX_IDENTIFIER_LEN, ValidationError, is_safe_identifier,
    validate_column, validate_table,
};
