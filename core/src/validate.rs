//! Table and column validation.
//!
//! Validates structural invariants of table definitions, catching errors
//! such as unsafe identifiers, oversized comments, duplicate columns and
//! dangling key references before the definition is rendered or applied.
//!
//! # Examples
//!
//! ```
//! use schema_ledger_core::*;
//!
//! let table = Table::new("orders")
//!     .with_column(Column::new("id", DataType::BigInt))
//!     .with_primary_key(["id"]);
//! assert!(validate_table(&table).is_empty());
//!
//! // Invalid: primary key references a column that does not exist
//! let bad = Table::new("orders").with_primary_key(["id"]);
//! assert_eq!(
//!     validate_table(&bad),
//!     vec![ValidationError::MissingPrimaryKeyColumn {
//!         table: "orders".into(),
//!         column: "id".into(),
//!     }]
//! );
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::parse::is_default_value;
use crate::{Column, DataType, Table};

/// Maximum identifier length in bytes.
pub const MAX_IDENTIFIER_LEN: usize = 255;

/// Maximum comment length in bytes.
pub const MAX_COMMENT_LEN: usize = 1024;

/// Problems found in a single column definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnError {
    /// Column name violates the identifier grammar.
    #[error("column name '{0}' is not a valid identifier")]
    InvalidName(String),
    /// Column comment exceeds [`MAX_COMMENT_LEN`].
    #[error("column '{0}' comment is too long")]
    CommentTooLong(String),
    /// Enum kind without any values.
    #[error("column '{0}' declares an enum without values")]
    EmptyEnum(String),
    /// Sized kind declared with length zero.
    #[error("column '{0}' declares a zero length type")]
    ZeroLength(String),
    /// Default that is not a literal, a function call or a parenthesized
    /// expression.
    #[error("column '{0}' declares an unsupported default '{1}'")]
    InvalidDefault(String, String),
}

/// Table validation errors.
///
/// Each variant names the offending table and, where relevant, the column.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Table name violates the identifier grammar.
    #[error("table name '{0}' is not a valid identifier")]
    InvalidTableName(String),
    /// Table comment exceeds [`MAX_COMMENT_LEN`].
    #[error("table '{0}' comment is too long")]
    TableCommentTooLong(String),
    /// Two columns share a name.
    #[error("table '{table}': duplicate column '{column}'")]
    DuplicateColumn { table: String, column: String },
    /// A primary key entry names a column that does not exist.
    #[error("table '{table}': primary key '{column}' is not defined")]
    MissingPrimaryKeyColumn { table: String, column: String },
    /// An index targets a column that does not exist.
    #[error("table '{table}': index column '{column}' is not defined")]
    MissingIndexColumn { table: String, column: String },
    /// A foreign key originates from a column that does not exist.
    #[error("table '{table}': foreign key column '{column}' is not defined")]
    MissingForeignKeyColumn { table: String, column: String },
    /// A column failed its own validation.
    #[error("table '{table}': {source}")]
    Column {
        table: String,
        #[source]
        source: ColumnError,
    },
}

/// Returns `true` if `name` is 1–255 bytes of `[a-z0-9_-]`.
///
/// # Examples
///
/// ```
/// use schema_ledger_core::is_safe_identifier;
///
/// assert!(is_safe_identifier("user_accounts"));
/// assert!(is_safe_identifier("v2-archive"));
/// assert!(!is_safe_identifier("Users"));
/// assert!(!is_safe_identifier("drop;--"));
/// assert!(!is_safe_identifier(""));
/// ```
pub fn is_safe_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_IDENTIFIER_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

fn is_safe_comment(comment: Option<&str>) -> bool {
    comment.is_none_or(|c| c.len() <= MAX_COMMENT_LEN)
}

/// Validates a single column.
///
/// Returns the first problem found.
pub fn validate_column(column: &Column) -> Result<(), ColumnError> {
    if !is_safe_identifier(&column.name) {
        return Err(ColumnError::InvalidName(column.name.clone()));
    }
    if !is_safe_comment(column.comment.as_deref()) {
        return Err(ColumnError::CommentTooLong(column.name.clone()));
    }
    if let Some(default) = column.default.as_deref().filter(|d| !is_default_value(d)) {
        return Err(ColumnError::InvalidDefault(
            column.name.clone(),
            default.to_string(),
        ));
    }
    match &column.data_type {
        DataType::Enum(values) if values.is_empty() => {
            Err(ColumnError::EmptyEnum(column.name.clone()))
        }
        kind if kind.length() == Some(0) => Err(ColumnError::ZeroLength(column.name.clone())),
        _ => Ok(()),
    }
}

/// Validates a table definition.
///
/// Collects every problem instead of stopping at the first one, so a caller
/// can report them all at once.
pub fn validate_table(table: &Table) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let name = &table.name;

    if !is_safe_identifier(name) {
        errors.push(ValidationError::InvalidTableName(name.clone()));
    }
    if !is_safe_comment(table.comment.as_deref()) {
        errors.push(ValidationError::TableCommentTooLong(name.clone()));
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for column in &table.columns {
        if !seen.insert(column.name.as_str()) {
            errors.push(ValidationError::DuplicateColumn {
                table: name.clone(),
                column: column.name.clone(),
            });
        }
        if let Err(source) = validate_column(column) {
            errors.push(ValidationError::Column {
                table: name.clone(),
                source,
            });
        }
    }

    for key in &table.primary_key {
        if !seen.contains(key.as_str()) {
            errors.push(ValidationError::MissingPrimaryKeyColumn {
                table: name.clone(),
                column: key.clone(),
            });
        }
    }

    for key in &table.keys {
        if !seen.contains(key.column.as_str()) {
            errors.push(ValidationError::MissingIndexColumn {
                table: name.clone(),
                column: key.column.clone(),
            });
        }
    }

    for fk in &table.foreign_keys {
        if !seen.contains(fk.column.as_str()) {
            errors.push(ValidationError::MissingForeignKeyColumn {
                table: name.clone(),
                column: fk.column.clone(),
            });
        }
    }

    errors
}

impl Column {
    /// Validates the column. See [`validate_column`].
    pub fn validate(&self) -> Result<(), ColumnError> {
        validate_column(self)
    }
}

impl Table {
    /// Validates the table and returns the first problem found.
    ///
    /// See [`validate_table`] to get all of them.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match validate_table(self).into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
