//! DDL model type definitions.
//!
//! This module defines the in-memory representation of relational table
//! definitions: tables, columns, foreign keys and indexes. The types are
//! plain data with serde support, so they can be stored next to migrations
//! or exchanged as JSON/YAML.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic data kind of a column.
///
/// The set is closed: every kind has a canonical spelling (see the
/// [`Display`](fmt::Display) impl) and a MySQL rendering. Unknown type
/// names are rejected when parsed, never at render time.
///
/// # Examples
///
/// ```
/// use schema_ledger_core::DataType;
///
/// assert_eq!(DataType::Varchar(64).to_string(), "VARCHAR(64)");
/// assert_eq!(
///     DataType::Enum(vec!["draft".into(), "live".into()]).to_string(),
///     "ENUM('draft','live')"
/// );
///
/// let parsed: DataType = "integer".parse().unwrap();
/// assert_eq!(parsed, DataType::Int);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// 8-bit integer.
    TinyInt,
    /// 16-bit integer.
    SmallInt,
    /// 24-bit integer.
    MediumInt,
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    BigInt,
    /// Single precision float.
    Float,
    /// Double precision float.
    Double,
    /// Boolean.
    Bool,
    /// Variable length text with a maximum length.
    Varchar(u32),
    /// Fixed length text.
    Char(u32),
    /// Unbounded text.
    Text,
    /// Unbounded binary data.
    Blob,
    /// Fixed length binary data.
    Binary(u32),
    /// 128-bit UUID.
    Uuid,
    /// Point in time.
    Timestamp,
    /// One of a fixed set of string values.
    Enum(Vec<String>),
}

impl DataType {
    /// Returns the bare type keyword without arguments (e.g. `VARCHAR`).
    pub fn keyword(&self) -> &'static str {
        match self {
            DataType::TinyInt => "TINYINT",
            DataType::SmallInt => "SMALLINT",
            DataType::MediumInt => "MEDIUMINT",
            DataType::Int => "INT",
            DataType::BigInt => "BIGINT",
            DataType::Float => "FLOAT",
            DataType::Double => "DOUBLE",
            DataType::Bool => "BOOLEAN",
            DataType::Varchar(_) => "VARCHAR",
            DataType::Char(_) => "CHAR",
            DataType::Text => "TEXT",
            DataType::Blob => "BLOB",
            DataType::Binary(_) => "BINARY",
            DataType::Uuid => "UUID",
            DataType::Timestamp => "TIMESTAMP",
            DataType::Enum(_) => "ENUM",
        }
    }

    /// Returns the declared length for sized kinds.
    pub fn length(&self) -> Option<u32> {
        match self {
            DataType::Varchar(len) | DataType::Char(len) | DataType::Binary(len) => Some(*len),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Varchar(len) | DataType::Char(len) | DataType::Binary(len) => {
                write!(f, "{}({len})", self.keyword())
            }
            DataType::Enum(values) => {
                let values: Vec<String> = values.iter().map(|v| quote_literal(v)).collect();
                write!(f, "ENUM({})", values.join(","))
            }
            other => f.write_str(other.keyword()),
        }
    }
}

/// A column defined in a [`Table`].
///
/// Columns are NOT NULL unless marked [`nullable`](Column::nullable). This
/// inverts the usual SQL default on purpose: a nullable column has to be
/// asked for.
///
/// # Examples
///
/// ```
/// use schema_ledger_core::{Column, DataType};
///
/// let id = Column::new("id", DataType::BigInt).primary_key();
/// assert!(!id.nullable);
///
/// let note = Column::new("note", DataType::Text)
///     .nullable()
///     .with_comment("free text");
/// assert!(note.nullable);
/// assert_eq!(note.comment.as_deref(), Some("free text"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Declared data kind.
    pub data_type: DataType,
    /// Whether NULL values are allowed.
    #[serde(default)]
    pub nullable: bool,
    /// Column-level PRIMARY KEY constraint.
    #[serde(default)]
    pub primary_key: bool,
    /// Column-level UNIQUE constraint.
    #[serde(default)]
    pub unique: bool,
    /// Default value as a SQL literal, e.g. `'n/a'`, `0` or `CURRENT_TIMESTAMP`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Documentation string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Column {
    /// Creates a NOT NULL column without constraints.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: false,
            primary_key: false,
            unique: false,
            default: None,
            comment: None,
        }
    }

    /// Allows NULL values.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Forbids NULL values.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Marks the column as primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Adds a UNIQUE constraint.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets the default literal.
    pub fn with_default(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(literal.into());
        self
    }

    /// Sets the documentation string.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// A FOREIGN KEY constraint.
///
/// Only single-column keys are modeled; composite keys are not supported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyConstraint {
    /// Constraint name, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Referencing column in the owning table.
    pub column: String,
    /// Referenced table.
    pub reference_table: String,
    /// Referenced column.
    pub reference_column: String,
}

/// An index on a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    /// Index name. Might be `None` if the index is anonymous.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Name of the indexed column.
    pub column: String,
    /// Whether the index enforces uniqueness.
    #[serde(default)]
    pub unique: bool,
}

/// A CREATE definition for a single SQL table.
///
/// # Examples
///
/// ```
/// use schema_ledger_core::{Column, DataType, Table};
///
/// let table = Table::new("users")
///     .with_column(Column::new("id", DataType::BigInt))
///     .with_column(Column::new("email", DataType::Varchar(255)).unique())
///     .with_primary_key(["id"]);
///
/// assert!(table.validate().is_ok());
/// assert_eq!(table.column("email").unwrap().data_type, DataType::Varchar(255));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Render as `CREATE TABLE IF NOT EXISTS`.
    #[serde(default)]
    pub if_not_exists: bool,
    /// Documentation string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Columns in declaration order.
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Table-level primary key column names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_key: Vec<String>,
    /// FOREIGN KEY constraints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKeyConstraint>,
    /// Indexes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<Key>,
}

impl Table {
    /// Creates an empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Appends a column.
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Sets the table-level primary key.
    pub fn with_primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the documentation string.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Appends a FOREIGN KEY constraint.
    pub fn with_foreign_key(mut self, key: ForeignKeyConstraint) -> Self {
        self.foreign_keys.push(key);
        self
    }

    /// Appends an index.
    pub fn with_key(mut self, key: Key) -> Self {
        self.keys.push(key);
        self
    }

    /// Marks the table as `IF NOT EXISTS`.
    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    /// Finds a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns `true` if a column with the given name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }
}

/// Everything read from a piece of DDL text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    /// All CREATE TABLE statements.
    pub tables: Vec<Table>,
    /// All ALTER TABLE / CREATE INDEX / DROP INDEX statements, in order.
    pub alter_statements: Vec<crate::AlterStatement>,
}

/// Quotes a string as a SQL literal, doubling embedded single quotes.
pub(crate) fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Quotes an identifier with backticks, doubling embedded backticks.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}
