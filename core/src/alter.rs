//! Table alterations.
//!
//! An [`AlterStatement`] is one of ADD COLUMN, DROP COLUMN, ADD INDEX or
//! DROP INDEX. Each knows its target table and can be applied to a
//! [`Table`] value in place. Failed applications leave the table untouched.
//!
//! # Examples
//!
//! ```
//! use schema_ledger_core::*;
//!
//! let mut table = Table::new("users").with_column(Column::new("id", DataType::BigInt));
//!
//! AlterStatement::add_column("users", Column::new("email", DataType::Text))
//!     .apply_to(&mut table)
//!     .unwrap();
//! assert_eq!(table.columns[1].name, "email");
//!
//! let err = AlterStatement::drop_column("users", "missing")
//!     .apply_to(&mut table)
//!     .unwrap_err();
//! assert!(err.is_not_found());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Column, Key, Table};

/// Errors raised while applying an alteration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlterError {
    /// A referenced column does not exist.
    #[error("column '{column}' was not found in table '{table}'")]
    ColumnNotFound { table: String, column: String },
    /// A referenced index does not exist.
    #[error("index '{index}' could not be dropped because it was not present in table '{table}'")]
    IndexNotFound { table: String, index: String },
    /// The statement targets a table that is not known.
    #[error("table '{0}' was not found")]
    TableNotFound(String),
    /// An added column reuses the name of an existing one.
    #[error("column '{column}' already exists in table '{table}'")]
    DuplicateColumn { table: String, column: String },
}

impl AlterError {
    /// Returns `true` for every "not found" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AlterError::ColumnNotFound { .. }
                | AlterError::IndexNotFound { .. }
                | AlterError::TableNotFound(_)
        )
    }
}

/// `ALTER TABLE t ADD COLUMN c [FIRST | AFTER x]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddColumn {
    /// Table the column is added to.
    pub table: String,
    /// The new column.
    pub column: Column,
    /// Insert at the front of the table.
    #[serde(default)]
    pub first: bool,
    /// Insert directly after this column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

/// `ALTER TABLE t DROP COLUMN c`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropColumn {
    /// Table the column is removed from.
    pub table: String,
    /// Name of the column to remove.
    pub column: String,
}

/// `CREATE [UNIQUE] INDEX i ON t (c)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddIndex {
    /// Table the index is created on.
    pub table: String,
    /// Index name.
    pub name: String,
    /// Indexed column.
    pub column: String,
    /// UNIQUE index.
    #[serde(default)]
    pub unique: bool,
}

/// `ALTER TABLE t DROP INDEX i` or `DROP INDEX i ON t`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropIndex {
    /// Table the index is removed from.
    pub table: String,
    /// Name of the index to remove.
    pub index: String,
}

/// A single table alteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AlterStatement {
    AddColumn(AddColumn),
    DropColumn(DropColumn),
    AddIndex(AddIndex),
    DropIndex(DropIndex),
}

impl AlterStatement {
    /// ADD COLUMN appending at the end.
    pub fn add_column(table: impl Into<String>, column: Column) -> Self {
        AlterStatement::AddColumn(AddColumn {
            table: table.into(),
            column,
            first: false,
            after: None,
        })
    }

    /// ADD COLUMN ... FIRST.
    pub fn add_column_first(table: impl Into<String>, column: Column) -> Self {
        AlterStatement::AddColumn(AddColumn {
            table: table.into(),
            column,
            first: true,
            after: None,
        })
    }

    /// ADD COLUMN ... AFTER `after`.
    pub fn add_column_after(
        table: impl Into<String>,
        column: Column,
        after: impl Into<String>,
    ) -> Self {
        AlterStatement::AddColumn(AddColumn {
            table: table.into(),
            column,
            first: false,
            after: Some(after.into()),
        })
    }

    /// DROP COLUMN.
    pub fn drop_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        AlterStatement::DropColumn(DropColumn {
            table: table.into(),
            column: column.into(),
        })
    }

    /// CREATE INDEX.
    pub fn add_index(
        table: impl Into<String>,
        name: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        AlterStatement::AddIndex(AddIndex {
            table: table.into(),
            name: name.into(),
            column: column.into(),
            unique: false,
        })
    }

    /// DROP INDEX.
    pub fn drop_index(table: impl Into<String>, index: impl Into<String>) -> Self {
        AlterStatement::DropIndex(DropIndex {
            table: table.into(),
            index: index.into(),
        })
    }

    /// Name of the table this statement modifies.
    pub fn table_name(&self) -> &str {
        match self {
            AlterStatement::AddColumn(s) => &s.table,
            AlterStatement::DropColumn(s) => &s.table,
            AlterStatement::AddIndex(s) => &s.table,
            AlterStatement::DropIndex(s) => &s.table,
        }
    }

    /// Applies the alteration to `table`.
    ///
    /// The target table name is not compared against `table.name`; use
    /// [`apply_alterations`] to route statements by name.
    ///
    /// # Errors
    ///
    /// Returns a "not found" [`AlterError`] when the referenced column or
    /// index does not exist, and [`AlterError::DuplicateColumn`] when an
    /// added column is already present. The table is left unmodified in
    /// either case.
    pub fn apply_to(&self, table: &mut Table) -> Result<(), AlterError> {
        match self {
            AlterStatement::AddColumn(add) => {
                if table.columns.iter().any(|c| c.name == add.column.name) {
                    return Err(AlterError::DuplicateColumn {
                        table: table.name.clone(),
                        column: add.column.name.clone(),
                    });
                }
                let at = match (&add.after, add.first) {
                    (Some(after), _) => {
                        let pos = table
                            .columns
                            .iter()
                            .position(|c| &c.name == after)
                            .ok_or_else(|| AlterError::ColumnNotFound {
                                table: table.name.clone(),
                                column: after.clone(),
                            })?;
                        pos + 1
                    }
                    (None, true) => 0,
                    (None, false) => table.columns.len(),
                };
                table.columns.insert(at, add.column.clone());
                Ok(())
            }
            AlterStatement::DropColumn(drop) => {
                let pos = table
                    .columns
                    .iter()
                    .position(|c| c.name == drop.column)
                    .ok_or_else(|| AlterError::ColumnNotFound {
                        table: table.name.clone(),
                        column: drop.column.clone(),
                    })?;
                table.columns.remove(pos);
                Ok(())
            }
            AlterStatement::AddIndex(index) => {
                table.keys.push(Key {
                    name: Some(index.name.clone()),
                    column: index.column.clone(),
                    unique: index.unique,
                });
                Ok(())
            }
            AlterStatement::DropIndex(drop) => {
                let pos = table
                    .keys
                    .iter()
                    .position(|k| k.name.as_deref() == Some(drop.index.as_str()))
                    .ok_or_else(|| AlterError::IndexNotFound {
                        table: table.name.clone(),
                        index: drop.index.clone(),
                    })?;
                table.keys.remove(pos);
                Ok(())
            }
        }
    }
}

/// Applies `statements` in order, routing each to the table it names.
///
/// Stops at the first failure; statements applied before it stay applied.
///
/// # Errors
///
/// Returns [`AlterError::TableNotFound`] for an unknown target table, or the
/// error of the failing [`AlterStatement::apply_to`].
pub fn apply_alterations(
    tables: &mut [Table],
    statements: &[AlterStatement],
) -> Result<(), AlterError> {
    for statement in statements {
        let target = statement.table_name();
        let table = tables
            .iter_mut()
            .find(|t| t.name == target)
            .ok_or_else(|| AlterError::TableNotFound(target.to_string()))?;
        statement.apply_to(table)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DataType;

    fn col(name: &str) -> Column {
        Column::new(name, DataType::Int)
    }

    fn names(table: &Table) -> Vec<&str> {
        table.columns.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_add_column_positions() {
        let mut table = Table::new("t");

        AlterStatement::add_column("t", col("a")).apply_to(&mut table).unwrap();
        assert_eq!(names(&table), ["a"]);

        AlterStatement::add_column_first("t", col("b")).apply_to(&mut table).unwrap();
        assert_eq!(names(&table), ["b", "a"]);

        AlterStatement::add_column_after("t", col("c"), "b")
            .apply_to(&mut table)
            .unwrap();
        assert_eq!(names(&table), ["b", "c", "a"]);

        AlterStatement::add_column_after("t", col("d"), "a")
            .apply_to(&mut table)
            .unwrap();
        assert_eq!(names(&table), ["b", "c", "a", "d"]);
    }

    #[test]
    fn test_add_existing_column_fails() {
        let mut table = Table::new("t").with_column(col("a")).with_column(col("b"));
        let before = table.clone();

        let err = AlterStatement::add_column_first("t", Column::new("b", DataType::Text))
            .apply_to(&mut table)
            .unwrap_err();
        assert_eq!(
            err,
            AlterError::DuplicateColumn {
                table: "t".into(),
                column: "b".into(),
            }
        );
        assert_eq!(err.to_string(), "column 'b' already exists in table 't'");
        assert!(!err.is_not_found());
        assert_eq!(table, before);
    }

    #[test]
    fn test_add_column_after_unknown_column_fails() {
        let mut table = Table::new("t").with_column(col("a"));
        let err = AlterStatement::add_column_after("t", col("b"), "zzz")
            .apply_to(&mut table)
            .unwrap_err();
        assert_eq!(
            err,
            AlterError::ColumnNotFound {
                table: "t".into(),
                column: "zzz".into()
            }
        );
        assert_eq!(names(&table), ["a"]);
    }

    #[test]
    fn test_drop_column() {
        let mut table = Table::new("t");
        for name in ["a", "b", "c", "d", "e"] {
            table.columns.push(col(name));
        }
        for name in ["a", "c", "e"] {
            AlterStatement::drop_column("t", name).apply_to(&mut table).unwrap();
        }
        assert_eq!(names(&table), ["b", "d"]);

        let before = table.clone();
        assert!(
            AlterStatement::drop_column("t", "a")
                .apply_to(&mut table)
                .unwrap_err()
                .is_not_found()
        );
        assert_eq!(table, before);
    }

    #[test]
    fn test_add_and_drop_index() {
        let mut table = Table::new("t").with_column(col("a"));
        AlterStatement::add_index("t", "idx_a", "a").apply_to(&mut table).unwrap();
        assert_eq!(table.keys.len(), 1);
        assert_eq!(table.keys[0].column, "a");
        assert_eq!(table.keys[0].name.as_deref(), Some("idx_a"));

        // duplicate names are the caller's problem
        AlterStatement::add_index("t", "idx_a", "a").apply_to(&mut table).unwrap();
        assert_eq!(table.keys.len(), 2);

        AlterStatement::drop_index("t", "idx_a").apply_to(&mut table).unwrap();
        AlterStatement::drop_index("t", "idx_a").apply_to(&mut table).unwrap();
        assert!(table.keys.is_empty());

        let err = AlterStatement::drop_index("t", "idx_a")
            .apply_to(&mut table)
            .unwrap_err();
        assert!(matches!(err, AlterError::IndexNotFound { .. }));
    }

    #[test]
    fn test_apply_is_order_sensitive() {
        let original = Table::new("t").with_column(col("a"));

        let mut table = original.clone();
        let forward = [
            AlterStatement::add_column("t", col("x")),
            AlterStatement::drop_column("t", "x"),
        ];
        apply_alterations(std::slice::from_mut(&mut table), &forward).unwrap();
        assert_eq!(table, original);

        let mut table = original.clone();
        let reversed = [
            AlterStatement::drop_column("t", "x"),
            AlterStatement::add_column("t", col("x")),
        ];
        let err = apply_alterations(std::slice::from_mut(&mut table), &reversed).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(table, original);
    }

    #[test]
    fn test_apply_alterations_unknown_table() {
        let mut tables = vec![Table::new("t")];
        let err = apply_alterations(&mut tables, &[AlterStatement::drop_column("u", "a")])
            .unwrap_err();
        assert_eq!(err, AlterError::TableNotFound("u".into()));
    }

    #[test]
    fn test_table_name() {
        assert_eq!(AlterStatement::drop_index("users", "i").table_name(), "users");
        assert_eq!(
            AlterStatement::add_column_first("orders", col("a")).table_name(),
            "orders"
        );
    }
}
