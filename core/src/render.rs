//! Dialect DDL rendering.
//!
//! Only the MySQL family is implemented. The output is meant to be executed,
//! so unlike [`normalize`](crate::normalize) it keeps declaration order and
//! maps kinds to concrete engine types (`UUID` becomes `BINARY(16)`, `TEXT`
//! becomes `LONGTEXT`).

use thiserror::Error;

use crate::types::{quote_ident, quote_literal};
use crate::{Column, DataType, Dialect, Table, ValidationError};

/// Character set and collation appended to every MySQL table.
///
/// `utf8mb4_unicode_520_ci` sorts the same on MySQL and MariaDB.
pub const MYSQL_TABLE_OPTIONS: &str = "CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_520_ci";

/// Errors raised while rendering DDL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// No renderer exists for the dialect.
    #[error("DDL rendering for {0} is not implemented")]
    UnsupportedDialect(Dialect),
    /// The definition did not pass validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

fn ensure_mysql(dialect: Dialect) -> Result<(), RenderError> {
    match dialect {
        Dialect::MySql => Ok(()),
        other => Err(RenderError::UnsupportedDialect(other)),
    }
}

impl DataType {
    /// Returns the concrete column type for `dialect`.
    ///
    /// # Examples
    ///
    /// ```
    /// use schema_ledger_core::{DataType, Dialect, RenderError};
    ///
    /// assert_eq!(DataType::Uuid.sql(Dialect::MySql).unwrap(), "BINARY(16)");
    /// assert_eq!(DataType::Text.sql(Dialect::MySql).unwrap(), "LONGTEXT");
    /// assert_eq!(
    ///     DataType::Int.sql(Dialect::Oracle),
    ///     Err(RenderError::UnsupportedDialect(Dialect::Oracle))
    /// );
    /// ```
    pub fn sql(&self, dialect: Dialect) -> Result<String, RenderError> {
        ensure_mysql(dialect)?;
        Ok(match self {
            DataType::Text => "LONGTEXT".to_string(),
            DataType::Blob => "LONGBLOB".to_string(),
            DataType::Uuid => "BINARY(16)".to_string(),
            DataType::Enum(values) => {
                let values: Vec<String> = values.iter().map(|v| quote_literal(v)).collect();
                format!("ENUM({})", values.join(", "))
            }
            other => other.to_string(),
        })
    }
}

impl Column {
    /// Renders the column definition: name, type, `NOT NULL`, `DEFAULT`,
    /// inline constraints and `COMMENT`.
    pub fn to_sql(&self, dialect: Dialect) -> Result<String, RenderError> {
        let mut out = format!("{} {}", quote_ident(&self.name), self.data_type.sql(dialect)?);
        if !self.nullable {
            out.push_str(" NOT NULL");
        }
        if let Some(default) = &self.default {
            out.push_str(" DEFAULT ");
            out.push_str(default);
        }
        if self.primary_key {
            out.push_str(" PRIMARY KEY");
        }
        if self.unique {
            out.push_str(" UNIQUE");
        }
        if let Some(comment) = &self.comment {
            out.push_str(&format!(" COMMENT {}", quote_literal(comment)));
        }
        Ok(out)
    }
}

impl Table {
    /// Renders a `CREATE TABLE IF NOT EXISTS` statement for `dialect`.
    ///
    /// The table is validated first.
    ///
    /// # Errors
    ///
    /// [`RenderError::Invalid`] with the first validation problem, or
    /// [`RenderError::UnsupportedDialect`] for anything but MySQL.
    ///
    /// # Examples
    ///
    /// ```
    /// use schema_ledger_core::{Column, DataType, Dialect, Table};
    ///
    /// let table = Table::new("users")
    ///     .with_column(Column::new("id", DataType::Uuid))
    ///     .with_primary_key(["id"])
    ///     .with_comment("accounts");
    ///
    /// assert_eq!(
    ///     table.to_sql(Dialect::MySql).unwrap(),
    ///     "CREATE TABLE IF NOT EXISTS `users` (\n  `id` BINARY(16) NOT NULL,\n  PRIMARY KEY (`id`)\n) \
    ///      CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_520_ci COMMENT 'accounts';"
    /// );
    /// ```
    pub fn to_sql(&self, dialect: Dialect) -> Result<String, RenderError> {
        ensure_mysql(dialect)?;
        self.validate()?;

        let mut lines = Vec::with_capacity(self.columns.len() + 1);
        for column in &self.columns {
            lines.push(column.to_sql(dialect)?);
        }
        for key in &self.keys {
            let kind = if key.unique { "UNIQUE KEY" } else { "KEY" };
            lines.push(match &key.name {
                Some(name) => format!("{kind} {} ({})", quote_ident(name), quote_ident(&key.column)),
                None => format!("{kind} ({})", quote_ident(&key.column)),
            });
        }
        for fk in &self.foreign_keys {
            let mut line = String::new();
            if let Some(name) = &fk.name {
                line.push_str(&format!("CONSTRAINT {} ", quote_ident(name)));
            }
            line.push_str(&format!(
                "FOREIGN KEY ({}) REFERENCES {} ({})",
                quote_ident(&fk.column),
                quote_ident(&fk.reference_table),
                quote_ident(&fk.reference_column)
            ));
            lines.push(line);
        }
        if !self.primary_key.is_empty() {
            let names: Vec<String> = self.primary_key.iter().map(|c| quote_ident(c)).collect();
            lines.push(format!("PRIMARY KEY ({})", names.join(",")));
        }

        let mut out = format!("CREATE TABLE IF NOT EXISTS {} (\n", quote_ident(&self.name));
        out.push_str(
            &lines
                .iter()
                .map(|line| format!("  {line}"))
                .collect::<Vec<_>>()
                .join(",\n"),
        );
        out.push_str("\n) ");
        out.push_str(MYSQL_TABLE_OPTIONS);
        if let Some(comment) = &self.comment {
            out.push_str(&format!(" COMMENT {}", quote_literal(comment)));
        }
        out.push(';');
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ForeignKeyConstraint, Key};

    #[test]
    fn test_mysql_type_mapping() {
        let cases = [
            (DataType::TinyInt, "TINYINT"),
            (DataType::MediumInt, "MEDIUMINT"),
            (DataType::BigInt, "BIGINT"),
            (DataType::Double, "DOUBLE"),
            (DataType::Varchar(20), "VARCHAR(20)"),
            (DataType::Blob, "LONGBLOB"),
            (DataType::Binary(32), "BINARY(32)"),
            (DataType::Timestamp, "TIMESTAMP"),
            (
                DataType::Enum(vec!["a".into(), "b".into()]),
                "ENUM('a', 'b')",
            ),
        ];
        for (kind, expected) in cases {
            assert_eq!(kind.sql(Dialect::MySql).unwrap(), expected);
        }
    }

    #[test]
    fn test_column_to_sql() {
        let col = Column::new("my_col", DataType::Varchar(20))
            .with_default("''")
            .with_comment("A required column");
        assert_eq!(
            col.to_sql(Dialect::MySql).unwrap(),
            "`my_col` VARCHAR(20) NOT NULL DEFAULT '' COMMENT 'A required column'"
        );
        assert!(col.to_sql(Dialect::Postgres).is_err());
    }

    #[test]
    fn test_table_to_sql_with_constraints() {
        let table = Table::new("track")
            .with_column(Column::new("id", DataType::BigInt))
            .with_column(Column::new("album_id", DataType::BigInt))
            .with_key(Key {
                name: Some("idx_album".into()),
                column: "album_id".into(),
                unique: false,
            })
            .with_foreign_key(ForeignKeyConstraint {
                name: None,
                column: "album_id".into(),
                reference_table: "album".into(),
                reference_column: "id".into(),
            })
            .with_primary_key(["id"]);

        assert_eq!(
            table.to_sql(Dialect::MySql).unwrap(),
            "CREATE TABLE IF NOT EXISTS `track` (\n\
             \x20 `id` BIGINT NOT NULL,\n\
             \x20 `album_id` BIGINT NOT NULL,\n\
             \x20 KEY `idx_album` (`album_id`),\n\
             \x20 FOREIGN KEY (`album_id`) REFERENCES `album` (`id`),\n\
             \x20 PRIMARY KEY (`id`)\n\
             ) CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_520_ci;"
        );
    }

    #[test]
    fn test_table_to_sql_validates_first() {
        let table = Table::new("t").with_primary_key(["missing"]);
        assert_eq!(
            table.to_sql(Dialect::MySql),
            Err(RenderError::Invalid(ValidationError::MissingPrimaryKeyColumn {
                table: "t".into(),
                column: "missing".into(),
            }))
        );
        assert_eq!(
            Table::new("t").to_sql(Dialect::Postgres),
            Err(RenderError::UnsupportedDialect(Dialect::Postgres))
        );
    }
}
