//! Canonical DDL text.
//!
//! Renders the model into a single deterministic string per logical
//! definition, suitable for hashing and for round-trip checks through
//! [`parse`](crate::parse()). Tables, columns, foreign keys and keys are
//! sorted before rendering; alter statements keep their order because
//! reordering them changes their meaning.
//!
//! Column clauses always appear in the order type, `DEFAULT`, `NOT NULL`,
//! `PRIMARY KEY`, `UNIQUE`, `COMMENT`.
//!
//! # Examples
//!
//! ```
//! use schema_ledger_core::{normalize, Column, DataType, Table};
//!
//! let table = Table::new("users")
//!     .with_column(Column::new("name", DataType::Varchar(64)).nullable())
//!     .with_column(Column::new("id", DataType::BigInt).primary_key());
//!
//! assert_eq!(
//!     normalize::table(&table),
//!     "CREATE TABLE `users` (`id` BIGINT NOT NULL PRIMARY KEY,`name` VARCHAR(64));"
//! );
//! ```

use crate::types::{quote_ident, quote_literal};
use crate::{AlterStatement, Column, ForeignKeyConstraint, Key, Table};

/// Renders all tables sorted by name, concatenated without separators.
pub fn tables(tables: &[Table]) -> String {
    let mut sorted: Vec<&Table> = tables.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    sorted.into_iter().map(table).collect()
}

/// Renders one `CREATE TABLE` statement.
pub fn table(table: &Table) -> String {
    let mut out = String::from("CREATE TABLE");
    if table.if_not_exists {
        out.push_str(" IF NOT EXISTS");
    }

    let mut body = columns(&table.columns);
    for part in [foreign_keys(&table.foreign_keys), keys(&table.keys)] {
        if !part.is_empty() {
            if !body.is_empty() {
                body.push(',');
            }
            body.push_str(&part);
        }
    }
    if !table.primary_key.is_empty() {
        if !body.is_empty() {
            body.push(',');
        }
        body.push_str(&primary_key(&table.primary_key));
    }

    out.push_str(&format!(" {} ({body})", quote_ident(&table.name)));
    if let Some(comment) = &table.comment {
        out.push_str(&format!(" COMMENT {}", quote_literal(comment)));
    }
    out.push(';');
    out
}

/// Renders columns sorted by name, comma separated.
pub fn columns(columns: &[Column]) -> String {
    let mut sorted: Vec<&Column> = columns.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    join(sorted.into_iter().map(column))
}

/// Renders a single column definition.
pub fn column(column: &Column) -> String {
    let mut out = format!("{} {}", quote_ident(&column.name), column.data_type);

    if let Some(default) = &column.default {
        out.push_str(" DEFAULT ");
        out.push_str(default);
    }
    if !column.nullable {
        out.push_str(" NOT NULL");
    }
    if column.primary_key {
        out.push_str(" PRIMARY KEY");
    }
    if column.unique {
        out.push_str(" UNIQUE");
    }
    if let Some(comment) = &column.comment {
        out.push_str(&format!(" COMMENT {}", quote_literal(comment)));
    }
    out
}

/// Renders foreign keys sorted by `(name, column)`, comma separated.
pub fn foreign_keys(keys: &[ForeignKeyConstraint]) -> String {
    let mut sorted: Vec<&ForeignKeyConstraint> = keys.iter().collect();
    sorted.sort_by(|a, b| {
        (a.name.as_deref().unwrap_or(""), &a.column)
            .cmp(&(b.name.as_deref().unwrap_or(""), &b.column))
    });
    join(sorted.into_iter().map(foreign_key))
}

/// Renders a single `FOREIGN KEY` clause.
pub fn foreign_key(key: &ForeignKeyConstraint) -> String {
    let mut out = String::new();
    if let Some(name) = &key.name {
        out.push_str(&format!("CONSTRAINT {} ", quote_ident(name)));
    }
    out.push_str(&format!(
        "FOREIGN KEY ({}) REFERENCES {}({})",
        quote_ident(&key.column),
        quote_ident(&key.reference_table),
        quote_ident(&key.reference_column)
    ));
    out
}

/// Renders keys sorted by `(name, column)`, comma separated.
pub fn keys(keys: &[Key]) -> String {
    let mut sorted: Vec<&Key> = keys.iter().collect();
    sorted.sort_by(|a, b| {
        (a.name.as_deref().unwrap_or(""), &a.column)
            .cmp(&(b.name.as_deref().unwrap_or(""), &b.column))
    });
    join(sorted.into_iter().map(key))
}

/// Renders a single `KEY` clause.
pub fn key(key: &Key) -> String {
    let mut out = String::from(if key.unique { "UNIQUE KEY" } else { "KEY" });
    if let Some(name) = &key.name {
        out.push(' ');
        out.push_str(&quote_ident(name));
    }
    out.push_str(&format!("({})", quote_ident(&key.column)));
    out
}

fn primary_key(columns: &[String]) -> String {
    let names: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
    format!("PRIMARY KEY ({})", names.join(","))
}

/// Renders alter statements in their given order.
pub fn alter_statements(statements: &[AlterStatement]) -> String {
    statements.iter().map(alter_statement).collect()
}

/// Renders a single alter statement, terminated by `;`.
pub fn alter_statement(statement: &AlterStatement) -> String {
    match statement {
        AlterStatement::AddColumn(add) => {
            let mut out = format!(
                "ALTER TABLE {} ADD COLUMN {}",
                quote_ident(&add.table),
                column(&add.column)
            );
            if add.first {
                out.push_str(" FIRST");
            } else if let Some(after) = &add.after {
                out.push_str(&format!(" AFTER {}", quote_ident(after)));
            }
            out.push(';');
            out
        }
        AlterStatement::DropColumn(drop) => format!(
            "ALTER TABLE {} DROP COLUMN {};",
            quote_ident(&drop.table),
            quote_ident(&drop.column)
        ),
        AlterStatement::AddIndex(index) => format!(
            "{} {} ON {}({});",
            if index.unique {
                "CREATE UNIQUE INDEX"
            } else {
                "CREATE INDEX"
            },
            quote_ident(&index.name),
            quote_ident(&index.table),
            quote_ident(&index.column)
        ),
        AlterStatement::DropIndex(drop) => format!(
            "ALTER TABLE {} DROP INDEX {};",
            quote_ident(&drop.table),
            quote_ident(&drop.index)
        ),
    }
}

fn join(parts: impl Iterator<Item = String>) -> String {
    parts.collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DataType;

    #[test]
    fn test_column_clause_order() {
        let col = Column::new("state", DataType::Char(2))
            .with_default("'NY'")
            .primary_key()
            .unique()
            .with_comment("it's a state");
        assert_eq!(
            column(&col),
            "`state` CHAR(2) DEFAULT 'NY' NOT NULL PRIMARY KEY UNIQUE COMMENT 'it''s a state'"
        );

        let col = Column::new("note", DataType::Text).nullable();
        assert_eq!(column(&col), "`note` TEXT");
    }

    #[test]
    fn test_columns_sorted_by_name() {
        let cols = vec![
            Column::new("b", DataType::Int),
            Column::new("a", DataType::Int),
        ];
        assert_eq!(columns(&cols), "`a` INT NOT NULL,`b` INT NOT NULL");
    }

    #[test]
    fn test_table_with_constraints() {
        let table = Table::new("track")
            .if_not_exists()
            .with_column(Column::new("id", DataType::BigInt))
            .with_column(Column::new("album_id", DataType::BigInt))
            .with_foreign_key(ForeignKeyConstraint {
                name: Some("fk_album".into()),
                column: "album_id".into(),
                reference_table: "album".into(),
                reference_column: "id".into(),
            })
            .with_key(Key {
                name: None,
                column: "album_id".into(),
                unique: false,
            })
            .with_primary_key(["id"])
            .with_comment("tracks");

        assert_eq!(
            super::table(&table),
            "CREATE TABLE IF NOT EXISTS `track` (\
             `album_id` BIGINT NOT NULL,`id` BIGINT NOT NULL,\
             CONSTRAINT `fk_album` FOREIGN KEY (`album_id`) REFERENCES `album`(`id`),\
             KEY(`album_id`),\
             PRIMARY KEY (`id`)) COMMENT 'tracks';"
        );
    }

    #[test]
    fn test_keys_sorted_by_name_then_column() {
        let k = |name: Option<&str>, column: &str| Key {
            name: name.map(String::from),
            column: column.into(),
            unique: false,
        };
        let rendered = keys(&[k(Some("b"), "x"), k(None, "z"), k(Some("a"), "y"), k(None, "c")]);
        assert_eq!(rendered, "KEY(`c`),KEY(`z`),KEY `a`(`y`),KEY `b`(`x`)");
    }

    #[test]
    fn test_tables_sorted_and_input_untouched() {
        let input = vec![Table::new("b"), Table::new("a")];
        assert_eq!(tables(&input), "CREATE TABLE `a` ();CREATE TABLE `b` ();");
        assert_eq!(input[0].name, "b");
    }

    #[test]
    fn test_alter_statements_keep_order() {
        let stmts = vec![
            AlterStatement::drop_index("users", "idx_email"),
            AlterStatement::add_column_after("users", Column::new("age", DataType::Int), "id"),
            AlterStatement::drop_column("users", "age"),
            AlterStatement::AddIndex(crate::AddIndex {
                table: "users".into(),
                name: "idx_email".into(),
                column: "email".into(),
                unique: true,
            }),
        ];
        assert_eq!(
            alter_statements(&stmts),
            "ALTER TABLE `users` DROP INDEX `idx_email`;\
             ALTER TABLE `users` ADD COLUMN `age` INT NOT NULL AFTER `id`;\
             ALTER TABLE `users` DROP COLUMN `age`;\
             CREATE UNIQUE INDEX `idx_email` ON `users`(`email`);"
        );
    }
}
