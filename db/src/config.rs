//! YAML migration sets.
//!
//! A migration set lists migrations in a file that lives next to the code
//! using them, so a group's history can be reviewed in one place.
//!
//! # Example YAML
//!
//! ```yaml
//! migrations:
//!   - group: accounts
//!     script: accounts.sql
//!     statements:
//!       - CREATE TABLE accounts (id BIGINT NOT NULL PRIMARY KEY)
//!   - group: accounts
//!     statements:
//!       - ALTER TABLE accounts ADD COLUMN email VARCHAR(255)
//!   - group: accounts
//!     version: 5
//!     dialect: mysql
//!     statements:
//!       - ALTER TABLE accounts ENGINE = InnoDB
//! ```
//!
//! Omitted versions count up from 0 in file order within each group, so the
//! first two entries above are versions 0 and 1. An omitted script becomes
//! `<file>#<index>`.

use std::collections::HashMap;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use schema_ledger_core::Dialect;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::migration::Migration;

/// One migration as written in a set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationEntry {
    pub group: String,
    /// Explicit version; defaults to the entry's position within its group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    /// Restricts the entry to one dialect. `None` means every dialect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialect: Option<Dialect>,
    pub statements: Vec<String>,
}

/// A list of migrations loaded from YAML.
///
/// # Examples
///
/// ```
/// use schema_ledger_db::{Dialect, MigrationSet};
///
/// let set = MigrationSet::from_yaml(
///     "migrations:\n  - group: g\n    statements: [\"CREATE TABLE t (id INT)\"]\n",
///     "inline",
/// )
/// .unwrap();
/// let migrations = set.for_dialect(Dialect::MySql);
/// assert_eq!(migrations[0].version, 0);
/// assert_eq!(migrations[0].script, "inline#0");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationSet {
    #[serde(default)]
    pub migrations: Vec<MigrationEntry>,
    /// Name used for default script identifiers; the file name when loaded
    /// from disk.
    #[serde(skip)]
    pub origin: String,
}

impl MigrationSet {
    /// Loads a set from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::MigrateError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::MigrateError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let mut set: MigrationSet = serde_yaml::from_reader(reader)?;
        set.origin = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(set)
    }

    /// Parses a set from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`YamlError`](crate::MigrateError::YamlError) if parsing
    /// fails.
    pub fn from_yaml(yaml: &str, origin: impl Into<String>) -> Result<Self> {
        let mut set: MigrationSet = serde_yaml::from_str(yaml)?;
        set.origin = origin.into();
        Ok(set)
    }

    /// Saves the set as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::MigrateError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::MigrateError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Appends an entry.
    pub fn push(&mut self, entry: MigrationEntry) {
        self.migrations.push(entry);
    }

    /// Resolves the entries that apply to `dialect` into migrations.
    ///
    /// Statements are trimmed. Default versions are assigned before
    /// filtering, so an entry keeps its version whatever the dialect.
    pub fn for_dialect(&self, dialect: Dialect) -> Vec<Migration> {
        let mut positions: HashMap<&str, i64> = HashMap::new();
        let mut migrations = Vec::new();

        for (index, entry) in self.migrations.iter().enumerate() {
            let position = positions.entry(entry.group.as_str()).or_insert(0);
            let version = entry.version.unwrap_or(*position);
            *position += 1;

            if entry.dialect.is_some_and(|d| d != dialect) {
                continue;
            }

            let script = entry
                .script
                .clone()
                .unwrap_or_else(|| format!("{}#{}", self.origin, index));
            migrations.push(Migration::new(
                entry.group.clone(),
                version,
                script,
                entry.statements.iter().map(|s| s.trim()),
            ));
        }
        migrations
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}
