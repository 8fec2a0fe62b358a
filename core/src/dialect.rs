//! SQL engine families.
//!
//! A [`Dialect`] drives placeholder syntax in the statement compiler and
//! DDL quirks in the renderer. Branches that are not implemented for a
//! dialect report an error instead of producing SQL for the wrong engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named SQL engine family.
///
/// # Examples
///
/// ```
/// use schema_ledger_core::Dialect;
///
/// let dialect: Dialect = "MariaDB".parse().unwrap();
/// assert_eq!(dialect, Dialect::MySql);
/// assert_eq!(dialect.to_string(), "mysql");
/// assert!(Dialect::Postgres.matches("POSTGRES"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// MySQL and MariaDB. Placeholders are `?`.
    #[default]
    #[serde(alias = "mariadb")]
    MySql,
    /// PostgreSQL. Placeholders are `$1`, `$2`, ...
    #[serde(alias = "postgresql")]
    Postgres,
    /// Oracle. Placeholders are `:1`, `:2`, ...
    Oracle,
}

/// Returned when a dialect name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown dialect: {0}")]
pub struct UnknownDialect(pub String);

impl Dialect {
    /// All dialects, in declaration order.
    pub const ALL: [Dialect; 3] = [Dialect::MySql, Dialect::Postgres, Dialect::Oracle];

    /// Returns the canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::Oracle => "oracle",
        }
    }

    /// Returns `true` if `name` is the canonical name of this dialect,
    /// ignoring case.
    pub fn matches(self, name: &str) -> bool {
        name.eq_ignore_ascii_case(self.as_str())
    }

    /// Guesses the dialect from a server version banner, such as the result
    /// of `SELECT version()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use schema_ledger_core::Dialect;
    ///
    /// assert_eq!(
    ///     Dialect::from_version_string("PostgreSQL 16.2 on x86_64-pc-linux-gnu"),
    ///     Some(Dialect::Postgres)
    /// );
    /// assert_eq!(Dialect::from_version_string("10.4.11-MariaDB"), Some(Dialect::MySql));
    /// assert_eq!(Dialect::from_version_string("3.45.0"), None);
    /// ```
    pub fn from_version_string(version: &str) -> Option<Dialect> {
        let version = version.to_lowercase();
        if version.contains("postgresql") {
            Some(Dialect::Postgres)
        } else if version.contains("mariadb") || version.contains("mysql") {
            Some(Dialect::MySql)
        } else if version.contains("oracle") {
            Some(Dialect::Oracle)
        } else {
            None
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "oracle" => Ok(Dialect::Oracle),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("mysql".parse::<Dialect>().unwrap(), Dialect::MySql);
        assert_eq!("PostgreSQL".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!(" oracle ".parse::<Dialect>().unwrap(), Dialect::Oracle);
        assert_eq!(
            "sqlserver".parse::<Dialect>(),
            Err(UnknownDialect("sqlserver".to_string()))
        );
    }

    #[test]
    fn test_display_roundtrip() {
        for dialect in Dialect::ALL {
            assert_eq!(dialect.to_string().parse::<Dialect>().unwrap(), dialect);
            assert!(dialect.matches(&dialect.to_string().to_uppercase()));
        }
    }

    #[test]
    fn test_version_banner_detection() {
        assert_eq!(
            Dialect::from_version_string("8.0.36 MySQL Community Server - GPL"),
            Some(Dialect::MySql)
        );
        assert_eq!(
            Dialect::from_version_string("Oracle Database 19c Enterprise Edition"),
            Some(Dialect::Oracle)
        );
        assert_eq!(Dialect::from_version_string(""), None);
    }

    #[test]
    fn test_serde_aliases() {
        let dialect: Dialect = serde_json::from_str("\"mariadb\"").unwrap();
        assert_eq!(dialect, Dialect::MySql);
        let dialect: Dialect = serde_json::from_str("\"postgresql\"").unwrap();
        assert_eq!(dialect, Dialect::Postgres);
        assert_eq!(serde_json::to_string(&Dialect::MySql).unwrap(), "\"mysql\"");
    }
}
