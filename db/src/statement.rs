//! Named-parameter statements.
//!
//! A template such as `SELECT * FROM t WHERE a = :id OR b = :id` names its
//! parameters. [`NamedStatement::prepare`] checks the names against the list
//! the call site declares and compiles the template to the dialect's
//! positional form, plus a lookup that places each declared argument at
//! every position it occurs in.
//!
//! # Examples
//!
//! ```
//! use schema_ledger_db::{Dialect, NamedStatement, Value};
//!
//! let stmt = NamedStatement::new("UPDATE t SET a = :a WHERE b = :b OR c = :a")
//!     .prepare(Dialect::MySql, &["a", "b"])
//!     .unwrap();
//!
//! assert_eq!(stmt.sql(), "UPDATE t SET a = ? WHERE b = ? OR c = ?");
//! assert_eq!(stmt.lookup(), &[0, 1, 0]);
//!
//! let bound = stmt.bind(&[Value::from(1), Value::from("x")]).unwrap();
//! assert_eq!(bound, vec![Value::from(1), Value::from("x"), Value::from(1)]);
//! ```

use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use schema_ledger_core::Dialect;

use crate::error::StatementError;
use crate::executor::{Executor, Row, Value};

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r":(\w+)").expect("static regex must compile")
});

/// A statement template with `:name` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedStatement {
    source: String,
    /// Placeholder names and their byte ranges (including the colon), left
    /// to right.
    placeholders: Vec<(String, Range<usize>)>,
}

impl NamedStatement {
    /// Parses the placeholders of `template`.
    ///
    /// A placeholder is a colon followed by word characters, so `:1` names
    /// parameter `1`. `::` casts are not placeholders.
    pub fn new(template: impl Into<String>) -> Self {
        let source = template.into();
        let placeholders = PLACEHOLDER_RE
            .captures_iter(&source)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                if source[..whole.start()].ends_with(':') {
                    return None;
                }
                Some((caps[1].to_string(), whole.range()))
            })
            .collect();
        Self {
            source,
            placeholders,
        }
    }

    /// Returns the template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns every placeholder occurrence, left to right.
    ///
    /// ```
    /// use schema_ledger_db::NamedStatement;
    ///
    /// let stmt = NamedStatement::new("SELECT :a::int, :b, :a");
    /// assert_eq!(stmt.names().collect::<Vec<_>>(), ["a", "b", "a"]);
    /// ```
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.placeholders.iter().map(|(name, _)| name.as_str())
    }

    /// Checks that every placeholder is declared and every declared name is
    /// used.
    ///
    /// # Errors
    ///
    /// [`StatementError::UnmappedParameter`] naming the first offender,
    /// placeholders first.
    pub fn validate(&self, declared: &[&str]) -> Result<(), StatementError> {
        if let Some(name) = self.names().find(|name| !declared.contains(name)) {
            return Err(StatementError::UnmappedParameter(name.to_string()));
        }
        if let Some(name) = declared.iter().find(|d| !self.names().any(|n| n == **d)) {
            return Err(StatementError::UnmappedParameter(name.to_string()));
        }
        Ok(())
    }

    /// Compiles the template for `dialect`.
    ///
    /// `declared` is the argument order the call site will use.
    ///
    /// # Errors
    ///
    /// [`StatementError::UnmappedParameter`] if the names do not match, or
    /// [`StatementError::UnsupportedDialect`] for dialects with numbered
    /// placeholders, which are not implemented.
    pub fn prepare(
        &self,
        dialect: Dialect,
        declared: &[&str],
    ) -> Result<DialectStatement, StatementError> {
        self.validate(declared)?;

        match dialect {
            Dialect::MySql => {
                let mut sql = String::with_capacity(self.source.len());
                let mut lookup = Vec::with_capacity(self.placeholders.len());
                let mut last = 0;
                for (name, range) in &self.placeholders {
                    sql.push_str(&self.source[last..range.start]);
                    sql.push('?');
                    last = range.end;
                    let index = declared
                        .iter()
                        .position(|d| d == name)
                        .ok_or_else(|| StatementError::UnmappedParameter(name.clone()))?;
                    lookup.push(index);
                }
                sql.push_str(&self.source[last..]);

                Ok(DialectStatement {
                    source: self.source.clone(),
                    dialect,
                    sql,
                    lookup,
                    arity: declared.len(),
                })
            }
            Dialect::Postgres | Dialect::Oracle => Err(StatementError::UnsupportedDialect(dialect)),
        }
    }
}

impl fmt::Display for NamedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// A statement compiled for one dialect.
///
/// Immutable and reusable; share it freely between threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialectStatement {
    source: String,
    dialect: Dialect,
    sql: String,
    lookup: Vec<usize>,
    arity: usize,
}

impl DialectStatement {
    /// Returns the compiled SQL.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// For each positional marker, the index of the declared argument.
    pub fn lookup(&self) -> &[usize] {
        &self.lookup
    }

    /// Orders `args`, given in declaration order, into positional order.
    ///
    /// # Errors
    ///
    /// [`StatementError::ArgumentCount`] if `args` does not match the
    /// declared parameter list.
    pub fn bind(&self, args: &[Value]) -> Result<Vec<Value>, StatementError> {
        if args.len() != self.arity {
            return Err(StatementError::ArgumentCount {
                expected: self.arity,
                actual: args.len(),
            });
        }
        Ok(self.lookup.iter().map(|&i| args[i].clone()).collect())
    }

    /// Binds `args` and executes the statement.
    pub fn execute<E: Executor + ?Sized>(
        &self,
        exec: &E,
        args: &[Value],
    ) -> Result<u64, StatementError> {
        let params = self.bind(args)?;
        exec.execute(&self.sql, &params)
            .map_err(StatementError::Execution)
    }

    /// Binds `args` and runs the statement as a query.
    pub fn query<E: Executor + ?Sized>(
        &self,
        exec: &E,
        args: &[Value],
    ) -> Result<Vec<Row>, StatementError> {
        let params = self.bind(args)?;
        exec.query(&self.sql, &params)
            .map_err(StatementError::Execution)
    }
}

impl fmt::Display for DialectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> [{}] {}", self.source, self.dialect, self.sql)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::executor::BoxError;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<(String, Vec<Value>)>>,
    }

    impl Executor for Recorder {
        fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, BoxError> {
            self.calls.borrow_mut().push((sql.to_string(), params.to_vec()));
            Ok(1)
        }

        fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, BoxError> {
            self.calls.borrow_mut().push((sql.to_string(), params.to_vec()));
            Ok(vec![Row::new(params.to_vec())])
        }
    }

    #[test]
    fn test_names_skip_casts() {
        let stmt = NamedStatement::new("SELECT x::text FROM t WHERE id = :id");
        assert_eq!(stmt.names().collect::<Vec<_>>(), ["id"]);

        let stmt = NamedStatement::new("SELECT 1");
        assert_eq!(stmt.names().count(), 0);
    }

    #[test]
    fn test_validate_requires_exact_name_sets() {
        let stmt = NamedStatement::new("INSERT INTO t VALUES (:a, :b)");
        assert!(stmt.validate(&["a", "b"]).is_ok());
        assert!(stmt.validate(&["b", "a"]).is_ok());

        let err = stmt.validate(&["a"]).unwrap_err();
        assert!(matches!(err, StatementError::UnmappedParameter(ref n) if n == "b"));
        assert_eq!(err.to_string(), "parameter 'b' is unmapped");

        let err = stmt.validate(&["a", "b", "c"]).unwrap_err();
        assert!(matches!(err, StatementError::UnmappedParameter(ref n) if n == "c"));
    }

    #[test]
    fn test_prepare_mysql_reorders_by_declaration() {
        let stmt = NamedStatement::new("UPDATE t SET v = :value WHERE k = :key")
            .prepare(Dialect::MySql, &["key", "value"])
            .unwrap();
        assert_eq!(stmt.sql(), "UPDATE t SET v = ? WHERE k = ?");
        assert_eq!(stmt.lookup(), &[1, 0]);

        let exec = Recorder::default();
        stmt.execute(&exec, &[Value::from("k1"), Value::from(10)]).unwrap();
        let calls = exec.calls.borrow();
        assert_eq!(calls[0].1, vec![Value::from(10), Value::from("k1")]);
    }

    #[test]
    fn test_prepare_numbered_names() {
        let stmt = NamedStatement::new("INSERT INTO t VALUES (:1, :2)");
        assert_eq!(stmt.names().collect::<Vec<_>>(), ["1", "2"]);

        let stmt = stmt.prepare(Dialect::MySql, &["1", "2"]).unwrap();
        assert_eq!(stmt.sql(), "INSERT INTO t VALUES (?, ?)");
        assert_eq!(stmt.lookup(), &[0, 1]);

        let stmt = NamedStatement::new("SELECT :1::int, :2")
            .prepare(Dialect::MySql, &["2", "1"])
            .unwrap();
        assert_eq!(stmt.sql(), "SELECT ?::int, ?");
        assert_eq!(stmt.lookup(), &[1, 0]);
    }

    #[test]
    fn test_prepare_keeps_casts() {
        let stmt = NamedStatement::new("SELECT :v::int")
            .prepare(Dialect::MySql, &["v"])
            .unwrap();
        assert_eq!(stmt.sql(), "SELECT ?::int");
    }

    #[test]
    fn test_prepare_fails_for_numbered_dialects() {
        let stmt = NamedStatement::new("SELECT :a");
        for dialect in [Dialect::Postgres, Dialect::Oracle] {
            assert!(matches!(
                stmt.prepare(dialect, &["a"]),
                Err(StatementError::UnsupportedDialect(d)) if d == dialect
            ));
        }
    }

    #[test]
    fn test_argument_count_is_checked() {
        let stmt = NamedStatement::new("SELECT :a, :a")
            .prepare(Dialect::MySql, &["a"])
            .unwrap();
        let exec = Recorder::default();
        assert!(matches!(
            stmt.query(&exec, &[]),
            Err(StatementError::ArgumentCount {
                expected: 1,
                actual: 0
            })
        ));
        let rows = stmt.query(&exec, &[Value::from(5)]).unwrap();
        assert_eq!(rows[0].values(), &[Value::from(5), Value::from(5)]);
    }

    #[test]
    fn test_display() {
        let stmt = NamedStatement::new("SELECT :a")
            .prepare(Dialect::MySql, &["a"])
            .unwrap();
        assert_eq!(stmt.to_string(), "SELECT :a -> [mysql] SELECT ?");
    }

    #[test]
    fn test_compiled_statement_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DialectStatement>();
    }
}
