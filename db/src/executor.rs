//! Execution capability consumed by the engine.
//!
//! An [`Executor`] runs SQL text with positional parameters. Backends
//! implement it for both a plain connection and an open transaction, so the
//! engine never knows which one it was handed.

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

/// Error type returned by backends.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A parameter or result value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
            Value::Timestamp(_) => "timestamp",
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Errors raised by [`Row`] accessors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("column {0} is out of range")]
    OutOfRange(usize),
    #[error("column {index}: expected {expected}, found {found}")]
    TypeMismatch {
        index: usize,
        expected: &'static str,
        found: String,
    },
}

/// One result row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Returns the value at `index`.
    pub fn get(&self, index: usize) -> Result<&Value, ValueError> {
        self.values.get(index).ok_or(ValueError::OutOfRange(index))
    }

    /// Reads an integer. Integral text is accepted, as some drivers return
    /// `BIGINT` columns as strings.
    pub fn get_i64(&self, index: usize) -> Result<i64, ValueError> {
        match self.get(index)? {
            Value::Integer(v) => Ok(*v),
            Value::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| mismatch(index, "integer", &Value::Text(s.clone()))),
            other => Err(mismatch(index, "integer", other)),
        }
    }

    /// Reads a text value.
    pub fn get_str(&self, index: usize) -> Result<&str, ValueError> {
        match self.get(index)? {
            Value::Text(s) => Ok(s),
            other => Err(mismatch(index, "text", other)),
        }
    }

    /// Reads a point in time.
    ///
    /// Accepts native timestamps, RFC 3339 text, `YYYY-MM-DD HH:MM:SS[.f]`
    /// text (read as UTC) and integers (Unix milliseconds).
    pub fn get_timestamp(&self, index: usize) -> Result<DateTime<Utc>, ValueError> {
        match self.get(index)? {
            Value::Timestamp(ts) => Ok(*ts),
            Value::Integer(ms) => DateTime::from_timestamp_millis(*ms)
                .ok_or_else(|| mismatch(index, "timestamp", &Value::Integer(*ms))),
            Value::Text(s) => DateTime::parse_from_rfc3339(s)
                .map(|ts| ts.with_timezone(&Utc))
                .or_else(|_| {
                    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").map(|ts| ts.and_utc())
                })
                .map_err(|_| mismatch(index, "timestamp", &Value::Text(s.clone()))),
            other => Err(mismatch(index, "timestamp", other)),
        }
    }
}

fn mismatch(index: usize, expected: &'static str, found: &Value) -> ValueError {
    let found = match found {
        Value::Text(s) => format!("text '{s}'"),
        other => other.kind().to_string(),
    };
    ValueError::TypeMismatch {
        index,
        expected,
        found,
    }
}

/// Runs SQL against a connection or transaction.
///
/// Parameters are positional and already in statement order; see
/// [`DialectStatement`](crate::DialectStatement) for named parameters.
pub trait Executor {
    /// Executes a statement and returns the number of affected rows.
    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, BoxError>;

    /// Runs a query and collects all rows.
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, BoxError>;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, BoxError> {
        (**self).execute(sql, params)
    }

    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, BoxError> {
        (**self).query(sql, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from(7_i64), Value::Integer(7));
        assert_eq!(Value::from(true), Value::Integer(1));
        assert_eq!(Value::from("x"), Value::Text("x".into()));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("y")), Value::Text("y".into()));
    }

    #[test]
    fn test_row_accessors() {
        let row = Row::new(vec![
            Value::Integer(3),
            Value::Text("42".into()),
            Value::Text("name".into()),
            Value::Null,
        ]);
        assert_eq!(row.get_i64(0).unwrap(), 3);
        assert_eq!(row.get_i64(1).unwrap(), 42);
        assert_eq!(row.get_str(2).unwrap(), "name");
        assert_eq!(
            row.get_str(3),
            Err(ValueError::TypeMismatch {
                index: 3,
                expected: "text",
                found: "null".into()
            })
        );
        assert_eq!(row.get_i64(9), Err(ValueError::OutOfRange(9)));
        assert!(row.get_i64(2).is_err());
    }

    #[test]
    fn test_row_timestamps() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let row = Row::new(vec![
            Value::Text("2024-01-15T10:30:00Z".into()),
            Value::Text("2024-01-15 10:30:00".into()),
            Value::Integer(expected.timestamp_millis()),
            Value::Timestamp(expected),
            Value::Text("yesterday".into()),
        ]);
        for index in 0..4 {
            assert_eq!(row.get_timestamp(index).unwrap(), expected, "column {index}");
        }
        assert!(row.get_timestamp(4).is_err());
    }
}
