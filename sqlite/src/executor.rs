//! [`Executor`] implementation over rusqlite.
//!
//! Values map onto SQLite storage classes directly. Timestamps are stored as
//! RFC 3339 text with millisecond precision, which sorts chronologically and
//! reads back through [`Row::get_timestamp`](schema_ledger_db::Row::get_timestamp).

use chrono::SecondsFormat;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, params_from_iter};
use schema_ledger_db::{BoxError, Executor, Row, Value};

/// Runs statements on a borrowed connection.
///
/// A [`rusqlite::Transaction`] dereferences to a [`Connection`], so the same
/// type executes inside and outside of transactions:
///
/// ```
/// use rusqlite::Connection;
/// use schema_ledger_db::Executor;
/// use schema_ledger_sqlite::SqliteExecutor;
///
/// let mut conn = Connection::open_in_memory().unwrap();
/// SqliteExecutor::new(&conn).execute("CREATE TABLE t (id INTEGER)", &[]).unwrap();
///
/// let tx = conn.transaction().unwrap();
/// SqliteExecutor::new(&tx).execute("INSERT INTO t VALUES (?)", &[1.into()]).unwrap();
/// tx.commit().unwrap();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SqliteExecutor<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteExecutor<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }
}

impl Executor for SqliteExecutor<'_> {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, BoxError> {
        let changed = self
            .conn
            .execute(sql, params_from_iter(params.iter().map(to_sql)))?;
        Ok(changed as u64)
    }

    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, BoxError> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns = stmt.column_count();
        let mut rows = stmt.query(params_from_iter(params.iter().map(to_sql)))?;

        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let values = (0..columns)
                .map(|i| row.get_ref(i).map(from_sql))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            result.push(Row::new(values));
        }
        Ok(result)
    }
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(v) => SqlValue::Integer(*v),
        Value::Real(v) => SqlValue::Real(*v),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Blob(b) => SqlValue::Blob(b.clone()),
        Value::Timestamp(ts) => SqlValue::Text(ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
    }
}

fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Real(v),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}
