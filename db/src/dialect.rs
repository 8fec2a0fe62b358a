//! Server dialect detection.

use schema_ledger_core::Dialect;
use tracing::debug;

use crate::error::{MigrateError, Result};
use crate::executor::Executor;

/// Asks the server for its version banner and maps it to a [`Dialect`].
///
/// # Errors
///
/// Returns [`MigrateError::Database`] if the version query fails, or
/// [`MigrateError::UnknownServer`] if the banner names no known server.
pub fn detect_dialect<E: Executor + ?Sized>(exec: &E) -> Result<Dialect> {
    let rows = exec
        .query("SELECT version()", &[])
        .map_err(MigrateError::database("query server version"))?;
    let banner = match rows.first() {
        Some(row) => row.get_str(0)?.to_string(),
        None => String::new(),
    };

    let dialect = Dialect::from_version_string(&banner)
        .ok_or_else(|| MigrateError::UnknownServer(banner.clone()))?;
    debug!(banner = %banner, dialect = %dialect, "Detected dialect");
    Ok(dialect)
}
