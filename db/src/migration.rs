//! Versioned schema migrations.
//!
//! A [`Migrator`] keeps a ledger of applied migrations in the
//! `migration_schema_history` table and applies each `(group, version)` at
//! most once. Every row is written as `executing` before its statements run
//! and updated to `success` or `failed` afterwards, so a crash or failure
//! leaves a row behind that blocks further work until it is fixed by hand.
//!
//! The engine never begins or commits transactions. Hand it a transaction
//! to make a run atomic.
//!
//! # Examples
//!
//! ```no_run
//! # fn open_transaction() -> Box<dyn schema_ledger_db::Executor> { unimplemented!() }
//! use schema_ledger_db::{Dialect, Migration, Migrator};
//!
//! let migrator = Migrator::new(Dialect::MySql).unwrap();
//! let migrations = vec![
//!     Migration::new("accounts", 0, "accounts.sql", [
//!         "CREATE TABLE accounts (id BIGINT NOT NULL PRIMARY KEY)",
//!     ]),
//!     Migration::new("accounts", 1, "accounts.sql", [
//!         "ALTER TABLE accounts ADD COLUMN email VARCHAR(255)",
//!     ]),
//! ];
//!
//! let tx = open_transaction();
//! let report = migrator.apply(&*tx, &migrations).unwrap();
//! println!("applied {} migrations", report.applied.len());
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use schema_ledger_core::Dialect;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use crate::error::{MigrateError, Result};
use crate::executor::{Executor, Row, Value, ValueError};
use crate::statement::{DialectStatement, NamedStatement};

/// Name of the history table.
pub const HISTORY_TABLE: &str = "migration_schema_history";

const CREATE_HISTORY_TABLE: &str = r#"CREATE TABLE IF NOT EXISTS "migration_schema_history"
(
    "group"              VARCHAR(255) NOT NULL,
    "version"            BIGINT       NOT NULL,
    "script"             VARCHAR(255) NOT NULL,
    "type"               VARCHAR(12)  NOT NULL,
    "checksum"           CHAR(64)     NOT NULL,
    "applied_at"         TIMESTAMP    NOT NULL,
    "execution_duration" BIGINT       NOT NULL,
    "status"             VARCHAR(12)  NOT NULL,
    "log"                TEXT         NOT NULL,
    PRIMARY KEY ("group", "version")
)"#;

const SELECT_HISTORY: &str = r#"SELECT "group", "version", "script", "type", "checksum", "applied_at", "execution_duration", "status", "log" FROM "migration_schema_history" ORDER BY "group", "version""#;

const INSERT_ENTRY: &str = r#"INSERT INTO "migration_schema_history" ("group", "version", "script", "type", "checksum", "applied_at", "execution_duration", "status", "log") VALUES (:group, :version, :script, :type, :checksum, :applied_at, :duration, :status, :log)"#;

const UPDATE_ENTRY: &str = r#"UPDATE "migration_schema_history" SET "script" = :script, "type" = :type, "checksum" = :checksum, "applied_at" = :applied_at, "execution_duration" = :duration, "status" = :status, "log" = :log WHERE "group" = :group AND "version" = :version"#;

/// Argument order of the insert and update statements.
const ENTRY_PARAMS: [&str; 9] = [
    "group",
    "version",
    "script",
    "type",
    "checksum",
    "applied_at",
    "duration",
    "status",
    "log",
];

/// A versioned list of statements.
///
/// The engine only reads migrations; they are built fresh for every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Migration {
    /// Namespace the version is ordered in.
    pub group: String,
    /// Position within the group, starting at 0.
    pub version: i64,
    /// Where the migration came from, for diagnostics.
    pub script: String,
    /// Statements executed in order.
    pub statements: Vec<String>,
}

impl Migration {
    pub fn new<I, S>(
        group: impl Into<String>,
        version: i64,
        script: impl Into<String>,
        statements: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            group: group.into(),
            version,
            script: script.into(),
            statements: statements.into_iter().map(Into::into).collect(),
        }
    }

    /// Lowercase hex SHA-256 over the statements joined by `;`.
    ///
    /// ```
    /// use schema_ledger_db::Migration;
    ///
    /// let a = Migration::new("g", 0, "a.sql", ["CREATE TABLE a (id INT)"]);
    /// let b = Migration::new("g", 0, "b.sql", ["CREATE TABLE a (id INT)"]);
    /// assert_eq!(a.checksum(), b.checksum());
    /// assert_eq!(a.checksum().len(), 64);
    /// ```
    pub fn checksum(&self) -> String {
        let hash = Sha256::digest(self.statements.join(";").as_bytes());
        format!("{:x}", hash)
    }

    fn check(&self) -> Result<()> {
        let reason = if self.group.trim().is_empty() {
            Some("group name is empty")
        } else if self.statements.is_empty() {
            Some("no statements")
        } else if self.statements.iter().any(|s| s.trim().is_empty()) {
            Some("blank statement")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(MigrateError::InvalidMigration {
                group: self.group.clone(),
                version: self.version,
                script: self.script.clone(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Kind of a history entry. Only SQL migrations exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MigrationType {
    #[default]
    Sql,
}

impl MigrationType {
    pub fn as_str(self) -> &'static str {
        match self {
            MigrationType::Sql => "sql",
        }
    }
}

impl fmt::Display for MigrationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MigrationType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "sql" => Ok(MigrationType::Sql),
            other => Err(format!("unknown migration type '{other}'")),
        }
    }
}

/// Lifecycle state of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationStatus {
    Pending,
    Executing,
    Success,
    Failed,
}

impl MigrationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MigrationStatus::Pending => "pending",
            MigrationStatus::Executing => "executing",
            MigrationStatus::Success => "success",
            MigrationStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MigrationStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MigrationStatus::Pending),
            "executing" => Ok(MigrationStatus::Executing),
            "success" => Ok(MigrationStatus::Success),
            "failed" => Ok(MigrationStatus::Failed),
            other => Err(format!("unknown migration status '{other}'")),
        }
    }
}

/// A persisted history row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationStatusEntry {
    pub group: String,
    pub version: i64,
    pub script: String,
    #[serde(rename = "type")]
    pub migration_type: MigrationType,
    pub checksum: String,
    pub applied_at: DateTime<Utc>,
    /// Stored as whole milliseconds.
    #[serde(with = "duration_millis")]
    pub duration: Duration,
    pub status: MigrationStatus,
    /// Error text of a failed run; empty otherwise.
    pub log: String,
}

impl MigrationStatusEntry {
    fn from_row(row: &Row) -> std::result::Result<Self, ValueError> {
        let parse_err = |index: usize, expected: &'static str, found: &str| {
            ValueError::TypeMismatch {
                index,
                expected,
                found: format!("'{found}'"),
            }
        };

        let migration_type = row.get_str(3)?;
        let status = row.get_str(7)?;
        let duration = row.get_i64(6)?;

        Ok(Self {
            group: row.get_str(0)?.to_string(),
            version: row.get_i64(1)?,
            script: row.get_str(2)?.to_string(),
            migration_type: migration_type
                .parse()
                .map_err(|_| parse_err(3, "migration type", migration_type))?,
            checksum: row.get_str(4)?.to_string(),
            applied_at: row.get_timestamp(5)?,
            duration: Duration::from_millis(u64::try_from(duration).unwrap_or(0)),
            status: status
                .parse()
                .map_err(|_| parse_err(7, "migration status", status))?,
            log: row.get_str(8)?.to_string(),
        })
    }

    /// Arguments in [`ENTRY_PARAMS`] order.
    fn to_args(&self) -> Vec<Value> {
        vec![
            Value::from(self.group.as_str()),
            Value::from(self.version),
            Value::from(self.script.as_str()),
            Value::from(self.migration_type.as_str()),
            Value::from(self.checksum.as_str()),
            Value::from(self.applied_at),
            Value::Integer(i64::try_from(self.duration.as_millis()).unwrap_or(i64::MAX)),
            Value::from(self.status.as_str()),
            Value::from(self.log.as_str()),
        ]
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    /// Whole milliseconds, clamped to `u64::MAX`.
    pub fn saturating(value: &Duration) -> u64 {
        u64::try_from(value.as_millis()).unwrap_or(u64::MAX)
    }

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(saturating(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

/// State of one migration relative to the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationState {
    /// Applied successfully with a matching checksum.
    Applied,
    /// Not in the history yet.
    Pending,
    /// Applied, but the statements changed since.
    Modified,
    /// A history row that is not `success`; blocks every run.
    Dirty(MigrationStatus),
    /// In the history but not among the given migrations.
    Unknown,
}

/// One line of [`Migrator::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedMigration {
    pub group: String,
    pub version: i64,
    pub script: String,
    pub state: MigrationState,
}

/// Outcome of a successful [`Migrator::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyReport {
    /// `(group, version)` of every executed migration, in execution order.
    pub applied: Vec<(String, i64)>,
    /// Number of migrations skipped because they were already applied.
    pub skipped: usize,
}

struct HistoryStatements {
    insert: DialectStatement,
    update: DialectStatement,
}

/// Applies migrations and keeps the history ledger.
///
/// All operations on one instance are serialized by an internal lock. Share
/// the instance (e.g. through an `Arc`) to serialize a whole process; nothing
/// guards against other processes migrating the same database.
pub struct Migrator {
    dialect: Dialect,
    statements: HistoryStatements,
    lock: Mutex<()>,
}

impl fmt::Debug for Migrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migrator")
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

impl Migrator {
    /// Creates a migrator for `dialect`.
    ///
    /// # Errors
    ///
    /// Fails with [`StatementError::UnsupportedDialect`](crate::StatementError)
    /// when the history statements cannot be compiled for `dialect`.
    pub fn new(dialect: Dialect) -> Result<Self> {
        let statements = HistoryStatements {
            insert: NamedStatement::new(INSERT_ENTRY).prepare(dialect, &ENTRY_PARAMS)?,
            update: NamedStatement::new(UPDATE_ENTRY).prepare(dialect, &ENTRY_PARAMS)?,
        };
        Ok(Self {
            dialect,
            statements,
            lock: Mutex::new(()),
        })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Applies every migration that is not in the history yet.
    ///
    /// Groups run in name order, versions ascending within a group. Nothing
    /// executes unless all checks pass first: the history is clean, applied
    /// migrations are unchanged, and pending versions are non-negative and
    /// unique per group.
    ///
    /// # Errors
    ///
    /// - [`MigrateError::Dirty`] if any history row is not `success`.
    /// - [`MigrateError::ChecksumMismatch`] if an applied migration changed.
    /// - [`MigrateError::InvalidMigration`] / [`MigrateError::InvalidVersion`]
    ///   for unusable input.
    /// - [`MigrateError::Execution`] when a statement fails; the row is
    ///   marked `failed` and later migrations are not attempted.
    pub fn apply<E: Executor + ?Sized>(
        &self,
        exec: &E,
        migrations: &[Migration],
    ) -> Result<ApplyReport> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        for migration in migrations {
            migration.check()?;
        }

        let history = self.load_history(exec)?;
        if let Some(entry) = history.iter().find(|e| e.status != MigrationStatus::Success) {
            return Err(MigrateError::Dirty {
                group: entry.group.clone(),
                version: entry.version,
                status: entry.status,
            });
        }

        let applied: HashMap<(&str, i64), &MigrationStatusEntry> = history
            .iter()
            .map(|e| ((e.group.as_str(), e.version), e))
            .collect();

        let mut report = ApplyReport::default();
        let mut pending: BTreeMap<&str, Vec<&Migration>> = BTreeMap::new();
        for migration in migrations {
            match applied.get(&(migration.group.as_str(), migration.version)) {
                Some(entry) => {
                    let checksum = migration.checksum();
                    if checksum != entry.checksum {
                        return Err(MigrateError::ChecksumMismatch {
                            group: migration.group.clone(),
                            version: migration.version,
                            script: migration.script.clone(),
                            expected: entry.checksum.clone(),
                            actual: checksum,
                        });
                    }
                    debug!(
                        group = %migration.group,
                        version = migration.version,
                        "Migration already applied"
                    );
                    report.skipped += 1;
                }
                None => pending
                    .entry(migration.group.as_str())
                    .or_default()
                    .push(migration),
            }
        }

        for (group, candidates) in pending.iter_mut() {
            candidates.sort_by_key(|m| m.version);
            let mut previous: Option<i64> = None;
            for migration in candidates.iter() {
                let reason = if migration.version < 0 {
                    Some("version must be >= 0")
                } else if previous == Some(migration.version) {
                    Some("version is not unique")
                } else {
                    None
                };
                if let Some(reason) = reason {
                    return Err(MigrateError::InvalidVersion {
                        group: group.to_string(),
                        version: migration.version,
                        reason,
                    });
                }
                previous = Some(migration.version);
            }
        }

        for migration in pending.values().flatten() {
            self.run(exec, migration)?;
            report.applied.push((migration.group.clone(), migration.version));
        }

        info!(
            applied = report.applied.len(),
            skipped = report.skipped,
            "Migrations complete"
        );
        Ok(report)
    }

    fn run<E: Executor + ?Sized>(&self, exec: &E, migration: &Migration) -> Result<()> {
        let mut entry = MigrationStatusEntry {
            group: migration.group.clone(),
            version: migration.version,
            script: migration.script.clone(),
            migration_type: MigrationType::Sql,
            checksum: migration.checksum(),
            applied_at: Utc::now(),
            duration: Duration::ZERO,
            status: MigrationStatus::Executing,
            log: String::new(),
        };

        let start = Instant::now();
        self.statements.insert.execute(exec, &entry.to_args())?;

        for statement in &migration.statements {
            if let Err(source) = exec.execute(statement, &[]) {
                error!(
                    group = %migration.group,
                    version = migration.version,
                    script = %migration.script,
                    error = %source,
                    "Migration failed"
                );
                entry.status = MigrationStatus::Failed;
                entry.duration = start.elapsed();
                entry.log = format!("failed to execute statement '{statement}': {source}");
                if let Err(e) = self.statements.update.execute(exec, &entry.to_args()) {
                    warn!(
                        group = %migration.group,
                        version = migration.version,
                        error = %e,
                        "Failed to record migration failure"
                    );
                }
                return Err(MigrateError::Execution {
                    group: migration.group.clone(),
                    version: migration.version,
                    script: migration.script.clone(),
                    source,
                });
            }
        }

        entry.status = MigrationStatus::Success;
        entry.duration = start.elapsed();
        self.statements.update.execute(exec, &entry.to_args())?;

        info!(
            group = %migration.group,
            version = migration.version,
            script = %migration.script,
            duration_ms = duration_millis::saturating(&entry.duration),
            "Applied migration"
        );
        Ok(())
    }

    /// Returns every history row ordered by group and version.
    ///
    /// Creates the history table if it does not exist.
    pub fn history<E: Executor + ?Sized>(&self, exec: &E) -> Result<Vec<MigrationStatusEntry>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load_history(exec)
    }

    /// Compares `migrations` with the history without changing anything
    /// but the history table's existence.
    ///
    /// Lines are ordered by group and version. History rows without a
    /// matching migration are reported as [`MigrationState::Unknown`], or
    /// as [`MigrationState::Dirty`] if they are not `success`.
    pub fn status<E: Executor + ?Sized>(
        &self,
        exec: &E,
        migrations: &[Migration],
    ) -> Result<Vec<PlannedMigration>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let history = self.load_history(exec)?;

        let mut lines: BTreeMap<(String, i64), PlannedMigration> = BTreeMap::new();
        for entry in &history {
            let state = match entry.status {
                MigrationStatus::Success => MigrationState::Unknown,
                other => MigrationState::Dirty(other),
            };
            lines.insert(
                (entry.group.clone(), entry.version),
                PlannedMigration {
                    group: entry.group.clone(),
                    version: entry.version,
                    script: entry.script.clone(),
                    state,
                },
            );
        }

        for migration in migrations {
            let key = (migration.group.clone(), migration.version);
            let state = match lines.get(&key).map(|line| &line.state) {
                None => MigrationState::Pending,
                Some(MigrationState::Dirty(status)) => MigrationState::Dirty(*status),
                Some(_) => {
                    let recorded = history
                        .iter()
                        .find(|e| e.group == migration.group && e.version == migration.version)
                        .map(|e| e.checksum.as_str());
                    if recorded == Some(migration.checksum().as_str()) {
                        MigrationState::Applied
                    } else {
                        MigrationState::Modified
                    }
                }
            };
            lines.insert(
                key,
                PlannedMigration {
                    group: migration.group.clone(),
                    version: migration.version,
                    script: migration.script.clone(),
                    state,
                },
            );
        }

        Ok(lines.into_values().collect())
    }

    fn load_history<E: Executor + ?Sized>(&self, exec: &E) -> Result<Vec<MigrationStatusEntry>> {
        exec.execute(CREATE_HISTORY_TABLE, &[])
            .map_err(MigrateError::database("create history table"))?;
        let rows = exec
            .query(SELECT_HISTORY, &[])
            .map_err(MigrateError::database("load history"))?;
        let entries = rows
            .iter()
            .map(MigrationStatusEntry::from_row)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(entries = entries.len(), "Loaded migration history");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::BoxError;

    /// In-memory stand-in for a database: keeps history rows and records
    /// every migration statement it runs.
    #[derive(Default)]
    struct FakeDb {
        rows: Mutex<Vec<Vec<Value>>>,
        executed: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl FakeDb {
        fn failing_on(statement: &'static str) -> Self {
            Self {
                fail_on: Some(statement),
                ..Self::default()
            }
        }

        fn executed(&self) -> Vec<String> {
            self.executed.lock().unwrap().clone()
        }

        fn statuses(&self) -> Vec<(String, i64, String)> {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .map(|r| {
                    let row = Row::new(r.clone());
                    (
                        row.get_str(0).unwrap().to_string(),
                        row.get_i64(1).unwrap(),
                        row.get_str(7).unwrap().to_string(),
                    )
                })
                .collect()
        }
    }

    impl Executor for FakeDb {
        fn execute(&self, sql: &str, params: &[Value]) -> std::result::Result<u64, BoxError> {
            if sql.starts_with("CREATE TABLE IF NOT EXISTS \"migration_schema_history\"") {
                return Ok(0);
            }
            if sql.starts_with("INSERT INTO \"migration_schema_history\"") {
                self.rows.lock().unwrap().push(params.to_vec());
                return Ok(1);
            }
            if sql.starts_with("UPDATE \"migration_schema_history\"") {
                // params: script, type, checksum, applied_at, duration, status, log, group, version
                let mut rows = self.rows.lock().unwrap();
                let row = rows
                    .iter_mut()
                    .find(|r| r[0] == params[7] && r[1] == params[8])
                    .ok_or("no such row")?;
                row[2..9].clone_from_slice(&params[0..7]);
                return Ok(1);
            }
            if Some(sql) == self.fail_on {
                return Err(format!("syntax error near '{sql}'").into());
            }
            self.executed.lock().unwrap().push(sql.to_string());
            Ok(0)
        }

        fn query(&self, _sql: &str, _params: &[Value]) -> std::result::Result<Vec<Row>, BoxError> {
            let mut rows: Vec<Row> = self.rows.lock().unwrap().iter().cloned().map(Row::new).collect();
            rows.sort_by_key(|r| (r.get_str(0).unwrap_or("").to_string(), r.get_i64(1).unwrap_or(0)));
            Ok(rows)
        }
    }

    fn m(group: &str, version: i64, statement: &str) -> Migration {
        Migration::new(group, version, format!("{group}.sql"), [statement])
    }

    #[test]
    fn test_checksum_joins_statements() {
        let one = Migration::new("g", 0, "s", ["a", "b"]);
        let joined = Migration::new("g", 0, "s", ["a;b"]);
        assert_eq!(one.checksum(), joined.checksum());
        assert_ne!(one.checksum(), Migration::new("g", 0, "s", ["ab"]).checksum());
        assert_eq!(
            Migration::new("g", 0, "s", ["abc"]).checksum(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_new_rejects_numbered_dialects() {
        assert!(Migrator::new(Dialect::MySql).is_ok());
        assert!(matches!(
            Migrator::new(Dialect::Postgres),
            Err(MigrateError::Statement(_))
        ));
    }

    #[test]
    fn test_history_statements_compile_to_positional_markers() {
        let migrator = Migrator::new(Dialect::MySql).unwrap();
        assert_eq!(migrator.statements.insert.sql().matches('?').count(), 9);
        assert_eq!(migrator.statements.update.lookup(), &[2, 3, 4, 5, 6, 7, 8, 0, 1]);
    }

    #[test]
    fn test_apply_orders_versions_and_groups() {
        let db = FakeDb::default();
        let migrator = Migrator::new(Dialect::MySql).unwrap();
        let report = migrator
            .apply(
                &db,
                &[m("b", 2, "b2"), m("b", 0, "b0"), m("a", 1, "a1"), m("b", 1, "b1"), m("a", 0, "a0")],
            )
            .unwrap();

        assert_eq!(db.executed(), ["a0", "a1", "b0", "b1", "b2"]);
        assert_eq!(report.applied.len(), 5);
        assert_eq!(report.applied[0], ("a".to_string(), 0));
        assert_eq!(report.skipped, 0);
        assert!(db.statuses().iter().all(|(_, _, s)| s == "success"));
    }

    #[test]
    fn test_apply_twice_executes_nothing() {
        let db = FakeDb::default();
        let migrator = Migrator::new(Dialect::MySql).unwrap();
        let set = [m("a", 0, "a0"), m("a", 1, "a1")];

        migrator.apply(&db, &set).unwrap();
        let report = migrator.apply(&db, &set).unwrap();

        assert!(report.applied.is_empty());
        assert_eq!(report.skipped, 2);
        assert_eq!(db.executed().len(), 2);
        assert_eq!(db.statuses().len(), 2);
    }

    #[test]
    fn test_modified_migration_is_rejected() {
        let db = FakeDb::default();
        let migrator = Migrator::new(Dialect::MySql).unwrap();
        migrator.apply(&db, &[m("a", 0, "a0")]).unwrap();

        let err = migrator.apply(&db, &[m("a", 0, "a0 changed"), m("a", 1, "a1")]).unwrap_err();
        assert!(matches!(err, MigrateError::ChecksumMismatch { version: 0, .. }));
        assert_eq!(db.executed(), ["a0"]);
    }

    #[test]
    fn test_duplicate_and_negative_versions_fail_before_executing() {
        let db = FakeDb::default();
        let migrator = Migrator::new(Dialect::MySql).unwrap();

        let err = migrator.apply(&db, &[m("a", 0, "x"), m("a", 0, "y")]).unwrap_err();
        assert!(matches!(err, MigrateError::InvalidVersion { version: 0, .. }));

        let err = migrator.apply(&db, &[m("a", -1, "x")]).unwrap_err();
        assert!(matches!(err, MigrateError::InvalidVersion { version: -1, .. }));

        assert!(db.executed().is_empty());
        assert!(db.statuses().is_empty());
    }

    #[test]
    fn test_invalid_migrations_fail_before_executing() {
        let db = FakeDb::default();
        let migrator = Migrator::new(Dialect::MySql).unwrap();

        let cases = [
            Migration::new("", 0, "s", ["x"]),
            Migration::new("a", 0, "s", Vec::<String>::new()),
            Migration::new("a", 0, "s", ["x", "  "]),
        ];
        for bad in cases {
            let err = migrator.apply(&db, &[m("a", 1, "ok"), bad]).unwrap_err();
            assert!(matches!(err, MigrateError::InvalidMigration { .. }), "{err}");
        }
        assert!(db.executed().is_empty());
    }

    #[test]
    fn test_failure_marks_row_and_stops_group() {
        let db = FakeDb::failing_on("a1");
        let migrator = Migrator::new(Dialect::MySql).unwrap();

        let err = migrator
            .apply(&db, &[m("a", 0, "a0"), m("a", 1, "a1"), m("a", 2, "a2")])
            .unwrap_err();
        assert!(matches!(err, MigrateError::Execution { version: 1, .. }));
        assert_eq!(
            db.statuses(),
            [
                ("a".to_string(), 0, "success".to_string()),
                ("a".to_string(), 1, "failed".to_string()),
            ]
        );

        let log = db.rows.lock().unwrap()[1][8].clone();
        assert!(matches!(log, Value::Text(ref s) if s.contains("syntax error")));

        // dirty from now on
        let err = migrator.apply(&db, &[m("b", 0, "b0")]).unwrap_err();
        assert!(matches!(
            err,
            MigrateError::Dirty {
                version: 1,
                status: MigrationStatus::Failed,
                ..
            }
        ));
        assert_eq!(db.executed(), ["a0"]);
    }

    #[test]
    fn test_status_reports_each_state() {
        let db = FakeDb::default();
        let migrator = Migrator::new(Dialect::MySql).unwrap();
        migrator
            .apply(&db, &[m("a", 0, "a0"), m("a", 1, "a1"), m("old", 0, "o0")])
            .unwrap();

        let lines = migrator
            .status(&db, &[m("a", 0, "a0"), m("a", 1, "changed"), m("a", 2, "a2")])
            .unwrap();
        let states: Vec<(&str, i64, &MigrationState)> = lines
            .iter()
            .map(|l| (l.group.as_str(), l.version, &l.state))
            .collect();
        assert_eq!(
            states,
            [
                ("a", 0, &MigrationState::Applied),
                ("a", 1, &MigrationState::Modified),
                ("a", 2, &MigrationState::Pending),
                ("old", 0, &MigrationState::Unknown),
            ]
        );
    }

    #[test]
    fn test_history_entries_decode() {
        let db = FakeDb::default();
        let migrator = Migrator::new(Dialect::MySql).unwrap();
        migrator.apply(&db, &[m("a", 0, "a0")]).unwrap();

        let history = migrator.history(&db).unwrap();
        assert_eq!(history.len(), 1);
        let entry = &history[0];
        assert_eq!(entry.group, "a");
        assert_eq!(entry.script, "a.sql");
        assert_eq!(entry.migration_type, MigrationType::Sql);
        assert_eq!(entry.status, MigrationStatus::Success);
        assert_eq!(entry.checksum, m("a", 0, "a0").checksum());
        assert!(entry.log.is_empty());
    }

    #[test]
    fn test_status_enums_parse() {
        for status in [
            MigrationStatus::Pending,
            MigrationStatus::Executing,
            MigrationStatus::Success,
            MigrationStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<MigrationStatus>(), Ok(status));
        }
        assert!("done".parse::<MigrationStatus>().is_err());
        assert_eq!("sql".parse::<MigrationType>(), Ok(MigrationType::Sql));
    }

    #[test]
    fn test_entry_serializes_duration_as_millis() {
        let entry = MigrationStatusEntry {
            group: "a".into(),
            version: 0,
            script: "a.sql".into(),
            migration_type: MigrationType::Sql,
            checksum: "00".into(),
            applied_at: DateTime::from_timestamp_millis(0).unwrap(),
            duration: Duration::from_millis(1500),
            status: MigrationStatus::Success,
            log: String::new(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["duration"], 1500);
        assert_eq!(json["type"], "sql");
        assert_eq!(json["status"], "success");
    }

    #[test]
    fn test_duration_millis_saturate() {
        assert_eq!(duration_millis::saturating(&Duration::from_millis(1500)), 1500);
        assert_eq!(duration_millis::saturating(&Duration::MAX), u64::MAX);

        let entry = MigrationStatusEntry {
            group: "a".into(),
            version: 0,
            script: "a.sql".into(),
            migration_type: MigrationType::Sql,
            checksum: "00".into(),
            applied_at: DateTime::from_timestamp_millis(0).unwrap(),
            duration: Duration::MAX,
            status: MigrationStatus::Success,
            log: String::new(),
        };
        assert_eq!(serde_json::to_value(&entry).unwrap()["duration"], u64::MAX);
        assert_eq!(entry.to_args()[6], Value::Integer(i64::MAX));
    }
}
