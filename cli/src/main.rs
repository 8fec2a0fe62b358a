use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use schema_ledger_core::{Dialect, Table, normalize, parse};
use schema_ledger_db::{
    MigrationSet, MigrationState, MigrationStatusEntry, NamedStatement, PlannedMigration,
};
use schema_ledger_sqlite::Ledger;
use serde::Serialize;
use tracing::{Level, debug};

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
    Table,
}

#[derive(Debug, Parser)]
#[command(name = "schema-ledger")]
#[command(about = "Versioned schema migrations and named-parameter statements")]
struct Cli {
    /// Maximum level of log output written to stderr.
    #[arg(long, global = true, default_value = "warn")]
    log_level: Level,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending migrations from a YAML migration set.
    Apply(ApplyArgs),
    /// Compare a migration set with the recorded history.
    Status(StatusArgs),
    /// Show the recorded migration history.
    History(HistoryArgs),
    /// Print DDL from a file in canonical form.
    Normalize(NormalizeArgs),
    /// Compile a named-parameter statement for a dialect.
    Compile(CompileArgs),
}

#[derive(Debug, Args)]
struct ApplyArgs {
    /// SQLite database file path.
    #[arg(long)]
    db: PathBuf,
    /// YAML migration set.
    #[arg(long)]
    migrations: PathBuf,
    /// Dialect used to select migration set entries.
    #[arg(long, default_value = "mysql")]
    dialect: Dialect,
    /// Commit each statement on its own, keeping the history row of a
    /// failed migration.
    #[arg(long)]
    no_transaction: bool,
}

#[derive(Debug, Args)]
struct StatusArgs {
    /// SQLite database file path.
    #[arg(long)]
    db: PathBuf,
    /// YAML migration set. Without it only recorded entries are listed.
    #[arg(long)]
    migrations: Option<PathBuf>,
    /// Dialect used to select migration set entries.
    #[arg(long, default_value = "mysql")]
    dialect: Dialect,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct HistoryArgs {
    /// SQLite database file path.
    #[arg(long)]
    db: PathBuf,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct NormalizeArgs {
    /// File containing CREATE TABLE / ALTER TABLE / CREATE INDEX statements.
    #[arg(long)]
    input: PathBuf,
    /// Render tables as DDL for this dialect instead of the canonical form.
    #[arg(long)]
    render: Option<Dialect>,
}

#[derive(Debug, Args)]
struct CompileArgs {
    /// Statement template with `:name` placeholders.
    #[arg(long)]
    statement: String,
    /// Comma-separated parameter names in argument order.
    #[arg(long, default_value = "")]
    params: String,
    /// Target dialect.
    #[arg(long, default_value = "mysql")]
    dialect: Dialect,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Command::Apply(args) => run_apply(args),
        Command::Status(args) => run_status(args),
        Command::History(args) => run_history(args),
        Command::Normalize(args) => run_normalize(args),
        Command::Compile(args) => run_compile(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_apply(args: ApplyArgs) -> Result<(), String> {
    let set = load_set(&args.migrations)?;
    let migrations = set.for_dialect(args.dialect);
    debug!(count = migrations.len(), dialect = %args.dialect, "Loaded migration set");

    let mut ledger = open_ledger(&args.db)?;
    let result = if args.no_transaction {
        ledger.apply_autocommit(&migrations)
    } else {
        ledger.apply(&migrations)
    };
    let report = result.map_err(|e| format!("Apply failed: {e}"))?;

    for (group, version) in &report.applied {
        println!("applied {group} {version}");
    }
    println!(
        "Apply complete: {} applied, {} already up to date.",
        report.applied.len(),
        report.skipped
    );
    Ok(())
}

fn run_status(args: StatusArgs) -> Result<(), String> {
    let migrations = match &args.migrations {
        Some(path) => load_set(path)?.for_dialect(args.dialect),
        None => Vec::new(),
    };

    let ledger = open_ledger(&args.db)?;
    let lines = ledger
        .status(&migrations)
        .map_err(|e| format!("Failed to get migration status: {e}"))?;

    match args.format {
        CliOutputFormat::Table => print!("{}", format_status_table(&lines)),
        format => println!("{}", serialize(&lines, format)?),
    }
    Ok(())
}

fn run_history(args: HistoryArgs) -> Result<(), String> {
    let ledger = open_ledger(&args.db)?;
    let history = ledger
        .history()
        .map_err(|e| format!("Failed to read migration history: {e}"))?;

    match args.format {
        CliOutputFormat::Table => print!("{}", format_history_table(&history)),
        format => println!("{}", serialize(&history, format)?),
    }
    Ok(())
}

fn run_normalize(args: NormalizeArgs) -> Result<(), String> {
    let sql = fs::read_to_string(&args.input)
        .map_err(|e| format!("Failed to read '{}': {e}", args.input.display()))?;
    let parsed = parse(&sql).map_err(|e| format!("Failed to parse '{}': {e}", args.input.display()))?;

    let mut tables: Vec<&Table> = parsed.tables.iter().collect();
    tables.sort_by(|a, b| a.name.cmp(&b.name));

    for table in tables {
        match args.render {
            Some(dialect) => println!(
                "{}",
                table
                    .to_sql(dialect)
                    .map_err(|e| format!("Failed to render table '{}': {e}", table.name))?
            ),
            None => println!("{}", normalize::table(table)),
        }
    }
    for statement in &parsed.alter_statements {
        println!("{}", normalize::alter_statement(statement));
    }
    Ok(())
}

fn run_compile(args: CompileArgs) -> Result<(), String> {
    let params = parse_csv_list(&args.params);
    let declared: Vec<&str> = params.iter().map(String::as_str).collect();

    let compiled = NamedStatement::new(args.statement)
        .prepare(args.dialect, &declared)
        .map_err(|e| format!("Compile failed: {e}"))?;

    println!("{}", compiled.sql());
    let lookup: Vec<String> = compiled
        .lookup()
        .iter()
        .enumerate()
        .map(|(position, &i)| format!("{}={}", position + 1, declared[i]))
        .collect();
    println!("-- parameters: {}", lookup.join(", "));
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn open_ledger(db: &Path) -> Result<Ledger, String> {
    Ledger::open(db).map_err(|e| format!("Failed to open database '{}': {e}", db.display()))
}

fn load_set(path: &Path) -> Result<MigrationSet, String> {
    MigrationSet::load(path)
        .map_err(|e| format!("Failed to load migration set '{}': {e}", path.display()))
}

fn serialize<T: Serialize>(value: &T, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        CliOutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        CliOutputFormat::Table => Err("table output is not serializable".to_string()),
    }
}

fn state_label(state: &MigrationState) -> String {
    match state {
        MigrationState::Applied => "applied".to_string(),
        MigrationState::Pending => "pending".to_string(),
        MigrationState::Modified => "modified".to_string(),
        MigrationState::Dirty(status) => format!("dirty ({status})"),
        MigrationState::Unknown => "unknown".to_string(),
    }
}

fn format_status_table(lines: &[PlannedMigration]) -> String {
    let rows: Vec<[String; 4]> = lines
        .iter()
        .map(|l| {
            [
                l.group.clone(),
                l.version.to_string(),
                state_label(&l.state),
                l.script.clone(),
            ]
        })
        .collect();
    format_table(["GROUP", "VERSION", "STATE", "SCRIPT"], &rows)
}

fn format_history_table(history: &[MigrationStatusEntry]) -> String {
    let rows: Vec<[String; 6]> = history
        .iter()
        .map(|e| {
            [
                e.group.clone(),
                e.version.to_string(),
                e.status.to_string(),
                e.applied_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                format!("{}ms", e.duration.as_millis()),
                e.script.clone(),
            ]
        })
        .collect();
    format_table(
        ["GROUP", "VERSION", "STATUS", "APPLIED AT", "DURATION", "SCRIPT"],
        &rows,
    )
}

/// Left-aligned columns separated by two spaces; the last column is not
/// padded.
fn format_table<const N: usize>(header: [&str; N], rows: &[[String; N]]) -> String {
    let mut widths = header.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let mut push_row = |cells: Vec<&str>| {
        let mut line = String::new();
        for (i, cell) in cells.iter().enumerate() {
            if i + 1 == N {
                line.push_str(cell);
            } else {
                line.push_str(&format!("{cell:<width$}  ", width = widths[i]));
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    };

    push_row(header.to_vec());
    for row in rows {
        push_row(row.iter().map(String::as_str).collect());
    }
    out
}

fn parse_csv_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
