//! Event log of commands and ingestion runs, stored in `logs.duckdb`
//!
//! Each ingestion leaves one row naming the command, source and sheet, how
//! long the fetch took and either the record count or the error message.
//! Cell values, counterparties and amounts are never written.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use duckdb::{params, Connection, OptionalExt};
use serde::Serialize;

use crate::log_migrations::{BOOTSTRAP_MIGRATION, LOG_MIGRATIONS};
use crate::services::ingest::IngestOutcome;

pub const EVENT_COMMAND: &str = "command_executed";
pub const EVENT_INGEST_COMPLETED: &str = "ingest_completed";
pub const EVENT_INGEST_FAILED: &str = "ingest_failed";
pub const EVENT_INGEST_DISCARDED: &str = "ingest_discarded";

/// Where an ingestion came from, for the log
#[derive(Debug, Clone, Copy)]
pub struct IngestRun<'a> {
    pub command: &'a str,
    pub source: &'a str,
    pub sheet: &'a str,
    pub elapsed: Duration,
}

/// One stored row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub id: i64,
    pub logged_at_ms: i64,
    pub app_version: String,
    pub event: String,
    pub command: Option<String>,
    pub source: Option<String>,
    pub sheet: Option<String>,
    pub records: Option<i64>,
    pub duration_ms: Option<i64>,
    pub error_message: Option<String>,
}

impl LogEntry {
    pub fn is_failure(&self) -> bool {
        self.error_message.is_some()
    }
}

/// Ingestion history of one source and sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestStats {
    pub source: String,
    pub sheet: String,
    pub runs: i64,
    pub failures: i64,
    pub last_success_ms: Option<i64>,
    pub last_error: Option<String>,
}

impl IngestStats {
    /// Share of runs that failed, in percent
    pub fn failure_rate(&self) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        self.failures as f64 * 100.0 / self.runs as f64
    }
}

const ENTRY_COLUMNS: &str =
    "id, logged_at_ms, app_version, event, command, source, sheet, records, duration_ms, error_message";

fn read_entry(row: &duckdb::Row<'_>) -> duckdb::Result<LogEntry> {
    Ok(LogEntry {
        id: row.get(0)?,
        logged_at_ms: row.get(1)?,
        app_version: row.get(2)?,
        event: row.get(3)?,
        command: row.get(4)?,
        source: row.get(5)?,
        sheet: row.get(6)?,
        records: row.get(7)?,
        duration_ms: row.get(8)?,
        error_message: row.get(9)?,
    })
}

/// A row about to be inserted
#[derive(Default)]
struct NewEntry<'a> {
    event: &'a str,
    command: Option<&'a str>,
    source: Option<&'a str>,
    sheet: Option<&'a str>,
    records: Option<i64>,
    duration_ms: Option<i64>,
    error_message: Option<&'a str>,
}

/// Writer and reader for `logs.duckdb`
pub struct LoggingService {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    app_version: String,
}

impl LoggingService {
    /// Open `logs.duckdb` in `rateio_dir`, creating and migrating it as needed
    pub fn open(rateio_dir: &Path, app_version: impl Into<String>) -> Result<Self> {
        std::fs::create_dir_all(rateio_dir)
            .with_context(|| format!("Failed to create {}", rateio_dir.display()))?;
        let db_path = rateio_dir.join("logs.duckdb");
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open {}", db_path.display()))?;
        migrate(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
            app_version: app_version.into(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| anyhow!("Event log lock poisoned: {}", e))
    }

    fn insert(&self, entry: NewEntry<'_>) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO sys_logs (logged_at_ms, app_version, event, command, source, sheet, \
             records, duration_ms, error_message) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                Utc::now().timestamp_millis(),
                &self.app_version,
                entry.event,
                entry.command,
                entry.source,
                entry.sheet,
                entry.records,
                entry.duration_ms,
                entry.error_message,
            ],
        )?;
        Ok(())
    }

    /// Record that a command ran
    pub fn log_command(&self, command: &str) -> Result<()> {
        self.insert(NewEntry {
            event: EVENT_COMMAND,
            command: Some(command),
            ..Default::default()
        })
    }

    /// Record how an ingestion ended
    pub fn log_ingest(&self, run: IngestRun<'_>, outcome: &IngestOutcome) -> Result<()> {
        let base = NewEntry {
            command: Some(run.command),
            source: Some(run.source),
            sheet: Some(run.sheet),
            duration_ms: i64::try_from(run.elapsed.as_millis()).ok(),
            ..Default::default()
        };

        let entry = match outcome {
            IngestOutcome::Committed(snapshot) => NewEntry {
                event: EVENT_INGEST_COMPLETED,
                records: i64::try_from(snapshot.records.len()).ok(),
                ..base
            },
            IngestOutcome::Failed(message) => NewEntry {
                event: EVENT_INGEST_FAILED,
                error_message: Some(message),
                ..base
            },
            IngestOutcome::Discarded => NewEntry {
                event: EVENT_INGEST_DISCARDED,
                ..base
            },
        };
        self.insert(entry)
    }

    /// Newest entries first; `failures_only` keeps rows with an error
    pub fn recent(&self, limit: usize, failures_only: bool) -> Result<Vec<LogEntry>> {
        let filter = if failures_only { "WHERE error_message IS NOT NULL" } else { "" };
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM sys_logs {filter} ORDER BY id DESC LIMIT ?");
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let entries = stmt
            .query_map([limit], read_entry)?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Runs and failures per source and sheet, most failing first
    ///
    /// Discarded runs are left out: they say nothing about the source.
    pub fn ingest_stats(&self) -> Result<Vec<IngestStats>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT source, sheet, \
                    COUNT(*), \
                    COUNT(*) FILTER (WHERE event = ?), \
                    MAX(logged_at_ms) FILTER (WHERE event = ?), \
                    arg_max(error_message, id) FILTER (WHERE event = ?) \
             FROM sys_logs \
             WHERE event IN (?, ?) AND source IS NOT NULL AND sheet IS NOT NULL \
             GROUP BY source, sheet \
             ORDER BY 4 DESC, 3 DESC, source, sheet",
        )?;
        let stats = stmt
            .query_map(
                params![
                    EVENT_INGEST_FAILED,
                    EVENT_INGEST_COMPLETED,
                    EVENT_INGEST_FAILED,
                    EVENT_INGEST_COMPLETED,
                    EVENT_INGEST_FAILED,
                ],
                |row| {
                    Ok(IngestStats {
                        source: row.get(0)?,
                        sheet: row.get(1)?,
                        runs: row.get(2)?,
                        failures: row.get(3)?,
                        last_success_ms: row.get(4)?,
                        last_error: row.get(5)?,
                    })
                },
            )?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(stats)
    }

    /// Number of stored entries
    pub fn count(&self) -> Result<i64> {
        let count = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM sys_logs", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete entries older than `older_than`, or all of them
    pub fn prune(&self, older_than: Option<Duration>) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = match older_than {
            Some(age) => {
                let age_ms = i64::try_from(age.as_millis()).unwrap_or(i64::MAX);
                let cutoff = Utc::now().timestamp_millis().saturating_sub(age_ms);
                conn.execute("DELETE FROM sys_logs WHERE logged_at_ms < ?", [cutoff])?
            }
            None => conn.execute("DELETE FROM sys_logs", [])?,
        };
        Ok(deleted)
    }
}

/// Apply every embedded migration not yet listed in `sys_migrations`
fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(BOOTSTRAP_MIGRATION)
        .context("Failed to prepare the event log")?;

    for &(name, sql) in LOG_MIGRATIONS {
        let applied = conn
            .query_row(
                "SELECT 1 FROM sys_migrations WHERE migration_name = ?",
                [name],
                |row| row.get::<_, i32>(0),
            )
            .optional()?
            .is_some();
        if applied {
            continue;
        }

        tracing::debug!(migration = name, "applying event log migration");
        conn.execute_batch(sql)
            .with_context(|| format!("Event log migration {} failed", name))?;
        conn.execute("INSERT INTO sys_migrations (migration_name) VALUES (?)", [name])?;
    }
    Ok(())
}
