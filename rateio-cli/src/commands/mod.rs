//! CLI command implementations

pub mod branches;
pub mod config;
pub mod cost_centers;
pub mod drilldown;
pub mod logs;
pub mod reconcile;
pub mod report;
pub mod summary;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use rateio_core::config::ENV_DIR;
use rateio_core::{IngestOutcome, IngestRun, LoggingService, RateioContext, SheetConfig, Snapshot};
use serde_json::{json, Value};

/// Where to read the sheet from and which year to keep
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Read a local CSV export instead of the configured endpoint
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Keep only records from this year
    #[arg(long, conflicts_with = "all_years")]
    pub year: Option<i32>,
    /// Ignore the configured year filter
    #[arg(long)]
    pub all_years: bool,
}

impl SourceArgs {
    /// Year filter requested on the command line, if any
    pub fn year_override(&self) -> Option<Option<i32>> {
        if self.all_years {
            Some(None)
        } else {
            self.year.map(Some)
        }
    }
}

/// Open the event log, or None if it cannot be opened
pub fn get_logger() -> Option<LoggingService> {
    match LoggingService::open(&get_rateio_dir(), env!("CARGO_PKG_VERSION")) {
        Ok(logger) => Some(logger),
        Err(e) => {
            tracing::debug!(error = %e, "event log unavailable");
            None
        }
    }
}

/// Write to the event log; failures are reported at debug level only
pub fn log_quietly(logger: &Option<LoggingService>, write: impl FnOnce(&LoggingService) -> Result<()>) {
    if let Some(logger) = logger {
        if let Err(e) = write(logger) {
            tracing::debug!(error = %e, "event log write failed");
        }
    }
}

/// Get the rateio directory from environment or default
pub fn get_rateio_dir() -> PathBuf {
    match std::env::var(ENV_DIR) {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".rateio"),
    }
}

/// A committed snapshot and the sheet selection it was read with
pub struct LoadedSheet {
    pub snapshot: Arc<Snapshot>,
    pub sheet: SheetConfig,
}

impl LoadedSheet {
    /// Print a one-line note about the data behind a report
    pub fn print_note(&self) {
        let mut note = format!("{} records from '{}'", self.snapshot.records.len(), self.sheet.sheet_name);
        if let Some(year) = self.sheet.year_filter {
            note.push_str(&format!(", year {}", year));
        }
        if let Some(fetched_at) = self.snapshot.fetched_at {
            note.push_str(&format!(", fetched {}", fetched_at.format("%Y-%m-%d %H:%M:%S UTC")));
        }
        println!("{}", note.dimmed());
    }

    /// Context attached to `--json` output
    pub fn json_context(&self) -> BTreeMap<String, Value> {
        BTreeMap::from([
            ("sheet".to_string(), json!(self.sheet.sheet_name)),
            ("range".to_string(), json!(self.sheet.cell_range)),
            ("yearFilter".to_string(), json!(self.sheet.year_filter)),
            ("records".to_string(), json!(self.snapshot.records.len())),
            ("fetchedAt".to_string(), json!(self.snapshot.fetched_at.map(|t| t.to_rfc3339()))),
        ])
    }
}

/// Ingest the sheet once and return the committed snapshot
pub fn load_snapshot(command: &str, source: &SourceArgs) -> Result<LoadedSheet> {
    let logger = get_logger();
    log_quietly(&logger, |l| l.log_command(command));

    let rateio_dir = get_rateio_dir();
    let ctx = RateioContext::new(&rateio_dir, source.file.as_deref())?;
    let service = &ctx.ingest_service;

    let mut sheet = service.sheet_config();
    if let Some(year) = source.year_override() {
        sheet.year_filter = year;
    }
    let requested = sheet.clone();

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let started = Instant::now();
    let outcome = runtime.block_on(service.reconfigure(sheet));

    let run = IngestRun {
        command,
        source: service.source_name(),
        sheet: &requested.sheet_name,
        elapsed: started.elapsed(),
    };
    log_quietly(&logger, |l| l.log_ingest(run, &outcome));

    match outcome {
        IngestOutcome::Committed(snapshot) => Ok(LoadedSheet {
            snapshot,
            sheet: requested,
        }),
        IngestOutcome::Failed(message) => {
            anyhow::bail!("Failed to load sheet '{}': {}", requested.sheet_name, message)
        }
        IngestOutcome::Discarded => anyhow::bail!("Sheet load was superseded before it finished"),
    }
}
