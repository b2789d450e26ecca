//! Logs command - ingestion history from the event log

use std::time::Duration;

use anyhow::Result;
use chrono::{Local, TimeZone};
use clap::Subcommand;
use colored::Colorize;
use comfy_table::{Cell, CellAlignment};
use dialoguer::Confirm;
use rateio_core::{LogEntry, LoggingService};
use serde_json::json;

use super::get_rateio_dir;
use crate::output::{create_table, format_percent, info, print_json, success};

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show the latest commands and ingestion runs
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "30")]
        limit: usize,
        /// Only failed ingestions
        #[arg(long)]
        failures: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete log entries
    Clear {
        /// Keep entries from the last N days
        #[arg(long)]
        older_than_days: Option<u32>,
        /// Do not ask for confirmation
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ingestion runs and failures per source and sheet
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl LogsCommands {
    pub fn json(&self) -> bool {
        match self {
            LogsCommands::List { json, .. } | LogsCommands::Clear { json, .. } | LogsCommands::Stats { json } => *json,
        }
    }
}

fn local_time(ms: i64) -> String {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map(|t| t.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// What happened, in one cell
fn describe(entry: &LogEntry) -> String {
    let target = match (entry.source.as_deref(), entry.sheet.as_deref()) {
        (Some(source), Some(sheet)) => format!("{} '{}'", source, sheet),
        _ => String::new(),
    };
    match (&entry.error_message, entry.records) {
        (Some(error), _) => format!("{}: {}", target, error.red()),
        (None, Some(records)) => format!("{}: {} records", target, records),
        (None, None) => target,
    }
}

pub fn run(command: LogsCommands) -> Result<()> {
    let log = LoggingService::open(&get_rateio_dir(), env!("CARGO_PKG_VERSION"))?;

    match command {
        LogsCommands::List { limit, failures, json } => {
            let entries = log.recent(limit, failures)?;
            if json {
                return print_json(&entries);
            }
            if entries.is_empty() {
                info("The event log is empty.");
                return Ok(());
            }

            let mut table = create_table();
            table.set_header(vec!["When", "Command", "Event", "Details", "Took"]);
            for entry in &entries {
                table.add_row(vec![
                    Cell::new(local_time(entry.logged_at_ms)),
                    Cell::new(entry.command.as_deref().unwrap_or("")),
                    Cell::new(&entry.event),
                    Cell::new(describe(entry)),
                    Cell::new(entry.duration_ms.map(|ms| format!("{} ms", ms)).unwrap_or_default())
                        .set_alignment(CellAlignment::Right),
                ]);
            }
            println!("{}", table);
        }
        LogsCommands::Clear { older_than_days, force, json } => {
            if !force && !json {
                let prompt = match older_than_days {
                    Some(days) => format!("Delete event log entries older than {} days?", days),
                    None => "Delete the whole event log?".to_string(),
                };
                if !Confirm::new().with_prompt(prompt).default(false).interact()? {
                    info("Nothing deleted.");
                    return Ok(());
                }
            }

            let age = older_than_days.map(|days| Duration::from_secs(u64::from(days) * 24 * 60 * 60));
            let deleted = log.prune(age)?;
            if json {
                return print_json(json!({ "deleted": deleted }));
            }
            success(&format!("Deleted {} entries", deleted));
        }
        LogsCommands::Stats { json } => {
            let stats = log.ingest_stats()?;
            if json {
                return print_json(json!({
                    "entries": log.count()?,
                    "databasePath": log.db_path().to_string_lossy(),
                    "sources": stats,
                }));
            }

            println!("{}", "Ingestion History".bold());
            if stats.is_empty() {
                info("No ingestions recorded yet.");
            } else {
                let mut table = create_table();
                table.set_header(vec!["Source", "Sheet", "Runs", "Failed", "Last success", "Last error"]);
                for s in &stats {
                    let failed = format!("{} ({})", s.failures, format_percent(s.failure_rate()));
                    let failed = if s.failures > 0 { failed.red().to_string() } else { failed };
                    table.add_row(vec![
                        Cell::new(&s.source),
                        Cell::new(&s.sheet),
                        Cell::new(s.runs).set_alignment(CellAlignment::Right),
                        Cell::new(failed).set_alignment(CellAlignment::Right),
                        Cell::new(s.last_success_ms.map(local_time).unwrap_or_else(|| "never".to_string())),
                        Cell::new(s.last_error.as_deref().unwrap_or("")),
                    ]);
                }
                println!("{}", table);
            }
            println!(
                "{}",
                format!("{} entries in {}", log.count()?, log.db_path().display()).dimmed()
            );
        }
    }

    Ok(())
}
