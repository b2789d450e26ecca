//! Rateio CLI - branch allocation dashboard in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::{branches, config, cost_centers, drilldown, logs, reconcile, report, summary, SourceArgs};

/// Rateio - expense allocation across branches, read from a spreadsheet
#[derive(Parser)]
#[command(name = "rateio", version, about, long_about = None)]
struct Cli {
    /// Print diagnostic logs to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Overview: totals, months, footer and per-month totals
    Report {
        #[command(flatten)]
        source: SourceArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Allocated spend per branch, overall or for one month
    Branches {
        #[command(flatten)]
        source: SourceArgs,
        /// Only this month (1-12)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Allocated spend per cost center
    CostCenters {
        #[command(flatten)]
        source: SourceArgs,
        /// Only this month (1-12)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        /// Keep only the N largest cost centers
        #[arg(long)]
        top: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Split one cost center's spend in a month across branches
    Drilldown {
        #[command(flatten)]
        source: SourceArgs,
        /// Month (1-12); omit to list what can be drilled into
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        /// Cost center name
        #[arg(long)]
        cost_center: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the totals written in the sheet's summary blocks
    Summary {
        #[command(flatten)]
        source: SourceArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare sheet totals with recomputed ones
    Reconcile {
        #[command(flatten)]
        source: SourceArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: Option<config::ConfigCommands>,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    /// Whether the command was asked for JSON output
    fn json(&self) -> bool {
        match self {
            Commands::Report { json, .. }
            | Commands::Branches { json, .. }
            | Commands::CostCenters { json, .. }
            | Commands::Drilldown { json, .. }
            | Commands::Summary { json, .. }
            | Commands::Reconcile { json, .. } => *json,
            Commands::Config { command } => command.as_ref().is_some_and(|c| c.json()),
            Commands::Logs { command } => command.json(),
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "rateio_core=debug,rateio=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json = cli.command.json();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = format!("{:#}", e);
            match output::json_failure(&message) {
                Ok(envelope) if json => println!("{}", envelope),
                _ => output::error(&message),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Report { source, json } => report::run(&source, json),
        Commands::Branches { source, month, json } => branches::run(&source, month, json),
        Commands::CostCenters { source, month, top, json } => cost_centers::run(&source, month, top, json),
        Commands::Drilldown { source, month, cost_center, json } => {
            drilldown::run(&source, month, cost_center.as_deref(), json)
        }
        Commands::Summary { source, json } => summary::run(&source, json),
        Commands::Reconcile { source, json } => reconcile::run(&source, json),
        Commands::Config { command } => config::run(command),
        Commands::Logs { command } => logs::run(command),
    }
}
