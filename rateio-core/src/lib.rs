//! Rateio Core - ingestion and aggregation of branch allocation spreadsheets
//!
//! The crate follows a hexagonal layout:
//!
//! - **domain**: records, totals, snapshots and the error types
//! - **parse**: locale-aware number/date parsing, footer detection,
//!   summary-block scanning and row normalization
//! - **ports**: trait for sheet sources
//! - **adapters**: HTTP endpoint, local file and in-memory sources
//! - **services**: aggregation, drilldown, reconciliation, ingestion and the
//!   event log

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod parse;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::{FileSheetSource, HttpSheetSource};
use config::Config;
use ports::SheetSource;

pub use domain::result::{Error, OperationResult};
pub use domain::{
    AggregateView, BranchShare, FooterSource, FooterTotals, MonthBranchTotal, RankedTotal,
    SheetConfig, Snapshot, SummaryBlockSet, TransactionRecord,
};
pub use parse::{parse_sheet, ParsedSheet};
pub use services::{
    IngestOutcome, IngestRun, IngestService, IngestStats, LogEntry, LoggingService,
    ReconciliationReport,
};

/// Main context for rateio operations
///
/// Holds the resolved configuration and the ingest service wired to the
/// right sheet source.
pub struct RateioContext {
    pub config: Config,
    pub ingest_service: IngestService,
}

impl RateioContext {
    /// Build a context from the rateio directory
    ///
    /// `file` reads a local CSV export instead of the configured endpoint.
    pub fn new(rateio_dir: &Path, file: Option<&Path>) -> Result<Self> {
        let config = Config::load(rateio_dir).context("Failed to load settings")?;

        let source: Arc<dyn SheetSource> = match file {
            Some(path) => Arc::new(FileSheetSource::new(path)),
            None => {
                let endpoint = config.endpoint.as_deref().with_context(|| {
                    format!(
                        "No endpoint configured. Run `rateio config set endpoint <url>`, set {} or pass --file",
                        config::ENV_ENDPOINT
                    )
                })?;
                Arc::new(HttpSheetSource::new(endpoint)?)
            }
        };

        Ok(Self::with_source(config, source))
    }

    /// Build a context around an explicit source
    pub fn with_source(config: Config, source: Arc<dyn SheetSource>) -> Self {
        let ingest_service = IngestService::new(source, config.sheet_config());
        Self { config, ingest_service }
    }
}
