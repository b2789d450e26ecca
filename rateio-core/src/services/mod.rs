//! Service layer - business logic orchestration
//!
//! Aggregation, drilldown and reconciliation are pure functions over parsed
//! records. `IngestService` drives a sheet source and publishes snapshots;
//! `LoggingService` records commands and ingestion runs.

pub mod aggregate;
pub mod drilldown;
pub mod ingest;
pub mod logging;
pub mod reconcile;

pub use aggregate::aggregate;
pub use drilldown::{
    cost_center_branch_breakdown, cost_center_options, cost_centers_by_month, BranchSlice,
    CostCenterBreakdown, DrilldownOptions,
};
pub use ingest::{IngestOutcome, IngestService};
pub use logging::{IngestRun, IngestStats, LogEntry, LoggingService};
pub use reconcile::{reconcile, CheckKind, ReconciliationCheck, ReconciliationReport, TOLERANCE};
