//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod aggregate;
mod footer;
mod sheet;
mod snapshot;
mod summary;
mod transaction;
pub mod result;

pub use aggregate::{AggregateView, BranchShare, MonthBranchTotal, RankedTotal};
pub use footer::{FooterSource, FooterTotals};
pub use sheet::{SheetConfig, DEFAULT_CELL_RANGE, DEFAULT_SHEET_NAME};
pub use snapshot::Snapshot;
pub use summary::{BranchSpend, SummaryBlockSet};
pub use transaction::TransactionRecord;
