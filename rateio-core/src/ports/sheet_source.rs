//! Sheet source port
//!
//! Defines where the raw CSV payload of the allocation sheet comes from
//! (a deployed spreadsheet web endpoint, a local export, a fixed string).

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::SheetConfig;

/// Source of raw CSV text
///
/// Implementations only move bytes: they never interpret cells. Any
/// transport problem, non-success response or non-CSV body is reported
/// as [`Error::Fetch`](crate::domain::result::Error::Fetch).
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Source name used in logs (e.g. "http", "file")
    fn name(&self) -> &str;

    /// Fetch the CSV text for the requested sheet and range
    async fn fetch(&self, sheet: &SheetConfig) -> Result<String>;
}
