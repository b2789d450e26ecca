//! Published, read-only ingestion state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AggregateView, FooterTotals, SummaryBlockSet, TransactionRecord};

/// The value consumers observe
///
/// A snapshot is never edited after it is published; each state change
/// (loading, committed, failed) produces a new one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Id of the ingestion whose data is held (None before the first success)
    pub ingestion_id: Option<Uuid>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub loading: bool,
    pub error: Option<String>,
    pub footer: FooterTotals,
    pub summary: SummaryBlockSet,
    pub records: Vec<TransactionRecord>,
    pub view: AggregateView,
}

impl Snapshot {
    /// Copy of this snapshot flagged as loading, with the error cleared
    pub fn loading(&self) -> Self {
        Self {
            loading: true,
            error: None,
            ..self.clone()
        }
    }

    /// Copy of this snapshot carrying a fetch error; data is left untouched
    pub fn failed(&self, error: impl Into<String>) -> Self {
        Self {
            loading: false,
            error: Some(error.into()),
            ..self.clone()
        }
    }

    /// Copy of this snapshot with `loading` cleared and nothing else changed
    pub fn settled(&self) -> Self {
        Self {
            loading: false,
            ..self.clone()
        }
    }

    pub fn has_data(&self) -> bool {
        self.ingestion_id.is_some()
    }
}
