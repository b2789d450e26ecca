//! Ingest service - fetch, parse and publish snapshots
//!
//! One ingestion fetches the payload (the only suspension point), then
//! parses, normalizes and aggregates synchronously. Results are published
//! as whole `Arc<Snapshot>` values on a `watch` channel.
//!
//! Every refresh takes a ticket from a generation counter. A result is only
//! published while its ticket is still the newest, so an ingestion that was
//! superseded by a later refresh (or a reconfiguration) is dropped when it
//! completes. A refresh future dropped mid-fetch clears the `loading` flag
//! it raised, unless a newer refresh has taken over.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::Utc;
use tokio::sync::watch;
use uuid::Uuid;

use crate::domain::{SheetConfig, Snapshot};
use crate::parse::parse_sheet;
use crate::ports::SheetSource;
use crate::services::aggregate::aggregate;

/// How a refresh ended
#[derive(Debug, Clone)]
pub enum IngestOutcome {
    /// New data was published
    Committed(Arc<Snapshot>),
    /// A newer refresh started before this one finished
    Discarded,
    /// The fetch failed; the published snapshot keeps its previous data
    Failed(String),
}

impl IngestOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, IngestOutcome::Committed(_))
    }
}

/// Owns the published snapshot and runs ingestions against one source
pub struct IngestService {
    source: Arc<dyn SheetSource>,
    sheet: RwLock<SheetConfig>,
    generation: AtomicU64,
    state: watch::Sender<Arc<Snapshot>>,
}

impl IngestService {
    pub fn new(source: Arc<dyn SheetSource>, sheet: SheetConfig) -> Self {
        let (state, _) = watch::channel(Arc::new(Snapshot::default()));
        Self {
            source,
            sheet: RwLock::new(sheet),
            generation: AtomicU64::new(0),
            state,
        }
    }

    /// Name of the underlying source
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Receive every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.state.subscribe()
    }

    /// The currently published snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.state.borrow().clone()
    }

    /// Sheet selection used by the next refresh
    pub fn sheet_config(&self) -> SheetConfig {
        match self.sheet.read() {
            Ok(sheet) => sheet.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the sheet selection and start a new ingestion
    ///
    /// Any ingestion still in flight is superseded.
    pub async fn reconfigure(&self, sheet: SheetConfig) -> IngestOutcome {
        match self.sheet.write() {
            Ok(mut current) => *current = sheet,
            Err(poisoned) => *poisoned.into_inner() = sheet,
        }
        self.refresh().await
    }

    /// Change only the year filter and re-ingest
    pub async fn set_year_filter(&self, year: Option<i32>) -> IngestOutcome {
        let sheet = self.sheet_config().with_year_filter(year);
        self.reconfigure(sheet).await
    }

    /// Run one ingestion
    pub async fn refresh(&self) -> IngestOutcome {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let sheet = self.sheet_config();

        self.publish(ticket, |current| current.loading());
        let _cancel = CancelGuard { service: self, ticket };

        tracing::debug!(ticket, source = self.source.name(), sheet = %sheet.sheet_name, "ingestion started");
        let fetched = self.source.fetch(&sheet).await;

        if !self.is_current(ticket) {
            tracing::debug!(ticket, "ingestion superseded, result dropped");
            return IngestOutcome::Discarded;
        }

        let text = match fetched {
            Ok(text) => text,
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(ticket, error = %message, "ingestion failed");
                let published = self.publish(ticket, |current| current.failed(message.clone()));
                return if published {
                    IngestOutcome::Failed(message)
                } else {
                    IngestOutcome::Discarded
                };
            }
        };

        let parsed = parse_sheet(&text, sheet.year_filter);
        let view = aggregate(&parsed.records);
        let snapshot = Arc::new(Snapshot {
            ingestion_id: Some(Uuid::new_v4()),
            fetched_at: Some(Utc::now()),
            loading: false,
            error: None,
            footer: parsed.footer,
            summary: parsed.summary,
            records: parsed.records,
            view,
        });

        let committed = Arc::clone(&snapshot);
        if self.publish_arc(ticket, move || committed) {
            tracing::info!(
                ticket,
                records = snapshot.records.len(),
                months = snapshot.view.months.len(),
                branches = snapshot.view.branches.len(),
                "ingestion committed"
            );
            IngestOutcome::Committed(snapshot)
        } else {
            tracing::debug!(ticket, "ingestion superseded during parse, result dropped");
            IngestOutcome::Discarded
        }
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    /// Publish a snapshot derived from the current one, if `ticket` is newest
    fn publish(&self, ticket: u64, derive: impl FnOnce(&Snapshot) -> Snapshot) -> bool {
        self.state.send_if_modified(|current| {
            if !self.is_current(ticket) {
                return false;
            }
            *current = Arc::new(derive(current));
            true
        })
    }

    fn publish_arc(&self, ticket: u64, make: impl FnOnce() -> Arc<Snapshot>) -> bool {
        self.state.send_if_modified(|current| {
            if !self.is_current(ticket) {
                return false;
            }
            *current = make();
            true
        })
    }
}

/// Settles the loading snapshot of a refresh that never reached a result
struct CancelGuard<'a> {
    service: &'a IngestService,
    ticket: u64,
}

impl Drop for CancelGuard<'_> {
    fn drop(&mut self) {
        let cancelled = self.service.state.send_if_modified(|current| {
            if !current.loading || !self.service.is_current(self.ticket) {
                return false;
            }
            *current = Arc::new(current.settled());
            true
        });
        if cancelled {
            tracing::debug!(ticket = self.ticket, "ingestion cancelled before it finished");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemorySheetSource;
    use crate::domain::result::Result as CoreResult;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::time::Duration;

    /// A source whose fetch never completes
    struct StalledSource;

    #[async_trait]
    impl SheetSource for StalledSource {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn fetch(&self, _sheet: &SheetConfig) -> CoreResult<String> {
            std::future::pending().await
        }
    }

    const SHEET: &str = "\
Data,Mês,Fornecedor,Centro,Valor,Rateado,Cod,Filial
05/06/2025,6,ACME,CC1,100,40,001,Branch A
05/07/2025,7,ACME,CC1,200,80,001,Branch A
05/06/2024,6,ACME,CC2,50,10,002,Branch B
";

    fn service(source: Arc<MemorySheetSource>) -> IngestService {
        IngestService::new(source, SheetConfig::default())
    }

    #[tokio::test]
    async fn test_initial_snapshot_is_empty() {
        let svc = service(Arc::new(MemorySheetSource::new(SHEET)));
        let snap = svc.snapshot();
        assert!(!snap.has_data());
        assert!(!snap.loading);
        assert!(snap.error.is_none());
    }

    #[tokio::test]
    async fn test_refresh_commits() {
        let svc = service(Arc::new(MemorySheetSource::new(SHEET)));
        let mut rx = svc.subscribe();

        let outcome = svc.refresh().await;
        assert!(outcome.is_committed());

        assert!(rx.has_changed().unwrap());
        let snap = rx.borrow_and_update().clone();
        assert!(snap.has_data());
        assert!(!snap.loading);
        assert_eq!(snap.records.len(), 3);
        assert_eq!(snap.view.total_allocated, Decimal::from(130));
        assert!(snap.fetched_at.is_some());
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_data() {
        let source = Arc::new(MemorySheetSource::new(SHEET));
        let svc = service(Arc::clone(&source));
        svc.refresh().await;
        let before = svc.snapshot();

        source.set_error("HTTP 503");
        let outcome = svc.refresh().await;
        assert!(matches!(outcome, IngestOutcome::Failed(ref m) if m.contains("HTTP 503")));

        let after = svc.snapshot();
        assert!(!after.loading);
        assert_eq!(after.error.as_deref(), Some("Fetch error: HTTP 503"));
        assert_eq!(after.ingestion_id, before.ingestion_id);
        assert_eq!(after.records, before.records);
    }

    #[tokio::test]
    async fn test_success_clears_error() {
        let source = Arc::new(MemorySheetSource::failing("offline"));
        let svc = service(Arc::clone(&source));
        svc.refresh().await;
        assert!(svc.snapshot().error.is_some());

        source.set_payload(SHEET);
        svc.refresh().await;
        let snap = svc.snapshot();
        assert!(snap.error.is_none());
        assert!(snap.has_data());
    }

    #[tokio::test]
    async fn test_reconfigure_applies_year_filter() {
        let source = Arc::new(MemorySheetSource::new(SHEET));
        let svc = service(Arc::clone(&source));
        svc.refresh().await;
        assert_eq!(svc.snapshot().records.len(), 3);

        svc.set_year_filter(Some(2025)).await;
        let snap = svc.snapshot();
        assert_eq!(snap.records.len(), 2);
        assert_eq!(snap.view.branches, vec!["Branch A".to_string()]);
        assert_eq!(svc.sheet_config().year_filter, Some(2025));
        assert_eq!(source.requests().last().and_then(|s| s.year_filter), Some(2025));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_refresh_clears_loading() {
        let svc = IngestService::new(Arc::new(StalledSource), SheetConfig::default());
        let mut rx = svc.subscribe();

        let timed_out = tokio::time::timeout(Duration::from_secs(30), svc.refresh()).await;
        assert!(timed_out.is_err());

        assert!(rx.has_changed().unwrap());
        let snap = rx.borrow_and_update().clone();
        assert!(!snap.loading);
        assert!(snap.error.is_none());
        assert!(!snap.has_data());
    }

    #[tokio::test]
    async fn test_completed_refresh_is_not_touched_by_cancel_guard() {
        let source = Arc::new(MemorySheetSource::failing("offline"));
        let svc = service(Arc::clone(&source));
        svc.refresh().await;

        let snap = svc.snapshot();
        assert!(!snap.loading);
        assert_eq!(snap.error.as_deref(), Some("Fetch error: offline"));
    }
}
