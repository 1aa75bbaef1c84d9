//! Inventory fetching
//!
//! One request per load, results applied to an [`InventorySurface`] in a fixed
//! order: loading first, then exactly one of the empty state or the table.

use crate::notify::{Notifier, ToastLevel};
use crate::row::{render_row, InventoryStats, RowView};
use chrono::{DateTime, Utc};
use cloudx_api::{ApiError, ContainerBackend, ContainerRecord};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Error produced by an inventory load
pub type FetchError = ApiError;

/// Display surface for the inventory view
pub trait InventorySurface {
    /// Show the loading indicator, hiding both result states
    fn show_loading(&mut self);

    /// Refresh the header counters
    fn update_stats(&mut self, stats: InventoryStats);

    /// Show the empty state. `error` is set when the load failed.
    fn show_empty(&mut self, error: Option<&FetchError>);

    /// Show the table with these rows, in order
    fn show_table(&mut self, rows: Vec<RowView>);
}

/// What the inventory area currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryPanel {
    Loading,
    Empty,
    /// Empty state carrying the load error and a retry affordance
    Failed(String),
    Table(Vec<RowView>),
}

/// In-memory surface; the state a front end renders from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryState {
    pub panel: InventoryPanel,
    pub stats: InventoryStats,
}

impl Default for InventoryState {
    fn default() -> Self {
        Self {
            panel: InventoryPanel::Loading,
            stats: InventoryStats::default(),
        }
    }
}

impl InventoryState {
    pub fn is_loading(&self) -> bool {
        matches!(self.panel, InventoryPanel::Loading)
    }

    pub fn is_empty_visible(&self) -> bool {
        matches!(self.panel, InventoryPanel::Empty | InventoryPanel::Failed(_))
    }

    pub fn is_table_visible(&self) -> bool {
        matches!(self.panel, InventoryPanel::Table(_))
    }

    /// Rows currently on screen, empty unless the table is visible
    pub fn rows(&self) -> &[RowView] {
        match &self.panel {
            InventoryPanel::Table(rows) => rows,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.panel {
            InventoryPanel::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

impl InventorySurface for InventoryState {
    fn show_loading(&mut self) {
        self.panel = InventoryPanel::Loading;
    }

    fn update_stats(&mut self, stats: InventoryStats) {
        self.stats = stats;
    }

    fn show_empty(&mut self, error: Option<&FetchError>) {
        self.panel = match error {
            Some(e) => InventoryPanel::Failed(e.to_string()),
            None => InventoryPanel::Empty,
        };
    }

    fn show_table(&mut self, rows: Vec<RowView>) {
        self.panel = InventoryPanel::Table(rows);
    }
}

/// Generation of an inventory load. Results from an older generation than the
/// last applied one are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct InventoryTicket(u64);

/// Loads the container inventory from the backend
#[derive(Clone)]
pub struct InventoryFetcher {
    backend: Arc<dyn ContainerBackend>,
    notifier: Arc<dyn Notifier>,
    issued: Arc<AtomicU64>,
    applied: Arc<AtomicU64>,
}

impl InventoryFetcher {
    pub fn new(backend: Arc<dyn ContainerBackend>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            backend,
            notifier,
            issued: Arc::new(AtomicU64::new(0)),
            applied: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Load the inventory and apply it to `surface`.
    ///
    /// The error is also reported on the surface and through the notifier, so
    /// callers only need the return value when they want the raw records.
    pub async fn load<S>(&self, surface: &mut S) -> Result<Vec<ContainerRecord>, FetchError>
    where
        S: InventorySurface + ?Sized,
    {
        let ticket = self.begin(surface);
        let result = self.fetch().await;
        self.apply(ticket, &result, surface, Utc::now());
        result
    }

    /// Start a load: show the loading state and hand out a ticket
    pub fn begin<S>(&self, surface: &mut S) -> InventoryTicket
    where
        S: InventorySurface + ?Sized,
    {
        surface.show_loading();
        InventoryTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// The network half of a load; touches no surface
    pub async fn fetch(&self) -> Result<Vec<ContainerRecord>, FetchError> {
        self.backend.list().await
    }

    /// Apply a finished load. Returns false when the result was stale and dropped.
    pub fn apply<S>(
        &self,
        ticket: InventoryTicket,
        result: &Result<Vec<ContainerRecord>, FetchError>,
        surface: &mut S,
        now: DateTime<Utc>,
    ) -> bool
    where
        S: InventorySurface + ?Sized,
    {
        let previous = self.applied.fetch_max(ticket.0, Ordering::SeqCst);
        if previous >= ticket.0 {
            tracing::debug!(
                "Dropping stale inventory response (generation {}, latest {})",
                ticket.0,
                previous
            );
            return false;
        }

        match result {
            Ok(records) => {
                tracing::debug!("Loaded {} containers", records.len());
                surface.update_stats(InventoryStats::from_records(records));
                if records.is_empty() {
                    surface.show_empty(None);
                } else {
                    surface.show_table(records.iter().map(|r| render_row(r, now)).collect());
                }
            }
            Err(e) => {
                tracing::warn!("Error loading containers: {}", e);
                surface.show_empty(Some(e));
                self.notifier.notify(
                    &format!("Failed to load containers: {}", e),
                    ToastLevel::Error,
                );
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{record, MockBackend, RecordingNotifier, RecordingSurface, SurfaceCall};

    fn fetcher(backend: &Arc<MockBackend>, notifier: &Arc<RecordingNotifier>) -> InventoryFetcher {
        InventoryFetcher::new(backend.clone(), notifier.clone())
    }

    #[tokio::test]
    async fn test_load_shows_loading_then_table() {
        let backend = Arc::new(MockBackend::with_containers(vec![
            record("a", "web", "running"),
            record("b", "db", "exited"),
        ]));
        let notifier = Arc::new(RecordingNotifier::default());
        let mut surface = RecordingSurface::default();

        let records = fetcher(&backend, &notifier).load(&mut surface).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(surface.calls[0], SurfaceCall::Loading);
        assert!(matches!(surface.calls[1], SurfaceCall::Stats(_)));
        assert!(matches!(&surface.calls[2], SurfaceCall::Table(ids) if ids == &["a", "b"]));
        assert_eq!(surface.calls.len(), 3);
        assert!(notifier.toasts().is_empty());
    }

    #[tokio::test]
    async fn test_error_shows_empty_state_and_notifies() {
        let backend = Arc::new(MockBackend::new());
        backend.set_list_result(Err(ApiError::Backend("daemon down".to_string())));
        let notifier = Arc::new(RecordingNotifier::default());
        let mut state = InventoryState::default();

        let err = fetcher(&backend, &notifier).load(&mut state).await.unwrap_err();

        assert_eq!(err.to_string(), "daemon down");
        assert_eq!(state.panel, InventoryPanel::Failed("daemon down".to_string()));
        assert!(!state.is_loading());
        assert!(state.is_empty_visible());
        assert!(!state.is_table_visible());
        assert_eq!(
            notifier.messages(),
            vec!["Failed to load containers: daemon down".to_string()]
        );
    }

    #[tokio::test]
    async fn test_stale_result_is_dropped() {
        let backend = Arc::new(MockBackend::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let fetcher = fetcher(&backend, &notifier);
        let mut state = InventoryState::default();

        let first = fetcher.begin(&mut state);
        let second = fetcher.begin(&mut state);

        let newer = Ok(vec![record("new", "fresh", "running")]);
        assert!(fetcher.apply(second, &newer, &mut state, Utc::now()));

        let older = Ok(vec![]);
        assert!(!fetcher.apply(first, &older, &mut state, Utc::now()));

        assert_eq!(state.rows().len(), 1);
        assert_eq!(state.rows()[0].id, "new");
    }

    #[tokio::test]
    async fn test_out_of_order_older_result_still_applies_first() {
        let backend = Arc::new(MockBackend::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let fetcher = fetcher(&backend, &notifier);
        let mut state = InventoryState::default();

        let first = fetcher.begin(&mut state);
        let second = fetcher.begin(&mut state);

        assert!(fetcher.apply(first, &Ok(vec![]), &mut state, Utc::now()));
        assert!(state.is_empty_visible());
        assert!(fetcher.apply(
            second,
            &Ok(vec![record("x", "x", "dead")]),
            &mut state,
            Utc::now()
        ));
        assert!(state.is_table_visible());
    }
}
