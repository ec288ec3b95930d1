//! The application: state, the update loop that feeds it, the error banner and the requests.

mod banner;
mod fetch;
mod state;

pub use banner::{Alert, ErrorBanner, DEFAULT_BANNER_DURATION};
pub use fetch::FetchController;
pub use state::{AppState, Effect, Event, Generation, Outcome};

use crate::api::{RequestKind, TransactionStore};
use crate::model::{Filter, TransactionForm};
use crate::report::{ExportError, ReportExporter};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Drives the model-update-view cycle: user actions start requests, settled requests come back
/// as events, events update the state and the state produces the view.
pub struct App {
    state: AppState,
    banner: ErrorBanner,
    controller: FetchController,
    events: mpsc::UnboundedReceiver<Event>,
    exporter: ReportExporter,
}

impl App {
    pub fn new(
        store: Arc<dyn TransactionStore>,
        banner_duration: Duration,
        exporter: ReportExporter,
    ) -> Self {
        let (sender, events) = mpsc::unbounded_channel();
        Self {
            state: AppState::new(),
            banner: ErrorBanner::new(banner_duration),
            controller: FetchController::new(store, sender),
            events,
            exporter,
        }
    }

    /// The initial load, under `filter`.
    pub fn mount(&mut self, filter: Filter) {
        self.fetch(filter);
    }

    /// Switches the month filter and re-fetches.
    pub fn select_month(&mut self, filter: Filter) {
        self.fetch(filter);
    }

    /// Submits the form. Returns false, with an alert showing, when the form is incomplete.
    pub fn submit(&mut self, form: &TransactionForm) -> bool {
        match form.submission() {
            Ok(transaction) => {
                self.state.begin_submit();
                self.controller.submit(transaction);
                true
            }
            Err(e) => {
                self.banner.show(Alert::new(RequestKind::Create, e.to_string()));
                false
            }
        }
    }

    /// Exports the report region as currently shown.
    pub async fn export(&self) -> Result<PathBuf, ExportError> {
        self.exporter.export(self.state.view().as_ref()).await
    }

    fn fetch(&mut self, filter: Filter) {
        let generation = self.state.begin_fetch(filter);
        self.controller.fetch(filter, generation);
    }

    /// Applies one event and carries out the resulting effects.
    pub fn handle(&mut self, event: Event) {
        for effect in self.state.update(event) {
            match effect {
                Effect::ShowAlert(alert) => self.banner.show(alert),
                Effect::ClearAlert(kind) => self.banner.clear_from(kind),
                Effect::Refetch(filter) => self.fetch(filter),
            }
        }
    }

    /// Applies every event that has already arrived, without waiting. Returns how many there were.
    pub fn process_pending(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle(event);
            count += 1;
        }
        count
    }

    /// Waits for the next event, or for the banner to expire, and applies it.
    pub async fn step(&mut self) {
        tokio::select! {
            event = self.events.recv() => {
                if let Some(event) = event {
                    self.handle(event);
                }
            }
            _ = self.banner.expired() => {}
        }
    }

    /// Runs the loop until the current fetch cycle and any submission have settled.
    pub async fn settle(&mut self) {
        while !self.state.is_settled() {
            self.step().await;
        }
        debug!("Cycle {} settled", self.state.generation());
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The visible alert, if it has not expired.
    pub fn alert(&mut self) -> Option<&Alert> {
        self.banner.alert()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TestStore;
    use crate::model::{MonthKey, TransactionType};
    use crate::report::PaginationMode;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        store: Arc<TestStore>,
        app: App,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(TestStore::default());
        let exporter = ReportExporter::new(dir.path(), "report.pdf", PaginationMode::Slice);
        let app = App::new(store.clone(), DEFAULT_BANNER_DURATION, exporter);
        Fixture {
            _dir: dir,
            store,
            app,
        }
    }

    fn month(s: &str) -> Filter {
        Filter::Month(MonthKey::from_str(s).unwrap())
    }

    #[tokio::test]
    async fn test_mount_loads_everything() {
        let Fixture { mut app, .. } = fixture();
        app.mount(Filter::All);
        app.settle().await;
        assert_eq!(app.state().transactions().len(), 13);
        assert_eq!(app.state().history().len(), 13);
        let months: Vec<String> = app
            .state()
            .months()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(months, vec!["2024-01", "2024-02", "2024-03"]);
        assert!(app.state().prediction().is_some());
        assert!(app.alert().is_none());
    }

    #[tokio::test]
    async fn test_select_month_filters_but_keeps_full_month_index() {
        let Fixture { mut app, .. } = fixture();
        app.mount(Filter::All);
        app.settle().await;
        app.select_month(month("2024-02"));
        app.settle().await;
        assert_eq!(app.state().transactions().len(), 5);
        assert_eq!(app.state().months().len(), 3);
        assert_eq!(app.state().filter(), month("2024-02"));
    }

    #[tokio::test]
    async fn test_transactions_failure_does_not_block_prediction() {
        let Fixture { store, mut app, .. } = fixture();
        store.fail(RequestKind::Transactions, "Transactions are unavailable");
        app.mount(month("2024-03"));
        app.settle().await;
        assert!(app.state().transactions().is_empty());
        assert_eq!(
            app.state().prediction().map(|p| p.value()),
            Some(Decimal::from_str("1947.70").unwrap())
        );
        let alert = app.alert().cloned().unwrap();
        assert_eq!(alert.source(), RequestKind::Transactions);
        assert_eq!(alert.message(), "Transactions are unavailable");
    }

    #[tokio::test]
    async fn test_submit_appends_and_refetches_under_current_filter() {
        let Fixture { store, mut app, .. } = fixture();
        app.mount(month("2024-03"));
        app.settle().await;
        let before = app.state().generation();
        let form = TransactionForm {
            amount: "20".to_string(),
            category: "Coffee".to_string(),
            r#type: TransactionType::Expense,
            date: "2024-03-01".to_string(),
            description: String::new(),
        };
        assert!(app.submit(&form));
        app.settle().await;
        assert!(app.state().generation() > before);
        assert_eq!(app.state().filter(), month("2024-03"));
        assert_eq!(app.state().transactions().len(), 4);
        assert!(app
            .state()
            .transactions()
            .iter()
            .any(|t| t.category() == "Coffee"));
        assert_eq!(store.snapshot().len(), 14);
    }

    #[tokio::test]
    async fn test_submit_into_new_month_extends_month_index() {
        let Fixture { mut app, .. } = fixture();
        app.mount(Filter::All);
        app.settle().await;
        let form = TransactionForm {
            amount: "3200".to_string(),
            category: "Salary".to_string(),
            r#type: TransactionType::Income,
            date: "2024-04-01".to_string(),
            description: "April pay".to_string(),
        };
        app.submit(&form);
        app.settle().await;
        assert_eq!(app.state().months().len(), 4);
    }

    #[tokio::test]
    async fn test_incomplete_form_alerts_without_request() {
        let Fixture { store, mut app, .. } = fixture();
        assert!(!app.submit(&TransactionForm::default()));
        assert!(app.state().is_settled());
        assert_eq!(
            app.alert().map(Alert::source),
            Some(RequestKind::Create)
        );
        assert_eq!(store.snapshot().len(), 13);
    }

    #[tokio::test]
    async fn test_rejected_submission_alerts() {
        let Fixture { store, mut app, .. } = fixture();
        store.fail(RequestKind::Create, "Amount must be positive");
        let form = TransactionForm {
            amount: "-5".to_string(),
            category: "Coffee".to_string(),
            date: "2024-03-02".to_string(),
            ..Default::default()
        };
        app.submit(&form);
        app.settle().await;
        assert_eq!(
            app.alert().map(Alert::message),
            Some("Amount must be positive")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_stale_response_is_ignored() {
        let Fixture { store, mut app, .. } = fixture();
        store.delay(RequestKind::Transactions, Duration::from_secs(3));
        app.mount(Filter::All);
        app.select_month(month("2024-01"));
        app.settle().await;
        assert_eq!(app.state().transactions().len(), 5);

        // Let the slow, superseded response arrive.
        tokio::time::sleep(Duration::from_secs(4)).await;
        app.process_pending();
        assert_eq!(app.state().transactions().len(), 5);
        assert_eq!(app.state().filter(), month("2024-01"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_alert_expires_while_running() {
        let Fixture { store, mut app, .. } = fixture();
        store.fail(RequestKind::History, "History is unavailable");
        app.mount(Filter::All);
        app.settle().await;
        assert!(app.alert().is_some());
        app.step().await;
        assert!(app.alert().is_none());
    }

    #[tokio::test]
    async fn test_export_before_load_fails_and_after_load_succeeds() {
        let Fixture { _dir, mut app, .. } = fixture();
        assert!(matches!(
            app.export().await,
            Err(ExportError::NothingRendered)
        ));
        app.mount(Filter::All);
        app.settle().await;
        let path = app.export().await.unwrap();
        assert!(path.is_file());
        assert_eq!(app.state().transactions().len(), 13);
    }
}
