//! Issues requests to the `TransactionStore` and reports each one back as an `Event`.

use crate::api::{RequestKind, TransactionStore};
use crate::app::{Event, Generation, Outcome};
use crate::error::service_message;
use crate::model::{Filter, NewTransaction};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{trace, warn};

/// Runs each request as its own task. Requests do not wait on each other and are never
/// cancelled; each sends its event whenever it settles.
#[derive(Clone)]
pub struct FetchController {
    store: Arc<dyn TransactionStore>,
    events: UnboundedSender<Event>,
}

impl FetchController {
    pub fn new(store: Arc<dyn TransactionStore>, events: UnboundedSender<Event>) -> Self {
        Self { store, events }
    }

    /// Requests the filtered transactions, the prediction and the full history for `generation`.
    pub fn fetch(&self, filter: Filter, generation: Generation) {
        let this = self.clone();
        tokio::spawn(async move {
            let result = this.store.transactions(filter).await;
            let result = outcome(RequestKind::Transactions, result);
            this.send(Event::Transactions { generation, result });
        });

        let this = self.clone();
        tokio::spawn(async move {
            let result = this.store.predicted_savings(filter).await;
            let result = outcome(RequestKind::Prediction, result);
            this.send(Event::Prediction { generation, result });
        });

        let this = self.clone();
        tokio::spawn(async move {
            let result = this.store.history().await;
            let result = outcome(RequestKind::History, result);
            this.send(Event::History { generation, result });
        });
    }

    /// Creates `transaction`.
    pub fn submit(&self, transaction: NewTransaction) {
        let this = self.clone();
        tokio::spawn(async move {
            let result = this.store.create(&transaction).await;
            let result = outcome(RequestKind::Create, result);
            this.send(Event::Created { result });
        });
    }

    fn send(&self, event: Event) {
        if self.events.send(event).is_err() {
            trace!("The app is gone, dropping a response");
        }
    }
}

/// Converts a store result into an event outcome, choosing the message to show on failure.
fn outcome<T>(kind: RequestKind, result: crate::Result<T>) -> Outcome<T> {
    result.map_err(|e| {
        warn!("{kind:?} request failed: {e:#}");
        service_message(&e)
            .unwrap_or(kind.fallback_message())
            .to_string()
    })
}
