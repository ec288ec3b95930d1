//! The transaction service: the `TransactionStore` trait and its two implementations, one that
//! talks HTTP to the real service and an in-memory one for testing.

mod http_store;
mod test_store;

use crate::model::{Amount, Filter, NewTransaction, Transaction};
use crate::{Config, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

pub(crate) use http_store::HttpStore;
pub use test_store::TestStore;

/// When this environment variable is set and non-empty, the in-memory `TestStore` is used in
/// place of the HTTP service.
pub const TEST_MODE_ENV: &str = "FINREPORT_IN_TEST_MODE";

/// The remote transaction service.
///
/// Implementations are shared between concurrently running reads, hence `&self` and `Sync`.
#[async_trait::async_trait]
pub trait TransactionStore: Send + Sync {
    /// Transactions in the month selected by `filter`, or all transactions for `Filter::All`.
    async fn transactions(&self, filter: Filter) -> Result<Vec<Transaction>>;

    /// The service's savings estimate for the next month, based on the `filter` month.
    async fn predicted_savings(&self, filter: Filter) -> Result<Amount>;

    /// The complete, unfiltered transaction history.
    async fn history(&self) -> Result<Vec<Transaction>> {
        self.transactions(Filter::All).await
    }

    /// Creates a transaction and returns the stored copy.
    async fn create(&self, transaction: &NewTransaction) -> Result<Transaction>;
}

/// The four requests made of the service. Alerts are tagged with the request that raised them.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// Transactions under the selected filter.
    Transactions,
    Prediction,
    /// The unfiltered history used to build the month list.
    History,
    Create,
}

impl RequestKind {
    /// The message shown when the service did not explain what went wrong.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            RequestKind::Transactions => "Failed to fetch transactions",
            RequestKind::Prediction => "Failed to fetch prediction",
            RequestKind::History => "Failed to fetch transaction history",
            RequestKind::Create => "Failed to add transaction",
        }
    }
}

/// Whether to talk to the real service or use in-memory data.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Http,
    Test,
}

impl Mode {
    /// Reads `FINREPORT_IN_TEST_MODE` to decide the mode.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Http,
        }
    }
}

/// Creates the store for `mode`.
pub(crate) fn store(config: &Config, mode: Mode) -> Result<Arc<dyn TransactionStore>> {
    debug!("Using {mode:?} transaction store");
    Ok(match mode {
        Mode::Http => Arc::new(HttpStore::new(
            config.base_url().clone(),
            config.request_timeout(),
        )?),
        Mode::Test => Arc::new(TestStore::default()),
    })
}
