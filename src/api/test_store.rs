//! Implements the `TransactionStore` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a running transaction service.

use crate::api::{RequestKind, TransactionStore};
use crate::error::ServiceError;
use crate::model::{Amount, Filter, NewTransaction, Transaction, TransactionType};
use crate::Result;
use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::io::Cursor;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::trace;

/// An implementation of the `TransactionStore` trait that does not use the network. It holds its
/// transactions in memory and, by default, is seeded with some existing data.
///
/// Requests of one kind can be made to fail with a service-reported message, and the next request
/// of a kind can be made to take a while.
pub struct TestStore {
    transactions: Mutex<Vec<Transaction>>,
    failures: Mutex<HashMap<RequestKind, String>>,
    delays: Mutex<HashMap<RequestKind, Duration>>,
}

impl TestStore {
    /// Create a new `TestStore` holding `transactions`.
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions: Mutex::new(transactions),
            failures: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
        }
    }

    /// Makes every `kind` request fail with a service-reported `message`.
    pub fn fail(&self, kind: RequestKind, message: impl Into<String>) {
        lock(&self.failures).insert(kind, message.into());
    }

    /// Lets `kind` requests succeed again.
    pub fn recover(&self, kind: RequestKind) {
        lock(&self.failures).remove(&kind);
    }

    /// Makes the next `kind` request wait for `delay` before answering.
    pub fn delay(&self, kind: RequestKind, delay: Duration) {
        lock(&self.delays).insert(kind, delay);
    }

    /// A copy of everything in the store.
    pub fn snapshot(&self) -> Vec<Transaction> {
        lock(&self.transactions).clone()
    }

    /// Applies the configured delay and failure for `kind`.
    async fn respond(&self, kind: RequestKind) -> Result<()> {
        let delay = lock(&self.delays).remove(&kind);
        if let Some(delay) = delay {
            trace!("Delaying {kind:?} by {delay:?}");
            tokio::time::sleep(delay).await;
        }
        let failure = lock(&self.failures).get(&kind).cloned();
        match failure {
            Some(message) => Err(ServiceError::new(message))
                .with_context(|| format!("{kind:?} request failed")),
            None => Ok(()),
        }
    }

    fn filtered(&self, filter: Filter) -> Vec<Transaction> {
        lock(&self.transactions)
            .iter()
            .filter(|t| filter.month().is_none_or(|month| t.month() == month))
            .cloned()
            .collect()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait::async_trait]
impl TransactionStore for TestStore {
    async fn transactions(&self, filter: Filter) -> Result<Vec<Transaction>> {
        self.respond(RequestKind::Transactions).await?;
        Ok(self.filtered(filter))
    }

    /// Net savings (income minus expenses) of the selected transactions.
    async fn predicted_savings(&self, filter: Filter) -> Result<Amount> {
        self.respond(RequestKind::Prediction).await?;
        let net: Decimal = self
            .filtered(filter)
            .iter()
            .map(|t| match t.r#type() {
                TransactionType::Income => t.amount().value(),
                TransactionType::Expense => -t.amount().value(),
            })
            .sum();
        Ok(Amount::new(net))
    }

    async fn history(&self) -> Result<Vec<Transaction>> {
        self.respond(RequestKind::History).await?;
        Ok(self.filtered(Filter::All))
    }

    async fn create(&self, transaction: &NewTransaction) -> Result<Transaction> {
        self.respond(RequestKind::Create).await?;
        let mut transactions = lock(&self.transactions);
        let created = Transaction::new(
            uuid::Uuid::new_v4().to_string(),
            transaction.amount(),
            transaction.category(),
            transaction.r#type(),
            transaction.date(),
            Some(transaction.description().to_string()).filter(|d| !d.is_empty()),
        );
        transactions.push(created.clone());
        Ok(created)
    }
}

impl Default for TestStore {
    /// Loads seed data from this module.
    fn default() -> Self {
        Self::new(seed_transactions())
    }
}

/// Provides the seed data from this module.
pub(crate) fn seed_transactions() -> Vec<Transaction> {
    load_csv(TRANSACTION_DATA).unwrap_or_default()
}

/// Loads transactions from a CSV-formatted string.
fn load_csv(csv_data: &str) -> Result<Vec<Transaction>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(Cursor::new(csv_data.as_bytes()));

    let mut transactions = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let field = |ix: usize| record.get(ix).unwrap_or_default().trim().to_string();
        let amount = Amount::from_str(&field(4))
            .map_err(|e| anyhow::anyhow!("Bad seed amount '{}': {e}", field(4)))?;
        let r#type = TransactionType::from_str(&field(3))
            .with_context(|| format!("Bad seed type '{}'", field(3)))?;
        let date = NaiveDate::from_str(&field(1))
            .with_context(|| format!("Bad seed date '{}'", field(1)))?;
        let description = Some(field(5)).filter(|d| !d.is_empty());
        transactions.push(Transaction::new(
            field(0),
            amount,
            field(2),
            r#type,
            date,
            description,
        ));
    }
    Ok(transactions)
}

/// Seed transaction data.
const TRANSACTION_DATA: &str = r##"id,date,category,type,amount,description
1,2024-01-02,Salary,income,3200.00,January pay
2,2024-01-05,Rent,expense,1200.00,
3,2024-01-09,Groceries,expense,87.43,Whole Foods Market
4,2024-01-15,Coffee,expense,6.75,
5,2024-01-21,Utilities,expense,142.67,PG&E Electric
6,2024-02-01,Salary,income,3200.00,February pay
7,2024-02-05,Rent,expense,1200.00,
8,2024-02-11,Groceries,expense,63.21,Trader Joe's
9,2024-02-17,Restaurants,expense,42.30,Olive Garden
10,2024-02-26,Freelance,income,450.00,Logo design
11,2024-03-01,Salary,income,3200.00,March pay
12,2024-03-05,Rent,expense,1200.00,
13,2024-03-12,Gas & Fuel,expense,52.30,Shell
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MonthKey;

    #[test]
    fn test_seed_data_parses() {
        let seed = seed_transactions();
        assert_eq!(seed.len(), 13);
        assert_eq!(seed[2].category(), "Groceries");
        assert_eq!(seed[2].description(), Some("Whole Foods Market"));
        assert_eq!(seed[1].description(), None);
    }

    #[tokio::test]
    async fn test_filtered_transactions() {
        let store = TestStore::default();
        let month = MonthKey::from_str("2024-02").unwrap();
        let transactions = store.transactions(Filter::Month(month)).await.unwrap();
        assert_eq!(transactions.len(), 5);
        assert!(transactions.iter().all(|t| t.month() == month));
    }

    #[tokio::test]
    async fn test_prediction_is_net_savings() {
        let store = TestStore::default();
        let month = MonthKey::from_str("2024-03").unwrap();
        let prediction = store.predicted_savings(Filter::Month(month)).await.unwrap();
        assert_eq!(prediction.value(), Decimal::from_str("1947.70").unwrap());
    }

    #[tokio::test]
    async fn test_injected_failure_is_a_service_error() {
        let store = TestStore::default();
        store.fail(RequestKind::Prediction, "Not enough data");
        let err = store.predicted_savings(Filter::All).await.unwrap_err();
        assert_eq!(crate::error::service_message(&err), Some("Not enough data"));
        store.recover(RequestKind::Prediction);
        assert!(store.predicted_savings(Filter::All).await.is_ok());
    }
}
