//! Implements the `TransactionStore` trait with `reqwest` against the transaction service.

use crate::api::TransactionStore;
use crate::error::ServiceError;
use crate::model::{Amount, Filter, NewTransaction, Transaction};
use crate::Result;
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::trace;
use url::Url;

const TRANSACTIONS: &str = "transactions/";
const PREDICT: &str = "predict/";

/// Talks to the transaction service rooted at `base_url`, e.g. `http://127.0.0.1:8000/api/`.
pub(crate) struct HttpStore {
    base_url: Url,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    predicted_savings: Amount,
}

impl HttpStore {
    pub(crate) fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Unable to create the HTTP client")?;
        Ok(Self { base_url, client })
    }

    /// The URL of `endpoint` with the `month` parameter set when `filter` selects a month.
    fn url(&self, endpoint: &str, filter: Filter) -> Result<Url> {
        let mut url = self
            .base_url
            .join(endpoint)
            .with_context(|| format!("Unable to build the {endpoint} URL from {}", self.base_url))?;
        if let Some(month) = filter.month() {
            url.query_pairs_mut()
                .append_pair("month", &month.to_string());
        }
        Ok(url)
    }

    async fn get<T>(&self, url: Url) -> Result<T>
    where
        T: DeserializeOwned,
    {
        trace!("GET {url}");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;
        decode(response, &url).await
    }
}

#[async_trait::async_trait]
impl TransactionStore for HttpStore {
    async fn transactions(&self, filter: Filter) -> Result<Vec<Transaction>> {
        let url = self.url(TRANSACTIONS, filter)?;
        self.get(url).await
    }

    async fn predicted_savings(&self, filter: Filter) -> Result<Amount> {
        let url = self.url(PREDICT, filter)?;
        let prediction: Prediction = self.get(url).await?;
        Ok(prediction.predicted_savings)
    }

    async fn create(&self, transaction: &NewTransaction) -> Result<Transaction> {
        let url = self.url(TRANSACTIONS, Filter::All)?;
        trace!("POST {url}");
        let response = self
            .client
            .post(url.clone())
            .json(transaction)
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;
        decode(response, &url).await
    }
}

/// Decodes a service response into `T`.
///
/// The service reports problems in two ways: an error status with an `error` or `detail` field,
/// or a success status whose body is `{"error": "..."}`. Both become a `ServiceError`.
async fn decode<T>(response: reqwest::Response, url: &Url) -> Result<T>
where
    T: DeserializeOwned,
{
    let status = response.status();
    let text = response
        .text()
        .await
        .with_context(|| format!("Unable to read the response body from {url}"))?;
    let body: Option<serde_json::Value> = serde_json::from_str(&text).ok();

    if let Some(message) = body.as_ref().and_then(reported_error) {
        return Err(ServiceError::new(message))
            .with_context(|| format!("The service at {url} reported an error ({status})"));
    }
    if !status.is_success() {
        anyhow::bail!("Request to {url} failed with status {status}: {text}");
    }
    let body = body.with_context(|| format!("The response from {url} is not JSON: {text}"))?;
    serde_json::from_value(body).with_context(|| format!("Unexpected response shape from {url}"))
}

/// The `error` message, or the `detail` message, of an error payload.
fn reported_error(body: &serde_json::Value) -> Option<String> {
    let object = body.as_object()?;
    ["error", "detail"]
        .iter()
        .find_map(|key| object.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MonthKey;
    use serde_json::json;
    use std::str::FromStr;

    fn store() -> HttpStore {
        HttpStore::new(
            Url::parse("http://127.0.0.1:8000/api/").unwrap(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_url_without_month() {
        let url = store().url(TRANSACTIONS, Filter::All).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/api/transactions/");
    }

    #[test]
    fn test_url_with_month() {
        let filter = Filter::Month(MonthKey::from_str("2024-01").unwrap());
        let url = store().url(PREDICT, filter).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/api/predict/?month=2024-01");
    }

    #[test]
    fn test_reported_error() {
        assert_eq!(
            reported_error(&json!({"error": "No data"})),
            Some("No data".to_string())
        );
        assert_eq!(
            reported_error(&json!({"detail": "Invalid amount"})),
            Some("Invalid amount".to_string())
        );
        assert_eq!(reported_error(&json!({"detail": {"amount": ["bad"]}})), None);
        assert_eq!(reported_error(&json!([])), None);
    }
}
