use crate::model::{Amount, MonthKey};
use crate::Result;
use anyhow::{bail, Context};
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    #[default]
    Expense,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

/// A transaction as returned by the transaction service. Read-only once fetched.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub(crate) id: String,
    pub(crate) amount: Amount,
    pub(crate) category: String,
    #[serde(rename = "type")]
    pub(crate) r#type: TransactionType,
    #[serde(deserialize_with = "local_date")]
    pub(crate) date: NaiveDate,
    #[serde(default, deserialize_with = "optional_text")]
    pub(crate) description: Option<String>,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        amount: impl Into<Amount>,
        category: impl Into<String>,
        r#type: TransactionType,
        date: NaiveDate,
        description: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            amount: amount.into(),
            category: category.into(),
            r#type,
            date,
            description,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn r#type(&self) -> TransactionType {
        self.r#type
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The month this transaction falls in, by its local calendar date.
    pub fn month(&self) -> MonthKey {
        MonthKey::from_date(self.date)
    }
}

impl Display for Transaction {
    /// One list row: `expense - $50.00 - Food - 2024-01-15`.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {} - {} - {}",
            self.r#type, self.amount, self.category, self.date
        )
    }
}

/// The body sent to create a transaction.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct NewTransaction {
    pub(crate) amount: Amount,
    pub(crate) category: String,
    #[serde(rename = "type")]
    pub(crate) r#type: TransactionType,
    pub(crate) date: NaiveDate,
    pub(crate) description: String,
}

impl NewTransaction {
    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn r#type(&self) -> TransactionType {
        self.r#type
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// The raw fields of the add-transaction form, as typed by the user.
///
/// Only presence of the required fields (amount, category, date) is checked, plus whatever it
/// takes to parse them into a `NewTransaction`.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct TransactionForm {
    pub amount: String,
    pub category: String,
    pub r#type: TransactionType,
    pub date: String,
    pub description: String,
}

impl TransactionForm {
    /// Validates the form and produces the body to submit.
    pub fn submission(&self) -> Result<NewTransaction> {
        let mut missing = Vec::new();
        if self.amount.trim().is_empty() {
            missing.push("amount");
        }
        if self.category.trim().is_empty() {
            missing.push("category");
        }
        if self.date.trim().is_empty() {
            missing.push("date");
        }
        if !missing.is_empty() {
            bail!("Please fill in the required fields: {}", missing.join(", "));
        }
        let amount = Amount::from_str(&self.amount)
            .with_context(|| format!("'{}' is not a valid amount", self.amount.trim()))?;
        let date = NaiveDate::from_str(self.date.trim())
            .with_context(|| format!("'{}' is not a valid date", self.date.trim()))?;
        Ok(NewTransaction {
            amount,
            category: self.category.trim().to_string(),
            r#type: self.r#type,
            date,
            description: self.description.trim().to_string(),
        })
    }
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number id, got {other}"
        ))),
    }
}

/// Accepts a calendar date (`2024-01-15`) as is, or a date-time which is converted to the local
/// calendar date.
fn local_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_local_date(&s).map_err(serde::de::Error::custom)
}

fn parse_local_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::from_str(s) {
        return Ok(date);
    }
    let date_time = DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("'{s}' is neither a date nor an RFC 3339 date-time"))?;
    Ok(date_time.with_timezone(&Local).date_naive())
}

fn optional_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_deserialize_service_transaction() {
        let json = r#"{
            "id": 7,
            "amount": "50.00",
            "category": "Food",
            "type": "expense",
            "date": "2024-01-15",
            "description": ""
        }"#;
        let t: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(t.id(), "7");
        assert_eq!(t.amount().value(), Decimal::from(50));
        assert_eq!(t.r#type(), TransactionType::Expense);
        assert_eq!(t.date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(t.description(), None);
        assert_eq!(t.month().to_string(), "2024-01");
    }

    #[test]
    fn test_deserialize_missing_description() {
        let json = r#"{"id":"a1","amount":2000,"category":"Pay","type":"income","date":"2024-02-01"}"#;
        let t: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(t.id(), "a1");
        assert_eq!(t.r#type(), TransactionType::Income);
        assert_eq!(t.description(), None);
    }

    #[test]
    fn test_display_row() {
        let t = Transaction::new(
            "1",
            50,
            "Food",
            TransactionType::Expense,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            None,
        );
        assert_eq!(t.to_string(), "expense - $50.00 - Food - 2024-01-15");
    }

    #[test]
    fn test_transaction_type_plain() {
        assert_eq!(TransactionType::Income.to_string(), "income");
        assert_eq!(
            TransactionType::from_str("expense").unwrap(),
            TransactionType::Expense
        );
        assert!(TransactionType::from_str("transfer").is_err());
    }

    #[test]
    fn test_form_submission() {
        let form = TransactionForm {
            amount: "20".to_string(),
            category: "Coffee".to_string(),
            r#type: TransactionType::Expense,
            date: "2024-03-01".to_string(),
            description: String::new(),
        };
        let body = form.submission().unwrap();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "amount": "20",
                "category": "Coffee",
                "type": "expense",
                "date": "2024-03-01",
                "description": ""
            })
        );
    }

    #[test]
    fn test_form_missing_fields() {
        let form = TransactionForm {
            amount: " ".to_string(),
            category: "Coffee".to_string(),
            ..Default::default()
        };
        let err = form.submission().unwrap_err().to_string();
        assert!(err.contains("amount"));
        assert!(err.contains("date"));
        assert!(!err.contains("category"));
    }
}
