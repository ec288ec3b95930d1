//! Turns the filtered transaction list into chart-ready series.

use crate::model::{Transaction, TransactionType};
use serde::Serialize;

/// The color of a bar, by transaction type.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesColor {
    /// Income.
    Affirmative,
    /// Expenses.
    Warning,
}

impl SeriesColor {
    pub fn for_type(r#type: TransactionType) -> Self {
        match r#type {
            TransactionType::Income => SeriesColor::Affirmative,
            TransactionType::Expense => SeriesColor::Warning,
        }
    }

    pub fn rgb(&self) -> [u8; 3] {
        match self {
            SeriesColor::Affirmative => [0, 128, 0],
            SeriesColor::Warning => [255, 0, 0],
        }
    }

    pub fn css_name(&self) -> &'static str {
        match self {
            SeriesColor::Affirmative => "green",
            SeriesColor::Warning => "red",
        }
    }
}

/// Parallel label, value and color sequences; index `i` of each describes the `i`th transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportSeries {
    labels: Vec<String>,
    values: Vec<f64>,
    colors: Vec<SeriesColor>,
}

impl ReportSeries {
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn colors(&self) -> &[SeriesColor] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The largest absolute value, used to scale bars.
    pub fn max_magnitude(&self) -> f64 {
        self.values.iter().fold(0.0, |max, v| max.max(v.abs()))
    }
}

/// One bar per transaction, in list order. Categories are not grouped and amounts keep the sign
/// they were stored with.
pub fn aggregate(transactions: &[Transaction]) -> ReportSeries {
    ReportSeries {
        labels: transactions
            .iter()
            .map(|t| t.category().to_string())
            .collect(),
        values: transactions.iter().map(|t| t.amount().to_f64()).collect(),
        colors: transactions
            .iter()
            .map(|t| SeriesColor::for_type(t.r#type()))
            .collect(),
    }
}
