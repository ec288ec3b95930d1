//! Derives the months that can be selected from the full transaction history.

use crate::model::{Filter, MonthKey, Transaction};
use serde::Serialize;
use std::collections::BTreeSet;

/// The distinct months present in `history`, ascending. Empty history gives no months.
pub fn month_index(history: &[Transaction]) -> Vec<MonthKey> {
    history
        .iter()
        .map(Transaction::month)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// One entry of the month selector.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct MonthOption {
    pub value: String,
    pub label: String,
}

impl From<Filter> for MonthOption {
    fn from(filter: Filter) -> Self {
        Self {
            value: filter.to_string(),
            label: filter.label(),
        }
    }
}

/// The month selector's entries: `All Months` followed by each indexed month.
pub fn month_options(months: &[MonthKey]) -> Vec<MonthOption> {
    std::iter::once(Filter::All)
        .chain(months.iter().copied().map(Filter::Month))
        .map(MonthOption::from)
        .collect()
}
