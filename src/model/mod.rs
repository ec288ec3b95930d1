//! Types that represent the core data model, such as `Transaction` and `MonthKey`.
mod amount;
mod month;
mod transaction;

pub use amount::{Amount, AmountError};
pub use month::{Filter, MonthKey};
pub use transaction::{NewTransaction, Transaction, TransactionForm, TransactionType};
