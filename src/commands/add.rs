use crate::api::{Mode, RequestKind};
use crate::commands::{Out, Report};
use crate::model::{Filter, TransactionForm};
use crate::{Config, Result};
use anyhow::bail;
use tracing::debug;

/// Submits `form` while `filter` is selected, then returns the refreshed report for that same
/// filter.
///
/// # Errors
/// - Returns an error if a required field is missing or the service rejects the transaction.
pub async fn add(
    config: Config,
    mode: Mode,
    form: TransactionForm,
    filter: Filter,
) -> Result<Out<Report>> {
    let mut app = super::app(&config, mode, None, None)?;
    app.mount(filter);
    app.settle().await;

    if !app.submit(&form) {
        let message = app
            .alert()
            .map(|alert| alert.message().to_string())
            .unwrap_or_default();
        bail!("Invalid transaction: {message}");
    }
    app.settle().await;

    if let Some(alert) = app.alert() {
        if alert.source() == RequestKind::Create {
            bail!("The transaction was not added: {}", alert.message());
        }
    }
    debug!("Transaction added under {filter}");

    let report = Report::new(&mut app);
    Ok(Out::new(
        format!("Added the transaction\n{report}"),
        report,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MonthKey, TransactionType};
    use crate::test::TestEnv;

    fn coffee() -> TransactionForm {
        TransactionForm {
            amount: "20".to_string(),
            category: "Coffee".to_string(),
            r#type: TransactionType::Expense,
            date: "2024-03-01".to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_add_keeps_selected_month() {
        let env = TestEnv::new().await;
        let march = Filter::Month(MonthKey::new(2024, 3).unwrap());
        let out = add(env.config(), Mode::Test, coffee(), march).await.unwrap();
        let report = out.structure().unwrap();
        assert_eq!(report.filter(), march);
        assert_eq!(report.transactions().len(), 4);
        assert!(report
            .transactions()
            .iter()
            .any(|t| t.category() == "Coffee"));
        assert!(out.message().starts_with("Added the transaction"));
    }

    #[tokio::test]
    async fn test_add_missing_category() {
        let env = TestEnv::new().await;
        let form = TransactionForm {
            category: " ".to_string(),
            ..coffee()
        };
        let err = add(env.config(), Mode::Test, form, Filter::All)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("category"));
    }
}
