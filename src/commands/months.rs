use crate::api::{self, Mode};
use crate::commands::Out;
use crate::report::{month_index, month_options, MonthOption};
use crate::{Config, Result};
use anyhow::Context;

/// Lists the months that have at least one transaction, oldest first.
pub async fn months(config: Config, mode: Mode) -> Result<Out<Vec<MonthOption>>> {
    let store = api::store(&config, mode)?;
    let history = store
        .history()
        .await
        .context("Unable to fetch the transaction history")?;
    let months = month_index(&history);
    let options = month_options(&months);
    let lines: Vec<String> = options
        .iter()
        .map(|option| format!("{}\t{}", option.value, option.label))
        .collect();
    Ok(Out::new(
        format!("{} months with transactions\n{}", months.len(), lines.join("\n")),
        options,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_months() {
        let env = TestEnv::new().await;
        let out = months(env.config(), Mode::Test).await.unwrap();
        let values: Vec<&str> = out
            .structure()
            .unwrap()
            .iter()
            .map(|option| option.value.as_str())
            .collect();
        assert_eq!(values, vec!["all", "2024-01", "2024-02", "2024-03"]);
        assert!(out.message().starts_with("3 months"));
        assert!(out.message().contains("2024-02\tFebruary 2024"));
    }
}
