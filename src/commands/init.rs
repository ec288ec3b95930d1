use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and an initial `config.json` pointing at `base_url`, along with
/// default settings.
///
/// # Arguments
/// - `finreport_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/finreport`
/// - `base_url` - The root of the transaction service API, e.g. `http://127.0.0.1:8000/api/`
///
/// # Errors
/// - Returns an error if the URL is invalid or any file operations fail.
pub async fn init(finreport_home: &Path, base_url: &str) -> Result<Out<()>> {
    let config = Config::create(finreport_home, base_url)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok(format!(
        "Successfully created {} for the service at {}",
        config.config_path().display(),
        config.base_url()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_loadable_config() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        let out = init(&home, "http://localhost:9000/api").await.unwrap();
        assert!(out.message().contains("http://localhost:9000/api/"));
        let config = Config::load(&home).await.unwrap();
        assert_eq!(config.base_url().as_str(), "http://localhost:9000/api/");
    }
}
