//! Configuration file handling for finreport.
//!
//! The configuration file is stored at `$FINREPORT_HOME/config.json` and holds the address of the
//! transaction service along with report and display settings.

use crate::app::DEFAULT_BANNER_DURATION;
use crate::report::{PaginationMode, DEFAULT_EXPORT_FILE_NAME};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const APP_NAME: &str = "finreport";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// The service address used by `finreport init` when none is given.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$FINREPORT_HOME` and from there it loads `$FINREPORT_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    base_url: Url,
}

impl Config {
    /// Creates the home directory, if needed, and an initial `config.json` pointing at
    /// `base_url` with default settings.
    ///
    /// # Errors
    /// - Returns an error if `base_url` is not a valid base URL or any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>, base_url: &str) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the finreport home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;
        let config_path = root.join(CONFIG_JSON);

        let config_file = ConfigFile {
            base_url: base_url.to_string(),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
            base_url,
        })
    }

    /// Validates that `home` and its config file exist, then loads the config file.
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The finreport home directory is missing, run 'finreport init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let base_url = parse_base_url(&config_file.base_url)
            .with_context(|| format!("Invalid base_url in {}", config_path.display()))?;

        Ok(Self {
            root,
            config_path,
            config_file,
            base_url,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The root of the transaction service API; endpoint paths are joined onto it.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config_file.request_timeout_seconds)
    }

    /// How long an error message stays visible.
    pub fn banner_duration(&self) -> Duration {
        Duration::from_secs(self.config_file.banner_seconds)
    }

    pub fn export_file_name(&self) -> &str {
        &self.config_file.export_file_name
    }

    pub fn pagination(&self) -> PaginationMode {
        self.config_file.pagination
    }

    /// Where reports are saved when no directory is given: the user's download directory, or the
    /// finreport home directory on systems without one.
    pub fn default_export_dir(&self) -> PathBuf {
        dirs::download_dir().unwrap_or_else(|| self.root.clone())
    }
}

/// The base URL must end with a `/` so that endpoint paths are joined onto it rather than
/// replacing its last segment.
fn parse_base_url(s: &str) -> Result<Url> {
    let with_slash = if s.ends_with('/') {
        s.to_string()
    } else {
        format!("{s}/")
    };
    let url = Url::parse(&with_slash).with_context(|| format!("'{s}' is not a valid URL"))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        bail!("'{s}' is not an http(s) base URL");
    }
    Ok(url)
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "finreport",
///   "config_version": 1,
///   "base_url": "http://127.0.0.1:8000/api/",
///   "export_file_name": "finance_report.pdf",
///   "banner_seconds": 5,
///   "request_timeout_seconds": 30,
///   "pagination": "slice"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "finreport"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Root URL of the transaction service API
    base_url: String,

    /// File name of exported reports
    #[serde(default = "default_export_file_name")]
    export_file_name: String,

    /// Seconds an error message stays visible
    #[serde(default = "default_banner_seconds")]
    banner_seconds: u64,

    /// Seconds before a request to the service is abandoned
    #[serde(default = "default_request_timeout_seconds")]
    request_timeout_seconds: u64,

    /// How tall reports are split over pages
    #[serde(default)]
    pagination: PaginationMode,
}

fn default_export_file_name() -> String {
    DEFAULT_EXPORT_FILE_NAME.to_string()
}

fn default_banner_seconds() -> u64 {
    DEFAULT_BANNER_DURATION.as_secs()
}

fn default_request_timeout_seconds() -> u64 {
    REQUEST_TIMEOUT_SECONDS
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            base_url: DEFAULT_BASE_URL.to_string(),
            export_file_name: default_export_file_name(),
            banner_seconds: default_banner_seconds(),
            request_timeout_seconds: default_request_timeout_seconds(),
            pagination: PaginationMode::default(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or names another application.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create_and_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("finreport_home");

        let created = Config::create(&home, "https://finance.example.com/api")
            .await
            .unwrap();
        assert!(created.config_path().is_file());
        assert_eq!(
            created.base_url().as_str(),
            "https://finance.example.com/api/"
        );

        let loaded = Config::load(&home).await.unwrap();
        assert_eq!(loaded.base_url(), created.base_url());
        assert_eq!(loaded.banner_duration(), Duration::from_secs(5));
        assert_eq!(loaded.export_file_name(), "finance_report.pdf");
        assert_eq!(loaded.pagination(), PaginationMode::Slice);
        assert_eq!(loaded.request_timeout(), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_config_create_rejects_bad_url() {
        let dir = TempDir::new().unwrap();
        assert!(Config::create(dir.path(), "not a url").await.is_err());
        assert!(Config::create(dir.path(), "ftp://example.com/").await.is_err());
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nope")).await.unwrap_err();
        assert!(err.to_string().contains("finreport init"));
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let json = r#"{
            "app_name": "finreport",
            "config_version": 1,
            "base_url": "http://localhost:8000/api/",
            "pagination": "offset"
        }"#;
        utils::write(&path, json).await.unwrap();

        let config = Config::load(dir.path()).await.unwrap();
        assert_eq!(config.pagination(), PaginationMode::Offset);
        assert_eq!(config.banner_duration(), DEFAULT_BANNER_DURATION);
        assert_eq!(config.export_file_name(), DEFAULT_EXPORT_FILE_NAME);
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let json = r#"{
            "app_name": "wrong_app",
            "config_version": 1,
            "base_url": "http://localhost:8000/api/"
        }"#;
        utils::write(&path, json).await.unwrap();

        let result = ConfigFile::load(&path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("file.json");
        let saved = ConfigFile {
            banner_seconds: 8,
            ..ConfigFile::default()
        };
        saved.save(&path).await.unwrap();
        assert_eq!(saved, ConfigFile::load(&path).await.unwrap());
    }

    #[test]
    fn test_parse_base_url_adds_slash() {
        let url = parse_base_url("http://127.0.0.1:8000/api").unwrap();
        assert_eq!(url.join("predict/").unwrap().as_str(), "http://127.0.0.1:8000/api/predict/");
    }
}
