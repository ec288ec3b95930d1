//! Command handlers for the finreport CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod add;
mod export;
mod init;
mod interactive;
mod months;
mod report;

use crate::api::{self, Mode};
use crate::app::App;
use crate::report::{PaginationMode, ReportExporter};
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Debug;
use std::path::Path;
use tracing::{debug, info};

pub use add::add;
pub use export::export;
pub use init::init;
pub use interactive::interactive;
pub use months::months;
pub use report::{report, Report};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Builds the app for a command: the store for `mode` and an exporter writing to `output`, or to
/// the configured default directory.
fn app(
    config: &Config,
    mode: Mode,
    output: Option<&Path>,
    pagination: Option<PaginationMode>,
) -> Result<App> {
    let store = api::store(config, mode)?;
    let dir = match output {
        Some(dir) => dir.to_path_buf(),
        None => config.default_export_dir(),
    };
    let exporter = ReportExporter::new(
        dir,
        config.export_file_name(),
        pagination.unwrap_or(config.pagination()),
    );
    Ok(App::new(store, config.banner_duration(), exporter))
}
