//! finreport: a client for a personal finance transaction service.
//!
//! Fetches transactions under a month filter, derives the months available for filtering, turns
//! the list into chart series, shows the service's savings estimate and exports the report as a
//! paginated PDF.

pub mod api;
pub mod app;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod model;
pub mod report;
mod utils;

#[cfg(test)]
mod test;

pub use api::Mode;
pub use config::{Config, DEFAULT_BASE_URL};
pub use error::{Error, Result, ServiceError};
