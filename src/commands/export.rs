use crate::api::Mode;
use crate::args::ExportArgs;
use crate::commands::Out;
use crate::{utils, Config, Result};
use anyhow::Context;
use std::path::PathBuf;
use tracing::warn;

/// Loads the report for the requested month and saves it as a PDF.
pub async fn export(config: Config, mode: Mode, args: &ExportArgs) -> Result<Out<PathBuf>> {
    if let Some(dir) = args.output() {
        utils::make_dir(dir)
            .await
            .context("Unable to create the output directory")?;
    }
    let mut app = super::app(&config, mode, args.output(), args.pagination())?;
    app.mount(args.month());
    app.settle().await;
    if let Some(alert) = app.alert() {
        warn!("The report is incomplete: {}", alert.message());
    }

    let path = app.export().await.context("Unable to export the report")?;
    Ok(Out::new(
        format!("Saved the report to {}", path.display()),
        path,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Filter;
    use crate::report::PaginationMode;
    use crate::test::TestEnv;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_export_to_output_dir() {
        let env = TestEnv::new().await;
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("reports");
        let args = ExportArgs::new(
            Filter::All,
            Some(output.clone()),
            Some(PaginationMode::Offset),
        );
        let out = export(env.config(), Mode::Test, &args).await.unwrap();
        let path = out.structure().unwrap();
        assert_eq!(path, &output.join("finance_report.pdf"));
        let bytes = std::fs::read(path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }
}
