//! The reporting pipeline: the month index, chart series, report capture and PDF export.

mod export;
mod months;
mod paginate;
mod render;
mod series;

pub use export::{ExportError, ReportExporter, DEFAULT_EXPORT_FILE_NAME};
pub use months::{month_index, month_options, MonthOption};
pub use paginate::{paginate, PagePlacement, PaginationMode};
pub use render::{Capture, RasterCapture, ReportCapture, ReportView, TextLabel};
pub use series::{aggregate, ReportSeries, SeriesColor};
