use crate::api::Mode;
use crate::app::{Alert, App};
use crate::commands::Out;
use crate::model::{Amount, Filter, Transaction};
use crate::report::{aggregate, month_options, MonthOption, ReportSeries};
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Everything the report screen shows: the month selector, the list, the chart series, the
/// savings estimate and the current error message.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    filter: Filter,
    months: Vec<MonthOption>,
    transactions: Vec<Transaction>,
    series: ReportSeries,
    prediction: Option<Amount>,
    alert: Option<Alert>,
}

impl Report {
    /// Takes a snapshot of what `app` currently shows.
    pub fn new(app: &mut App) -> Self {
        let alert = app.alert().cloned();
        let state = app.state();
        Self {
            filter: state.filter(),
            months: month_options(&state.months()),
            transactions: state.transactions().to_vec(),
            series: aggregate(state.transactions()),
            prediction: state.prediction(),
            alert,
        }
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn months(&self) -> &[MonthOption] {
        &self.months
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn series(&self) -> &ReportSeries {
        &self.series
    }

    pub fn prediction(&self) -> Option<Amount> {
        self.prediction
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(alert) = &self.alert {
            writeln!(f, "Error: {}", alert.message())?;
        }
        writeln!(
            f,
            "Transactions for {} ({}):",
            self.filter.label(),
            self.transactions.len()
        )?;
        for transaction in &self.transactions {
            write!(f, "  {transaction}")?;
            if let Some(description) = transaction.description() {
                write!(f, " ({description})")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "Chart:")?;
        let series = &self.series;
        for ((label, value), color) in series
            .labels()
            .iter()
            .zip(series.values())
            .zip(series.colors())
        {
            writeln!(f, "  {label}: {value:.2} [{}]", color.css_name())?;
        }
        match self.prediction {
            Some(amount) => writeln!(f, "Predicted savings for next month: {amount}")?,
            None => writeln!(f, "Predicted savings for next month: unavailable")?,
        }
        let months: Vec<&str> = self.months.iter().map(|m| m.label.as_str()).collect();
        write!(f, "Months: {}", months.join(", "))
    }
}

/// Fetches everything under `filter` and returns the report.
pub async fn report(config: Config, mode: Mode, filter: Filter) -> Result<Out<Report>> {
    let mut app = super::app(&config, mode, None, None)?;
    app.mount(filter);
    app.settle().await;
    let report = Report::new(&mut app);
    Ok(Out::new(report.to_string(), report))
}
