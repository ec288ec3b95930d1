//! These structs provide the CLI interface for finreport.

use crate::model::{Filter, TransactionForm, TransactionType};
use crate::report::PaginationMode;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// finreport: a command-line client for your personal finance transaction service.
///
/// Lists transactions month by month, shows the chart series and the predicted savings computed
/// by the service, records new transactions and exports the report as a PDF.
///
/// Run `finreport init --base-url <URL>` first to point the program at the service.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and the configuration file.
    ///
    /// This is the first command you should run. Pass the root of the service API as --base-url,
    /// e.g. http://127.0.0.1:8000/api/, and optionally choose a directory with --finreport-home.
    Init(InitArgs),
    /// Fetch transactions and the savings prediction and print the report.
    Report(MonthArgs),
    /// List the months that have transactions.
    Months,
    /// Record a new transaction, then print the refreshed report.
    Add(AddArgs),
    /// Save the report as a PDF.
    Export(ExportArgs),
    /// Start a session that reads commands from standard input.
    ///
    /// Commands: `month <YYYY-MM|all>`, `add <amount> <category> <income|expense> <date>
    /// [description...]`, `export`, `show`, `help`, `quit`.
    Interactive(MonthArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where finreport configuration is held. Defaults to ~/finreport
    #[arg(long, env = "FINREPORT_HOME", default_value_t = default_finreport_home())]
    finreport_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, finreport_home: PathBuf) -> Self {
        Self {
            log_level,
            finreport_home: finreport_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn finreport_home(&self) -> &DisplayPath {
        &self.finreport_home
    }
}

/// (Not shown): Args for the `finreport init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The root of the transaction service API.
    #[arg(long, default_value = crate::DEFAULT_BASE_URL)]
    base_url: String,
}

impl InitArgs {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// (Not shown): The month filter shared by several commands.
#[derive(Debug, Parser, Clone, Default)]
pub struct MonthArgs {
    /// Only show transactions from this month, given as YYYY-MM, or "all".
    #[arg(long, default_value_t = Filter::All)]
    month: Filter,
}

impl MonthArgs {
    pub fn new(month: Filter) -> Self {
        Self { month }
    }

    pub fn month(&self) -> Filter {
        self.month
    }
}

/// (Not shown): Args for the `finreport add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The amount, e.g. 20 or 1,250.50
    #[arg(long)]
    amount: String,

    /// The category, e.g. Groceries
    #[arg(long)]
    category: String,

    /// Either income or expense
    #[arg(long = "type", default_value_t = TransactionType::Expense)]
    r#type: TransactionType,

    /// The date of the transaction as YYYY-MM-DD
    #[arg(long)]
    date: String,

    /// An optional note
    #[arg(long, default_value = "")]
    description: String,

    #[clap(flatten)]
    month: MonthArgs,
}

impl AddArgs {
    pub fn new(form: TransactionForm, month: Filter) -> Self {
        Self {
            amount: form.amount,
            category: form.category,
            r#type: form.r#type,
            date: form.date,
            description: form.description,
            month: MonthArgs::new(month),
        }
    }

    /// The form as the user filled it in.
    pub fn form(&self) -> TransactionForm {
        TransactionForm {
            amount: self.amount.clone(),
            category: self.category.clone(),
            r#type: self.r#type,
            date: self.date.clone(),
            description: self.description.clone(),
        }
    }

    pub fn month(&self) -> Filter {
        self.month.month()
    }
}

/// (Not shown): Args for the `finreport export` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ExportArgs {
    #[clap(flatten)]
    month: MonthArgs,

    /// The directory to save the report in. Defaults to your download directory.
    #[arg(long)]
    output: Option<PathBuf>,

    /// How the report is split over pages. Defaults to the configured mode.
    #[arg(long, value_enum)]
    pagination: Option<PaginationMode>,
}

impl ExportArgs {
    pub fn new(month: Filter, output: Option<PathBuf>, pagination: Option<PaginationMode>) -> Self {
        Self {
            month: MonthArgs::new(month),
            output,
            pagination,
        }
    }

    pub fn month(&self) -> Filter {
        self.month.month()
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub fn pagination(&self) -> Option<PaginationMode> {
        self.pagination
    }
}

fn default_finreport_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("finreport"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --finreport-home or FINREPORT_HOME instead of relying on the \
                default directory.",
            );
            PathBuf::from("finreport")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
