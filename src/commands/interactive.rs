use crate::api::Mode;
use crate::app::App;
use crate::commands::{Out, Report};
use crate::model::{Filter, TransactionForm, TransactionType};
use crate::{Config, Result};
use anyhow::{bail, Context};
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

const HELP: &str = "Commands:
  month <YYYY-MM|all>                                   select a month
  add <amount> <category> <income|expense> <date> [description...]
  export                                                save the report as a PDF
  show                                                  print the report
  help                                                  print this message
  quit                                                  end the session";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Month(Filter),
    Add(TransactionForm),
    Export,
    Show,
    Help,
    Quit,
}

impl FromStr for Input {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, rest)) = words.split_first() else {
            return Ok(Input::Show);
        };
        Ok(match command {
            "month" => match rest {
                [month] => Input::Month(Filter::from_str(month)?),
                _ => bail!("Usage: month <YYYY-MM|all>"),
            },
            "add" => match rest {
                [amount, category, r#type, date, description @ ..] => {
                    Input::Add(TransactionForm {
                        amount: amount.to_string(),
                        category: category.to_string(),
                        r#type: TransactionType::from_str(r#type)
                            .with_context(|| format!("'{}' is not income or expense", r#type))?,
                        date: date.to_string(),
                        description: description.join(" "),
                    })
                }
                _ => bail!("Usage: add <amount> <category> <income|expense> <date> [description...]"),
            },
            "export" => Input::Export,
            "show" => Input::Show,
            "help" | "?" => Input::Help,
            "quit" | "exit" | "q" => Input::Quit,
            other => bail!("Unknown command '{other}', type 'help' for a list"),
        })
    }
}

/// Runs a session reading commands from standard input until `quit` or end of input. Requests
/// settle and error messages expire while waiting for input.
pub async fn interactive(config: Config, mode: Mode, filter: Filter) -> Result<Out<()>> {
    let mut app = super::app(&config, mode, None, None)?;
    app.mount(filter);
    info!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut settled = false;
    loop {
        let had_alert = app.alert().is_some();
        tokio::select! {
            line = lines.next_line() => {
                let line = line.context("Unable to read from standard input")?;
                let Some(line) = line else { break };
                match Input::from_str(&line) {
                    Ok(Input::Quit) => break,
                    Ok(input) => {
                        if apply(&mut app, input).await {
                            settled = false;
                        }
                    }
                    Err(e) => warn!("{e}"),
                }
            }
            _ = app.step() => {
                if had_alert && app.alert().is_none() {
                    info!("The error message has expired");
                }
            }
        }
        if !settled && app.state().is_settled() {
            settled = true;
            info!("{}", Report::new(&mut app));
        }
    }
    Ok("Session ended".into())
}

/// Carries out one command. Returns true when it started requests whose results are worth
/// printing once they settle.
async fn apply(app: &mut App, input: Input) -> bool {
    match input {
        Input::Month(filter) => {
            app.select_month(filter);
            true
        }
        Input::Add(form) => {
            let submitted = app.submit(&form);
            if !submitted {
                if let Some(alert) = app.alert() {
                    warn!("{}", alert.message());
                }
            }
            submitted
        }
        Input::Export => {
            match app.export().await {
                Ok(path) => info!("Saved the report to {}", path.display()),
                Err(e) => warn!("Unable to export the report: {e}"),
            }
            false
        }
        Input::Show => {
            info!("{}", Report::new(app));
            false
        }
        Input::Help => {
            info!("{HELP}");
            false
        }
        Input::Quit => false,
    }
}
