//! The application state and its update function.
//!
//! Every settled request arrives as an `Event`. `AppState::update` applies it and returns the
//! `Effect`s the driver has to carry out (banner changes, re-fetches). Nothing else mutates the
//! state.

use crate::api::RequestKind;
use crate::app::Alert;
use crate::model::{Amount, Filter, MonthKey, Transaction};
use crate::report::{month_index, ReportView};
use std::collections::HashSet;
use tracing::{debug, trace};

/// Identifies one fetch cycle. Each cycle gets a larger number than the one before it.
pub type Generation = u64;

/// The outcome of one request. Failures carry the message to show.
pub type Outcome<T> = std::result::Result<T, String>;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Transactions {
        generation: Generation,
        result: Outcome<Vec<Transaction>>,
    },
    Prediction {
        generation: Generation,
        result: Outcome<Amount>,
    },
    History {
        generation: Generation,
        result: Outcome<Vec<Transaction>>,
    },
    Created {
        result: Outcome<Transaction>,
    },
}

impl Event {
    fn generation(&self) -> Option<Generation> {
        match self {
            Event::Transactions { generation, .. }
            | Event::Prediction { generation, .. }
            | Event::History { generation, .. } => Some(*generation),
            Event::Created { .. } => None,
        }
    }

    fn kind(&self) -> RequestKind {
        match self {
            Event::Transactions { .. } => RequestKind::Transactions,
            Event::Prediction { .. } => RequestKind::Prediction,
            Event::History { .. } => RequestKind::History,
            Event::Created { .. } => RequestKind::Create,
        }
    }
}

/// Something the driver must do after an update.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ShowAlert(Alert),
    /// Clear the banner if its alert came from this request.
    ClearAlert(RequestKind),
    /// Start a new fetch cycle under this filter.
    Refetch(Filter),
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    filter: Filter,
    generation: Generation,
    transactions: Vec<Transaction>,
    history: Vec<Transaction>,
    prediction: Option<Amount>,
    loaded: bool,
    outstanding: HashSet<RequestKind>,
    submitting: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fetch cycle under `filter` and returns its generation. Responses to earlier
    /// cycles are ignored from now on.
    pub fn begin_fetch(&mut self, filter: Filter) -> Generation {
        self.filter = filter;
        self.generation += 1;
        self.outstanding = [
            RequestKind::Transactions,
            RequestKind::Prediction,
            RequestKind::History,
        ]
        .into_iter()
        .collect();
        debug!("Fetch cycle {} under filter {filter}", self.generation);
        self.generation
    }

    /// Records that a creation request is in flight.
    pub fn begin_submit(&mut self) {
        self.submitting = true;
    }

    pub fn update(&mut self, event: Event) -> Vec<Effect> {
        let kind = event.kind();
        if let Some(generation) = event.generation() {
            if generation != self.generation {
                debug!(
                    "Discarding {kind:?} response from cycle {generation}, current cycle is {}",
                    self.generation
                );
                return Vec::new();
            }
            self.outstanding.remove(&kind);
        }
        trace!("Applying {kind:?} response");

        match event {
            Event::Transactions { result, .. } => {
                self.loaded = true;
                self.transactions = result.as_ref().cloned().unwrap_or_default();
                settled(kind, result.err())
            }
            Event::Prediction { result, .. } => {
                self.prediction = Some(result.as_ref().copied().unwrap_or(Amount::ZERO));
                settled(kind, result.err())
            }
            Event::History { result, .. } => {
                self.history = result.as_ref().cloned().unwrap_or_default();
                settled(kind, result.err())
            }
            Event::Created { result } => {
                self.submitting = false;
                match result {
                    Ok(created) => {
                        self.transactions.push(created);
                        vec![Effect::ClearAlert(kind), Effect::Refetch(self.filter)]
                    }
                    Err(message) => vec![Effect::ShowAlert(Alert::new(kind, message))],
                }
            }
        }
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// The transactions under the current filter.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The unfiltered history.
    pub fn history(&self) -> &[Transaction] {
        &self.history
    }

    /// The months that can be selected, derived from the history.
    pub fn months(&self) -> Vec<MonthKey> {
        month_index(&self.history)
    }

    /// `None` until the first prediction response arrives.
    pub fn prediction(&self) -> Option<Amount> {
        self.prediction
    }

    /// True when no request of the current cycle, and no submission, is outstanding.
    pub fn is_settled(&self) -> bool {
        self.outstanding.is_empty() && !self.submitting
    }

    /// The report region as currently shown, `None` until transactions have loaded once.
    pub fn view(&self) -> Option<ReportView> {
        self.loaded
            .then(|| ReportView::new(self.filter, self.transactions.clone()))
    }
}

/// A success clears that request's own alert, a failure shows a new one.
fn settled(kind: RequestKind, error: Option<String>) -> Vec<Effect> {
    match error {
        None => vec![Effect::ClearAlert(kind)],
        Some(message) => vec![Effect::ShowAlert(Alert::new(kind, message))],
    }
}
