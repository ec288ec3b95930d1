//! The error banner: one message at a time, cleared automatically after a fixed duration.

use crate::api::RequestKind;
use serde::Serialize;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{sleep, Instant, Sleep};
use tracing::debug;

/// How long an error stays visible unless configured otherwise.
pub const DEFAULT_BANNER_DURATION: Duration = Duration::from_secs(5);

/// An error message and the request that produced it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Alert {
    source: RequestKind,
    message: String,
}

impl Alert {
    pub fn new(source: RequestKind, message: impl Into<String>) -> Self {
        Self {
            source,
            message: message.into(),
        }
    }

    pub fn source(&self) -> RequestKind {
        self.source
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

struct Shown {
    alert: Alert,
    countdown: Pin<Box<Sleep>>,
}

/// Holds at most one `Alert`. Showing an alert replaces the current one and restarts the
/// countdown. The countdown belongs to the banner, so dropping the banner cancels it.
///
/// Must be used from within a tokio runtime.
pub struct ErrorBanner {
    duration: Duration,
    shown: Option<Shown>,
}

impl ErrorBanner {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            shown: None,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn show(&mut self, alert: Alert) {
        debug!("Showing alert from {:?}: {}", alert.source(), alert.message());
        self.shown = Some(Shown {
            alert,
            countdown: Box::pin(sleep(self.duration)),
        });
    }

    /// Clears the current alert, if any.
    pub fn clear(&mut self) {
        if self.shown.take().is_some() {
            debug!("Alert cleared");
        }
    }

    /// Clears the current alert only if it was raised by `source`.
    pub fn clear_from(&mut self, source: RequestKind) {
        if self.alert().is_some_and(|alert| alert.source() == source) {
            self.clear();
        }
    }

    /// The visible alert. An alert whose countdown has run out is cleared first.
    pub fn alert(&mut self) -> Option<&Alert> {
        let due = self
            .shown
            .as_ref()
            .is_some_and(|shown| Instant::now() >= shown.countdown.deadline());
        if due {
            debug!("Alert expired");
            self.shown = None;
        }
        self.shown.as_ref().map(|shown| &shown.alert)
    }

    /// Resolves when the visible alert expires, clearing it. Never resolves while nothing is
    /// shown. Dropping the returned future leaves the countdown running.
    pub async fn expired(&mut self) {
        match self.shown.as_mut() {
            Some(shown) => {
                shown.countdown.as_mut().await;
                debug!("Alert expired");
                self.shown = None;
            }
            None => std::future::pending().await,
        }
    }
}

impl Default for ErrorBanner {
    fn default() -> Self {
        Self::new(DEFAULT_BANNER_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    fn alert(message: &str) -> Alert {
        Alert::new(RequestKind::Transactions, message)
    }

    #[tokio::test(start_paused = true)]
    async fn test_alert_visible_before_expiry() {
        let mut banner = ErrorBanner::default();
        banner.show(alert("boom"));
        advance(Duration::from_millis(4999)).await;
        assert_eq!(banner.alert().map(Alert::message), Some("boom"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_alert_cleared_after_expiry() {
        let mut banner = ErrorBanner::default();
        banner.show(alert("boom"));
        advance(Duration::from_secs(5)).await;
        assert!(banner.alert().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_alert_replaces_and_restarts_countdown() {
        let mut banner = ErrorBanner::default();
        banner.show(alert("first"));
        advance(Duration::from_secs(3)).await;
        banner.show(alert("second"));
        advance(Duration::from_secs(3)).await;
        assert_eq!(banner.alert().map(Alert::message), Some("second"));
        advance(Duration::from_secs(2)).await;
        assert!(banner.alert().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_future_clears() {
        let mut banner = ErrorBanner::new(Duration::from_secs(2));
        banner.show(alert("boom"));
        let start = Instant::now();
        banner.expired().await;
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert!(banner.alert().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_pending_when_empty() {
        let mut banner = ErrorBanner::default();
        let waited = tokio::time::timeout(Duration::from_secs(60), banner.expired()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let mut banner = ErrorBanner::default();
        banner.clear();
        banner.show(alert("boom"));
        banner.clear();
        banner.clear();
        assert!(banner.alert().is_none());
    }

    #[tokio::test]
    async fn test_clear_from_only_matching_source() {
        let mut banner = ErrorBanner::default();
        banner.show(Alert::new(RequestKind::Prediction, "no prediction"));
        banner.clear_from(RequestKind::Transactions);
        assert!(banner.alert().is_some());
        banner.clear_from(RequestKind::Prediction);
        assert!(banner.alert().is_none());
    }
}
