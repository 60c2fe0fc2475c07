//! User-facing notifications for retry progress, recovery and terminal failure.
//!
//! The actual rendering (toasts, popups) lives outside this crate behind the
//! [`Notifier`] and [`PopupPresenter`] traits. Errors from either are logged
//! and dropped; they never reach the caller of the retry controller.

use crate::error::FetchError;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupKind {
    Error,
}

/// Short-lived notification sink (toast-style).
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, severity: Severity) -> Result<()>;
}

/// Modal error popup. Optional; failures fall back to the notifier.
pub trait PopupPresenter: Send + Sync {
    fn show_popup(&self, message: &str, kind: PopupKind, title: &str) -> Result<()>;
}

/// Notifier that writes notifications to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, severity: Severity) -> Result<()> {
        match severity {
            Severity::Info => tracing::info!("{}", message),
            Severity::Success => tracing::info!(outcome = "success", "{}", message),
            Severity::Error => tracing::error!("{}", message),
        }
        Ok(())
    }
}

const POPUP_TITLE: &str = "Request retry failed";

/// Formats retry events and routes them to the configured collaborators.
#[derive(Clone)]
pub struct Reporter {
    notifier: Option<Arc<dyn Notifier>>,
    popup: Option<Arc<dyn PopupPresenter>>,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(Some(Arc::new(TracingNotifier)), None)
    }
}

impl Reporter {
    pub fn new(notifier: Option<Arc<dyn Notifier>>, popup: Option<Arc<dyn PopupPresenter>>) -> Self {
        Self { notifier, popup }
    }

    /// `attempt` is 1-based: the attempt that just came back empty.
    /// `total` is the number of attempts in the whole sequence.
    pub fn retrying(&self, attempt: u32, total: u32, delay: Duration, reason: &str) {
        let message = format!(
            "Empty or failed response ({}) on attempt {}/{}, retrying in {} ms",
            reason,
            attempt,
            total,
            delay.as_millis()
        );
        self.send(&message, Severity::Info);
    }

    /// `attempt` is 1-based.
    pub fn recovered(&self, attempt: u32) {
        let message = format!("Valid response received on attempt {}", attempt);
        self.send(&message, Severity::Success);
    }

    /// Terminal failure. Never called for [`FetchError::Aborted`].
    pub fn failed(&self, error: &FetchError) {
        let message = failure_message(error);
        if let Some(popup) = &self.popup {
            match popup.show_popup(&message, PopupKind::Error, POPUP_TITLE) {
                Ok(()) => return,
                Err(e) => tracing::warn!(error = %e, "error popup failed, falling back to notification"),
            }
        }
        if let Some(notifier) = &self.notifier {
            match notifier.notify(&message, Severity::Error) {
                Ok(()) => return,
                Err(e) => tracing::warn!(error = %e, "notification failed"),
            }
        }
        tracing::error!("{}", message);
    }

    fn send(&self, message: &str, severity: Severity) {
        match &self.notifier {
            Some(notifier) => {
                if let Err(e) = notifier.notify(message, severity) {
                    tracing::warn!(error = %e, "notification failed");
                }
            }
            None => tracing::debug!("{}", message),
        }
    }
}

/// Human-readable text for a terminal failure.
pub fn failure_message(error: &FetchError) -> String {
    match error {
        FetchError::EmptyContentExhausted { attempts } => format!(
            "No valid content after {} attempt(s); every response was empty",
            attempts
        ),
        FetchError::HttpStatus {
            status,
            status_text,
            body,
        } => {
            let mut msg = format!("Request failed with HTTP {} {}", status, status_text);
            let snippet: String = body.trim().chars().take(200).collect();
            if !snippet.is_empty() {
                msg.push_str(": ");
                msg.push_str(&snippet);
            }
            msg
        }
        FetchError::Transport(e) => {
            let mut msg = format!("Request failed: {}", e);
            let mut source = std::error::Error::source(e);
            while let Some(cause) = source {
                msg.push_str(&format!("\n  caused by: {}", cause));
                source = cause.source();
            }
            msg
        }
        FetchError::Aborted => "Request aborted".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(String, Severity)>>,
        fail: bool,
    }

    impl Notifier for Recorder {
        fn notify(&self, message: &str, severity: Severity) -> Result<()> {
            if self.fail {
                anyhow::bail!("toast backend down");
            }
            self.seen.lock().unwrap().push((message.to_string(), severity));
            Ok(())
        }
    }

    struct BrokenPopup;

    impl PopupPresenter for BrokenPopup {
        fn show_popup(&self, _message: &str, _kind: PopupKind, _title: &str) -> Result<()> {
            anyhow::bail!("no window")
        }
    }

    #[test]
    fn retry_and_success_messages() {
        let rec = Arc::new(Recorder::default());
        let reporter = Reporter::new(Some(rec.clone()), None);
        reporter.retrying(1, 4, Duration::from_millis(250), "too short");
        reporter.recovered(2);
        let seen = rec.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].0.contains("on attempt 1/4, retrying in 250 ms"));
        assert_eq!(seen[0].1, Severity::Info);
        assert_eq!(seen[1].1, Severity::Success);
    }

    #[test]
    fn failed_popup_falls_back_to_notifier() {
        let rec = Arc::new(Recorder::default());
        let reporter = Reporter::new(Some(rec.clone()), Some(Arc::new(BrokenPopup)));
        reporter.failed(&FetchError::EmptyContentExhausted { attempts: 3 });
        let seen = rec.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].1, Severity::Error);
        assert!(seen[0].0.contains("3 attempt"));
    }

    #[test]
    fn notifier_errors_are_swallowed() {
        let rec = Arc::new(Recorder {
            fail: true,
            ..Recorder::default()
        });
        let reporter = Reporter::new(Some(rec), Some(Arc::new(BrokenPopup)));
        reporter.retrying(1, 2, Duration::ZERO, "empty");
        reporter.failed(&FetchError::Aborted);
        Reporter::new(None, None).failed(&FetchError::EmptyContentExhausted { attempts: 1 });
    }

    #[test]
    fn failure_message_includes_detail() {
        let msg = failure_message(&FetchError::HttpStatus {
            status: 502,
            status_text: "Bad Gateway".into(),
            body: "upstream timeout".into(),
        });
        assert_eq!(msg, "Request failed with HTTP 502 Bad Gateway: upstream timeout");

        let msg = failure_message(&FetchError::Transport(TransportError::Other(
            "connection reset".into(),
        )));
        assert!(msg.contains("connection reset"));
    }
}
