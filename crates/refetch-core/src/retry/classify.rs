//! Turn the result of one underlying call into an attempt outcome.

use crate::config::RetryConfig;
use crate::content::{self, TokenEstimator, Verdict};
use crate::error::{FetchError, TransportError};
use crate::transport::{Request, Response};
use std::fmt;

/// Why an attempt should be retried.
#[derive(Debug)]
pub enum RetryReason {
    EmptyContent(Verdict),
    HttpStatus {
        status: u16,
        status_text: String,
        body: String,
    },
    Transport(TransportError),
}

impl RetryReason {
    /// The error to surface if this was the last attempt.
    pub fn into_error(self, attempts: u32) -> FetchError {
        match self {
            RetryReason::EmptyContent(_) => FetchError::EmptyContentExhausted { attempts },
            RetryReason::HttpStatus {
                status,
                status_text,
                body,
            } => FetchError::HttpStatus {
                status,
                status_text,
                body,
            },
            RetryReason::Transport(e) => FetchError::Transport(e),
        }
    }
}

impl fmt::Display for RetryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryReason::EmptyContent(verdict) => write!(f, "{}", verdict),
            RetryReason::HttpStatus {
                status,
                status_text,
                ..
            } => write!(f, "HTTP {} {}", status, status_text),
            RetryReason::Transport(e) => write!(f, "{}", e),
        }
    }
}

/// Result of a single attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    Success(Response),
    RetryableFailure(RetryReason),
    TerminalFailure(FetchError),
    Aborted,
}

/// Classify a completed call. `request` supplies the cancellation signal.
pub fn classify_attempt(
    result: Result<Response, FetchError>,
    request: &Request,
    cfg: &RetryConfig,
    estimator: Option<&dyn TokenEstimator>,
) -> AttemptOutcome {
    let response = match result {
        Ok(r) => r,
        Err(_) if request.is_cancelled() => return AttemptOutcome::Aborted,
        Err(e) => return classify_error(e),
    };

    if !response.is_success() {
        return AttemptOutcome::RetryableFailure(RetryReason::HttpStatus {
            status: response.status,
            status_text: response.status_text.clone(),
            body: response.lossy_text(),
        });
    }

    // Inspect a duplicate so the caller gets the response untouched.
    let copy = response.duplicate();
    let text = match copy.peek_text() {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!(error = %e, "response body unreadable, passing through");
            return AttemptOutcome::Success(response);
        }
    };

    match content::classify(Some(text), cfg, estimator) {
        Verdict::Acceptable => AttemptOutcome::Success(response),
        verdict => AttemptOutcome::RetryableFailure(RetryReason::EmptyContent(verdict)),
    }
}

fn classify_error(e: FetchError) -> AttemptOutcome {
    match e {
        FetchError::Aborted => AttemptOutcome::Aborted,
        FetchError::Transport(te) => AttemptOutcome::RetryableFailure(RetryReason::Transport(te)),
        FetchError::HttpStatus {
            status,
            status_text,
            body,
        } => AttemptOutcome::RetryableFailure(RetryReason::HttpStatus {
            status,
            status_text,
            body,
        }),
        other => AttemptOutcome::TerminalFailure(other),
    }
}
