//! Error types returned by transports and the retry controller.

use thiserror::Error;

/// Failure of the underlying call itself (no HTTP response was produced).
#[derive(Debug, Error)]
pub enum TransportError {
    /// libcurl reported an error (timeout, connection, DNS, etc.).
    #[error("curl: {0}")]
    Curl(#[from] curl::Error),
    /// Request could not be built (bad header, bad method).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Blocking worker panicked or was cancelled by the runtime.
    #[error("transport worker failed: {0}")]
    Worker(String),
    /// Any other transport implementation failure.
    #[error("{0}")]
    Other(String),
}

/// Error returned by [`crate::transport::Transport::fetch`] and the retry controller.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Non-2xx response. Retryable.
    #[error("HTTP {status} {status_text}")]
    HttpStatus {
        status: u16,
        status_text: String,
        body: String,
    },
    /// Every attempt returned empty or low-signal content.
    #[error("no valid content after {attempts} attempt(s): responses were empty")]
    EmptyContentExhausted { attempts: u32 },
    /// The underlying call failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    /// The caller's cancellation signal fired.
    #[error("request aborted")]
    Aborted,
}

impl FetchError {
    pub fn is_aborted(&self) -> bool {
        matches!(self, FetchError::Aborted)
    }
}
