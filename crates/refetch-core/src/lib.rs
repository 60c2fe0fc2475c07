//! refetch: a transparent retry layer for outbound HTTP calls.
//!
//! Selected requests (by URL rule) are sent through a [`retry::RetryController`],
//! which classifies each response body and retries empty or low-signal ones
//! with a fixed delay until valid content arrives, a terminal error occurs, or
//! the retry budget runs out.

pub mod config;
pub mod content;
pub mod error;
pub mod logging;
pub mod notify;
pub mod retry;
pub mod rules;
pub mod settings;
pub mod transport;

pub use config::{Backoff, RetryConfig};
pub use error::{FetchError, TransportError};
pub use retry::{ConfigSource, RetryController};
pub use transport::{CurlTransport, Request, Response, Transport};
