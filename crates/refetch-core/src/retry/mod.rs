//! Retry controller for empty or failed responses.
//!
//! This module owns the per-call state machine: attempt the underlying call,
//! classify the result, then succeed, wait and retry, or fail. Delays observe
//! the caller's cancellation signal and the attempt count never exceeds
//! `max_retries + 1`.

mod classify;
mod controller;
mod delay;
mod policy;

pub use classify::{classify_attempt, AttemptOutcome, RetryReason};
pub use controller::{ConfigSource, RetryController};
pub use delay::{sleep_or_cancel, Cancelled};
pub use policy::{RetryDecision, RetryPolicy};
