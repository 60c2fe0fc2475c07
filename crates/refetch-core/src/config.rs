use serde::{Deserialize, Serialize};

/// Delay policy between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    /// Wait `base_delay_ms` before every retry.
    #[default]
    Fixed,
    /// Wait `base_delay_ms * 2^attempt`, capped at `max_delay_ms`.
    Exponential,
}

/// Retry settings for one extension record in `settings.toml`.
///
/// Every field has a default so a partial record (e.g. only `intercept_rules`)
/// still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Global on/off switch.
    pub enabled: bool,
    /// Retries after the first try (total attempts = max_retries + 1).
    pub max_retries: u32,
    /// Delay between attempts in milliseconds.
    pub base_delay_ms: u64,
    /// Delay policy. Fixed unless explicitly set to exponential.
    pub backoff: Backoff,
    /// Upper bound for the exponential policy in milliseconds.
    pub max_delay_ms: u64,
    /// Minimum trimmed length (in chars) for a body to count as content.
    pub min_content_length: usize,
    /// Treat whitespace-only bodies as empty regardless of raw length.
    pub check_whitespace: bool,
    /// Per-attempt diagnostic logging.
    pub enable_logging: bool,
    /// Also classify by estimated token count of the extracted text.
    pub enable_min_token_retry: bool,
    /// Estimated tokens below which a body is empty. Must be > 0.
    pub min_token_threshold: usize,
    /// URL whitelist. `/regex/` or case-insensitive substring. Empty = intercept nothing.
    pub intercept_rules: Vec<String>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 3,
            base_delay_ms: 1000,
            backoff: Backoff::Fixed,
            max_delay_ms: 30_000,
            min_content_length: 10,
            check_whitespace: true,
            enable_logging: false,
            enable_min_token_retry: false,
            min_token_threshold: 10,
            intercept_rules: Vec::new(),
        }
    }
}

impl RetryConfig {
    /// Clamp values that would make the classifier meaningless.
    pub fn normalized(mut self) -> Self {
        if self.min_token_threshold == 0 {
            self.min_token_threshold = 1;
        }
        self
    }
}
