//! Response-content classification: is a completed body empty or low-signal?
//!
//! The primary test is length/whitespace based. When enabled, a secondary test
//! extracts the generated text from a JSON body and compares its estimated
//! token count against a threshold.

mod extract;
mod tokens;

pub use extract::{extract_text, FALLBACK_FIELDS};
pub use tokens::{
    char_ratio_estimate, estimate_tokens, CharRatioEstimator, TokenEstimator, CHARS_PER_TOKEN,
};

use crate::config::RetryConfig;

/// Why a body was judged empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Acceptable,
    Missing,
    TooShort { len: usize, min: usize },
    WhitespaceOnly,
    LowTokens { tokens: usize, min: usize },
}

impl Verdict {
    pub fn is_empty(&self) -> bool {
        !matches!(self, Verdict::Acceptable)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Acceptable => write!(f, "acceptable"),
            Verdict::Missing => write!(f, "no body"),
            Verdict::TooShort { len, min } => write!(f, "too short ({} < {} chars)", len, min),
            Verdict::WhitespaceOnly => write!(f, "whitespace only"),
            Verdict::LowTokens { tokens, min } => {
                write!(f, "too few tokens ({} < {})", tokens, min)
            }
        }
    }
}

/// Returns true if `body` should be treated as an empty response under `cfg`.
pub fn is_empty(
    body: Option<&str>,
    cfg: &RetryConfig,
    estimator: Option<&dyn TokenEstimator>,
) -> bool {
    classify(body, cfg, estimator).is_empty()
}

/// Full classification with the reason.
pub fn classify(
    body: Option<&str>,
    cfg: &RetryConfig,
    estimator: Option<&dyn TokenEstimator>,
) -> Verdict {
    let Some(body) = body else {
        return Verdict::Missing;
    };

    let len = body.trim_matches(is_blank).chars().count();
    if len < cfg.min_content_length {
        return Verdict::TooShort {
            len,
            min: cfg.min_content_length,
        };
    }
    if cfg.check_whitespace && body.chars().all(is_blank) {
        return Verdict::WhitespaceOnly;
    }

    if cfg.enable_min_token_retry {
        if let Some(tokens) = token_count(body, estimator) {
            let min = cfg.min_token_threshold.max(1);
            if tokens < min {
                return Verdict::LowTokens { tokens, min };
            }
        }
    }

    Verdict::Acceptable
}

/// Whitespace, plus the zero-width no-break space (BOM) that `char::is_whitespace` skips.
fn is_blank(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

/// Generated text from a JSON body, or `None` if the body is not JSON or has
/// no recognised shape.
pub fn extract_from_body(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    extract_text(&value)
}

/// Estimated tokens of the extracted text, or `None` if the body is not JSON.
fn token_count(body: &str, estimator: Option<&dyn TokenEstimator>) -> Option<usize> {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(error = %e, "body is not JSON, skipping token check");
            return None;
        }
    };
    let candidate = extract_text(&value).unwrap_or_else(|| body.to_string());
    Some(estimate_tokens(&candidate, estimator))
}
