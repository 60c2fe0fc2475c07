//! Token-count estimation for the low-signal check.

use anyhow::Result;

/// Average characters per token used by the built-in estimate.
pub const CHARS_PER_TOKEN: f64 = 3.35;

/// Injected token counter (e.g. a real tokenizer).
pub trait TokenEstimator: Send + Sync {
    fn estimate(&self, text: &str) -> Result<usize>;
}

/// `ceil(chars / 3.35)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharRatioEstimator;

impl TokenEstimator for CharRatioEstimator {
    fn estimate(&self, text: &str) -> Result<usize> {
        Ok(char_ratio_estimate(text))
    }
}

pub fn char_ratio_estimate(text: &str) -> usize {
    (text.chars().count() as f64 / CHARS_PER_TOKEN).ceil() as usize
}

/// Estimate with `estimator`, falling back to the char ratio if it fails.
pub fn estimate_tokens(text: &str, estimator: Option<&dyn TokenEstimator>) -> usize {
    match estimator {
        Some(est) => match est.estimate(text) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, "token estimator failed, using character ratio");
                char_ratio_estimate(text)
            }
        },
        None => char_ratio_estimate(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl TokenEstimator for Failing {
        fn estimate(&self, _text: &str) -> Result<usize> {
            anyhow::bail!("tokenizer not loaded")
        }
    }

    struct Words;

    impl TokenEstimator for Words {
        fn estimate(&self, text: &str) -> Result<usize> {
            Ok(text.split_whitespace().count())
        }
    }

    #[test]
    fn char_ratio_rounds_up() {
        assert_eq!(char_ratio_estimate(""), 0);
        assert_eq!(char_ratio_estimate("a"), 1);
        assert_eq!(char_ratio_estimate("abc"), 1);
        assert_eq!(char_ratio_estimate("abcd"), 2);
        assert_eq!(char_ratio_estimate(&"x".repeat(10)), 3);
    }

    #[test]
    fn counts_chars_not_bytes() {
        assert_eq!(char_ratio_estimate("ééé"), 1);
    }

    #[test]
    fn injected_estimator_is_used() {
        assert_eq!(estimate_tokens("one two three", Some(&Words)), 3);
    }

    #[test]
    fn failing_estimator_falls_back() {
        assert_eq!(estimate_tokens("abcd", Some(&Failing)), 2);
    }
}
