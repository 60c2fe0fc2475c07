//! Intercept rules: decide whether an outbound URL goes through the retry loop.
//!
//! A rule wrapped in slashes (`/pattern/`) is a regular expression; anything
//! else is a case-insensitive substring. An empty rule list intercepts nothing.

use regex::Regex;

/// One compiled intercept rule.
#[derive(Debug, Clone)]
pub enum InterceptRule {
    Regex { source: String, regex: Regex },
    Substring { source: String, needle: String },
    /// `/pattern/` whose pattern did not compile. Never matches.
    Invalid { source: String },
}

impl InterceptRule {
    pub fn parse(rule: &str) -> Self {
        if rule.len() >= 2 && rule.starts_with('/') && rule.ends_with('/') {
            let pattern = &rule[1..rule.len() - 1];
            return match Regex::new(pattern) {
                Ok(regex) => InterceptRule::Regex {
                    source: rule.to_string(),
                    regex,
                },
                Err(e) => {
                    tracing::warn!(rule, error = %e, "invalid intercept regex, rule ignored");
                    InterceptRule::Invalid {
                        source: rule.to_string(),
                    }
                }
            };
        }
        InterceptRule::Substring {
            source: rule.to_string(),
            needle: rule.to_lowercase(),
        }
    }

    /// Rule text as configured.
    pub fn source(&self) -> &str {
        match self {
            InterceptRule::Regex { source, .. }
            | InterceptRule::Substring { source, .. }
            | InterceptRule::Invalid { source } => source,
        }
    }

    pub fn matches(&self, url: &str) -> bool {
        match self {
            InterceptRule::Regex { regex, .. } => regex.is_match(url),
            InterceptRule::Substring { needle, .. } => url.to_lowercase().contains(needle.as_str()),
            InterceptRule::Invalid { .. } => false,
        }
    }
}

/// Ordered, pre-compiled list of intercept rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<InterceptRule>,
}

impl RuleSet {
    pub fn compile(rules: &[String]) -> Self {
        Self {
            rules: rules.iter().map(|r| InterceptRule::parse(r)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the first rule matching `url`, or `None` when the URL is not
    /// intercepted (including empty rule sets and unparseable URLs).
    pub fn first_match(&self, url: &str) -> Option<&InterceptRule> {
        if self.rules.is_empty() || !is_valid_url(url) {
            return None;
        }
        self.rules.iter().find(|rule| rule.matches(url))
    }

    pub fn matches(&self, url: &str) -> bool {
        self.first_match(url).is_some()
    }
}

/// Returns true if `url` should go through the retry loop under `rules`.
pub fn should_intercept(url: &str, rules: &[String]) -> bool {
    if rules.is_empty() {
        return false;
    }
    RuleSet::compile(rules).matches(url)
}

fn is_valid_url(url: &str) -> bool {
    if url.trim().is_empty() {
        return false;
    }
    match url::Url::parse(url) {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!(url, error = %e, "unparseable request URL, not intercepting");
            false
        }
    }
}
