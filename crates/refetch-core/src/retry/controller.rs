//! The retry controller: wraps a transport and retries empty responses.

use super::classify::{classify_attempt, AttemptOutcome, RetryReason};
use super::delay::sleep_or_cancel;
use super::policy::{RetryDecision, RetryPolicy};
use crate::config::RetryConfig;
use crate::content::TokenEstimator;
use crate::error::FetchError;
use crate::notify::Reporter;
use crate::rules::RuleSet;
use crate::settings::SettingsStore;
use crate::transport::{Request, Response, Transport};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Where the controller reads its configuration from at the start of each call.
#[derive(Clone)]
pub enum ConfigSource {
    /// A fixed snapshot.
    Fixed(Arc<RetryConfig>),
    /// A live record in the settings store, re-read on every call.
    Store {
        store: Arc<SettingsStore>,
        extension_id: String,
    },
}

impl ConfigSource {
    pub fn snapshot(&self) -> RetryConfig {
        match self {
            ConfigSource::Fixed(cfg) => RetryConfig::clone(cfg),
            ConfigSource::Store {
                store,
                extension_id,
            } => store.snapshot(extension_id),
        }
    }
}

impl From<RetryConfig> for ConfigSource {
    fn from(cfg: RetryConfig) -> Self {
        ConfigSource::Fixed(Arc::new(cfg))
    }
}

/// Retry layer in front of an underlying transport.
///
/// Implements [`Transport`] itself, so callers swap it in wherever the wrapped
/// transport was used. While uninstalled every call goes straight through.
pub struct RetryController<T> {
    inner: T,
    config: ConfigSource,
    reporter: Reporter,
    estimator: Option<Arc<dyn TokenEstimator>>,
    installed: AtomicBool,
    /// Rule list of the last snapshot and its compiled form.
    compiled_rules: Mutex<Option<(Vec<String>, Arc<RuleSet>)>>,
}

impl<T: Transport> RetryController<T> {
    /// New controller, installed, reporting through the tracing notifier.
    pub fn new(inner: T, config: impl Into<ConfigSource>) -> Self {
        Self {
            inner,
            config: config.into(),
            reporter: Reporter::default(),
            estimator: None,
            installed: AtomicBool::new(true),
            compiled_rules: Mutex::new(None),
        }
    }

    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_estimator(mut self, estimator: Arc<dyn TokenEstimator>) -> Self {
        self.estimator = Some(estimator);
        self
    }

    pub fn install(&self) {
        if !self.installed.swap(true, Ordering::SeqCst) {
            tracing::info!("retry interception installed");
        }
    }

    pub fn uninstall(&self) {
        if self.installed.swap(false, Ordering::SeqCst) {
            tracing::info!("retry interception uninstalled");
        }
    }

    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }

    /// The wrapped transport.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Send `request`, retrying empty or failed responses per the current config.
    pub async fn execute(&self, request: Request) -> Result<Response, FetchError> {
        let cfg = self.config.snapshot();
        if !self.is_installed() || !cfg.enabled {
            return self.inner.fetch(request).await;
        }
        if !self.rules_for(&cfg.intercept_rules).matches(&request.url) {
            return self.inner.fetch(request).await;
        }
        self.run(request, &cfg).await
    }

    /// Compiled form of `rules`, recompiled only when the list changes.
    fn rules_for(&self, rules: &[String]) -> Arc<RuleSet> {
        let mut cached = self
            .compiled_rules
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match cached.as_ref() {
            Some((source, set)) if source.as_slice() == rules => Arc::clone(set),
            _ => {
                let set = Arc::new(RuleSet::compile(rules));
                *cached = Some((rules.to_vec(), Arc::clone(&set)));
                set
            }
        }
    }

    async fn run(&self, request: Request, cfg: &RetryConfig) -> Result<Response, FetchError> {
        let policy = RetryPolicy::from_config(cfg);
        let total = policy.total_attempts();
        let verbose = cfg.enable_logging;
        let estimator = self.estimator.as_deref();

        let mut attempt = 0u32;
        loop {
            if request.is_cancelled() {
                tracing::debug!(url = %request.url, attempt, "cancelled before attempt");
                return Err(FetchError::Aborted);
            }
            if verbose {
                tracing::info!(url = %request.url, attempt = attempt + 1, total, "attempting");
            }

            let result = self.inner.fetch(request.clone()).await;
            let reason = match classify_attempt(result, &request, cfg, estimator) {
                AttemptOutcome::Success(response) => {
                    if attempt > 0 {
                        self.reporter.recovered(attempt + 1);
                    }
                    if verbose {
                        tracing::info!(url = %request.url, attempt = attempt + 1, "valid response");
                    }
                    return Ok(response);
                }
                AttemptOutcome::Aborted => {
                    tracing::debug!(url = %request.url, attempt, "aborted");
                    return Err(FetchError::Aborted);
                }
                AttemptOutcome::TerminalFailure(e) => {
                    tracing::warn!(url = %request.url, error = %e, "terminal failure, not retrying");
                    self.reporter.failed(&e);
                    return Err(e);
                }
                AttemptOutcome::RetryableFailure(reason) => reason,
            };

            match policy.decide(attempt) {
                RetryDecision::RetryAfter(delay) => {
                    if verbose {
                        tracing::info!(
                            url = %request.url,
                            attempt = attempt + 1,
                            delay_ms = delay.as_millis() as u64,
                            reason = %reason,
                            "retrying"
                        );
                    }
                    self.reporter
                        .retrying(attempt + 1, total, delay, &reason.to_string());
                    if sleep_or_cancel(delay, request.signal.as_ref()).await.is_err() {
                        tracing::debug!(url = %request.url, "cancelled during retry delay");
                        return Err(FetchError::Aborted);
                    }
                    attempt += 1;
                }
                RetryDecision::GiveUp => return Err(self.exhausted(&request, reason, total)),
            }
        }
    }

    fn exhausted(&self, request: &Request, reason: RetryReason, total: u32) -> FetchError {
        let error = reason.into_error(total);
        tracing::warn!(url = %request.url, attempts = total, error = %error, "retries exhausted");
        if !request.is_cancelled() {
            self.reporter.failed(&error);
        }
        error
    }
}

#[async_trait]
impl<T: Transport> Transport for RetryController<T> {
    async fn fetch(&self, request: Request) -> Result<Response, FetchError> {
        self.execute(request).await
    }
}
