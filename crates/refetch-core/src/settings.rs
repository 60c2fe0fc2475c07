//! Settings store: retry records keyed by extension id, persisted as TOML.
//!
//! The file lives at `~/.config/refetch/settings.toml`:
//!
//! ```toml
//! [extensions.refetch]
//! max_retries = 3
//! intercept_rules = ["api.example.com"]
//! ```
//!
//! Readers take a cloned snapshot per request; writers replace a whole record
//! and ask for a debounced save.

use crate::config::RetryConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Record used when no extension id is given.
pub const DEFAULT_EXTENSION_ID: &str = "refetch";

/// Saves requested within this window coalesce into one write.
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    extensions: BTreeMap<String, RetryConfig>,
}

pub struct SettingsStore {
    path: PathBuf,
    records: RwLock<BTreeMap<String, RetryConfig>>,
    save_generation: AtomicU64,
    debounce: Duration,
}

pub fn settings_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("refetch")?;
    Ok(xdg_dirs.place_config_file("settings.toml")?)
}

impl SettingsStore {
    /// Open the default settings file, creating it if none exists.
    pub fn load_or_init() -> Result<Self> {
        Self::open_at(&settings_path()?)
    }

    /// Open `path`, writing a file with one default record if it does not exist.
    pub fn open_at(path: &Path) -> Result<Self> {
        let records = if path.exists() {
            let data = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let file: SettingsFile =
                toml::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
            file.extensions
        } else {
            let mut records = BTreeMap::new();
            records.insert(DEFAULT_EXTENSION_ID.to_string(), RetryConfig::default());
            write_file(path, &records)?;
            tracing::info!("created default settings at {}", path.display());
            records
        };

        Ok(Self {
            path: path.to_path_buf(),
            records: RwLock::new(records),
            save_generation: AtomicU64::new(0),
            debounce: SAVE_DEBOUNCE,
        })
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<RetryConfig> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Value copy of `key`'s record (defaults if absent) for one retry sequence.
    pub fn snapshot(&self, key: &str) -> RetryConfig {
        self.get(key).unwrap_or_default().normalized()
    }

    pub fn set(&self, key: &str, record: RetryConfig) {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), record);
    }

    /// Read-modify-write of one record.
    pub fn update(&self, key: &str, f: impl FnOnce(&mut RetryConfig)) {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        f(records.entry(key.to_string()).or_default());
    }

    pub fn keys(&self) -> Vec<String> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Write all records to disk now.
    pub fn save(&self) -> Result<()> {
        let records = self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        write_file(&self.path, &records)
    }

    /// Save after the debounce window unless another save is requested first.
    ///
    /// The returned task yields `true` if it performed the write.
    pub fn schedule_save(self: &Arc<Self>) -> tokio::task::JoinHandle<bool> {
        let generation = self.save_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let store = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(store.debounce).await;
            if store.save_generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            match store.save() {
                Ok(()) => {
                    tracing::debug!("settings saved to {}", store.path.display());
                    true
                }
                Err(e) => {
                    tracing::warn!(error = %e, "could not save settings");
                    false
                }
            }
        })
    }
}

/// Write-then-rename so readers never see a half-written file.
fn write_file(path: &Path, records: &BTreeMap<String, RetryConfig>) -> Result<()> {
    let file = SettingsFile {
        extensions: records.clone(),
    };
    let toml = toml::to_string_pretty(&file)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("toml.tmp");
    fs::write(&tmp, toml).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}
