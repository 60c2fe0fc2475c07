//! `refetch match` – report whether a URL is intercepted.

use anyhow::Result;
use refetch_core::rules::RuleSet;
use refetch_core::settings::SettingsStore;

pub fn run_match(store: &SettingsStore, extension: &str, url: &str) -> Result<()> {
    let cfg = store.snapshot(extension);
    if !cfg.enabled {
        println!("not intercepted: retries are disabled for {}", extension);
        return Ok(());
    }
    let rules = RuleSet::compile(&cfg.intercept_rules);
    if rules.is_empty() {
        println!("not intercepted: no intercept rules configured");
        return Ok(());
    }
    match rules.first_match(url) {
        Some(rule) => println!("intercepted by rule {}", rule.source()),
        None => println!("not intercepted"),
    }
    Ok(())
}
