//! `refetch config` – inspect the settings record.

use crate::cli::ConfigAction;
use anyhow::{Context, Result};
use refetch_core::settings::SettingsStore;

pub fn run_config(store: &SettingsStore, extension: &str, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let cfg = store.snapshot(extension);
            let text = toml::to_string_pretty(&cfg).context("serializing settings")?;
            println!("# [extensions.{}]", extension);
            print!("{}", text);
        }
        ConfigAction::Path => println!("{}", store.path().display()),
    }
    Ok(())
}
