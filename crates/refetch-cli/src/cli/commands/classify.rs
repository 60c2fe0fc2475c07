//! `refetch classify` – run the content classifier over a saved body.

use anyhow::{Context, Result};
use refetch_core::content;
use refetch_core::settings::SettingsStore;
use std::io::Read;
use std::path::Path;

pub fn run_classify(store: &SettingsStore, extension: &str, path: Option<&Path>) -> Result<()> {
    let cfg = store.snapshot(extension);
    let body = match path {
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?,
        None => {
            let mut s = String::new();
            std::io::stdin()
                .read_to_string(&mut s)
                .context("reading stdin")?;
            s
        }
    };

    let verdict = content::classify(Some(&body), &cfg, None);
    let label = if verdict.is_empty() { "empty" } else { "ok" };
    println!("{}: {}", label, verdict);

    let text = content::extract_from_body(&body).unwrap_or(body);
    println!(
        "chars: {}  estimated tokens: {}",
        text.trim().chars().count(),
        content::char_ratio_estimate(&text)
    );
    Ok(())
}
