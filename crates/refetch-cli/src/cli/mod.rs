//! CLI for the refetch retry layer.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use refetch_core::settings::{SettingsStore, DEFAULT_EXTENSION_ID};
use std::path::PathBuf;
use std::sync::Arc;

use commands::{run_classify, run_config, run_fetch, run_match, run_rules, FetchArgs};

/// Top-level CLI for refetch.
#[derive(Debug, Parser)]
#[command(name = "refetch")]
#[command(about = "refetch: retry HTTP calls that come back empty", long_about = None)]
pub struct Cli {
    /// Settings record to use (extension id in settings.toml).
    #[arg(long, global = true, default_value = DEFAULT_EXTENSION_ID)]
    pub extension: String,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Send a request through the retry layer and print the response body.
    Fetch {
        /// HTTP/HTTPS URL to request.
        url: String,
        /// Request method.
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,
        /// Extra request header, e.g. -H 'Authorization: Bearer x'. Repeatable.
        #[arg(short = 'H', long = "header", value_name = "HEADER")]
        headers: Vec<String>,
        /// Request body.
        #[arg(short = 'd', long)]
        data: Option<String>,
        /// Print the status line and response headers before the body.
        #[arg(short = 'i', long)]
        include: bool,
    },

    /// Show whether a URL would be intercepted, and by which rule.
    Match {
        /// URL to test against the intercept rules.
        url: String,
    },

    /// Classify a response body with the current settings.
    Classify {
        /// File holding the body (reads stdin if omitted).
        path: Option<PathBuf>,
    },

    /// List, add or remove intercept rules.
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },

    /// Show the settings record or the settings file location.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum RulesAction {
    /// List intercept rules in order.
    List,
    /// Append a rule: `/regex/` or a case-insensitive substring.
    Add { rule: String },
    /// Remove a rule (exact text).
    Remove { rule: String },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the settings record as TOML.
    Show,
    /// Print the settings file path.
    Path,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let store = Arc::new(SettingsStore::load_or_init()?);
        tracing::debug!(
            "loaded settings from {} (extension {})",
            store.path().display(),
            cli.extension
        );
        let extension = cli.extension.as_str();

        match cli.command {
            CliCommand::Fetch {
                url,
                method,
                headers,
                data,
                include,
            } => {
                let args = FetchArgs {
                    url,
                    method,
                    headers,
                    data,
                    include,
                };
                run_fetch(Arc::clone(&store), extension, args).await?
            }
            CliCommand::Match { url } => run_match(&store, extension, &url)?,
            CliCommand::Classify { path } => run_classify(&store, extension, path.as_deref())?,
            CliCommand::Rules { action } => run_rules(&store, extension, action)?,
            CliCommand::Config { action } => run_config(&store, extension, action)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
