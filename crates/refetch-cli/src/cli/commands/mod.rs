//! CLI command handlers. Each command is in its own file.

mod classify;
mod config;
mod fetch;
mod match_url;
mod rules;

pub use classify::run_classify;
pub use config::run_config;
pub use fetch::{run_fetch, FetchArgs};
pub use match_url::run_match;
pub use rules::run_rules;
