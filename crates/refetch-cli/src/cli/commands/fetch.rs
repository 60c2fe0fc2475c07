//! `refetch fetch` – send one request through the retry controller.

use anyhow::{Context, Result};
use refetch_core::retry::{ConfigSource, RetryController};
use refetch_core::settings::SettingsStore;
use refetch_core::transport::{CurlTransport, Request};
use std::io::Write;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub struct FetchArgs {
    pub url: String,
    pub method: String,
    pub headers: Vec<String>,
    pub data: Option<String>,
    pub include: bool,
}

pub async fn run_fetch(store: Arc<SettingsStore>, extension: &str, args: FetchArgs) -> Result<()> {
    let source = ConfigSource::Store {
        store,
        extension_id: extension.to_string(),
    };
    let controller = RetryController::new(CurlTransport::default(), source);

    // Ctrl-C cancels the in-flight attempt or the pending retry delay.
    let signal = CancellationToken::new();
    let on_interrupt = signal.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let request = build_request(&args)?.with_signal(signal);
    let response = controller
        .execute(request)
        .await
        .with_context(|| format!("{} {}", args.method, args.url))?;

    let mut out = std::io::stdout().lock();
    if args.include {
        writeln!(out, "HTTP {} {}", response.status, response.status_text)?;
        for (name, value) in &response.headers {
            writeln!(out, "{}: {}", name, value)?;
        }
        writeln!(out)?;
    }
    let body = response.into_bytes().context("response body")?;
    out.write_all(&body)?;
    out.flush()?;
    Ok(())
}

fn build_request(args: &FetchArgs) -> Result<Request> {
    let mut request = Request::new(&args.method, &args.url);
    for header in &args.headers {
        let (name, value) = parse_header(header)?;
        request = request.with_header(name, value);
    }
    if let Some(data) = &args.data {
        request = request.with_body(data.as_bytes().to_vec());
    }
    Ok(request)
}

/// "Name: value" -> ("Name", "value").
fn parse_header(raw: &str) -> Result<(&str, &str)> {
    let (name, value) = raw
        .split_once(':')
        .with_context(|| format!("header {:?} is not in 'Name: value' form", raw))?;
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("header {:?} has an empty name", raw);
    }
    Ok((name, value.trim()))
}
