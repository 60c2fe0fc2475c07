//! libcurl-backed transport.
//!
//! Each request runs on a blocking worker with its own `Easy` handle. The
//! progress callback polls the request's cancellation signal so an aborted
//! request stops mid-transfer.

use super::parse::parse_head;
use super::{Request, Response, Transport};
use crate::error::{FetchError, TransportError};
use async_trait::async_trait;
use std::str;
use std::time::Duration;

/// Timeouts and redirect limits for the curl transport.
#[derive(Debug, Clone, Copy)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    /// Whole-transfer timeout. `None` = no limit beyond the caller's signal.
    pub timeout: Option<Duration>,
    pub max_redirections: u32,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            timeout: None,
            max_redirections: 10,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    options: CurlOptions,
}

impl CurlTransport {
    pub fn new(options: CurlOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Transport for CurlTransport {
    async fn fetch(&self, request: Request) -> Result<Response, FetchError> {
        let options = self.options;
        let signal = request.signal.clone();
        let result = tokio::task::spawn_blocking(move || perform(&request, options))
            .await
            .map_err(|e| TransportError::Worker(e.to_string()))?;

        match result {
            Err(TransportError::Curl(e))
                if e.is_aborted_by_callback()
                    && signal.as_ref().is_some_and(|s| s.is_cancelled()) =>
            {
                Err(FetchError::Aborted)
            }
            Err(e) => Err(e.into()),
            Ok(resp) => Ok(resp),
        }
    }
}

/// Runs one request to completion on the current thread.
fn perform(request: &Request, options: CurlOptions) -> Result<Response, TransportError> {
    let mut header_lines: Vec<String> = Vec::new();
    let mut data: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(&request.url)?;
    match request.method.as_str() {
        "GET" => {}
        "HEAD" => easy.nobody(true)?,
        "POST" => easy.post(true)?,
        other => easy.custom_request(other)?,
    }
    if let Some(body) = &request.body {
        easy.post_fields_copy(body)?;
    }
    easy.follow_location(true)?;
    easy.max_redirections(options.max_redirections)?;
    easy.connect_timeout(options.connect_timeout)?;
    if let Some(timeout) = options.timeout {
        easy.timeout(timeout)?;
    }

    let mut list = curl::easy::List::new();
    for (k, v) in &request.headers {
        if k.trim().is_empty() || k.contains(['\r', '\n']) || v.contains(['\r', '\n']) {
            return Err(TransportError::InvalidRequest(format!("bad header {:?}", k)));
        }
        list.append(&format!("{}: {}", k.trim(), v.trim()))?;
    }
    if !request.headers.is_empty() {
        easy.http_headers(list)?;
    }
    easy.progress(true)?;

    let performed = {
        let signal = request.signal.as_ref();
        let mut transfer = easy.transfer();
        transfer.header_function(|line| {
            if let Ok(s) = str::from_utf8(line) {
                header_lines.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.write_function(|chunk| {
            data.extend_from_slice(chunk);
            Ok(chunk.len())
        })?;
        transfer.progress_function(|_, _, _, _| !signal.is_some_and(|s| s.is_cancelled()))?;
        transfer.perform()
    };

    let head = parse_head(&header_lines);
    if let Err(e) = performed {
        // Status and headers arrived but the body stream broke: hand back a
        // response with an unreadable body instead of a transport failure.
        if head.complete && (e.is_partial_file() || e.is_recv_error()) {
            let code = easy.response_code()?;
            return Ok(Response::with_unreadable_body(
                code as u16,
                head.status_text,
                head.headers,
                &e.to_string(),
            ));
        }
        return Err(e.into());
    }

    let code = easy.response_code()?;
    Ok(Response::new(code as u16, head.status_text, head.headers, data))
}
