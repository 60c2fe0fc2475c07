//! Fetch-shaped request/response types and the transport seam.
//!
//! A [`Transport`] takes a [`Request`] (URL plus passthrough options and an
//! optional cancellation signal) and yields a buffered [`Response`]. The retry
//! controller implements the same trait, so it can stand in for the transport
//! it wraps.

mod easy;
mod parse;

pub use easy::{CurlOptions, CurlTransport};

use crate::error::FetchError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Outbound call descriptor. Cloned verbatim for every attempt.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    /// Caller-supplied cancellation signal.
    pub signal: Option<CancellationToken>,
}

impl Request {
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            url: url.to_string(),
            headers: Vec::new(),
            body: None,
            signal: None,
        }
    }

    pub fn get(url: &str) -> Self {
        Self::new("GET", url)
    }

    pub fn post(url: &str, body: impl Into<Vec<u8>>) -> Self {
        Self::new("POST", url).with_body(body)
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.signal.as_ref().is_some_and(|s| s.is_cancelled())
    }
}

impl From<&str> for Request {
    fn from(url: &str) -> Self {
        Request::get(url)
    }
}

impl From<String> for Request {
    fn from(url: String) -> Self {
        Request::get(&url)
    }
}

/// Why a response body cannot be inspected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BodyError {
    #[error("body could not be read: {0}")]
    Unreadable(String),
    #[error("body is not valid UTF-8")]
    NotUtf8,
}

/// Buffered response body. Cloning shares the buffer.
#[derive(Debug, Clone)]
pub enum Body {
    Bytes(Arc<[u8]>),
    /// Headers arrived but the body stream failed.
    Unreadable(Arc<str>),
}

/// A completed HTTP response.
///
/// `Clone` yields an independent handle onto the same buffered body, so the
/// classifier can read a duplicate while the caller still gets an unconsumed
/// response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    body: Body,
}

impl Response {
    pub fn new(
        status: u16,
        status_text: impl Into<String>,
        headers: Vec<(String, String)>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            headers,
            body: Body::Bytes(Arc::from(body.into())),
        }
    }

    /// Response whose body failed to arrive after the status line.
    pub fn with_unreadable_body(
        status: u16,
        status_text: impl Into<String>,
        headers: Vec<(String, String)>,
        reason: &str,
    ) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            headers,
            body: Body::Unreadable(Arc::from(reason)),
        }
    }

    /// Shorthand for a `200 OK` text response.
    pub fn ok(body: &str) -> Self {
        Self::new(200, "OK", Vec::new(), body.as_bytes().to_vec())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Independent handle onto the same body.
    pub fn duplicate(&self) -> Response {
        self.clone()
    }

    /// Raw body bytes without consuming the response.
    pub fn peek_bytes(&self) -> Result<&[u8], BodyError> {
        match &self.body {
            Body::Bytes(b) => Ok(&b[..]),
            Body::Unreadable(reason) => Err(BodyError::Unreadable(reason.to_string())),
        }
    }

    /// Body as UTF-8 text without consuming the response.
    pub fn peek_text(&self) -> Result<&str, BodyError> {
        std::str::from_utf8(self.peek_bytes()?).map_err(|_| BodyError::NotUtf8)
    }

    /// Body text with invalid UTF-8 replaced; empty if unreadable.
    pub fn lossy_text(&self) -> String {
        match self.peek_bytes() {
            Ok(b) => String::from_utf8_lossy(b).into_owned(),
            Err(_) => String::new(),
        }
    }

    pub fn into_bytes(self) -> Result<Vec<u8>, BodyError> {
        self.peek_bytes().map(<[u8]>::to_vec)
    }

    pub fn text(self) -> Result<String, BodyError> {
        self.peek_text().map(str::to_string)
    }
}

/// The underlying call primitive.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, request: Request) -> Result<Response, FetchError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn fetch(&self, request: Request) -> Result<Response, FetchError> {
        (**self).fetch(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_leaves_original_readable() {
        let resp = Response::ok("hello world");
        let copy = resp.duplicate();
        assert_eq!(copy.text().unwrap(), "hello world");
        assert_eq!(resp.peek_text().unwrap(), "hello world");
        assert_eq!(resp.into_bytes().unwrap(), b"hello world".to_vec());
    }

    #[test]
    fn unreadable_body_reports_error() {
        let resp = Response::with_unreadable_body(200, "OK", Vec::new(), "connection reset");
        assert_eq!(
            resp.peek_text(),
            Err(BodyError::Unreadable("connection reset".into()))
        );
        assert_eq!(resp.lossy_text(), "");
    }

    #[test]
    fn non_utf8_body() {
        let resp = Response::new(200, "OK", Vec::new(), vec![0xff, 0xfe, 0x00]);
        assert_eq!(resp.peek_text(), Err(BodyError::NotUtf8));
        assert_eq!(resp.peek_bytes().unwrap().len(), 3);
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let resp = Response::new(
            200,
            "OK",
            vec![("Content-Type".into(), "application/json".into())],
            Vec::new(),
        );
        assert_eq!(resp.header("content-type"), Some("application/json"));
        assert!(resp.header("etag").is_none());
    }

    #[test]
    fn request_builder_and_signal() {
        let token = CancellationToken::new();
        let req = Request::new("post", "https://example.com/")
            .with_header("Authorization", "Bearer x")
            .with_body("{}")
            .with_signal(token.clone());
        assert_eq!(req.method, "POST");
        assert_eq!(req.headers.len(), 1);
        assert!(!req.is_cancelled());
        token.cancel();
        assert!(req.clone().is_cancelled());
        assert!(!Request::from("https://example.com/").is_cancelled());
    }
}
