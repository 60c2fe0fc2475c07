//! Parse collected HTTP response header lines into a status line and header list.

/// Status text and headers of the final response in a (possibly redirected) exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResponseHead {
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    /// True once the blank line ending the last header block was seen.
    pub complete: bool,
}

/// Parse header lines as delivered by libcurl's header callback.
///
/// With redirects followed, several header blocks arrive in sequence; each
/// new `HTTP/` status line resets the state so only the last block is kept.
pub(crate) fn parse_head(lines: &[String]) -> ResponseHead {
    let mut head = ResponseHead::default();

    for line in lines {
        let line = line.trim();
        if line.starts_with("HTTP/") {
            head = ResponseHead {
                status_text: status_text(line),
                ..ResponseHead::default()
            };
            continue;
        }
        if line.is_empty() {
            head.complete = true;
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            head.headers
                .push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    head
}

/// "HTTP/1.1 404 Not Found" -> "Not Found". HTTP/2 has no reason phrase.
fn status_text(line: &str) -> String {
    let mut parts = line.splitn(3, ' ');
    let _version = parts.next();
    let _code = parts.next();
    parts.next().unwrap_or("").trim().to_string()
}
