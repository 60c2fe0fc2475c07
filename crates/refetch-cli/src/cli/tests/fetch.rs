//! Tests for fetch argument parsing.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;

#[test]
fn cli_parse_fetch_defaults() {
    match parse(&["refetch", "fetch", "https://api.example.com/v1/chat"]) {
        CliCommand::Fetch {
            url,
            method,
            headers,
            data,
            include,
        } => {
            assert_eq!(url, "https://api.example.com/v1/chat");
            assert_eq!(method, "GET");
            assert!(headers.is_empty());
            assert!(data.is_none());
            assert!(!include);
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_fetch_post_with_headers() {
    match parse(&[
        "refetch",
        "fetch",
        "-X",
        "POST",
        "-H",
        "Content-Type: application/json",
        "--header",
        "Authorization: Bearer t",
        "-d",
        "{\"prompt\":\"hi\"}",
        "-i",
        "https://api.example.com/v1/completions",
    ]) {
        CliCommand::Fetch {
            method,
            headers,
            data,
            include,
            ..
        } => {
            assert_eq!(method, "POST");
            assert_eq!(headers.len(), 2);
            assert_eq!(headers[1], "Authorization: Bearer t");
            assert_eq!(data.as_deref(), Some("{\"prompt\":\"hi\"}"));
            assert!(include);
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_fetch_requires_url() {
    assert!(Cli::try_parse_from(["refetch", "fetch"]).is_err());
}

#[test]
fn cli_parse_extension_is_global() {
    let cli = Cli::try_parse_from(["refetch", "fetch", "http://x/", "--extension", "proxy"]).unwrap();
    assert_eq!(cli.extension, "proxy");

    let cli = Cli::try_parse_from(["refetch", "match", "http://x/"]).unwrap();
    assert_eq!(cli.extension, "refetch");
}
