// src/tools/net.rs

use std::fs;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::ToolError;
use crate::sandbox::{Workspace, validate_url};
use crate::tools::ToolResult;

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);
pub const FETCH_MAX_CHARS: usize = 2000;

fn client(timeout: Duration) -> Result<Client, ToolError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// GET `url` and return at most the first `FETCH_MAX_CHARS` characters.
pub fn fetch_url(url: &str) -> Result<ToolResult, ToolError> {
    let url = validate_url(url)?;

    let response = client(FETCH_TIMEOUT)?
        .get(url.as_str())
        .send()?
        .error_for_status()?;
    let status = response.status().as_u16();
    let body = response.text()?;

    let (text, truncated) = truncate_chars(&body, FETCH_MAX_CHARS);
    tracing::info!(url = %url, status, truncated, "fetched url");

    Ok(ToolResult::success(text)
        .with_meta("url", url.as_str())
        .with_meta("status", status)
        .with_meta("truncated", truncated))
}

/// GET `url` and write the body to `filename` inside the workspace.
///
/// Both inputs are validated before any network I/O.
pub fn download_file(
    workspace: &Workspace,
    url: &str,
    filename: &str,
) -> Result<ToolResult, ToolError> {
    let url = validate_url(url)?;
    let target = workspace.resolve(filename)?;

    let response = client(DOWNLOAD_TIMEOUT)?
        .get(url.as_str())
        .send()?
        .error_for_status()?;
    let status = response.status().as_u16();
    let bytes = response.bytes()?;

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, &bytes)?;
    tracing::info!(url = %url, path = %target.display(), bytes = bytes.len(), "downloaded file");

    let shown = target.display().to_string();
    Ok(ToolResult::success(format!("Downloaded {url} to {shown}"))
        .with_meta("url", url.as_str())
        .with_meta("path", shown)
        .with_meta("bytes", bytes.len())
        .with_meta("status", status))
}

fn truncate_chars(text: &str, max: usize) -> (String, bool) {
    match text.char_indices().nth(max) {
        Some((cut, _)) => (text[..cut].to_string(), true),
        None => (text.to_string(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_urls_fail_before_any_request() {
        for raw in ["ftp://x", "not a url"] {
            assert!(matches!(fetch_url(raw), Err(ToolError::InvalidUrl(_))), "{raw}");
        }
    }

    #[test]
    fn download_checks_url_and_target_first() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path()).unwrap();

        assert!(matches!(
            download_file(&ws, "ftp://example.com/f", "f.bin"),
            Err(ToolError::InvalidUrl(_))
        ));
        assert!(matches!(
            download_file(&ws, "https://example.com/f", "../f.bin"),
            Err(ToolError::PathEscape { .. })
        ));
    }

    #[test]
    fn truncation_counts_characters() {
        let text = "é".repeat(2500);
        let (cut, truncated) = truncate_chars(&text, FETCH_MAX_CHARS);
        assert!(truncated);
        assert_eq!(cut.chars().count(), FETCH_MAX_CHARS);

        let (same, truncated) = truncate_chars("short", FETCH_MAX_CHARS);
        assert_eq!(same, "short");
        assert!(!truncated);
    }
}
