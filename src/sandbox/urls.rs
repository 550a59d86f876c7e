// src/sandbox/urls.rs

use url::Url;

use crate::error::ToolError;

/// Accept only `http`/`https` URLs that name a host.
pub fn validate_url(raw: &str) -> Result<Url, ToolError> {
    let url = Url::parse(raw.trim()).map_err(|_| ToolError::InvalidUrl(raw.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(ToolError::InvalidUrl(raw.to_string())),
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(ToolError::InvalidUrl(raw.to_string())),
    }
}
