// src/policy/params.rs

//! Deterministic parameter extraction from the user's text.
//!
//! Each tool has one rule plus a fallback, so extraction always yields a
//! call; the tool layer validates whatever comes out.

use std::sync::LazyLock;

use regex::Regex;

use crate::tools::{ToolCall, ToolId};

pub const DEFAULT_CONTENT: &str = "default content";
pub const DEFAULT_WRITE_PATH: &str = "default.txt";
pub const DEFAULT_DOWNLOAD_NAME: &str = "download.bin";
pub const DEFAULT_COMMAND: &str = "echo 'no command specified'";

/// Words after `in`/`of` that mean the workspace root itself.
const CURRENT_DIR_WORDS: &[&str] = &["this", "current", "here", "."];

static READ_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:read|show|display|open|cat)\s+(?:me\s+)?(?:the\s+)?(?:file\s+)?(?:(?:at|named|called)\s+)?(\S+)")
        .expect("valid read regex")
});
static WRITE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\b(?:create|write|make)\s+(?:a\s+)?(?:new\s+)?(?:file\s+)?(\S+)\s+(?:with|containing)\s+(.+)")
        .expect("valid write regex")
});
static LIST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:in|of|under|inside)\s+(?:the\s+)?(?:directory\s+|folder\s+)?(\S+)")
        .expect("valid list regex")
});
static DELETE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:delete|remove)\s+(?:the\s+)?(?:file\s+)?(\S+)")
        .expect("valid delete regex")
});
static RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\b(?:run|execute|shell)\s+(.+)").expect("valid run regex")
});
static DOWNLOAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bdownload\s+(\S+)\s+(?:to|as|into)\s+(\S+)").expect("valid download regex")
});
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z][A-Za-z0-9+.\-]*://\S+").expect("valid url regex")
});
static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:[a-z0-9-]+\.)+[a-z]{2,}(?:/\S*)?").expect("valid domain regex")
});

/// Build the call for `tool` from `input`. Never fails.
pub fn extract(tool: ToolId, input: &str) -> ToolCall {
    let input = input.trim();
    match tool {
        ToolId::ReadFile => ToolCall::ReadFile {
            path: capture(&READ_RE, input, 1)
                .or_else(|| last_word(input))
                .unwrap_or_else(|| ".".into()),
        },
        ToolId::WriteFile => extract_write(input),
        ToolId::ListDirectory => ToolCall::ListDirectory {
            path: capture(&LIST_RE, input, 1)
                .filter(|p| !CURRENT_DIR_WORDS.contains(&p.to_ascii_lowercase().as_str()))
                .unwrap_or_else(|| ".".into()),
        },
        ToolId::DeleteFile => ToolCall::DeleteFile {
            path: capture(&DELETE_RE, input, 1)
                .or_else(|| last_word(input))
                .unwrap_or_default(),
        },
        ToolId::RunShell => ToolCall::RunShell {
            command: RUN_RE
                .captures(input)
                .map(|c| strip_ticks(&c[1]))
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_COMMAND.into()),
        },
        ToolId::FetchUrl => ToolCall::FetchUrl {
            url: find_url(input).unwrap_or_else(|| input.to_string()),
        },
        ToolId::DownloadFile => extract_download(input),
    }
}

fn extract_write(input: &str) -> ToolCall {
    if let Some(caps) = WRITE_RE.captures(input) {
        return ToolCall::WriteFile {
            path: clean_token(&caps[1]),
            content: strip_quotes(caps[2].trim()).to_string(),
        };
    }
    let words: Vec<&str> = input.split_whitespace().collect();
    let path = if words.len() >= 2 {
        last_word(input).unwrap_or_else(|| DEFAULT_WRITE_PATH.into())
    } else {
        DEFAULT_WRITE_PATH.into()
    };
    ToolCall::WriteFile {
        path,
        content: DEFAULT_CONTENT.into(),
    }
}

fn extract_download(input: &str) -> ToolCall {
    if let Some(caps) = DOWNLOAD_RE.captures(input) {
        return ToolCall::DownloadFile {
            url: clean_token(&caps[1]),
            filename: clean_token(&caps[2]),
        };
    }
    let url = find_url(input).unwrap_or_else(|| input.to_string());
    let filename = url::Url::parse(&url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_DOWNLOAD_NAME.into());
    ToolCall::DownloadFile { url, filename }
}

/// First `scheme://...` token, else a bare domain promoted to https.
fn find_url(input: &str) -> Option<String> {
    if let Some(m) = URL_RE.find(input) {
        return Some(clean_token(m.as_str()));
    }
    DOMAIN_RE
        .find(input)
        .map(|m| format!("https://{}", clean_token(m.as_str())))
}

fn capture(re: &Regex, input: &str, group: usize) -> Option<String> {
    re.captures(input)
        .and_then(|c| c.get(group))
        .map(|m| clean_token(m.as_str()))
        .filter(|s| !s.is_empty())
}

fn last_word(input: &str) -> Option<String> {
    input
        .split_whitespace()
        .last()
        .map(clean_token)
        .filter(|s| !s.is_empty())
}

/// Strip wrapping quotes/backticks and trailing sentence punctuation.
fn clean_token(token: &str) -> String {
    let token = strip_quotes(token)
        .trim_end_matches([',', ';', ':', '!', '?', ')'])
        .trim_start_matches('(');
    // A final '.' ends the sentence unless the token is all dots and slashes.
    match token.strip_suffix('.') {
        Some(rest) if rest.chars().any(|c| c != '.' && c != '/') => rest.to_string(),
        _ => token.to_string(),
    }
}

fn strip_quotes(text: &str) -> &str {
    text.trim_matches(|c: char| matches!(c, '"' | '\'' | '`'))
}

fn strip_ticks(text: &str) -> String {
    text.trim().trim_matches('`').trim().to_string()
}
