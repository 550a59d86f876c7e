// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Failures raised inside the tool layer and its sandbox guards.
///
/// None of these leave `Toolset::execute`: they are folded into a
/// `ToolResult { ok: false, .. }` there.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("path '{}' is outside workspace root '{}'", path.display(), root.display())]
    PathEscape { path: PathBuf, root: PathBuf },

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("directory not found: {0}")]
    DirNotFound(String),

    #[error("empty command")]
    EmptyCommand,

    #[error("malformed command: {0}")]
    MalformedCommand(String),

    #[error("command '{0}' is not in the allowlist")]
    CommandNotAllowed(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Transport(String),

    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("tool '{0}' is forbidden by policy")]
    PolicyForbidden(String),

    #[error("cancelled")]
    UserCancelled,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ToolError {
    fn from(err: reqwest::Error) -> Self {
        ToolError::Transport(err.to_string())
    }
}

/// Failures talking to the model backend.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("model request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("model backend returned status {0}")]
    Status(u16),

    #[error("model response missing message content")]
    MissingContent,
}

/// Faults that end a turn. `Agent::run` renders these as `Error: ...`.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("workspace unavailable: {0}")]
    Workspace(#[source] ToolError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("internal fault: {0}")]
    Internal(String),
}
