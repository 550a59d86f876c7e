// src/tools/mod.rs

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::confirm::Confirmer;
use crate::error::ToolError;
use crate::sandbox::{ShellGate, Workspace};

pub mod fs;
pub mod net;
pub mod shell;

/// Payload of a successful tool call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolData {
    Text(String),
    Lines(Vec<String>),
}

impl ToolData {
    /// Lines are joined with newlines; text is returned as-is.
    pub fn render(&self) -> String {
        match self {
            ToolData::Text(text) => text.clone(),
            ToolData::Lines(lines) => lines.join("\n"),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ToolData::Text(text) => text.trim().is_empty(),
            ToolData::Lines(lines) => lines.is_empty(),
        }
    }
}

impl From<String> for ToolData {
    fn from(text: String) -> Self {
        ToolData::Text(text)
    }
}

impl From<&str> for ToolData {
    fn from(text: &str) -> Self {
        ToolData::Text(text.to_string())
    }
}

impl From<Vec<String>> for ToolData {
    fn from(lines: Vec<String>) -> Self {
        ToolData::Lines(lines)
    }
}

/// The result of executing a tool.
///
/// `data` is meaningful when `ok`, `error` when not. `meta` carries auxiliary
/// fields (resolved path, HTTP status, exit code, ...) and is always present.
#[derive(Debug, Clone, Serialize)]
pub struct ToolResult {
    pub ok: bool,
    pub data: Option<ToolData>,
    pub error: Option<String>,
    pub meta: Map<String, Value>,
}

impl ToolResult {
    pub fn success(data: impl Into<ToolData>) -> Self {
        Self {
            ok: true,
            data: Some(data.into()),
            error: None,
            meta: Map::new(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
            meta: Map::new(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.meta.insert(key.to_string(), value.into());
        self
    }

    /// `meta.succeeded`, for tools that report a command status apart from `ok`.
    pub fn command_succeeded(&self) -> Option<bool> {
        self.meta.get("succeeded").and_then(Value::as_bool)
    }

    pub fn render(&self) -> String {
        self.data.as_ref().map(ToolData::render).unwrap_or_default()
    }
}

impl From<Result<ToolResult, ToolError>> for ToolResult {
    fn from(outcome: Result<ToolResult, ToolError>) -> Self {
        outcome.unwrap_or_else(|err| ToolResult::failure(err.to_string()))
    }
}

/// The closed set of tools the planner may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolId {
    ReadFile,
    WriteFile,
    ListDirectory,
    DeleteFile,
    RunShell,
    FetchUrl,
    DownloadFile,
}

impl ToolId {
    pub const ALL: [ToolId; 7] = [
        ToolId::ReadFile,
        ToolId::WriteFile,
        ToolId::ListDirectory,
        ToolId::DeleteFile,
        ToolId::RunShell,
        ToolId::FetchUrl,
        ToolId::DownloadFile,
    ];

    /// Identifier used in planner prompts and replies.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolId::ReadFile => "read_file_tool",
            ToolId::WriteFile => "write_file_tool",
            ToolId::ListDirectory => "list_directory_tool",
            ToolId::DeleteFile => "delete_file_tool",
            ToolId::RunShell => "run_shell_tool",
            ToolId::FetchUrl => "fetch_url_tool",
            ToolId::DownloadFile => "download_file_tool",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolId::ReadFile => "Read the contents of a file in the workspace.",
            ToolId::WriteFile => "Write text content to a file in the workspace.",
            ToolId::ListDirectory => "List the entries of a workspace directory.",
            ToolId::DeleteFile => "Delete a file in the workspace (asks first).",
            ToolId::RunShell => "Run an allowlisted program (ls, cat, git, ...) in the workspace.",
            ToolId::FetchUrl => "Fetch the text of an http(s) URL.",
            ToolId::DownloadFile => "Download an http(s) URL into a workspace file.",
        }
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolId {
    type Err = ToolError;

    /// Accepts the canonical `*_tool` names and their short forms.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let name = raw
            .trim()
            .trim_matches(|c: char| matches!(c, '`' | '"' | '\'' | '[' | ']' | '*'))
            .trim()
            .to_ascii_lowercase();
        let short = name.strip_suffix("_tool").unwrap_or(&name);

        let id = match short {
            "read_file" => ToolId::ReadFile,
            "write_file" => ToolId::WriteFile,
            "list_directory" | "list_dir" => ToolId::ListDirectory,
            "delete_file" => ToolId::DeleteFile,
            "run_shell" => ToolId::RunShell,
            "fetch_url" => ToolId::FetchUrl,
            "download_file" => ToolId::DownloadFile,
            _ => return Err(ToolError::ToolNotFound(raw.trim().to_string())),
        };
        Ok(id)
    }
}

/// A tool invocation with its typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    ReadFile { path: String },
    WriteFile { path: String, content: String },
    ListDirectory { path: String },
    DeleteFile { path: String },
    RunShell { command: String },
    FetchUrl { url: String },
    DownloadFile { url: String, filename: String },
}

impl ToolCall {
    pub fn id(&self) -> ToolId {
        match self {
            ToolCall::ReadFile { .. } => ToolId::ReadFile,
            ToolCall::WriteFile { .. } => ToolId::WriteFile,
            ToolCall::ListDirectory { .. } => ToolId::ListDirectory,
            ToolCall::DeleteFile { .. } => ToolId::DeleteFile,
            ToolCall::RunShell { .. } => ToolId::RunShell,
            ToolCall::FetchUrl { .. } => ToolId::FetchUrl,
            ToolCall::DownloadFile { .. } => ToolId::DownloadFile,
        }
    }

    /// Parameters as a name -> value map, for execution records.
    pub fn parameters(&self) -> BTreeMap<String, String> {
        let pairs: Vec<(&str, &str)> = match self {
            ToolCall::ReadFile { path }
            | ToolCall::ListDirectory { path }
            | ToolCall::DeleteFile { path } => vec![("path", path.as_str())],
            ToolCall::WriteFile { path, content } => {
                vec![("path", path.as_str()), ("content", content.as_str())]
            }
            ToolCall::RunShell { command } => vec![("command", command.as_str())],
            ToolCall::FetchUrl { url } => vec![("url", url.as_str())],
            ToolCall::DownloadFile { url, filename } => {
                vec![("url", url.as_str()), ("filename", filename.as_str())]
            }
        };
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

/// The seven sandboxed operations, bound to one workspace.
pub struct Toolset {
    workspace: Workspace,
    shell: ShellGate,
    confirmer: Arc<dyn Confirmer>,
}

impl Toolset {
    pub fn new(workspace: Workspace, confirmer: Arc<dyn Confirmer>) -> Self {
        Self {
            workspace,
            shell: ShellGate::default(),
            confirmer,
        }
    }

    pub fn with_shell_gate(mut self, gate: ShellGate) -> Self {
        self.shell = gate;
        self
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn shell_gate(&self) -> &ShellGate {
        &self.shell
    }

    /// Run `call`. Sandbox and I/O errors come back as `ok: false`.
    pub fn execute(&self, call: &ToolCall) -> ToolResult {
        let outcome = match call {
            ToolCall::ReadFile { path } => fs::read_file(&self.workspace, path),
            ToolCall::WriteFile { path, content } => fs::write_file(&self.workspace, path, content),
            ToolCall::ListDirectory { path } => fs::list_dir(&self.workspace, path),
            ToolCall::DeleteFile { path } => {
                fs::delete_file(&self.workspace, path, self.confirmer.as_ref())
            }
            ToolCall::RunShell { command } => {
                shell::run_shell(&self.shell, &self.workspace, command)
            }
            ToolCall::FetchUrl { url } => net::fetch_url(url),
            ToolCall::DownloadFile { url, filename } => {
                net::download_file(&self.workspace, url, filename)
            }
        };

        if let Err(err) = &outcome {
            tracing::warn!(tool = %call.id(), error = %err, "tool call failed");
        }
        ToolResult::from(outcome)
    }

    pub fn read_file(&self, path: &str) -> ToolResult {
        self.execute(&ToolCall::ReadFile { path: path.into() })
    }

    pub fn write_file(&self, path: &str, content: &str) -> ToolResult {
        self.execute(&ToolCall::WriteFile {
            path: path.into(),
            content: content.into(),
        })
    }

    pub fn list_dir(&self, path: &str) -> ToolResult {
        self.execute(&ToolCall::ListDirectory { path: path.into() })
    }

    pub fn delete_file(&self, path: &str) -> ToolResult {
        self.execute(&ToolCall::DeleteFile { path: path.into() })
    }

    pub fn run_shell(&self, command: &str) -> ToolResult {
        self.execute(&ToolCall::RunShell {
            command: command.into(),
        })
    }

    pub fn fetch_url(&self, url: &str) -> ToolResult {
        self.execute(&ToolCall::FetchUrl { url: url.into() })
    }

    pub fn download_file(&self, url: &str, filename: &str) -> ToolResult {
        self.execute(&ToolCall::DownloadFile {
            url: url.into(),
            filename: filename.into(),
        })
    }
}
