// src/sandbox/shell.rs

//! Allowlist gate for the shell tool.
//!
//! Commands are split into words (quotes honoured, nothing expanded) and the
//! program name is checked against a fixed allowlist. The word vector is what
//! gets executed; no shell interpreter ever sees the raw string.

use std::collections::BTreeSet;

use crate::error::ToolError;

pub const DEFAULT_ALLOWLIST: &[&str] = &[
    "cat", "echo", "find", "git", "head", "ls", "pwd", "python", "python3", "pytest", "rg", "tail",
    "wc",
];

#[derive(Debug, Clone)]
pub struct ShellGate {
    allowlist: BTreeSet<String>,
}

impl Default for ShellGate {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWLIST.iter().copied())
    }
}

impl ShellGate {
    pub fn new<'a>(programs: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            allowlist: programs.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn is_allowed(&self, program: &str) -> bool {
        self.allowlist.contains(program)
    }

    pub fn allowlist(&self) -> impl Iterator<Item = &str> {
        self.allowlist.iter().map(String::as_str)
    }

    /// Split `command` and return the argv if its program is allowlisted.
    pub fn check(&self, command: &str) -> Result<Vec<String>, ToolError> {
        let argv = shell_words::split(command)
            .map_err(|e| ToolError::MalformedCommand(e.to_string()))?;

        let Some(program) = argv.first() else {
            return Err(ToolError::EmptyCommand);
        };
        if !self.is_allowed(program) {
            return Err(ToolError::CommandNotAllowed(program.clone()));
        }
        Ok(argv)
    }
}
