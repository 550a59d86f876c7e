// src/tools/shell.rs

use std::process::Command;

use serde_json::Value;

use crate::error::ToolError;
use crate::sandbox::{ShellGate, Workspace};
use crate::tools::ToolResult;

/// Runs an allowlisted program in the workspace root and returns its
/// stdout/stderr output.
///
/// `ok` mirrors the exit status; `meta.succeeded` records it explicitly.
pub fn run_shell(
    gate: &ShellGate,
    workspace: &Workspace,
    command: &str,
) -> Result<ToolResult, ToolError> {
    let argv = gate.check(command)?;
    let (program, args) = argv.split_first().ok_or(ToolError::EmptyCommand)?;

    let output = Command::new(program)
        .args(args)
        .current_dir(workspace.root())
        .output()?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let succeeded = output.status.success();
    let returncode = output.status.code();
    tracing::info!(program = %program, ?returncode, succeeded, "ran command");

    let mut combined = stdout.clone();
    combined.push_str(&stderr);

    let result = if succeeded {
        ToolResult::success(combined.trim())
    } else {
        let status = returncode.map_or_else(|| "a signal".to_string(), |c| c.to_string());
        let mut message = format!("command exited with status {status}");
        if !stderr.trim().is_empty() {
            message.push_str(": ");
            message.push_str(stderr.trim());
        }
        ToolResult::failure(message)
    };

    Ok(result
        .with_meta("command", program.as_str())
        .with_meta("argv", argv.clone())
        .with_meta("returncode", returncode.map_or(Value::Null, Value::from))
        .with_meta("stdout", stdout)
        .with_meta("stderr", stderr)
        .with_meta("succeeded", succeeded)
        .with_meta("cwd", workspace.root().display().to_string()))
}
