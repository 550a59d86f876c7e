// src/protocol/mod.rs

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::tools::ToolResult;

pub mod classifier;
pub mod planner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    Question,
    Command,
    MultiStepTask,
    ToolRequest,
    ReasoningOnly,
}

impl IntentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentCategory::Question => "question",
            IntentCategory::Command => "command",
            IntentCategory::MultiStepTask => "multi_step_task",
            IntentCategory::ToolRequest => "tool_request",
            IntentCategory::ReasoningOnly => "reasoning_only",
        }
    }
}

impl fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentCategory {
    type Err = ();

    /// Case-insensitive; spaces and dashes count as underscores.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let token = raw
            .trim()
            .trim_matches(|c: char| matches!(c, '*' | '`' | '"' | '\'' | '[' | ']'))
            .to_ascii_lowercase()
            .replace([' ', '-'], "_");
        match token.as_str() {
            "question" => Ok(IntentCategory::Question),
            "command" => Ok(IntentCategory::Command),
            "multi_step_task" => Ok(IntentCategory::MultiStepTask),
            "tool_request" => Ok(IntentCategory::ToolRequest),
            "reasoning_only" => Ok(IntentCategory::ReasoningOnly),
            _ => Err(()),
        }
    }
}

/// What the user wants, as judged once per turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Intent {
    pub category: IntentCategory,
    /// Always within `[0, 1]`.
    pub confidence: f32,
    pub description: String,
}

/// Goal, ordered steps, and the tools expected to serve them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub goal: String,
    /// Never empty.
    pub steps: Vec<String>,
    /// Raw identifiers as the planner named them; may be empty.
    pub tools_needed: Vec<String>,
    /// 1 to 5.
    pub complexity: u8,
}

impl Plan {
    pub const DEFAULT_GOAL: &'static str = "Complete user request";
    pub const DEFAULT_STEP: &'static str = "Execute request";

    /// Fixed plan for requests that need thinking, not tools.
    pub fn reasoning() -> Self {
        Self {
            goal: "Provide reasoning".into(),
            steps: vec!["Think and respond".into()],
            tools_needed: Vec::new(),
            complexity: 1,
        }
    }

    /// Tool for step `index`: its positional tool, else the first listed, else none.
    pub fn tool_for_step(&self, index: usize) -> Option<&str> {
        self.tools_needed
            .get(index)
            .or_else(|| self.tools_needed.first())
            .map(String::as_str)
    }
}

impl Default for Plan {
    fn default() -> Self {
        Self {
            goal: Self::DEFAULT_GOAL.into(),
            steps: vec![Self::DEFAULT_STEP.into()],
            tools_needed: Vec::new(),
            complexity: 1,
        }
    }
}

/// Record of one attempted tool call. Never mutated once built.
#[derive(Debug, Clone, Serialize)]
pub struct ToolExecution {
    pub tool_name: String,
    pub parameters: BTreeMap<String, String>,
    pub output: Option<ToolResult>,
    pub success: bool,
    pub error: Option<String>,
}

impl ToolExecution {
    /// An attempt that never reached the tool (unknown, forbidden, cancelled).
    pub fn refused(tool_name: &str, error: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.to_string(),
            parameters: BTreeMap::new(),
            output: None,
            success: false,
            error: Some(error.into()),
        }
    }

    /// Success needs both `ok` and, when reported, a zero-exit command.
    pub fn from_result(
        tool_name: &str,
        parameters: BTreeMap<String, String>,
        result: ToolResult,
    ) -> Self {
        let success = result.ok && result.command_succeeded().unwrap_or(true);
        let error = if success {
            None
        } else {
            Some(
                result
                    .error
                    .clone()
                    .unwrap_or_else(|| "command did not succeed".to_string()),
            )
        };
        Self {
            tool_name: tool_name.to_string(),
            parameters,
            output: Some(result),
            success,
            error,
        }
    }

    pub fn has_output(&self) -> bool {
        self.output
            .as_ref()
            .and_then(|o| o.data.as_ref())
            .is_some_and(|d| !d.is_empty())
    }
}

/// Post-execution judgement for one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reflection {
    pub output_matches_expectation: bool,
    pub plan_still_valid: bool,
    pub next_step_adjustment: Option<String>,
    pub additional_context_needed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_tokens_are_lenient() {
        assert_eq!(
            "MULTI_STEP_TASK".parse::<IntentCategory>(),
            Ok(IntentCategory::MultiStepTask)
        );
        assert_eq!(
            " tool request ".parse::<IntentCategory>(),
            Ok(IntentCategory::ToolRequest)
        );
        assert_eq!(
            "**Question**".parse::<IntentCategory>(),
            Ok(IntentCategory::Question)
        );
        assert!("chit_chat".parse::<IntentCategory>().is_err());
    }

    #[test]
    fn step_tool_alignment() {
        let plan = Plan {
            tools_needed: vec!["list_directory_tool".into(), "read_file_tool".into()],
            steps: vec!["a".into(), "b".into(), "c".into()],
            ..Plan::default()
        };
        assert_eq!(plan.tool_for_step(1), Some("read_file_tool"));
        assert_eq!(plan.tool_for_step(2), Some("list_directory_tool"));
        assert_eq!(Plan::default().tool_for_step(0), None);
    }

    #[test]
    fn non_zero_exit_marks_execution_failed() {
        let result = ToolResult::success("partial").with_meta("succeeded", false);
        let exec = ToolExecution::from_result("run_shell_tool", BTreeMap::new(), result);
        assert!(!exec.success);
        assert!(exec.error.is_some());
    }
}
