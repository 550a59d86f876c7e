// src/protocol/planner.rs

use std::sync::Arc;

use crate::llm::{ChatModel, Message};
use crate::protocol::{Intent, IntentCategory, Plan};
use crate::tools::ToolId;

/// Trait for generating a Plan from the user's text and its intent.
pub trait Planner: Send + Sync {
    fn generate_plan(&self, input: &str, intent: &Intent) -> Plan;
}

/// Implementation using the model backend + a labeled-line prompt.
pub struct LlmPlanner {
    llm: Arc<dyn ChatModel>,
}

impl LlmPlanner {
    pub fn new(llm: Arc<dyn ChatModel>) -> Self {
        Self { llm }
    }
}

impl Planner for LlmPlanner {
    fn generate_plan(&self, input: &str, intent: &Intent) -> Plan {
        if intent.category == IntentCategory::ReasoningOnly {
            return Plan::reasoning();
        }

        let tool_list = ToolId::ALL
            .iter()
            .map(|t| format!("- {}: {}", t.as_str(), t.description()))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            r#"Create a plan for: "{input}"
Intent: {category}

Respond with exactly these four lines:
GOAL: [clear goal statement]
STEPS: [step1] | [step2] | [step3]
TOOLS: [tool1] | [tool2]
COMPLEXITY: [1-5]

List one tool per step, in step order. Leave TOOLS empty if no tool is needed.

Available tools:
{tool_list}
"#,
            category = intent.category,
        );

        match self.llm.complete(&[Message::system(prompt)]) {
            Ok(reply) => parse_plan(&reply),
            Err(err) => {
                tracing::warn!(error = %err, "planner call failed, using default plan");
                Plan::default()
            }
        }
    }
}

/// Parse `GOAL:` / `STEPS:` / `TOOLS:` / `COMPLEXITY:` lines.
///
/// Each field defaults on its own when missing or malformed; the rest of
/// the reply is still used.
pub fn parse_plan(reply: &str) -> Plan {
    let mut plan = Plan::default();
    let mut seen = [false; 4];

    for raw in reply.lines() {
        let line = raw
            .trim()
            .trim_start_matches(|c: char| matches!(c, '-' | '*' | '#' | ' '));

        if let Some(rest) = strip_label(line, "GOAL:") {
            let goal = clean_item(rest);
            if !goal.is_empty() {
                plan.goal = goal;
                seen[0] = true;
            }
        } else if let Some(rest) = strip_label(line, "STEPS:") {
            let steps = split_items(rest);
            if !steps.is_empty() {
                plan.steps = steps;
                seen[1] = true;
            }
        } else if let Some(rest) = strip_label(line, "TOOLS:") {
            plan.tools_needed = split_items(rest)
                .into_iter()
                .filter(|t| !matches!(t.to_ascii_lowercase().as_str(), "none" | "n/a"))
                .collect();
            seen[2] = true;
        } else if let Some(rest) = strip_label(line, "COMPLEXITY:") {
            if let Some(value) = leading_integer(rest) {
                plan.complexity = value.clamp(1, 5) as u8;
                seen[3] = true;
            }
        }
    }

    for (field, present) in ["goal", "steps", "tools", "complexity"].iter().zip(seen) {
        if !present {
            tracing::warn!(field, "planner field missing or malformed, using default");
        }
    }
    plan
}

fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let head = line.get(..label.len())?;
    if head.eq_ignore_ascii_case(label) {
        Some(line[label.len()..].trim_start_matches('*'))
    } else {
        None
    }
}

fn split_items(text: &str) -> Vec<String> {
    text.split('|')
        .map(clean_item)
        .filter(|s| !s.is_empty())
        .collect()
}

fn clean_item(text: &str) -> String {
    text.trim()
        .trim_matches(|c: char| matches!(c, '[' | ']' | '`' | '*'))
        .trim()
        .to_string()
}

fn leading_integer(text: &str) -> Option<i64> {
    let digits: String = text
        .trim()
        .trim_start_matches('[')
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}
