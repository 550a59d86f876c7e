// src/protocol/classifier.rs

use std::sync::Arc;

use crate::llm::{ChatModel, Message};
use crate::protocol::{Intent, IntentCategory};

pub const FALLBACK_CONFIDENCE: f32 = 0.7;
pub const INVALID_CONFIDENCE: f32 = 0.5;

/// Maps free text to an `Intent`. Never fails.
pub trait IntentClassifier: Send + Sync {
    fn classify(&self, input: &str) -> Intent;
}

/// Asks the model for `CATEGORY|CONFIDENCE|DESCRIPTION`, with a keyword fallback.
pub struct LlmClassifier {
    llm: Arc<dyn ChatModel>,
}

impl LlmClassifier {
    pub fn new(llm: Arc<dyn ChatModel>) -> Self {
        Self { llm }
    }
}

impl IntentClassifier for LlmClassifier {
    fn classify(&self, input: &str) -> Intent {
        let prompt = format!(
            r#"Classify this user input into ONE category:

Input: "{input}"

Categories:
- QUESTION: Asking for information (What, How, Why questions)
- COMMAND: Direct instruction to do something (Create, Delete, Run)
- MULTI_STEP_TASK: Complex task needing multiple steps (setup, configure, build)
- TOOL_REQUEST: Specific tool usage (use curl, execute command, run script)
- REASONING_ONLY: Pure thinking task (explain, calculate, tell joke)

Respond ONLY with: CATEGORY|0.9|description
Example: COMMAND|0.9|User wants to create a file
"#
        );

        match self.llm.complete(&[Message::system(prompt)]) {
            Ok(reply) => parse_classification(&reply, input),
            Err(err) => {
                tracing::warn!(error = %err, "classifier call failed, using keyword fallback");
                keyword_intent(input)
            }
        }
    }
}

/// Parse a model reply, falling back as the reply degrades:
///
/// * fewer than three `|` fields or an unknown category: keyword heuristic
/// * known category but unusable confidence: `Question` at 0.5
pub fn parse_classification(reply: &str, input: &str) -> Intent {
    let line = reply
        .lines()
        .map(str::trim)
        .find(|l| l.contains('|'))
        .unwrap_or_else(|| reply.trim());
    let parts: Vec<&str> = line.split('|').collect();

    if parts.len() < 3 {
        tracing::warn!(reply, "classifier reply not pipe-delimited, using keyword fallback");
        return keyword_intent(input);
    }
    let Ok(category) = parts[0].parse::<IntentCategory>() else {
        tracing::warn!(category = parts[0], "unknown intent category, using keyword fallback");
        return keyword_intent(input);
    };

    let confidence = match parts[1].trim().trim_end_matches('%').parse::<f32>() {
        Ok(value) if value.is_finite() => value.clamp(0.0, 1.0),
        _ => {
            tracing::warn!(confidence = parts[1], "unparseable confidence, defaulting to question");
            return Intent {
                category: IntentCategory::Question,
                confidence: INVALID_CONFIDENCE,
                description: "Invalid classification, defaulted to question".into(),
            };
        }
    };

    let description = parts[2..].join("|").trim().to_string();
    Intent {
        category,
        confidence,
        description: if description.is_empty() {
            category.to_string()
        } else {
            description
        },
    }
}

const INTERROGATIVES: &[&str] = &["what", "how", "why", "where", "when"];
const EXPLANATION_WORDS: &[&str] = &["explain", "calculate"];
const COMMAND_VERBS: &[&str] = &["create", "delete", "make", "build", "remove"];
const EXECUTION_VERBS: &[&str] = &["run", "execute", "use", "curl"];
const SETUP_VERBS: &[&str] = &["setup", "configure", "install"];

/// Deterministic classification from the words of the input.
pub fn keyword_intent(input: &str) -> Intent {
    let lowered = input.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let has_any = |set: &[&str]| words.iter().any(|w| set.contains(w));

    let category = if has_any(INTERROGATIVES) {
        if has_any(EXPLANATION_WORDS) || lowered.contains("tell me") {
            IntentCategory::ReasoningOnly
        } else {
            IntentCategory::Question
        }
    } else if has_any(COMMAND_VERBS) {
        IntentCategory::Command
    } else if has_any(EXECUTION_VERBS) {
        IntentCategory::ToolRequest
    } else if has_any(SETUP_VERBS) || lowered.contains("set up") {
        IntentCategory::MultiStepTask
    } else {
        IntentCategory::ReasoningOnly
    };

    Intent {
        category,
        confidence: FALLBACK_CONFIDENCE,
        description: "Fallback classification".into(),
    }
}
