// src/agent/mod.rs

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;

use crate::config::AgentConfig;
use crate::confirm::{Confirmer, confirmer_for};
use crate::context::Context;
use crate::error::{AgentError, ToolError};
use crate::llm::{ChatModel, Message, OllamaChat};
use crate::memory::ExecutionHistory;
use crate::policy::{GateDecision, params};
use crate::protocol::classifier::{IntentClassifier, LlmClassifier};
use crate::protocol::planner::{LlmPlanner, Planner};
use crate::protocol::{Intent, IntentCategory, Plan, ToolExecution};
use crate::sandbox::Workspace;
use crate::tools::Toolset;
use crate::validation::validate_plan;

pub mod reflection;

pub use reflection::{MAX_EXECUTIONS, MAX_FAILURES, Termination, reflect, should_terminate};

const ASSISTANT_PROMPT: &str = "You are KOV, a helpful AI assistant. Provide a thoughtful response.";
const SUCCESS_BANNER: &str = "Task completed successfully!";
const REPHRASE_MESSAGE: &str =
    "I encountered some issues completing your request. Please try rephrasing or being more specific.";

/// Everything one turn produced, for callers that want more than the text.
#[derive(Debug, Clone, Serialize)]
pub struct TurnReport {
    pub intent: Intent,
    pub plan: Plan,
    pub executions: Vec<ToolExecution>,
    pub termination: Termination,
    pub response: String,
}

pub struct Agent {
    llm: Arc<dyn ChatModel>,
    classifier: Box<dyn IntentClassifier>,
    planner: Box<dyn Planner>,
    context: Context,
    confirmer: Arc<dyn Confirmer>,
}

impl Agent {
    pub fn new(llm: Arc<dyn ChatModel>, context: Context, confirmer: Arc<dyn Confirmer>) -> Self {
        Self {
            classifier: Box::new(LlmClassifier::new(llm.clone())),
            planner: Box::new(LlmPlanner::new(llm.clone())),
            llm,
            context,
            confirmer,
        }
    }

    /// Wire an Ollama-backed agent over the configured workspace.
    pub fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let root = config
            .resolved_root()
            .map_err(|err| AgentError::Workspace(ToolError::Io(err)))?;
        let workspace = Workspace::new(&root).map_err(AgentError::Workspace)?;
        let confirmer = confirmer_for(config.confirm);

        let context = Context::new(Toolset::new(workspace, confirmer.clone()));

        let llm: Arc<dyn ChatModel> = Arc::new(OllamaChat::new(&config.ollama_url, &config.model));
        tracing::info!(root = %root.display(), model = %config.model, "agent ready");
        Ok(Self::new(llm, context, confirmer))
    }

    pub fn with_classifier(mut self, classifier: Box<dyn IntentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_planner(mut self, planner: Box<dyn Planner>) -> Self {
        self.planner = planner;
        self
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// One turn, always as text. Faults and panics become `Error: ...`.
    pub fn run(&self, input: &str) -> String {
        match self.run_guarded(input) {
            Ok(report) => report.response,
            Err(err) => format!("Error: {err}"),
        }
    }

    /// `run_turn` with panics turned into `AgentError::Internal`.
    pub fn run_guarded(&self, input: &str) -> Result<TurnReport, AgentError> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run_turn(input)))
            .unwrap_or_else(|payload| {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unexpected panic".to_string());
                Err(AgentError::Internal(message))
            });
        if let Err(err) = &outcome {
            tracing::error!(error = %err, "turn failed");
        }
        outcome
    }

    pub fn run_turn(&self, input: &str) -> Result<TurnReport, AgentError> {
        let intent = self.classifier.classify(input);
        tracing::debug!(category = %intent.category, confidence = intent.confidence, "classified");

        let plan = self.planner.generate_plan(input, &intent);
        for warning in validate_plan(&plan) {
            tracing::warn!(hint = %warning.hint(), "plan warning");
        }
        tracing::debug!(goal = %plan.goal, steps = plan.steps.len(), tools = ?plan.tools_needed, "planned");

        if intent.category == IntentCategory::ReasoningOnly {
            let response = self.reason(ASSISTANT_PROMPT, input)?;
            return Ok(TurnReport {
                intent,
                plan,
                executions: Vec::new(),
                termination: Termination::Reasoned,
                response,
            });
        }

        let mut history = ExecutionHistory::new();
        let mut step = 0;

        let termination = loop {
            if let Some(reason) = should_terminate(&plan, &history, step) {
                break reason;
            }

            let Some(tool_name) = plan.tool_for_step(step) else {
                let response = self.reason(&format!("Complete this step: {}", plan.steps[step]), input)?;
                return Ok(TurnReport {
                    intent,
                    plan,
                    executions: history.into_entries(),
                    termination: Termination::Reasoned,
                    response,
                });
            };

            let execution = self.select_and_execute(tool_name, input);
            let reflection = reflect(&execution, &plan, step);
            tracing::debug!(
                step,
                tool = %execution.tool_name,
                success = execution.success,
                adjustment = ?reflection.next_step_adjustment,
                "step reflected"
            );
            history.record(execution);

            if !reflection.plan_still_valid {
                break Termination::PlanInvalidated;
            }
            step += 1;
        };

        tracing::debug!(?termination, executions = history.len(), "turn finished");
        let response = summarize(&history);
        Ok(TurnReport {
            intent,
            plan,
            executions: history.into_entries(),
            termination,
            response,
        })
    }

    /// Gate, confirm, extract and run one tool.
    fn select_and_execute(&self, tool_name: &str, input: &str) -> ToolExecution {
        let mut decision = self.context.policies.gate(tool_name);
        if let GateDecision::NeedsConfirmation { prompt, .. } = &decision {
            let confirmed = self.confirmer.confirm(prompt);
            decision = decision.resume(confirmed);
        }

        let tool = match decision {
            GateDecision::Proceed(tool) => tool,
            GateDecision::Refused(reason) => return ToolExecution::refused(tool_name, reason),
            GateDecision::NeedsConfirmation { .. } => {
                return ToolExecution::refused(tool_name, ToolError::UserCancelled.to_string());
            }
        };

        let call = params::extract(tool, input);
        let result = self.context.tools.execute(&call);
        ToolExecution::from_result(tool.as_str(), call.parameters(), result)
    }

    fn reason(&self, system: &str, input: &str) -> Result<String, AgentError> {
        let reply = self
            .llm
            .complete(&[Message::system(system), Message::human(input)])?;
        Ok(reply)
    }
}

/// Final text for a tool-driven turn.
pub fn summarize(history: &ExecutionHistory) -> String {
    if let Some(last) = history.last_success() {
        let output = last.output.as_ref().map(|o| o.render()).unwrap_or_default();
        return format!("{SUCCESS_BANNER}\n\n{output}");
    }

    if history.is_empty() {
        return REPHRASE_MESSAGE.to_string();
    }

    let mut text = String::from("I couldn't complete your request:");
    for error in history.distinct_errors(3) {
        text.push_str("\n- ");
        text.push_str(error);
    }
    text
}
