// src/agent/reflection.rs

use serde::Serialize;

use crate::memory::ExecutionHistory;
use crate::protocol::{Plan, Reflection, ToolExecution};

/// Failed executions that end a turn.
pub const MAX_FAILURES: usize = 3;
/// Total executions that end a turn.
pub const MAX_EXECUTIONS: usize = 10;

/// Why a turn stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Termination {
    GoalAchieved,
    TooManyFailures,
    SafetyLimit,
    PlanInvalidated,
    /// Answered by the model directly, no tools ran.
    Reasoned,
}

pub fn reflect(execution: &ToolExecution, plan: &Plan, step: usize) -> Reflection {
    if !execution.success {
        return Reflection {
            output_matches_expectation: false,
            plan_still_valid: true,
            next_step_adjustment: Some(format!(
                "Retry {} with different parameters",
                execution.tool_name
            )),
            additional_context_needed: true,
        };
    }

    Reflection {
        output_matches_expectation: execution.has_output(),
        plan_still_valid: step < plan.steps.len(),
        next_step_adjustment: None,
        additional_context_needed: false,
    }
}

/// Checked before every step, in this order.
pub fn should_terminate(plan: &Plan, history: &ExecutionHistory, step: usize) -> Option<Termination> {
    if step >= plan.steps.len() {
        return Some(Termination::GoalAchieved);
    }
    if history.failures() >= MAX_FAILURES {
        return Some(Termination::TooManyFailures);
    }
    if history.len() >= MAX_EXECUTIONS {
        return Some(Termination::SafetyLimit);
    }
    None
}
