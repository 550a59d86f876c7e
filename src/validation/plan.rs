// src/validation/plan.rs

use crate::protocol::Plan;
use crate::tools::ToolId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanValidationError {
    UnknownTool(String),
    ComplexityOutOfRange(u8),
    EmptySteps,
    /// More tools than steps; the extras never run.
    SurplusTools { steps: usize, tools: usize },
}

impl PlanValidationError {
    pub fn hint(&self) -> String {
        match self {
            PlanValidationError::UnknownTool(name) => format!(
                "Unknown tool '{name}'. The step that selects it will fail with tool not found."
            ),
            PlanValidationError::ComplexityOutOfRange(value) => {
                format!("Complexity {value} is outside 1-5.")
            }
            PlanValidationError::EmptySteps => "Plan has no steps.".to_string(),
            PlanValidationError::SurplusTools { steps, tools } => {
                format!("{tools} tools listed for {steps} steps; trailing tools are ignored.")
            }
        }
    }
}

/// Collect problems with a plan. Callers log them; none is fatal.
pub fn validate_plan(plan: &Plan) -> Vec<PlanValidationError> {
    let mut errors = Vec::new();

    if plan.steps.is_empty() {
        errors.push(PlanValidationError::EmptySteps);
    }
    if !(1..=5).contains(&plan.complexity) {
        errors.push(PlanValidationError::ComplexityOutOfRange(plan.complexity));
    }
    for name in &plan.tools_needed {
        if name.parse::<ToolId>().is_err() {
            errors.push(PlanValidationError::UnknownTool(name.clone()));
        }
    }
    if plan.tools_needed.len() > plan.steps.len() {
        errors.push(PlanValidationError::SurplusTools {
            steps: plan.steps.len(),
            tools: plan.tools_needed.len(),
        });
    }

    errors
}
