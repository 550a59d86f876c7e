// src/policy/mod.rs

use std::collections::BTreeMap;

use crate::error::ToolError;
use crate::tools::ToolId;

pub mod params;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolPolicy {
    AutoExecute,
    RequireConfirmation,
    Forbidden,
}

/// What the gate says about running a tool right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Proceed(ToolId),
    /// Suspended until the user answers `prompt`.
    NeedsConfirmation { tool: ToolId, prompt: String },
    Refused(String),
}

impl GateDecision {
    /// Resume a suspended decision with the user's answer.
    pub fn resume(self, confirmed: bool) -> GateDecision {
        match self {
            GateDecision::NeedsConfirmation { tool, .. } if confirmed => GateDecision::Proceed(tool),
            GateDecision::NeedsConfirmation { .. } => {
                GateDecision::Refused(ToolError::UserCancelled.to_string())
            }
            other => other,
        }
    }
}

/// Per-tool policy, fixed when the agent is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTable {
    policies: BTreeMap<ToolId, ToolPolicy>,
}

impl Default for PolicyTable {
    fn default() -> Self {
        let policies = ToolId::ALL
            .into_iter()
            .map(|id| {
                let policy = match id {
                    ToolId::RunShell | ToolId::DeleteFile | ToolId::DownloadFile => {
                        ToolPolicy::RequireConfirmation
                    }
                    ToolId::ReadFile
                    | ToolId::WriteFile
                    | ToolId::ListDirectory
                    | ToolId::FetchUrl => ToolPolicy::AutoExecute,
                };
                (id, policy)
            })
            .collect();
        Self { policies }
    }
}

impl PolicyTable {
    /// Every tool set to `policy`.
    pub fn uniform(policy: ToolPolicy) -> Self {
        Self {
            policies: ToolId::ALL.into_iter().map(|id| (id, policy)).collect(),
        }
    }

    pub fn with_policy(mut self, tool: ToolId, policy: ToolPolicy) -> Self {
        self.policies.insert(tool, policy);
        self
    }

    pub fn policy(&self, tool: ToolId) -> ToolPolicy {
        self.policies
            .get(&tool)
            .copied()
            .unwrap_or(ToolPolicy::AutoExecute)
    }

    /// Gate a planner-supplied tool name.
    pub fn gate(&self, tool_name: &str) -> GateDecision {
        let tool = match tool_name.parse::<ToolId>() {
            Ok(tool) => tool,
            Err(err) => return GateDecision::Refused(err.to_string()),
        };

        match self.policy(tool) {
            ToolPolicy::AutoExecute => GateDecision::Proceed(tool),
            ToolPolicy::RequireConfirmation => GateDecision::NeedsConfirmation {
                tool,
                prompt: format!("Execute {tool}?"),
            },
            ToolPolicy::Forbidden => {
                GateDecision::Refused(ToolError::PolicyForbidden(tool.to_string()).to_string())
            }
        }
    }
}
