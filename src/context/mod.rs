// src/context/mod.rs

use crate::policy::{PolicyTable, ToolPolicy};
use crate::tools::{ToolId, Toolset};

/// Runtime context for an agent: tools and their policies.
///
/// Built once and only read afterwards. Resetting a session means building
/// a new one, never editing this in place.
pub struct Context {
    pub tools: Toolset,
    pub policies: PolicyTable,
}

impl Context {
    pub fn new(tools: Toolset) -> Self {
        Self {
            tools,
            policies: PolicyTable::default(),
        }
    }

    pub fn with_policies(mut self, policies: PolicyTable) -> Self {
        self.policies = policies;
        self
    }

    pub fn with_policy(mut self, tool: ToolId, policy: ToolPolicy) -> Self {
        self.policies = self.policies.with_policy(tool, policy);
        self
    }
}
