// src/memory/mod.rs

use crate::protocol::ToolExecution;

/// Ordered record of the tool calls attempted during one turn.
#[derive(Default, Debug, Clone)]
pub struct ExecutionHistory {
    pub entries: Vec<ToolExecution>,
}

impl ExecutionHistory {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, execution: ToolExecution) {
        self.entries.push(execution);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|e| !e.success).count()
    }

    pub fn last_success(&self) -> Option<&ToolExecution> {
        self.entries.iter().rev().find(|e| e.success)
    }

    /// Up to `limit` distinct error messages, in first-seen order.
    pub fn distinct_errors(&self, limit: usize) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for error in self.entries.iter().filter_map(|e| e.error.as_deref()) {
            if seen.len() == limit {
                break;
            }
            if !seen.contains(&error) {
                seen.push(error);
            }
        }
        seen
    }

    pub fn into_entries(self) -> Vec<ToolExecution> {
        self.entries
    }
}
