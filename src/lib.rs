// src/lib.rs

pub mod agent;
pub mod config;
pub mod confirm;
pub mod context;
pub mod error;
pub mod llm;
pub mod logging;
pub mod memory;
pub mod policy;
pub mod protocol;
pub mod sandbox;
pub mod tools;
pub mod validation;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use agent::{Agent, TurnReport};
pub use config::{AgentConfig, ConfirmMode};
pub use error::{AgentError, LlmError, ToolError};
