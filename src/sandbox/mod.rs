// src/sandbox/mod.rs

//! Guards that bound what the tools may touch: the workspace root, the
//! shell allowlist, and http(s)-only URLs.

pub mod shell;
pub mod urls;
pub mod workspace;

pub use shell::{DEFAULT_ALLOWLIST, ShellGate};
pub use urls::validate_url;
pub use workspace::Workspace;
