// src/config/mod.rs

use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "llama3.2:3b";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

pub const ENV_WORKSPACE_ROOT: &str = "KOV_WORKSPACE_ROOT";
pub const ENV_MODEL: &str = "KOV_MODEL";
pub const ENV_OLLAMA_HOST: &str = "OLLAMA_HOST";

/// How confirmation prompts get answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmMode {
    /// Block on a line from stdin.
    #[default]
    Interactive,
    /// Answer "y" to every prompt.
    AlwaysYes,
    /// Answer "n" to every prompt.
    AlwaysNo,
}

/// Process-level settings used to build an `Agent`.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// `None` means the current working directory.
    pub workspace_root: Option<PathBuf>,
    pub model: String,
    pub ollama_url: String,
    pub debug: bool,
    pub confirm: ConfirmMode,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            workspace_root: None,
            model: DEFAULT_MODEL.into(),
            ollama_url: DEFAULT_OLLAMA_URL.into(),
            debug: false,
            confirm: ConfirmMode::Interactive,
        }
    }
}

impl AgentConfig {
    /// Defaults overlaid with `KOV_WORKSPACE_ROOT`, `KOV_MODEL` and `OLLAMA_HOST`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same overlay as `from_env`, reading variables through `lookup`.
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut config = Self::default();
        if let Some(root) = var(ENV_WORKSPACE_ROOT) {
            config.workspace_root = Some(PathBuf::from(root));
        }
        if let Some(model) = var(ENV_MODEL) {
            config.model = model;
        }
        if let Some(url) = var(ENV_OLLAMA_HOST) {
            config.ollama_url = normalize_ollama_url(&url);
        }
        config
    }

    pub fn with_workspace(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_ollama_url(mut self, url: &str) -> Self {
        self.ollama_url = normalize_ollama_url(url);
        self
    }

    pub fn with_confirm(mut self, confirm: ConfirmMode) -> Self {
        self.confirm = confirm;
        self
    }

    pub fn enable_debug(mut self) -> Self {
        self.debug = true;
        self
    }

    /// The configured root, or the current directory when unset.
    pub fn resolved_root(&self) -> std::io::Result<PathBuf> {
        match &self.workspace_root {
            Some(root) => Ok(root.clone()),
            None => std::env::current_dir(),
        }
    }
}

/// `OLLAMA_HOST` is often given as a bare `host:port`.
pub fn normalize_ollama_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}
