// src/llm/mod.rs

use serde::{Deserialize, Serialize};

use crate::error::LlmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One role-tagged chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Text-in, text-out model backend. Replies carry no guaranteed structure.
pub trait ChatModel: Send + Sync {
    fn complete(&self, messages: &[Message]) -> Result<String, LlmError>;
}

/// Sends messages to a local model via Ollama's `/api/chat`.
pub struct OllamaChat {
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    client: reqwest::blocking::Client,
}

impl OllamaChat {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            temperature: 0.1,
            client: reqwest::blocking::Client::new(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ChatReply>,
}

#[derive(Deserialize)]
struct ChatReply {
    content: String,
}

impl ChatModel for OllamaChat {
    fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.base_url);
        let payload = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: ChatOptions {
                temperature: self.temperature,
            },
        };

        let response = self.client.post(&url).json(&payload).send()?;
        if !response.status().is_success() {
            return Err(LlmError::Status(response.status().as_u16()));
        }

        let body: ChatResponse = response.json()?;
        let reply = body.message.ok_or(LlmError::MissingContent)?;
        tracing::debug!(model = %self.model, chars = reply.content.len(), "model replied");
        Ok(reply.content.trim().to_string())
    }
}
