//! Capability traits the engine depends on.
//!
//! The engine holds these collaborators by explicit injection and never
//! touches transport details; HTTP-backed implementations live in
//! `loomnodes`, and tests substitute mocks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error reported by a tool server for a failed call.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct ToolCallError {
    pub message: String,
}

impl ToolCallError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Executes a named tool on a remote server and returns its data payload
/// or a tool-level error. Transport-agnostic.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    async fn call(
        &self,
        server_id: &str,
        tool_name: &str,
        parameters: Value,
    ) -> Result<Value, ToolCallError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionOptions {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Reply from the text-generation capability. `content` is opaque text;
/// the engine only ever attempts a best-effort structured parse of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    pub content: String,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct CompletionError {
    pub message: String,
}

impl CompletionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Produces text from a list of chat messages.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<Completion, CompletionError>;
}
