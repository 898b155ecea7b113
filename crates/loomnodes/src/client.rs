//! HTTP-backed implementations of the capability traits.
//!
//! The engine is transport-agnostic; these clients bind the traits to a
//! plain JSON-over-HTTP shape for deployments that speak it.

use async_trait::async_trait;
use loomcore::{
    ChatMessage, Completion, CompletionError, CompletionOptions, TextGenerator, TokenUsage,
    ToolCallError, ToolInvoker,
};
use serde::Deserialize;
use serde_json::{json, Value};

/// Tool invoker speaking `POST {base}/servers/{server_id}/tools/{tool}`
/// with a `{success, data | error}` response body.
pub struct HttpToolClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ToolCallReply {
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl HttpToolClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ToolInvoker for HttpToolClient {
    async fn call(
        &self,
        server_id: &str,
        tool_name: &str,
        parameters: Value,
    ) -> Result<Value, ToolCallError> {
        let url = format!(
            "{}/servers/{}/tools/{}",
            self.base_url.trim_end_matches('/'),
            server_id,
            tool_name
        );

        tracing::debug!(%url, "tool call");

        let response = self
            .client
            .post(&url)
            .json(&json!({ "parameters": parameters }))
            .send()
            .await
            .map_err(|e| ToolCallError::new(format!("tool request failed: {e}")))?;

        let reply: ToolCallReply = response
            .json()
            .await
            .map_err(|e| ToolCallError::new(format!("malformed tool response: {e}")))?;

        if reply.success {
            Ok(reply.data.unwrap_or(Value::Null))
        } else {
            Err(ToolCallError::new(
                reply.error.unwrap_or_else(|| "tool call failed".to_string()),
            ))
        }
    }
}

/// Text generator speaking `POST {base}/v1/completions` with a chat-style
/// message list and a `{content, usage?}` reply.
pub struct HttpCompletionClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CompletionReply {
    content: String,
    #[serde(default)]
    usage: Option<UsageReply>,
}

#[derive(Debug, Deserialize)]
struct UsageReply {
    input_tokens: u64,
    output_tokens: u64,
}

impl HttpCompletionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for HttpCompletionClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<Completion, CompletionError> {
        let url = format!("{}/v1/completions", self.base_url.trim_end_matches('/'));

        let mut body = json!({ "messages": messages });
        if let Some(model) = &options.model {
            body["model"] = json!(model);
        }
        if let Some(max_tokens) = options.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        tracing::debug!(%url, "completion call");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::new(format!("completion request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CompletionError::new(format!(
                "completion request returned {status}: {detail}"
            )));
        }

        let reply: CompletionReply = response
            .json()
            .await
            .map_err(|e| CompletionError::new(format!("malformed completion response: {e}")))?;

        Ok(Completion {
            content: reply.content,
            usage: reply.usage.map(|u| TokenUsage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            }),
        })
    }
}
