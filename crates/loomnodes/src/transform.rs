//! Transform node: rewrite inputs through the text-generation capability.

use loomcore::{ChatMessage, CompletionOptions, NodeError, TextGenerator, TransformConfig};
use serde_json::Value;

/// Build the prompt sent to the text-generation capability: the configured
/// template followed by the serialized resolved inputs.
pub fn build_prompt(config: &TransformConfig, inputs: &[Value]) -> String {
    let serialized = match inputs {
        [] => "null".to_string(),
        [single] => serde_json::to_string_pretty(single).unwrap_or_else(|_| single.to_string()),
        many => serde_json::to_string_pretty(many)
            .unwrap_or_else(|_| Value::Array(many.to_vec()).to_string()),
    };

    format!("{}\n\nInput data:\n{}", config.template.trim_end(), serialized)
}

/// Execute a transform node. The reply content is strictly parsed as JSON;
/// on parse failure the raw text is forwarded unchanged, so the output is
/// either structured data or opaque text and downstream nodes must
/// tolerate both. Only a capability-level failure fails the node.
pub async fn run_transform(
    config: &TransformConfig,
    inputs: &[Value],
    textgen: &dyn TextGenerator,
) -> Result<Value, NodeError> {
    let prompt = build_prompt(config, inputs);
    let messages = [ChatMessage::user(prompt)];
    let options = CompletionOptions {
        model: config.model.clone(),
        max_tokens: config.max_tokens,
    };

    let completion = textgen
        .complete(&messages, &options)
        .await
        .map_err(|e| NodeError::Completion(e.message))?;

    let content = completion.content;
    match serde_json::from_str::<Value>(content.trim()) {
        Ok(parsed) => Ok(parsed),
        Err(_) => Ok(Value::String(content)),
    }
}
