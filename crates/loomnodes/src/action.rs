//! Action node: terminal, side-effecting step.

use loomcore::{ActionConfig, ActionKind, NodeError};
use serde_json::Value;

/// Execute an action node. `save` and `notify` are synchronous, always
/// succeed and pass through their first input. `send_email` and `webhook`
/// are unsupported and fail the node instead of no-opping.
pub fn run_action(config: &ActionConfig, inputs: &[Value]) -> Result<Value, NodeError> {
    let payload = inputs.first().cloned().unwrap_or(Value::Null);

    match config.action {
        ActionKind::Save => {
            tracing::info!(action = "save", payload = %payload, "action executed");
            Ok(payload)
        }
        ActionKind::Notify => {
            let message = config.message.as_deref().unwrap_or("workflow notification");
            tracing::info!(action = "notify", %message, payload = %payload, "action executed");
            Ok(payload)
        }
        ActionKind::SendEmail | ActionKind::Webhook => Err(NodeError::UnsupportedAction(
            config.action.as_str().to_string(),
        )),
    }
}
