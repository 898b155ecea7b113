//! Fetch node: invoke a named tool on a remote server.

use loomcore::{FetchConfig, NodeError, ToolInvoker};
use serde_json::Value;

/// Execute a fetch node. `parameters` has already passed through the
/// parameter resolver. A tool-level failure fails the node with the
/// tool's reported message.
pub async fn run_fetch(
    config: &FetchConfig,
    parameters: Value,
    tools: &dyn ToolInvoker,
) -> Result<Value, NodeError> {
    tracing::debug!(
        server_id = %config.server_id,
        tool_name = %config.tool_name,
        "invoking tool"
    );

    tools
        .call(&config.server_id, &config.tool_name, parameters)
        .await
        .map_err(|e| NodeError::ToolCall(e.message))
}
