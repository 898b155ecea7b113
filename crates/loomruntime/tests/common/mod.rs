//! Shared fixtures: stub capabilities and definition builders.
#![allow(dead_code)]

use async_trait::async_trait;
use loomcore::{
    ActionConfig, ActionKind, ChatMessage, Completion, CompletionError, CompletionOptions,
    FetchConfig, MergeConfig, MergeStrategy, NodeKind, NodeSpec, OwnerScope, TextGenerator,
    ToolCallError, ToolInvoker, WorkflowDefinition,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Tool invoker with canned per-tool replies; records every call.
pub struct StubTools {
    pub calls: Mutex<Vec<(String, String, Value)>>,
    outputs: HashMap<String, Value>,
    failures: HashMap<String, String>,
}

impl StubTools {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            outputs: HashMap::new(),
            failures: HashMap::new(),
        }
    }

    pub fn with_output(mut self, tool_name: &str, output: Value) -> Self {
        self.outputs.insert(tool_name.to_string(), output);
        self
    }

    pub fn with_failure(mut self, tool_name: &str, message: &str) -> Self {
        self.failures
            .insert(tool_name.to_string(), message.to_string());
        self
    }

    pub fn called_tools(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, tool, _)| tool.clone())
            .collect()
    }
}

#[async_trait]
impl ToolInvoker for StubTools {
    async fn call(
        &self,
        server_id: &str,
        tool_name: &str,
        parameters: Value,
    ) -> Result<Value, ToolCallError> {
        self.calls.lock().unwrap().push((
            server_id.to_string(),
            tool_name.to_string(),
            parameters.clone(),
        ));

        if let Some(message) = self.failures.get(tool_name) {
            return Err(ToolCallError::new(message.clone()));
        }
        if let Some(output) = self.outputs.get(tool_name) {
            return Ok(output.clone());
        }
        Ok(json!({ "tool": tool_name, "parameters": parameters }))
    }
}

/// Text generator that always replies with the same content.
pub struct StubTextGen {
    reply: String,
}

impl StubTextGen {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
        }
    }
}

#[async_trait]
impl TextGenerator for StubTextGen {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _options: &CompletionOptions,
    ) -> Result<Completion, CompletionError> {
        Ok(Completion {
            content: self.reply.clone(),
            usage: None,
        })
    }
}

pub fn owner() -> OwnerScope {
    OwnerScope::User(Uuid::from_u128(7))
}

pub fn definition(nodes: Vec<NodeSpec>) -> WorkflowDefinition {
    let mut def = WorkflowDefinition::new("test-workflow").with_owner(owner());
    for node in nodes {
        def.add_node(node);
    }
    def
}

pub fn fetch(id: &str, tool_name: &str) -> NodeSpec {
    fetch_with_params(id, tool_name, Map::new())
}

pub fn fetch_with_params(id: &str, tool_name: &str, parameters: Map<String, Value>) -> NodeSpec {
    NodeSpec::new(
        id,
        NodeKind::Fetch(FetchConfig {
            server_id: "srv-test".to_string(),
            tool_name: tool_name.to_string(),
            parameters,
        }),
    )
}

pub fn merge_concat(id: &str, inputs: &[&str]) -> NodeSpec {
    NodeSpec::new(
        id,
        NodeKind::Merge(MergeConfig {
            strategy: MergeStrategy::Concat,
            key: None,
        }),
    )
    .with_inputs(inputs.iter().copied())
}

pub fn action_save(id: &str, inputs: &[&str]) -> NodeSpec {
    NodeSpec::new(
        id,
        NodeKind::Action(ActionConfig {
            action: ActionKind::Save,
            message: None,
        }),
    )
    .with_inputs(inputs.iter().copied())
}
