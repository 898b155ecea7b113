use crate::condition::ConditionExpr;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub type WorkflowId = Uuid;

/// Scope that owns a workflow definition: a single user or a single
/// organization, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum OwnerScope {
    User(Uuid),
    Organization(Uuid),
}

/// Complete workflow definition: an ordered set of nodes whose `inputs`
/// edges form a DAG. Immutable once persisted except via full
/// replace-and-revalidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub id: WorkflowId,
    /// Validated present before persistence; `None` only on drafts.
    pub owner: Option<OwnerScope>,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub nodes: Vec<NodeSpec>,
}

impl WorkflowDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: None,
            name: name.into(),
            description: None,
            category: None,
            nodes: Vec::new(),
        }
    }

    pub fn with_owner(mut self, owner: OwnerScope) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn add_node(&mut self, node: NodeSpec) -> &mut Self {
        self.nodes.push(node);
        self
    }

    pub fn find_node(&self, id: &str) -> Option<&NodeSpec> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// One typed unit of work in a workflow. `inputs` lists the node ids whose
/// outputs this node consumes, in the order it consumes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default)]
    pub inputs: Vec<String>,
}

impl NodeSpec {
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            inputs: Vec::new(),
        }
    }

    pub fn with_inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    /// Stable label for logs and events.
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Closed set of node types. Each variant carries its own typed
/// configuration payload; the executor dispatches on this exhaustively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "snake_case")]
pub enum NodeKind {
    Fetch(FetchConfig),
    Transform(TransformConfig),
    Filter(FilterConfig),
    Merge(MergeConfig),
    Action(ActionConfig),
    Conditional(ConditionalConfig),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Fetch(_) => "fetch",
            NodeKind::Transform(_) => "transform",
            NodeKind::Filter(_) => "filter",
            NodeKind::Merge(_) => "merge",
            NodeKind::Action(_) => "action",
            NodeKind::Conditional(_) => "conditional",
        }
    }
}

/// Invoke a named tool on a remote server. String-valued top-level
/// parameters may reference upstream outputs via `$input` / `$input[N]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub server_id: String,
    pub tool_name: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

/// Rewrite inputs through the text-generation capability. The model reply
/// is parsed as JSON when possible and forwarded as raw text otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    pub template: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub conditions: Vec<FilterCondition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterCondition {
    pub field: String,
    pub operator: FilterOperator,
    pub value: Value,
}

/// Supported filter operators. An operator the engine does not recognize
/// deserializes to `Unknown` and evaluates to false rather than erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    Contains,
    Gt,
    Lt,
    Unknown,
}

impl<'de> Deserialize<'de> for FilterOperator {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "equals" => FilterOperator::Equals,
            "contains" => FilterOperator::Contains,
            "gt" => FilterOperator::Gt,
            "lt" => FilterOperator::Lt,
            _ => FilterOperator::Unknown,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    pub strategy: MergeStrategy,
    /// Field name used by `deduplicate`; required for that strategy.
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    Concat,
    Deduplicate,
    MergeObjects,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionConfig {
    pub action: ActionKind,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Save,
    Notify,
    SendEmail,
    Webhook,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Save => "save",
            ActionKind::Notify => "notify",
            ActionKind::SendEmail => "send_email",
            ActionKind::Webhook => "webhook",
        }
    }
}

/// Conditional nodes are informational-only: they evaluate their condition
/// against the first input and annotate which branch would run. They never
/// change which nodes the executor actually executes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionalConfig {
    pub condition: ConditionExpr,
    #[serde(default)]
    pub true_branch: Option<String>,
    #[serde(default)]
    pub false_branch: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn node_kind_round_trips_through_json() {
        let node = NodeSpec::new(
            "fetch-1",
            NodeKind::Fetch(FetchConfig {
                server_id: "srv".into(),
                tool_name: "search".into(),
                parameters: Map::new(),
            }),
        )
        .with_inputs(["a", "b"]);

        let encoded = serde_json::to_value(&node).unwrap();
        assert_eq!(encoded["type"], "fetch");
        assert_eq!(encoded["inputs"], json!(["a", "b"]));

        let decoded: NodeSpec = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded.id, "fetch-1");
        assert!(matches!(decoded.kind, NodeKind::Fetch(_)));
    }

    #[test]
    fn unknown_filter_operator_deserializes_to_unknown() {
        let condition: FilterCondition = serde_json::from_value(json!({
            "field": "x",
            "operator": "starts_with",
            "value": 1
        }))
        .unwrap();
        assert_eq!(condition.operator, FilterOperator::Unknown);
    }

    #[test]
    fn owner_scope_is_tagged() {
        let owner = OwnerScope::Organization(Uuid::nil());
        let encoded = serde_json::to_value(owner).unwrap();
        assert_eq!(encoded["kind"], "organization");
    }
}
