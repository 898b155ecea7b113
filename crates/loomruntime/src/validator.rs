//! Static structural validation of workflow definitions.
//!
//! Every check runs independently and accumulates into the report, so a
//! caller sees the complete list of violations at once. A failing report
//! blocks persistence entirely.

use loomcore::{NodeKind, ValidationError, WorkflowDefinition};
use std::collections::{HashMap, HashSet};

/// Outcome of validating a definition.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Human-readable error list, for API replies and CLI output.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }
}

/// Validate a workflow definition, accumulating all violations.
pub fn validate(definition: &WorkflowDefinition) -> ValidationReport {
    let mut errors = Vec::new();

    if definition.name.trim().is_empty() {
        errors.push(ValidationError::MissingName);
    }

    if definition.owner.is_none() {
        errors.push(ValidationError::MissingOwner);
    }

    if definition.nodes.is_empty() {
        errors.push(ValidationError::NoNodes);
    }

    let mut ids: HashSet<&str> = HashSet::new();
    for node in &definition.nodes {
        if !ids.insert(node.id.as_str()) {
            errors.push(ValidationError::DuplicateNodeId(node.id.clone()));
        }
    }

    for node in &definition.nodes {
        for input in &node.inputs {
            if !ids.contains(input.as_str()) {
                errors.push(ValidationError::UnknownInput {
                    node_id: node.id.clone(),
                    input: input.clone(),
                });
            }
        }
    }

    for node in &definition.nodes {
        if let Some(detail) = config_issue(&node.kind) {
            errors.push(ValidationError::EmptyConfig {
                node_id: node.id.clone(),
                detail,
            });
        }
    }

    errors.extend(find_cycles(definition));

    ValidationReport { errors }
}

/// Per-kind configuration completeness. The typed payloads guarantee
/// shape; this catches fields that deserialized but are empty.
fn config_issue(kind: &NodeKind) -> Option<String> {
    match kind {
        NodeKind::Fetch(cfg) => {
            if cfg.server_id.trim().is_empty() {
                Some("fetch requires a server_id".to_string())
            } else if cfg.tool_name.trim().is_empty() {
                Some("fetch requires a tool_name".to_string())
            } else {
                None
            }
        }
        NodeKind::Transform(cfg) => cfg
            .template
            .trim()
            .is_empty()
            .then(|| "transform requires a template".to_string()),
        NodeKind::Filter(cfg) => cfg
            .conditions
            .is_empty()
            .then(|| "filter requires at least one condition".to_string()),
        NodeKind::Merge(_) | NodeKind::Action(_) | NodeKind::Conditional(_) => None,
    }
}

/// Depth-first search with an explicit recursion stack. Any node
/// reachable from itself via `inputs` edges produces a cycle error naming
/// the offending chain.
fn find_cycles(definition: &WorkflowDefinition) -> Vec<ValidationError> {
    let mut edges: HashMap<&str, &[String]> = HashMap::new();
    for node in &definition.nodes {
        edges.entry(node.id.as_str()).or_insert(&node.inputs);
    }

    let mut errors = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut rec_stack: HashSet<&str> = HashSet::new();
    let mut path: Vec<&str> = Vec::new();

    for node in &definition.nodes {
        if !visited.contains(node.id.as_str()) {
            walk(
                node.id.as_str(),
                &edges,
                &mut visited,
                &mut rec_stack,
                &mut path,
                &mut errors,
            );
        }
    }

    errors
}

fn walk<'a>(
    node_id: &'a str,
    edges: &HashMap<&'a str, &'a [String]>,
    visited: &mut HashSet<&'a str>,
    rec_stack: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
    errors: &mut Vec<ValidationError>,
) {
    visited.insert(node_id);
    rec_stack.insert(node_id);
    path.push(node_id);

    if let Some(inputs) = edges.get(node_id) {
        for input in inputs.iter() {
            let input = input.as_str();
            if rec_stack.contains(input) {
                // Chain from the first occurrence of the repeated node.
                let start = path.iter().position(|id| *id == input).unwrap_or(0);
                let mut chain: Vec<String> =
                    path[start..].iter().map(|id| id.to_string()).collect();
                chain.push(input.to_string());
                errors.push(ValidationError::Cycle { chain });
            } else if !visited.contains(input) && edges.contains_key(input) {
                walk(input, edges, visited, rec_stack, path, errors);
            }
        }
    }

    path.pop();
    rec_stack.remove(node_id);
}
