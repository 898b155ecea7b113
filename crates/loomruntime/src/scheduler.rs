//! Topological scheduling of workflow nodes.

use loomcore::{EngineError, WorkflowDefinition};
use std::collections::{HashMap, VecDeque};

/// Compute the execution order for a definition using Kahn's algorithm.
///
/// A node's `inputs` are its incoming edges. Nodes with no inputs seed a
/// FIFO queue in definition order; ties among nodes becoming ready
/// simultaneously are broken by enqueue order, never by id sort. The
/// produced order is part of the engine's contract, not merely "a"
/// topological order.
///
/// Returns [`EngineError::CycleDetected`] when the order cannot cover
/// every node. The validator rejects cyclic definitions at save time, so
/// this is a defensive re-check; it fires before any node executes.
pub fn execution_order(definition: &WorkflowDefinition) -> Result<Vec<String>, EngineError> {
    let mut pending: HashMap<&str, usize> = HashMap::with_capacity(definition.nodes.len());
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

    for node in &definition.nodes {
        pending.insert(node.id.as_str(), node.inputs.len());
    }
    for node in &definition.nodes {
        for input in &node.inputs {
            dependents
                .entry(input.as_str())
                .or_default()
                .push(node.id.as_str());
        }
    }

    let mut queue: VecDeque<&str> = definition
        .nodes
        .iter()
        .filter(|node| node.inputs.is_empty())
        .map(|node| node.id.as_str())
        .collect();

    let mut order = Vec::with_capacity(definition.nodes.len());
    while let Some(node_id) = queue.pop_front() {
        order.push(node_id.to_string());

        if let Some(deps) = dependents.get(node_id) {
            for dependent in deps {
                if let Some(count) = pending.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        queue.push_back(dependent);
                    }
                }
            }
        }
    }

    if order.len() != definition.nodes.len() {
        return Err(EngineError::CycleDetected);
    }

    Ok(order)
}
