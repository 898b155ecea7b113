//! Merge node: combine the outputs of multiple upstream nodes.

use crate::value::{coerce_string, type_name};
use loomcore::{MergeConfig, MergeStrategy, NodeError};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Execute a merge node over the resolved inputs, in declaration order.
pub fn run_merge(config: &MergeConfig, inputs: &[Value]) -> Result<Value, NodeError> {
    match config.strategy {
        MergeStrategy::Concat => Ok(Value::Array(flatten(inputs))),
        MergeStrategy::Deduplicate => {
            let key = config.key.as_deref().ok_or_else(|| {
                NodeError::Configuration(
                    "deduplicate strategy requires a 'key' field".to_string(),
                )
            })?;
            Ok(Value::Array(deduplicate(flatten(inputs), key)))
        }
        MergeStrategy::MergeObjects => merge_objects(inputs),
    }
}

/// Flatten every input, preserving declaration order and duplicates.
/// Non-array inputs are appended as single elements.
fn flatten(inputs: &[Value]) -> Vec<Value> {
    let mut out = Vec::new();
    for input in inputs {
        match input {
            Value::Array(items) => out.extend(items.iter().cloned()),
            other => out.push(other.clone()),
        }
    }
    out
}

/// Keep the first occurrence per key field, in first-seen order. Items
/// without the key field are kept.
fn deduplicate(items: Vec<Value>, key: &str) -> Vec<Value> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for item in items {
        match item.get(key) {
            Some(value) => {
                if seen.insert(coerce_string(value)) {
                    out.push(item);
                }
            }
            None => out.push(item),
        }
    }

    out
}

/// Shallow right-biased union of all inputs in declaration order; later
/// inputs' fields overwrite earlier ones.
fn merge_objects(inputs: &[Value]) -> Result<Value, NodeError> {
    let mut out = Map::new();
    for input in inputs {
        match input {
            Value::Object(map) => {
                for (k, v) in map {
                    out.insert(k.clone(), v.clone());
                }
            }
            other => {
                return Err(NodeError::InvalidInputType {
                    expected: "object".to_string(),
                    actual: type_name(other).to_string(),
                })
            }
        }
    }
    Ok(Value::Object(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn concat_preserves_order_and_duplicates() {
        let config = MergeConfig {
            strategy: MergeStrategy::Concat,
            key: None,
        };
        let out = run_merge(&config, &[json!([1, 2]), json!([2, 3]), json!("x")]).unwrap();
        assert_eq!(out, json!([1, 2, 2, 3, "x"]));
    }

    #[test]
    fn deduplicate_keeps_first_seen_order() {
        let config = MergeConfig {
            strategy: MergeStrategy::Deduplicate,
            key: Some("id".into()),
        };
        let out = run_merge(
            &config,
            &[json!([{"id": 1}, {"id": 2}]), json!([{"id": 2}, {"id": 3}])],
        )
        .unwrap();
        assert_eq!(out, json!([{"id": 1}, {"id": 2}, {"id": 3}]));
    }

    #[test]
    fn deduplicate_without_key_is_a_configuration_error() {
        let config = MergeConfig {
            strategy: MergeStrategy::Deduplicate,
            key: None,
        };
        let err = run_merge(&config, &[json!([])]).unwrap_err();
        assert!(matches!(err, NodeError::Configuration(_)));
    }

    #[test]
    fn deduplicate_keeps_items_missing_the_key() {
        let config = MergeConfig {
            strategy: MergeStrategy::Deduplicate,
            key: Some("id".into()),
        };
        let out = run_merge(&config, &[json!([{"id": 1}, {"name": "x"}, {"id": 1}])]).unwrap();
        assert_eq!(out, json!([{"id": 1}, {"name": "x"}]));
    }

    #[test]
    fn merge_objects_is_right_biased() {
        let config = MergeConfig {
            strategy: MergeStrategy::MergeObjects,
            key: None,
        };
        let out = run_merge(
            &config,
            &[json!({"a": 1, "b": 1}), json!({"b": 2, "c": 3})],
        )
        .unwrap();
        assert_eq!(out, json!({"a": 1, "b": 2, "c": 3}));
    }

    #[test]
    fn merge_objects_rejects_non_objects() {
        let config = MergeConfig {
            strategy: MergeStrategy::MergeObjects,
            key: None,
        };
        let err = run_merge(&config, &[json!({"a": 1}), json!([1])]).unwrap_err();
        assert!(matches!(err, NodeError::InvalidInputType { .. }));
    }
}
