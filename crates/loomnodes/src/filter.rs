//! Filter node: keep the elements of a single array input that satisfy
//! every declared condition.

use crate::value::{as_f64, coerce_string, type_name};
use loomcore::{lookup_path, FilterCondition, FilterConfig, FilterOperator, NodeError};
use serde_json::Value;

/// Execute a filter node. Requires exactly one resolved input, which must
/// be an array; conditions are ANDed. An operator the engine does not
/// recognize makes its condition false, never an error.
pub fn run_filter(config: &FilterConfig, inputs: &[Value]) -> Result<Value, NodeError> {
    if inputs.len() != 1 {
        return Err(NodeError::InputArity {
            expected: 1,
            actual: inputs.len(),
        });
    }

    let Value::Array(items) = &inputs[0] else {
        return Err(NodeError::InvalidInputType {
            expected: "array".to_string(),
            actual: type_name(&inputs[0]).to_string(),
        });
    };

    let kept: Vec<Value> = items
        .iter()
        .filter(|item| {
            config
                .conditions
                .iter()
                .all(|condition| matches_condition(item, condition))
        })
        .cloned()
        .collect();

    tracing::debug!(kept = kept.len(), total = items.len(), "filter applied");
    Ok(Value::Array(kept))
}

fn matches_condition(item: &Value, condition: &FilterCondition) -> bool {
    let left = lookup_path(item, &condition.field)
        .cloned()
        .unwrap_or(Value::Null);

    match condition.operator {
        FilterOperator::Equals => left == condition.value,
        FilterOperator::Contains => {
            coerce_string(&left).contains(&coerce_string(&condition.value))
        }
        FilterOperator::Gt => match (as_f64(&left), as_f64(&condition.value)) {
            (Some(l), Some(r)) => l > r,
            _ => false,
        },
        FilterOperator::Lt => match (as_f64(&left), as_f64(&condition.value)) {
            (Some(l), Some(r)) => l < r,
            _ => false,
        },
        FilterOperator::Unknown => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn condition(field: &str, operator: FilterOperator, value: Value) -> FilterCondition {
        FilterCondition {
            field: field.into(),
            operator,
            value,
        }
    }

    #[test]
    fn gt_keeps_larger_values() {
        let config = FilterConfig {
            conditions: vec![condition("x", FilterOperator::Gt, json!(3))],
        };
        let out = run_filter(&config, &[json!([{"x": 1}, {"x": 5}, {"x": 9}])]).unwrap();
        assert_eq!(out, json!([{"x": 5}, {"x": 9}]));
    }

    #[test]
    fn conditions_are_anded() {
        let config = FilterConfig {
            conditions: vec![
                condition("x", FilterOperator::Gt, json!(1)),
                condition("x", FilterOperator::Lt, json!(9)),
            ],
        };
        let out = run_filter(&config, &[json!([{"x": 1}, {"x": 5}, {"x": 9}])]).unwrap();
        assert_eq!(out, json!([{"x": 5}]));
    }

    #[test]
    fn contains_matches_on_string_coerced_values() {
        let config = FilterConfig {
            conditions: vec![condition("name", FilterOperator::Contains, json!("ann"))],
        };
        let out = run_filter(
            &config,
            &[json!([{"name": "joanna"}, {"name": "bob"}, {"name": 7}])],
        )
        .unwrap();
        assert_eq!(out, json!([{"name": "joanna"}]));
    }

    #[test]
    fn unknown_operator_is_false_not_an_error() {
        let config = FilterConfig {
            conditions: vec![condition("x", FilterOperator::Unknown, json!(1))],
        };
        let out = run_filter(&config, &[json!([{"x": 1}])]).unwrap();
        assert_eq!(out, json!([]));
    }

    #[test]
    fn non_array_input_is_a_type_error() {
        let config = FilterConfig { conditions: vec![] };
        let err = run_filter(&config, &[json!({"x": 1})]).unwrap_err();
        assert!(matches!(err, NodeError::InvalidInputType { .. }));
    }

    #[test]
    fn wrong_input_count_is_an_arity_error() {
        let config = FilterConfig { conditions: vec![] };
        let err = run_filter(&config, &[json!([]), json!([])]).unwrap_err();
        assert!(matches!(
            err,
            NodeError::InputArity {
                expected: 1,
                actual: 2
            }
        ));
    }
}
