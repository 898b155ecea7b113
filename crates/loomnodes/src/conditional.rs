//! Conditional node: evaluate a boolean expression against the first
//! input and annotate the route that would be taken.
//!
//! The annotation is informational-only. The executor runs every
//! scheduled node regardless of `condition_met`; `next_node_id` names the
//! branch a routing-aware executor would select.

use crate::value::{as_f64, coerce_string};
use loomcore::{lookup_path, ConditionExpr, ConditionalConfig, NodeError};
use serde_json::{json, Value};

/// Execute a conditional node over the first resolved input (`Null` when
/// the node has no inputs).
pub fn run_conditional(
    config: &ConditionalConfig,
    inputs: &[Value],
) -> Result<Value, NodeError> {
    let subject = inputs.first().cloned().unwrap_or(Value::Null);
    let condition_met = evaluate(&config.condition, &subject);

    let next_node_id = if condition_met {
        config.true_branch.clone()
    } else {
        config.false_branch.clone()
    };

    Ok(json!({
        "condition_met": condition_met,
        "next_node_id": next_node_id,
        "data": subject,
    }))
}

/// Evaluate an expression against a subject value.
pub fn evaluate(expr: &ConditionExpr, subject: &Value) -> bool {
    match expr {
        ConditionExpr::Eq { field, value } => field_value(subject, field) == *value,
        ConditionExpr::Ne { field, value } => field_value(subject, field) != *value,
        ConditionExpr::Gt { field, value } => compare(subject, field, value, |l, r| l > r),
        ConditionExpr::Lt { field, value } => compare(subject, field, value, |l, r| l < r),
        ConditionExpr::Gte { field, value } => compare(subject, field, value, |l, r| l >= r),
        ConditionExpr::Lte { field, value } => compare(subject, field, value, |l, r| l <= r),
        ConditionExpr::Contains { field, value } => {
            coerce_string(&field_value(subject, field)).contains(&coerce_string(value))
        }
        ConditionExpr::Exists { field } => lookup_path(subject, field)
            .map(|v| !v.is_null())
            .unwrap_or(false),
        ConditionExpr::All { terms } => terms.iter().all(|t| evaluate(t, subject)),
        ConditionExpr::AnyOf { terms } => terms.iter().any(|t| evaluate(t, subject)),
        ConditionExpr::Not { term } => !evaluate(term, subject),
    }
}

fn field_value(subject: &Value, field: &str) -> Value {
    lookup_path(subject, field).cloned().unwrap_or(Value::Null)
}

fn compare(subject: &Value, field: &str, value: &Value, op: fn(f64, f64) -> bool) -> bool {
    match (as_f64(&field_value(subject, field)), as_f64(value)) {
        (Some(l), Some(r)) => op(l, r),
        _ => false,
    }
}
