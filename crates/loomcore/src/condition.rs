//! Typed boolean expression grammar for conditional nodes.
//!
//! Expressions are plain data evaluated against a read-only subject value.
//! The grammar is restricted to comparisons, membership tests and boolean
//! combinators; caller-supplied code is never compiled or executed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Boolean expression over a JSON subject. `field` is a dotted path into
/// the subject; a path that does not resolve yields `Null` for the
/// comparison rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ConditionExpr {
    Eq { field: String, value: Value },
    Ne { field: String, value: Value },
    Gt { field: String, value: Value },
    Lt { field: String, value: Value },
    Gte { field: String, value: Value },
    Lte { field: String, value: Value },
    /// Substring match on the string-coerced field value.
    Contains { field: String, value: Value },
    Exists { field: String },
    All { terms: Vec<ConditionExpr> },
    AnyOf { terms: Vec<ConditionExpr> },
    Not { term: Box<ConditionExpr> },
}

impl ConditionExpr {
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        ConditionExpr::Eq {
            field: field.into(),
            value,
        }
    }

    pub fn gt(field: impl Into<String>, value: Value) -> Self {
        ConditionExpr::Gt {
            field: field.into(),
            value,
        }
    }
}

/// Resolve a dotted path against a value. Objects are traversed by key,
/// arrays by numeric index. An empty path returns the value itself.
pub fn lookup_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        if segment.is_empty() {
            continue;
        }
        match current {
            Value::Object(map) => current = map.get(segment)?,
            Value::Array(items) => {
                let index = segment.parse::<usize>().ok()?;
                current = items.get(index)?;
            }
            _ => return None,
        }
    }
    Some(current)
}
