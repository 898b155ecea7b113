//! Parameter resolution for fetch nodes.
//!
//! String-valued leaves at the top level of a parameters object may
//! reference upstream outputs via `$input` or `$input[N]`. Templates are
//! parsed into a small typed expression and evaluated against a read-only
//! input context; there is no field-path addressing, arithmetic or
//! conditional substitution, and substitution is never recursive.

use serde_json::{Map, Value};

/// Read-only view over a node's resolved inputs.
pub struct InputContext<'a> {
    inputs: &'a [Value],
}

impl<'a> InputContext<'a> {
    pub fn new(inputs: &'a [Value]) -> Self {
        Self { inputs }
    }

    fn get(&self, index: usize) -> Option<&Value> {
        self.inputs.get(index)
    }
}

/// Parsed form of one string-valued parameter leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamTemplate {
    /// Any string that is not an input reference; passes through.
    Verbatim(String),
    /// `$input` (index 0) or `$input[N]`.
    InputRef { index: usize, raw: String },
}

impl ParamTemplate {
    pub fn parse(raw: &str) -> Self {
        if raw == "$input" {
            return ParamTemplate::InputRef {
                index: 0,
                raw: raw.to_string(),
            };
        }

        if let Some(rest) = raw.strip_prefix("$input[") {
            if let Some(digits) = rest.strip_suffix(']') {
                if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                    if let Ok(index) = digits.parse::<usize>() {
                        return ParamTemplate::InputRef {
                            index,
                            raw: raw.to_string(),
                        };
                    }
                }
            }
        }

        ParamTemplate::Verbatim(raw.to_string())
    }

    /// Evaluate against the input context. An out-of-range reference
    /// leaves the original template string unresolved.
    pub fn resolve(&self, ctx: &InputContext<'_>) -> Value {
        match self {
            ParamTemplate::Verbatim(raw) => Value::String(raw.clone()),
            ParamTemplate::InputRef { index, raw } => match ctx.get(*index) {
                Some(input) => stringify_input(input),
                None => Value::String(raw.clone()),
            },
        }
    }
}

/// A string input passes through as-is; anything else is serialized to
/// its JSON text.
fn stringify_input(input: &Value) -> Value {
    match input {
        Value::String(s) => Value::String(s.clone()),
        other => Value::String(other.to_string()),
    }
}

/// Resolve a fetch node's parameters object. Only top-level string values
/// are candidates; numbers, booleans and nested structures pass through
/// unchanged.
pub fn resolve_parameters(parameters: &Map<String, Value>, ctx: &InputContext<'_>) -> Value {
    let resolved: Map<String, Value> = parameters
        .iter()
        .map(|(key, value)| {
            let resolved = match value {
                Value::String(raw) => ParamTemplate::parse(raw).resolve(ctx),
                other => other.clone(),
            };
            (key.clone(), resolved)
        })
        .collect();

    Value::Object(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn dollar_input_resolves_to_first_input() {
        let inputs = [json!("hello")];
        let ctx = InputContext::new(&inputs);
        let out = resolve_parameters(&params(json!({"q": "$input"})), &ctx);
        assert_eq!(out, json!({"q": "hello"}));
    }

    #[test]
    fn structured_inputs_are_serialized_to_text() {
        let inputs = [json!({"a": 1})];
        let ctx = InputContext::new(&inputs);
        let out = resolve_parameters(&params(json!({"q": "$input"})), &ctx);
        assert_eq!(out, json!({"q": r#"{"a":1}"#}));
    }

    #[test]
    fn indexed_references_pick_the_nth_input() {
        let inputs = [json!("first"), json!("second")];
        let ctx = InputContext::new(&inputs);
        let out = resolve_parameters(&params(json!({"a": "$input[1]", "b": "$input[0]"})), &ctx);
        assert_eq!(out, json!({"a": "second", "b": "first"}));
    }

    #[test]
    fn out_of_range_index_leaves_the_template() {
        let inputs = [json!("only")];
        let ctx = InputContext::new(&inputs);
        let out = resolve_parameters(&params(json!({"q": "$input[3]"})), &ctx);
        assert_eq!(out, json!({"q": "$input[3]"}));
    }

    #[test]
    fn other_strings_pass_through() {
        let inputs: [Value; 0] = [];
        let ctx = InputContext::new(&inputs);
        let out = resolve_parameters(
            &params(json!({"q": "plain", "odd": "$inputs", "trail": "$input[2x]"})),
            &ctx,
        );
        assert_eq!(out, json!({"q": "plain", "odd": "$inputs", "trail": "$input[2x]"}));
    }

    #[test]
    fn non_string_leaves_and_nested_values_are_untouched() {
        let inputs = [json!("x")];
        let ctx = InputContext::new(&inputs);
        let out = resolve_parameters(
            &params(json!({
                "n": 7,
                "flag": true,
                "nested": {"inner": "$input"},
                "list": ["$input"]
            })),
            &ctx,
        );
        assert_eq!(
            out,
            json!({
                "n": 7,
                "flag": true,
                "nested": {"inner": "$input"},
                "list": ["$input"]
            })
        );
    }
}
