//! Query string rendering.
//!
//! Values are emitted verbatim. Sequences are rendered from their aggregate
//! text with the enclosing brackets removed and every `"` stripped, so
//! `["p","q"]` becomes `p,q`. Nothing is percent-encoded.

use indexmap::IndexMap;
use serde_json::Value;

/// Query parameters in insertion order.
pub type ParameterSet = IndexMap<String, Value>;

const QUOTATION_MARK: char = '"';

/// Render a single parameter value.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(_) => {
            let text = value.to_string();
            strip_enclosing(&text).replace(QUOTATION_MARK, "")
        }
        other => other.to_string(),
    }
}

/// Drop the first and last character (the enclosing brackets).
fn strip_enclosing(text: &str) -> &str {
    let mut chars = text.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

/// Build the query string for a parameter set.
///
/// Returns an empty string for an empty set, so callers can skip the `?`.
pub fn query_string(params: &ParameterSet) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, render_value(value)))
        .collect::<Vec<_>>()
        .join("&")
}
