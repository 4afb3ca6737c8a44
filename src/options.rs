//! Per-node component options.
//!
//! Options arrive as text in the node's options attribute and are parsed as a
//! JSON object literal: string keys, literal values (strings, numbers,
//! booleans, null, arrays, nested objects). Nothing is evaluated.
//!
//! ERROR HANDLING
//! ==============
//! Options never fail a load. Missing, blank, `null`, malformed, or
//! non-object text all produce an empty map; the parse error is logged at
//! debug level and dropped.

#[cfg(test)]
#[path = "options_test.rs"]
mod options_test;

use serde_json::{Map, Value};
use tracing::debug;

/// Options handed to a component constructor.
pub type Options = Map<String, Value>;

/// Parse the raw options attribute into an options map.
#[must_use]
pub fn parse_options(raw: Option<&str>) -> Options {
    let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return Options::new();
    };

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => map,
        Ok(Value::Null) => Options::new(),
        Ok(other) => {
            debug!(kind = value_kind(&other), "component options are not an object; using empty options");
            Options::new()
        }
        Err(e) => {
            debug!(error = %e, "component options failed to parse; using empty options");
            Options::new()
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
