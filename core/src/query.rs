//! Query-string serialization for Strapi parameters.
//!
//! Strapi reads nested parameters in bracket notation:
//! `{"filters": {"title": {"$eq": "Hello"}}}` becomes
//! `filters[title][$eq]=Hello`, and arrays are indexed
//! (`populate[0]=author`). `null` leaves are dropped. Percent-encoding is
//! left to the URL layer.

use serde_json::Value;

/// Flatten `params` into ordered `(key, value)` pairs.
///
/// Only a JSON object produces pairs; any other top-level value yields none.
pub fn stringify(params: &Value) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    if let Value::Object(map) = params {
        for (key, value) in map {
            flatten(key.clone(), value, &mut pairs);
        }
    }
    pairs
}

fn flatten(prefix: String, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => pairs.push((prefix, b.to_string())),
        Value::Number(n) => pairs.push((prefix, n.to_string())),
        Value::String(s) => pairs.push((prefix, s.clone())),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten(format!("{prefix}[{i}]"), item, pairs);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                flatten(format!("{prefix}[{key}]"), item, pairs);
            }
        }
    }
}
