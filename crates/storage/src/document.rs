//! JSON documents and their non-destructive merge.

use serde_json::{Map, Value};

/// A schemaless document: the top-level JSON object of a stored record.
pub type Document = Map<String, Value>;

/// Deep-merge `patch` into `target`.
///
/// Objects present on both sides are merged key by key; any other value in
/// `patch` replaces the one in `target`. Keys absent from `patch` are left
/// untouched at every level.
pub fn merge(target: &mut Document, patch: Document) {
    for (key, incoming) in patch {
        match (target.get_mut(&key), incoming) {
            (Some(Value::Object(existing)), Value::Object(nested)) => merge(existing, nested),
            (_, incoming) => {
                target.insert(key, incoming);
            }
        }
    }
}

/// Parse a stored document body. Anything other than a JSON object is rejected.
///
/// # Errors
///
/// Returns a description of the problem when the body is not a JSON object.
pub fn parse(body: &str) -> Result<Document, String> {
    match serde_json::from_str::<Value>(body).map_err(|e| e.to_string())? {
        Value::Object(map) => Ok(map),
        other => Err(format!("expected a JSON object, found {other}")),
    }
}
