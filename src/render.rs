use serde_json::Value;

/// Render a JSON value as a CSV cell.
pub fn cell(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        // For arrays/objects, fall back to compact JSON representation
        other => other.to_string(),
    }
}

/// Render an optional scalar, leaving absent values blank.
pub fn opt<T: ToString>(v: &Option<T>) -> String {
    v.as_ref().map(ToString::to_string).unwrap_or_default()
}
