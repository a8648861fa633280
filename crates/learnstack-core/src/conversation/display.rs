use serde_json::Value;

/// Text to show for an assistant message while its reply is streaming.
///
/// If the accumulated text is itself a JSON object with a non-empty `reply`
/// string, only that value is shown; otherwise the text is shown as-is.
pub fn display_text(accumulated: &str) -> String {
    // Only a complete object can carry `reply`.
    if !accumulated.trim_end().ends_with('}') {
        return accumulated.to_string();
    }

    match serde_json::from_str::<Value>(accumulated) {
        Ok(Value::Object(fields)) => match fields.get("reply") {
            Some(Value::String(reply)) if !reply.is_empty() => reply.clone(),
            _ => accumulated.to_string(),
        },
        _ => accumulated.to_string(),
    }
}
