//! Normalization of chat service replies into display text.
//!
//! The chat service is loosely typed: a reply may be a bare string, a
//! `[sender, text]` pair, an object carrying `response` or `responses`, or a
//! `data.messages` list.  [`extract_message_content`] turns any one content
//! value into text with a fixed precedence, and never fails; values that
//! match no known shape become the empty string.

use serde_json::Value;

/// Extract display text from a raw content value.
///
/// Precedence, first match wins:
///
/// 1. a string is returned unchanged;
/// 2. an object whose `response` is a non-empty array yields its first element;
/// 3. an object whose `responses` is a string yields that string;
/// 4. an array yields its element at index 1 if present, else index 0;
/// 5. anything else yields `""`.
///
/// ```
/// # use parlor::normalize::extract_message_content;
/// # use serde_json::json;
/// assert_eq!(extract_message_content(&json!({"response": ["hi"]})), "hi");
/// assert_eq!(extract_message_content(&json!(["user", "hello"])), "hello");
/// assert_eq!(extract_message_content(&json!("plain text")), "plain text");
/// assert_eq!(extract_message_content(&json!(null)), "");
/// ```
pub fn extract_message_content(value: &Value) -> String {
    if let Value::String(text) = value {
        return text.clone();
    }
    if let Some(Value::Array(items)) = value.get("response")
        && let Some(first) = items.first()
    {
        return scalar_text(first);
    }
    if let Some(Value::String(text)) = value.get("responses") {
        return text.clone();
    }
    if let Value::Array(items) = value {
        return items.get(1).or_else(|| items.first()).map(scalar_text).unwrap_or_default();
    }
    String::new()
}

// Elements picked out of arrays are expected to be text; numbers and booleans
// are printed, anything structured degrades to empty.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}
