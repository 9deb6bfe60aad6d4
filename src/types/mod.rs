// Public modules
pub mod chat;
pub mod end;
pub mod message;
pub mod response_payload;
pub mod sender;
pub mod start;

// Re-exports
pub use chat::{ChatRequest, ChatResponse};
pub use end::EndRequest;
pub use message::Message;
pub use response_payload::{BackendMessage, ResponsePayload};
pub use sender::{Sender, SenderParseError};
pub use start::{StartRequest, StartResponse};

use serde_json::Value;

// Booleans sometimes arrive as strings or 0/1 from loosely typed services.
pub(crate) fn lenient_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" | "" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        _ => None,
    }
}

pub(crate) fn lenient_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
