use serde_json::Value;

use crate::normalize::extract_message_content;
use crate::types::{Message, Sender};

/// One entry of a `data.messages` list as sent by the chat service.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendMessage {
    /// The sender label, as given.  Empty when missing or not a string.
    pub sender: String,

    /// The raw content value.  Any shape accepted by
    /// [`extract_message_content`].
    pub content: Value,
}

/// The bot reply carried by a response body, classified by shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponsePayload {
    /// A `data.messages` list of sender/content pairs.
    Messages(Vec<BackendMessage>),

    /// An object carrying `response` and/or `responses`.
    Reply(Value),

    /// A bare array such as `["bot", "hello"]`.
    Sequence(Vec<Value>),

    /// A bare string.
    Text(String),

    /// No recognizable reply.
    #[default]
    Empty,
}

impl ResponsePayload {
    /// Classify a whole response body.
    ///
    /// `data.messages` wins over `response`, which wins over a bare value.
    pub fn from_body(body: &Value) -> Self {
        if let Some(Value::Array(entries)) = body.get("data").and_then(|d| d.get("messages")) {
            return ResponsePayload::Messages(entries.iter().map(backend_message).collect());
        }
        match body {
            Value::String(text) => ResponsePayload::Text(text.clone()),
            Value::Array(items) => ResponsePayload::Sequence(items.clone()),
            Value::Object(map) if map.contains_key("response") || map.contains_key("responses") => {
                ResponsePayload::Reply(body.clone())
            }
            _ => ResponsePayload::Empty,
        }
    }

    /// Normalize into transcript messages, preserving order.
    ///
    /// Texts that normalize to nothing are kept as empty strings; deciding
    /// whether to display them is up to the view.
    pub fn messages(&self) -> Vec<Message> {
        match self {
            ResponsePayload::Messages(entries) => entries
                .iter()
                .map(|entry| {
                    Message::new(
                        Sender::from_label(&entry.sender),
                        extract_message_content(&entry.content),
                    )
                })
                .collect(),
            ResponsePayload::Reply(body) => vec![Message::bot(reply_text(body))],
            ResponsePayload::Sequence(items) => {
                vec![Message::bot(extract_message_content(&Value::Array(
                    items.clone(),
                )))]
            }
            ResponsePayload::Text(text) => vec![Message::bot(text.clone())],
            ResponsePayload::Empty => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ResponsePayload::Empty)
    }
}

// The object rules apply to the body first; a `response` that is itself a
// string or pair is then normalized on its own.
fn reply_text(body: &Value) -> String {
    let text = extract_message_content(body);
    if !text.is_empty() {
        return text;
    }
    body.get("response")
        .map(extract_message_content)
        .unwrap_or_default()
}

fn backend_message(entry: &Value) -> BackendMessage {
    let sender = entry
        .get("sender")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let content = entry.get("content").cloned().unwrap_or(Value::Null);
    BackendMessage { sender, content }
}
