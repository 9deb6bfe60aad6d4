use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::{ResponsePayload, lenient_bool};

/// Body of a `POST /chat` request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    /// The text the user typed.
    pub message: String,

    /// The conversation identifier, when the service assigned one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl ChatRequest {
    /// Create a new `ChatRequest`.
    pub fn new(message: impl Into<String>, user_id: Option<String>) -> Self {
        Self {
            message: message.into(),
            user_id,
        }
    }
}

/// Decoded body of a `/chat` response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatResponse {
    /// Whether the service flagged an error.  A string `error` counts as set.
    pub error: bool,

    /// The error text, when `error` was a string.
    pub error_message: Option<String>,

    /// The `conversationStarted` flag, if the service sent one.
    pub conversation_started: Option<bool>,

    /// The reply, in whatever shape it arrived.
    pub payload: ResponsePayload,
}

impl ChatResponse {
    /// Decode from a JSON body.
    pub fn from_value(body: &Value) -> Self {
        let (error, error_message) = match body.get("error") {
            Some(Value::String(message)) => (true, Some(message.clone())),
            Some(value) => (lenient_bool(value).unwrap_or(false), None),
            None => (false, None),
        };
        Self {
            error,
            error_message,
            conversation_started: body.get("conversationStarted").and_then(lenient_bool),
            payload: ResponsePayload::from_body(body),
        }
    }

    /// True when the service says the conversation is gone and must be
    /// started again.
    pub fn is_session_expired(&self) -> bool {
        self.error && self.conversation_started != Some(true)
    }
}

impl<'de> Deserialize<'de> for ChatResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let body = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;
    use serde_json::{json, to_value};

    #[test]
    fn request_body() {
        assert_eq!(
            to_value(ChatRequest::new("cheap thai", Some("u-1".to_string()))).unwrap(),
            json!({"message": "cheap thai", "user_id": "u-1"})
        );
        assert_eq!(
            to_value(ChatRequest::new("hello", None)).unwrap(),
            json!({"message": "hello"})
        );
    }

    #[test]
    fn ordinary_reply() {
        let response = ChatResponse::from_value(&json!({
            "response": "In which area of the city would you like to dine?"
        }));
        assert!(!response.is_session_expired());
        assert_eq!(
            response.payload.messages(),
            vec![Message::bot(
                "In which area of the city would you like to dine?"
            )]
        );
    }

    #[test]
    fn expiry_with_flags() {
        let response =
            ChatResponse::from_value(&json!({"error": true, "conversationStarted": false}));
        assert!(response.is_session_expired());
        assert!(response.payload.messages().is_empty());
    }

    #[test]
    fn expiry_with_error_string() {
        let response = ChatResponse::from_value(&json!({"error": "Conversation not started"}));
        assert!(response.error);
        assert_eq!(
            response.error_message.as_deref(),
            Some("Conversation not started")
        );
        assert!(response.is_session_expired());
    }

    #[test]
    fn error_while_started_is_not_expiry() {
        let response =
            ChatResponse::from_value(&json!({"error": true, "conversationStarted": true}));
        assert!(!response.is_session_expired());
    }

    #[test]
    fn error_false_is_not_expiry() {
        let response =
            ChatResponse::from_value(&json!({"error": false, "conversationStarted": false}));
        assert!(!response.is_session_expired());
    }
}
