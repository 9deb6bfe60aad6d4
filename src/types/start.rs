use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::{ResponsePayload, lenient_bool, lenient_string};

/// Body of a `POST /start` request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StartRequest {
    /// Optional hint for how the service should gather preferences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preference_mode: Option<String>,
}

impl StartRequest {
    /// Create a new `StartRequest`.
    pub fn new(preference_mode: Option<String>) -> Self {
        Self { preference_mode }
    }
}

/// Decoded body of a `/start` response.
///
/// Fields are read leniently: a field of the wrong type is treated as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartResponse {
    /// The `conversationStarted` flag, if the service sent one.
    pub conversation_started: Option<bool>,

    /// Identifier the service assigned to this conversation.
    pub user_id: Option<String>,

    /// The greeting, in whatever shape it arrived.
    pub payload: ResponsePayload,
}

impl StartResponse {
    /// Decode from a JSON body.
    pub fn from_value(body: &Value) -> Self {
        Self {
            conversation_started: body.get("conversationStarted").and_then(lenient_bool),
            user_id: body.get("user_id").and_then(lenient_string),
            payload: ResponsePayload::from_body(body),
        }
    }

    /// Whether the service accepted the start.
    ///
    /// Services that omit the flag are taken at their word on a 2xx answer.
    pub fn started(&self) -> bool {
        self.conversation_started != Some(false)
    }
}

impl<'de> Deserialize<'de> for StartResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let body = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&body))
    }
}
