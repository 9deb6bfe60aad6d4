use serde::{Deserialize, Serialize};

/// Body of a `POST /end` request.  The response is an opaque acknowledgement.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndRequest {
    /// The conversation identifier, when the service assigned one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl EndRequest {
    /// Create a new `EndRequest`.
    pub fn new(user_id: Option<String>) -> Self {
        Self { user_id }
    }
}
