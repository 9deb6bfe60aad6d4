use serde::{Deserialize, Serialize};

use crate::types::Sender;

/// One entry in the conversation transcript.
///
/// Messages are never persisted; they live in the view and in transient
/// response payloads only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Who produced the message.
    pub sender: Sender,

    /// Plain text of the message.  Never interpreted as markup.
    pub text: String,
}

impl Message {
    /// Create a new `Message`.
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
        }
    }

    /// Create a message typed by the user.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    /// Create a message produced by the chat service.
    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }

    /// Create a local notice.
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Sender::System, text)
    }

    /// True when there is nothing worth displaying.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
