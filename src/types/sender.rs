use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who produced a message in the transcript.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The person typing into the input line.
    User,

    /// The chat service.
    Bot,

    /// Notices produced locally, such as transport failures.
    System,
}

impl Sender {
    /// The lower-case tag used to style and categorize a rendered message.
    pub fn tag(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
            Sender::System => "system",
        }
    }

    /// Interpret a sender label sent by the chat service.
    ///
    /// Labels are compared case-insensitively.  Anything that is not
    /// recognizably the user or a local notice is attributed to the bot, so a
    /// garbled label never drops a reply.
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or(Sender::Bot)
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Error returned when parsing an unknown sender label.
#[derive(Debug)]
pub struct SenderParseError {
    /// The label that could not be parsed.
    pub invalid_value: String,
}

impl fmt::Display for SenderParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown sender: {}", self.invalid_value)
    }
}

impl std::error::Error for SenderParseError {}

impl FromStr for Sender {
    type Err = SenderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" | "you" | "human" => Ok(Sender::User),
            "bot" | "assistant" | "agent" => Ok(Sender::Bot),
            "system" => Ok(Sender::System),
            _ => Err(SenderParseError {
                invalid_value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_case_insensitive() {
        assert_eq!("You".parse::<Sender>().unwrap(), Sender::User);
        assert_eq!("BOT".parse::<Sender>().unwrap(), Sender::Bot);
        assert_eq!(" system ".parse::<Sender>().unwrap(), Sender::System);
    }

    #[test]
    fn unknown_label_is_bot() {
        assert!("narrator".parse::<Sender>().is_err());
        assert_eq!(Sender::from_label("narrator"), Sender::Bot);
        assert_eq!(Sender::from_label(""), Sender::Bot);
    }

    #[test]
    fn tag_is_lowercase() {
        assert_eq!(Sender::User.tag(), "user");
        assert_eq!(Sender::Bot.to_string(), "bot");
        assert_eq!(Sender::System.to_string(), "system");
    }
}
