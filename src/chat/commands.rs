//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the conversation without sending messages to
//! the chat service.

/// A parsed chat command.
///
/// These commands control the session and are not sent to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Clear the transcript and start a fresh conversation.
    Reset,

    /// Start a conversation when none is active.
    Start,

    /// End the current conversation.
    End,

    /// Set the preference mode for future starts.
    /// `None` stops sending one.
    Mode(Option<String>),

    /// Display the session status.
    Status,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it
/// should be sent as a regular message.
///
/// # Examples
///
/// ```
/// # use parlor::chat::{ChatCommand, parse_command};
/// assert_eq!(parse_command("/reset"), Some(ChatCommand::Reset));
/// assert!(parse_command("cheap food in the north").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let mut parts = rest.splitn(2, ' ');
    let command = parts.next().unwrap_or_default().to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "reset" | "restart" => ChatCommand::Reset,
        "start" => ChatCommand::Start,
        "end" => ChatCommand::End,
        "mode" => match argument {
            Some(arg) if arg.eq_ignore_ascii_case("clear") => ChatCommand::Mode(None),
            Some(arg) => ChatCommand::Mode(Some(arg.to_string())),
            None => ChatCommand::Invalid("/mode requires a mode name or 'clear'".to_string()),
        },
        "status" | "stats" => ChatCommand::Status,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /reset                 Clear the transcript and start a new conversation
  /start                 Start a conversation if none is active
  /end                   End the current conversation
  /mode <name>           Preference mode for new conversations (or 'clear')
  /status                Show session status
  /help                  Show this help message
  /quit                  Exit the chat"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_session_commands() {
        assert_eq!(parse_command("/reset"), Some(ChatCommand::Reset));
        assert_eq!(parse_command("/RESTART"), Some(ChatCommand::Reset));
        assert_eq!(parse_command("/start"), Some(ChatCommand::Start));
        assert_eq!(parse_command("  /end  "), Some(ChatCommand::End));
    }

    #[test]
    fn parse_mode() {
        assert_eq!(
            parse_command("/mode guided"),
            Some(ChatCommand::Mode(Some("guided".to_string())))
        );
        assert_eq!(parse_command("/mode clear"), Some(ChatCommand::Mode(None)));
        assert!(matches!(
            parse_command("/mode"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn parse_misc() {
        assert_eq!(parse_command("/status"), Some(ChatCommand::Status));
        assert_eq!(parse_command("/help"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/?"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
    }

    #[test]
    fn unknown_command() {
        assert_eq!(
            parse_command("/frobnicate now"),
            Some(ChatCommand::Invalid("Unknown command: /frobnicate".to_string()))
        );
        assert_eq!(
            parse_command("/"),
            Some(ChatCommand::Invalid("Unknown command: /".to_string()))
        );
    }

    #[test]
    fn non_commands() {
        assert_eq!(parse_command("I want cheap food"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
    }

    #[test]
    fn help_text_not_empty() {
        let help = help_text();
        assert!(help.contains("/quit"));
        assert!(help.contains("/reset"));
        assert!(help.contains("/end"));
    }
}
