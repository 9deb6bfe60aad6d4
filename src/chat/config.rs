//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::client::{BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

/// File name of the state file inside the state directory.
const STATE_FILE: &str = "state.json";

/// Command-line arguments for the parlor-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Base URL of the chat service.
    #[arrrg(optional, "Chat service URL (default: $PARLOR_BASE_URL or http://127.0.0.1:5000/)", "URL")]
    pub base_url: Option<String>,

    /// Where the session state is kept between runs.
    #[arrrg(optional, "Session state file (default: ~/.parlor/state.json)", "PATH")]
    pub state_file: Option<String>,

    /// Preference mode sent when starting a conversation.
    #[arrrg(optional, "Preference mode sent with each start request", "MODE")]
    pub preference_mode: Option<String>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: 30)", "SECONDS")]
    pub timeout: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// Base URL the `/start`, `/chat` and `/end` endpoints are joined onto.
    pub base_url: String,

    /// Path of the session state file.
    pub state_path: PathBuf,

    /// Preference mode sent with start requests.
    pub preference_mode: Option<String>,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Base URL: `$PARLOR_BASE_URL`, else the local development server
    /// - State file: `~/.parlor/state.json`, else `./.parlor-state.json`
    /// - Timeout: 30 seconds
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            base_url: default_base_url(),
            state_path: default_state_path(),
            preference_mode: None,
            timeout: DEFAULT_TIMEOUT,
            use_color: true,
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the state file path.
    pub fn with_state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = path.into();
        self
    }

    /// Sets the preference mode.
    pub fn with_preference_mode(mut self, mode: Option<String>) -> Self {
        self.preference_mode = mode;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let defaults = ChatConfig::new();
        ChatConfig {
            base_url: args.base_url.unwrap_or(defaults.base_url),
            state_path: args
                .state_file
                .map(PathBuf::from)
                .unwrap_or(defaults.state_path),
            preference_mode: args.preference_mode,
            timeout: args
                .timeout
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
            use_color: !args.no_color,
        }
    }
}

fn default_base_url() -> String {
    env::var(BASE_URL_ENV)
        .ok()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

fn default_state_path() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(".parlor").join(STATE_FILE),
        None => PathBuf::from(".parlor-state.json"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.use_color);
        assert!(config.preference_mode.is_none());
        assert!(config.state_path.ends_with(STATE_FILE) || config.state_path.ends_with(".parlor-state.json"));
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::from(ChatArgs::default());
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.use_color);
        assert_eq!(config.state_path, default_state_path());
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            base_url: Some("http://chat.internal:8000/".to_string()),
            state_file: Some("/tmp/parlor.json".to_string()),
            preference_mode: Some("guided".to_string()),
            timeout: Some(5),
            no_color: true,
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.base_url, "http://chat.internal:8000/");
        assert_eq!(config.state_path, PathBuf::from("/tmp/parlor.json"));
        assert_eq!(config.preference_mode.as_deref(), Some("guided"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(!config.use_color);
    }

    #[test]
    fn zero_timeout_uses_default() {
        let args = ChatArgs {
            timeout: Some(0),
            ..ChatArgs::default()
        };
        assert_eq!(ChatConfig::from(args).timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_base_url("https://example.com/bot")
            .with_state_path("state.json")
            .with_preference_mode(Some("free".to_string()))
            .with_timeout(Duration::from_secs(12))
            .without_color();
        assert_eq!(config.base_url, "https://example.com/bot");
        assert_eq!(config.state_path, PathBuf::from("state.json"));
        assert_eq!(config.preference_mode.as_deref(), Some("free"));
        assert_eq!(config.timeout, Duration::from_secs(12));
        assert!(!config.use_color);
    }
}
