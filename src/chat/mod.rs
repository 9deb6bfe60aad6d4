//! Terminal front end for the chat widget.
//!
//! This module provides what the `parlor-chat` binary needs on top of the
//! library: argument parsing and resolved configuration, and slash commands
//! for controlling the conversation from the input line.
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`commands`]: Slash command parsing and handling

mod commands;
mod config;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
