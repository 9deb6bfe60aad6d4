//! Output rendering for the chat transcript.
//!
//! This module provides the renderer trait the message view writes through,
//! and a plain-text implementation with optional ANSI styling.

use std::borrow::Cow;
use std::io::{self, Stdout, Write};

use crate::error::{Error, Result};
use crate::types::Sender;

/// ANSI escape code for bold text (used for sender labels).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for dim text (used for local notices).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the user's messages).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used for bot replies).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for yellow text (used for system notices).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI sequence that clears the screen and homes the cursor.
const ANSI_CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Replacement for characters that would be interpreted by the terminal.
const REPLACEMENT: char = '\u{FFFD}';

/// One message as displayed: a category tag plus sanitized plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// The sender, also used as the lower-case category tag.
    pub sender: Sender,

    /// Text with terminal control characters neutralized.
    pub text: String,
}

impl RenderedMessage {
    /// Build a display unit from raw message text.
    pub fn new(sender: Sender, text: &str) -> Self {
        Self {
            sender,
            text: sanitize_text(text).into_owned(),
        }
    }

    /// The lower-case category tag.
    pub fn tag(&self) -> &'static str {
        self.sender.tag()
    }

    /// Number of display lines this message occupies.
    pub fn line_count(&self) -> usize {
        self.text.lines().count().max(1)
    }
}

/// Neutralize characters that a terminal would interpret.
///
/// Message text is data, never markup: ESC, the other C0 controls apart from
/// newline and tab, DEL, and the C1 controls are replaced with U+FFFD.
///
/// ```
/// # use parlor::render::sanitize_text;
/// assert_eq!(sanitize_text("plain"), "plain");
/// assert_eq!(sanitize_text("\x1b[31mred"), "\u{FFFD}[31mred");
/// ```
pub fn sanitize_text(text: &str) -> Cow<'_, str> {
    if !text.chars().any(is_unsafe) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.chars()
            .map(|c| if is_unsafe(c) { REPLACEMENT } else { c })
            .collect(),
    )
}

fn is_unsafe(c: char) -> bool {
    c != '\n' && c != '\t' && c.is_control()
}

/// Trait for rendering the chat transcript.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
/// - Captured output for tests
pub trait Renderer: Send {
    /// Display one message.  Fails when the output target is gone.
    fn print_message(&mut self, message: &RenderedMessage) -> Result<()>;

    /// Remove everything displayed so far.
    fn clear(&mut self) -> Result<()>;

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// Plain text renderer with optional ANSI styling.
///
/// Writes to stdout by default; any writer can be supplied, which is how the
/// tests capture output.
pub struct PlainTextRenderer<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
}

impl PlainTextRenderer<Stdout> {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            out: io::stdout(),
            use_color,
        }
    }
}

impl Default for PlainTextRenderer<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> PlainTextRenderer<W> {
    /// Creates a renderer writing to `out`.
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self { out, use_color }
    }

    /// Returns the underlying writer.
    pub fn writer(&self) -> &W {
        &self.out
    }

    /// Consumes the renderer, returning the underlying writer.
    pub fn into_writer(self) -> W {
        self.out
    }

    fn label(sender: Sender) -> &'static str {
        match sender {
            Sender::User => "You",
            Sender::Bot => "Bot",
            Sender::System => "System",
        }
    }

    fn color(sender: Sender) -> &'static str {
        match sender {
            Sender::User => ANSI_CYAN,
            Sender::Bot => ANSI_GREEN,
            Sender::System => ANSI_YELLOW,
        }
    }

    fn write_message(&mut self, message: &RenderedMessage) -> io::Result<()> {
        let label = Self::label(message.sender);
        let indent = " ".repeat(label.len() + 2);
        if self.use_color {
            write!(
                self.out,
                "{ANSI_BOLD}{}{label}:{ANSI_RESET} ",
                Self::color(message.sender)
            )?;
        } else {
            write!(self.out, "{label}: ")?;
        }
        if message.sender == Sender::System && self.use_color {
            write!(self.out, "{ANSI_DIM}")?;
        }
        let mut lines = message.text.lines();
        write!(self.out, "{}", lines.next().unwrap_or_default())?;
        for line in lines {
            write!(self.out, "\n{indent}{line}")?;
        }
        if message.sender == Sender::System && self.use_color {
            write!(self.out, "{ANSI_RESET}")?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write + Send> Renderer for PlainTextRenderer<W> {
    fn print_message(&mut self, message: &RenderedMessage) -> Result<()> {
        self.write_message(message).map_err(|err| {
            tracing::debug!(error = %err, "transcript write failed");
            Error::missing_target("transcript")
        })
    }

    fn clear(&mut self) -> Result<()> {
        let written = if self.use_color {
            write!(self.out, "{ANSI_CLEAR_SCREEN}")
        } else {
            writeln!(self.out, "---")
        };
        written
            .and_then(|_| self.out.flush())
            .map_err(|_| Error::missing_target("transcript"))
    }

    fn print_error(&mut self, error: &str) {
        let error = sanitize_text(error);
        let _ = if self.use_color {
            writeln!(self.out, "{ANSI_RED}Error: {error}{ANSI_RESET}")
        } else {
            writeln!(self.out, "Error: {error}")
        };
        let _ = self.out.flush();
    }

    fn print_info(&mut self, info: &str) {
        let _ = writeln!(self.out, "{}", sanitize_text(info));
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captured(renderer: &PlainTextRenderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.writer().clone()).unwrap()
    }

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
    }

    #[test]
    fn plain_message_layout() {
        let mut renderer = PlainTextRenderer::with_writer(Vec::new(), false);
        renderer
            .print_message(&RenderedMessage::new(Sender::Bot, "first\nsecond"))
            .unwrap();
        renderer
            .print_message(&RenderedMessage::new(Sender::User, "cheap"))
            .unwrap();
        assert_eq!(
            captured(&renderer),
            "Bot: first\n     second\nYou: cheap\n"
        );
    }

    #[test]
    fn colored_message_has_styles() {
        let mut renderer = PlainTextRenderer::with_writer(Vec::new(), true);
        renderer
            .print_message(&RenderedMessage::new(Sender::System, "offline"))
            .unwrap();
        let out = captured(&renderer);
        assert!(out.starts_with(ANSI_BOLD));
        assert!(out.contains("System:"));
        assert!(out.contains(ANSI_DIM));
        assert!(out.ends_with(&format!("{ANSI_RESET}\n")));
    }

    #[test]
    fn escape_sequences_are_neutralized() {
        let message = RenderedMessage::new(Sender::Bot, "\x1b]0;pwned\x07title\u{9b}2J");
        assert!(!message.text.contains('\x1b'));
        assert!(!message.text.contains('\x07'));
        assert!(!message.text.contains('\u{9b}'));
        assert!(message.text.contains("title"));
    }

    #[test]
    fn newlines_and_tabs_survive() {
        assert_eq!(sanitize_text("a\tb\nc"), "a\tb\nc");
        assert!(matches!(sanitize_text("clean"), Cow::Borrowed(_)));
        assert_eq!(sanitize_text("a\rb\x7f"), "a\u{FFFD}b\u{FFFD}");
    }

    #[test]
    fn line_count_is_at_least_one() {
        assert_eq!(RenderedMessage::new(Sender::Bot, "").line_count(), 1);
        assert_eq!(RenderedMessage::new(Sender::Bot, "a\nb\nc").line_count(), 3);
    }

    #[test]
    fn clear_without_color_prints_rule() {
        let mut renderer = PlainTextRenderer::with_writer(Vec::new(), false);
        renderer.clear().unwrap();
        assert_eq!(captured(&renderer), "---\n");
    }

    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn closed_output_is_missing_target() {
        let mut renderer = PlainTextRenderer::with_writer(Closed, false);
        let err = renderer
            .print_message(&RenderedMessage::new(Sender::Bot, "hello"))
            .unwrap_err();
        assert!(err.is_missing_target());
    }
}
