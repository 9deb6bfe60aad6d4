//! The text input line and its submit bindings.

use crate::observability::INPUT_REJECTED;

/// Keys the input controller reacts to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Key {
    Enter,
    Backspace,
    Char(char),
}

/// A key press with its modifier state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl KeyPress {
    /// A key pressed without modifiers.
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            shift: false,
            ctrl: false,
            alt: false,
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn has_modifier(&self) -> bool {
        self.shift || self.ctrl || self.alt
    }
}

/// Events delivered to the input controller.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A key press inside the text field.
    Key(KeyPress),

    /// The submit control was activated.
    SubmitClicked,
}

/// What handling an event produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventResult {
    /// The key's default action (newline insertion) must be suppressed.
    pub prevent_default: bool,

    /// Text to send, when the event submitted the field.
    pub submitted: Option<String>,
}

/// The text field plus its disabled flag.
#[derive(Debug, Clone, Default)]
pub struct InputController {
    text: String,
    disabled: bool,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents of the field.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn enable(&mut self) {
        self.disabled = false;
    }

    pub fn disable(&mut self) {
        self.disabled = true;
    }

    /// Handle a key press or click.
    ///
    /// Enter without modifiers and a click submit; Enter with a modifier
    /// inserts a newline.  Key presses are ignored while disabled.
    pub fn handle(&mut self, event: InputEvent) -> EventResult {
        match event {
            InputEvent::SubmitClicked => EventResult {
                prevent_default: false,
                submitted: self.submit(),
            },
            InputEvent::Key(_) if self.disabled => EventResult::default(),
            InputEvent::Key(press) => match press.key {
                Key::Enter if !press.has_modifier() => EventResult {
                    prevent_default: true,
                    submitted: self.submit(),
                },
                Key::Enter => {
                    self.text.push('\n');
                    EventResult::default()
                }
                Key::Backspace => {
                    self.text.pop();
                    EventResult::default()
                }
                Key::Char(c) => {
                    self.text.push(c);
                    EventResult::default()
                }
            },
        }
    }

    /// Take the field's text for sending, clearing the field.
    ///
    /// Returns `None` and leaves the field untouched when it is disabled or
    /// holds only whitespace.
    pub fn submit(&mut self) -> Option<String> {
        if self.disabled {
            tracing::debug!("input disabled; ignoring submit");
            INPUT_REJECTED.click();
            return None;
        }
        if self.text.trim().is_empty() {
            INPUT_REJECTED.click();
            return None;
        }
        Some(std::mem::take(&mut self.text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> InputController {
        let mut input = InputController::new();
        for c in text.chars() {
            input.handle(InputEvent::Key(KeyPress::plain(Key::Char(c))));
        }
        input
    }

    #[test]
    fn enter_submits_and_clears() {
        let mut input = typed("cheap italian");
        let result = input.handle(InputEvent::Key(KeyPress::plain(Key::Enter)));
        assert!(result.prevent_default);
        assert_eq!(result.submitted.as_deref(), Some("cheap italian"));
        assert_eq!(input.text(), "");
    }

    #[test]
    fn click_submits() {
        let mut input = typed("north");
        let result = input.handle(InputEvent::SubmitClicked);
        assert_eq!(result.submitted.as_deref(), Some("north"));
        assert_eq!(input.text(), "");
    }

    #[test]
    fn shift_enter_inserts_newline() {
        let mut input = typed("a");
        let result = input.handle(InputEvent::Key(KeyPress::plain(Key::Enter).with_shift()));
        assert_eq!(result, EventResult::default());
        assert_eq!(input.text(), "a\n");
    }

    #[test]
    fn whitespace_is_rejected() {
        let mut input = typed("   \t ");
        let result = input.handle(InputEvent::Key(KeyPress::plain(Key::Enter)));
        assert!(result.prevent_default);
        assert!(result.submitted.is_none());
        assert_eq!(input.text(), "   \t ");
        assert!(InputController::new().submit().is_none());
    }

    #[test]
    fn disabled_ignores_everything() {
        let mut input = typed("hello");
        input.disable();
        input.handle(InputEvent::Key(KeyPress::plain(Key::Char('!'))));
        assert_eq!(input.text(), "hello");
        assert!(input.handle(InputEvent::SubmitClicked).submitted.is_none());
        input.enable();
        assert_eq!(input.submit().as_deref(), Some("hello"));
    }

    #[test]
    fn backspace_removes_last_char() {
        let mut input = typed("hey");
        input.handle(InputEvent::Key(KeyPress::plain(Key::Backspace)));
        assert_eq!(input.text(), "he");
    }
}
