//! The scrollable message container.
//!
//! [`MessageView`] keeps the transcript of display units, writes each one
//! through a [`Renderer`], and keeps the scroll position pinned to the newest
//! message.

use crate::error::{Error, Result};
use crate::observability::MESSAGES_RENDERED;
use crate::render::{RenderedMessage, Renderer};
use crate::types::{Message, Sender};

/// The message container.
pub struct MessageView<R: Renderer> {
    renderer: Option<R>,
    rendered: Vec<RenderedMessage>,
    scroll_offset: usize,
}

impl<R: Renderer> MessageView<R> {
    /// Creates a view that writes through `renderer`.
    pub fn new(renderer: R) -> Self {
        Self {
            renderer: Some(renderer),
            rendered: Vec::new(),
            scroll_offset: 0,
        }
    }

    /// Creates a view with no output target.  Every render fails.
    pub fn detached() -> Self {
        Self {
            renderer: None,
            rendered: Vec::new(),
            scroll_offset: 0,
        }
    }

    /// Append one message and scroll it into view.
    ///
    /// On a missing or failing target the failure is logged and nothing is
    /// appended.
    pub fn render(&mut self, sender: Sender, text: &str) -> Result<()> {
        let Some(renderer) = self.renderer.as_mut() else {
            tracing::warn!(tag = sender.tag(), "no message container; dropping message");
            return Err(Error::missing_target("message container"));
        };
        let unit = RenderedMessage::new(sender, text);
        if let Err(err) = renderer.print_message(&unit) {
            tracing::warn!(error = %err, tag = unit.tag(), "could not render message");
            return Err(err);
        }
        self.rendered.push(unit);
        MESSAGES_RENDERED.click();
        self.scroll_to_bottom();
        Ok(())
    }

    /// Render messages in order, skipping those with nothing to show.
    pub fn render_all(&mut self, messages: &[Message]) {
        for message in messages {
            if message.is_blank() {
                tracing::debug!(tag = message.sender.tag(), "skipping blank message");
                continue;
            }
            // Failures are already logged; later messages still get a chance.
            let _ = self.render(message.sender, &message.text);
        }
    }

    /// Remove every rendered message.
    pub fn clear(&mut self) {
        self.rendered.clear();
        self.scroll_offset = 0;
        match self.renderer.as_mut() {
            Some(renderer) => {
                if let Err(err) = renderer.clear() {
                    tracing::warn!(error = %err, "could not clear message container");
                }
            }
            None => tracing::warn!("no message container to clear"),
        }
    }

    /// Displayed messages, oldest first.
    pub fn messages(&self) -> &[RenderedMessage] {
        &self.rendered
    }

    pub fn len(&self) -> usize {
        self.rendered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty()
    }

    /// Total height of the transcript in lines.
    pub fn scroll_extent(&self) -> usize {
        self.rendered.iter().map(RenderedMessage::line_count).sum()
    }

    /// Current scroll position in lines from the top.
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.scroll_extent();
    }

    pub fn renderer(&self) -> Option<&R> {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> Option<&mut R> {
        self.renderer.as_mut()
    }
}
