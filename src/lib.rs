// Public modules
pub mod chat;
pub mod client;
pub mod error;
pub mod input;
pub mod normalize;
pub mod observability;
pub mod render;
pub mod session;
pub mod types;
pub mod view;
pub mod widget;

// Re-exports
pub use client::{Backend, ChatClient};
pub use error::{Error, Result};
pub use input::{EventResult, InputController, InputEvent, Key, KeyPress};
pub use normalize::extract_message_content;
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, RenderedMessage, Renderer};
pub use session::{FileStore, Incarnation, MemoryStore, Session, SessionState, SessionStore};
pub use types::*;
pub use view::MessageView;
pub use widget::{ChatWidget, Outcome, Request, dispatch};
