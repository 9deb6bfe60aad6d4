//! Conversation orchestration.
//!
//! [`ChatWidget`] ties the session, the message view and the input line
//! together.  It never performs I/O on the network itself: user actions
//! produce [`Request`]s tagged with the session [`Incarnation`], a caller runs
//! them with [`dispatch`] (possibly concurrently), and feeds the resulting
//! [`Outcome`]s back through [`ChatWidget::apply`].  Outcomes from an older
//! incarnation are discarded, so a reset while a request is in flight can
//! never leak a stale reply into the fresh conversation.
//!
//! Session lifecycle:
//!
//! - not started, then started when a start succeeds;
//! - started, then not started when the service reports the conversation
//!   expired, followed immediately by exactly one new start request (the
//!   message that triggered the expiry is not resent);
//! - started, then not started when an end is requested; replies to
//!   anything issued before the end are discarded.

use crate::client::Backend;
use crate::error::{Error, Result};
use crate::input::{InputController, InputEvent};
use crate::observability::{SESSION_ENDS, SESSION_RESTARTS, SESSION_STARTS, STALE_OUTCOMES};
use crate::render::Renderer;
use crate::session::{Incarnation, SessionState, SessionStore};
use crate::types::{
    ChatRequest, ChatResponse, EndRequest, Sender, StartRequest, StartResponse,
};
use crate::view::MessageView;

/// Notice shown when the service cannot be reached.
const TRANSPORT_NOTICE: &str = "Could not reach the chat service";

/// A round trip the widget wants performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Start {
        incarnation: Incarnation,
        body: StartRequest,
    },
    Chat {
        incarnation: Incarnation,
        body: ChatRequest,
    },
    End {
        incarnation: Incarnation,
        body: EndRequest,
    },
}

impl Request {
    pub fn incarnation(&self) -> Incarnation {
        match self {
            Request::Start { incarnation, .. }
            | Request::Chat { incarnation, .. }
            | Request::End { incarnation, .. } => *incarnation,
        }
    }

    /// Endpoint name, for logs.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Request::Start { .. } => "start",
            Request::Chat { .. } => "chat",
            Request::End { .. } => "end",
        }
    }
}

/// The result of a [`Request`], carrying the request's incarnation.
#[derive(Debug, Clone)]
pub enum Outcome {
    Start {
        incarnation: Incarnation,
        result: Result<StartResponse>,
    },
    Chat {
        incarnation: Incarnation,
        result: Result<ChatResponse>,
    },
    End {
        incarnation: Incarnation,
        result: Result<()>,
    },
}

impl Outcome {
    pub fn incarnation(&self) -> Incarnation {
        match self {
            Outcome::Start { incarnation, .. }
            | Outcome::Chat { incarnation, .. }
            | Outcome::End { incarnation, .. } => *incarnation,
        }
    }
}

/// Perform one request against `backend`.
pub async fn dispatch<B: Backend + ?Sized>(backend: &B, request: Request) -> Outcome {
    tracing::debug!(
        endpoint = request.endpoint(),
        incarnation = request.incarnation().value(),
        "dispatching request"
    );
    match request {
        Request::Start { incarnation, body } => Outcome::Start {
            incarnation,
            result: backend.start(&body).await,
        },
        Request::Chat { incarnation, body } => Outcome::Chat {
            incarnation,
            result: backend.chat(&body).await,
        },
        Request::End { incarnation, body } => Outcome::End {
            incarnation,
            result: backend.end(&body).await,
        },
    }
}

/// The chat widget: session, view and input behind one event-driven API.
pub struct ChatWidget<S: SessionStore, R: Renderer> {
    state: SessionState<S>,
    view: MessageView<R>,
    input: InputController,
    preference_mode: Option<String>,
}

impl<S: SessionStore, R: Renderer> ChatWidget<S, R> {
    /// Creates a widget over restored session state.
    ///
    /// The input starts disabled until [`ChatWidget::boot`] finds or
    /// establishes an active session.
    pub fn new(state: SessionState<S>, view: MessageView<R>) -> Self {
        let mut input = InputController::new();
        input.disable();
        Self {
            state,
            view,
            input,
            preference_mode: None,
        }
    }

    /// Sets the preference mode sent with every start request.
    pub fn with_preference_mode(mut self, preference_mode: Option<String>) -> Self {
        self.preference_mode = preference_mode;
        self
    }

    pub fn set_preference_mode(&mut self, preference_mode: Option<String>) {
        self.preference_mode = preference_mode;
    }

    pub fn preference_mode(&self) -> Option<&str> {
        self.preference_mode.as_deref()
    }

    pub fn state(&self) -> &SessionState<S> {
        &self.state
    }

    pub fn view(&self) -> &MessageView<R> {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut MessageView<R> {
        &mut self.view
    }

    pub fn input(&self) -> &InputController {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputController {
        &mut self.input
    }

    pub fn is_started(&self) -> bool {
        self.state.is_started()
    }

    pub fn incarnation(&self) -> Incarnation {
        self.state.incarnation()
    }

    /// Page-load step: resume a restored session or ask for a new one.
    pub fn boot(&mut self) -> Option<Request> {
        if self.state.is_started() {
            tracing::info!(user_id = ?self.state.user_id(), "resuming conversation");
            self.input.enable();
            None
        } else {
            Some(self.start_request())
        }
    }

    /// Ask for a new conversation unless one is already active.
    pub fn start(&mut self) -> Option<Request> {
        if self.state.is_started() {
            tracing::debug!("conversation already started");
            return None;
        }
        Some(self.start_request())
    }

    /// Route an input event; a submit becomes a chat request.
    pub fn handle_input(&mut self, event: InputEvent) -> Option<Request> {
        let text = self.input.handle(event).submitted?;
        Some(self.chat_request(text))
    }

    /// Submit whatever is in the input field.
    ///
    /// Blank input, or input while no session is active, issues nothing.
    pub fn submit(&mut self) -> Option<Request> {
        let text = self.input.submit()?;
        Some(self.chat_request(text))
    }

    /// Clear the transcript and session, then start over.
    pub fn reset(&mut self) -> Request {
        tracing::info!("resetting conversation");
        self.view.clear();
        self.input.disable();
        if let Err(err) = self.state.reset() {
            tracing::warn!(error = %err, "could not persist session reset");
        }
        self.start_request()
    }

    /// Ask the service to end the conversation.
    ///
    /// Input is disabled right away and the incarnation advances, so chat
    /// or start replies still in flight are discarded.  The session is
    /// cleared when the end completes.
    pub fn end(&mut self) -> Request {
        self.input.disable();
        let incarnation = self.state.advance();
        Request::End {
            incarnation,
            body: EndRequest::new(self.state.user_id().map(String::from)),
        }
    }

    /// Apply the result of a request.  Returns the follow-up request, if any.
    pub fn apply(&mut self, outcome: Outcome) -> Option<Request> {
        let current = self.state.incarnation();
        if outcome.incarnation() < current {
            STALE_OUTCOMES.click();
            tracing::warn!(
                outcome = outcome.incarnation().value(),
                current = current.value(),
                "discarding response from a superseded session"
            );
            return None;
        }
        match outcome {
            Outcome::Start { result, .. } => {
                self.apply_start(result);
                None
            }
            Outcome::Chat { result, .. } => self.apply_chat(result),
            Outcome::End { result, .. } => {
                self.apply_end(result);
                None
            }
        }
    }

    /// Run `request` and every follow-up it triggers, one after another.
    pub async fn drive<B: Backend + ?Sized>(&mut self, backend: &B, request: Request) {
        let mut next = Some(request);
        while let Some(request) = next.take() {
            let outcome = dispatch(backend, request).await;
            next = self.apply(outcome);
        }
    }

    fn start_request(&mut self) -> Request {
        // A fresh start supersedes any start still in flight.
        let incarnation = self.state.advance();
        Request::Start {
            incarnation,
            body: StartRequest::new(self.preference_mode.clone()),
        }
    }

    fn chat_request(&mut self, text: String) -> Request {
        // Shown immediately, before the service answers.
        let _ = self.view.render(Sender::User, &text);
        Request::Chat {
            incarnation: self.state.incarnation(),
            body: ChatRequest::new(text, self.state.user_id().map(String::from)),
        }
    }

    fn apply_start(&mut self, result: Result<StartResponse>) {
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                self.transport_failure("start", &err);
                return;
            }
        };
        if !response.started() {
            tracing::warn!("chat service declined to start a conversation");
            self.view.render_all(&response.payload.messages());
            return;
        }
        SESSION_STARTS.click();
        if let Err(err) = self.state.mark_started(response.user_id.clone()) {
            tracing::warn!(error = %err, "could not persist started session");
        }
        tracing::info!(user_id = ?response.user_id, "conversation started");
        self.input.enable();
        self.view.render_all(&response.payload.messages());
    }

    fn apply_chat(&mut self, result: Result<ChatResponse>) -> Option<Request> {
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                self.transport_failure("chat", &err);
                return None;
            }
        };
        if response.is_session_expired() {
            SESSION_RESTARTS.click();
            let reason = response
                .error_message
                .clone()
                .unwrap_or_else(|| "conversation not started".to_string());
            tracing::info!(%reason, "conversation expired; starting a new one");
            let _ = self.view.render(
                Sender::System,
                "The conversation expired; starting a new one. Your last message was not sent.",
            );
            self.input.disable();
            if let Err(err) = self.state.reset() {
                tracing::warn!(error = %err, "could not persist expired session");
            }
            return Some(self.start_request());
        }
        let messages = response.payload.messages();
        if response.error && messages.iter().all(|m| m.is_blank()) {
            let notice = response
                .error_message
                .as_deref()
                .unwrap_or("The chat service reported an error.");
            tracing::warn!(%notice, "chat service reported an error");
            let _ = self.view.render(Sender::System, notice);
            return None;
        }
        self.view.render_all(&messages);
        None
    }

    fn apply_end(&mut self, result: Result<()>) {
        if let Err(err) = result {
            tracing::warn!(error = %err, "end request failed; clearing session anyway");
        }
        SESSION_ENDS.click();
        if let Err(err) = self.state.reset() {
            tracing::warn!(error = %err, "could not persist ended session");
        }
        self.input.disable();
        tracing::info!("conversation ended");
        let _ = self.view.render(Sender::System, "Conversation ended.");
    }

    fn transport_failure(&mut self, endpoint: &str, err: &Error) {
        tracing::warn!(endpoint, error = %err, "request failed");
        let _ = self
            .view
            .render(Sender::System, &format!("{TRANSPORT_NOTICE}: {err}"));
    }
}
