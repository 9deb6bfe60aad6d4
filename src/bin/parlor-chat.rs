//! Interactive terminal client for a conversational chat service.
//!
//! # Usage
//!
//! ```bash
//! # Talk to a local development server
//! parlor-chat
//!
//! # Talk to a remote service and keep state somewhere specific
//! parlor-chat --base-url https://chat.example.com/ --state-file ./state.json
//!
//! # Disable colors (useful for piping output)
//! parlor-chat --no-color
//! ```
//!
//! Diagnostics go to stderr and are controlled with `RUST_LOG`, e.g.
//! `RUST_LOG=parlor=debug`.
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/reset` - Clear the transcript and start a new conversation
//! - `/start` - Start a conversation if none is active
//! - `/end` - End the current conversation
//! - `/mode <name>` - Preference mode for new conversations
//! - `/status` - Show session status
//! - `/quit` - Exit the application

use std::sync::Arc;
use std::sync::mpsc as std_mpsc;
use std::thread;

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

use parlor::chat::{ChatArgs, ChatCommand, ChatConfig, help_text, parse_command};
use parlor::{
    ChatClient, ChatWidget, FileStore, InputEvent, Key, KeyPress, MessageView, Outcome,
    PlainTextRenderer, Renderer, Request, SessionState, dispatch,
};

type Widget = ChatWidget<FileStore, PlainTextRenderer>;

/// What the line editor thread hands to the event loop.
enum LineEvent {
    Line(String),
    Eof,
    Failed(String),
}

/// Main entry point for the parlor-chat application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let (args, _) = ChatArgs::from_command_line_relaxed("parlor-chat [OPTIONS]");
    let config = ChatConfig::from(args);

    let client = Arc::new(ChatClient::with_options(
        Some(config.base_url.clone()),
        Some(config.timeout),
    )?);
    let state = SessionState::load(FileStore::new(&config.state_path));
    let view = MessageView::new(PlainTextRenderer::with_color(config.use_color));
    let mut widget =
        ChatWidget::new(state, view).with_preference_mode(config.preference_mode.clone());

    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<Outcome>();
    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<LineEvent>();
    let (prompt_tx, prompt_rx) = std_mpsc::channel::<()>();
    spawn_line_reader(line_tx, prompt_rx);

    println!("Parlor chat ({})", client.base_url());
    println!("Type /help for commands, /quit to exit\n");

    if let Some(request) = widget.boot() {
        spawn_request(&client, request, &outcome_tx);
    }
    let _ = prompt_tx.send(());

    loop {
        tokio::select! {
            Some(outcome) = outcome_rx.recv() => {
                if let Some(next) = widget.apply(outcome) {
                    spawn_request(&client, next, &outcome_tx);
                }
            }
            event = line_rx.recv() => {
                match event {
                    Some(LineEvent::Line(line)) => {
                        if let Some(cmd) = parse_command(&line) {
                            match cmd {
                                ChatCommand::Quit => {
                                    println!("Goodbye!");
                                    break;
                                }
                                ChatCommand::Reset => {
                                    let request = widget.reset();
                                    spawn_request(&client, request, &outcome_tx);
                                }
                                ChatCommand::Start => match widget.start() {
                                    Some(request) => spawn_request(&client, request, &outcome_tx),
                                    None => info(&mut widget, "A conversation is already active."),
                                },
                                ChatCommand::End => {
                                    if widget.is_started() {
                                        let request = widget.end();
                                        spawn_request(&client, request, &outcome_tx);
                                    } else {
                                        info(&mut widget, "No conversation to end.");
                                    }
                                }
                                ChatCommand::Mode(mode) => {
                                    let message = match &mode {
                                        Some(mode) => format!("Preference mode set to: {mode}"),
                                        None => "Preference mode cleared.".to_string(),
                                    };
                                    widget.set_preference_mode(mode);
                                    info(&mut widget, &message);
                                }
                                ChatCommand::Status => print_status(&mut widget),
                                ChatCommand::Help => {
                                    for line in help_text().lines() {
                                        info(&mut widget, &format!("    {line}"));
                                    }
                                }
                                ChatCommand::Invalid(message) => {
                                    if let Some(renderer) = widget.view_mut().renderer_mut() {
                                        renderer.print_error(&message);
                                    }
                                }
                            }
                        } else {
                            widget.input_mut().set_text(line);
                            let enter = InputEvent::Key(KeyPress::plain(Key::Enter));
                            match widget.handle_input(enter) {
                                Some(request) => spawn_request(&client, request, &outcome_tx),
                                None if widget.input().is_disabled() => {
                                    info(&mut widget, "No active conversation; use /start.");
                                }
                                None => {}
                            }
                            // Rejected text does not carry over to the next line.
                            widget.input_mut().set_text(String::new());
                        }
                        if prompt_tx.send(()).is_err() {
                            break;
                        }
                    }
                    Some(LineEvent::Eof) | None => {
                        println!("\nGoodbye!");
                        break;
                    }
                    Some(LineEvent::Failed(err)) => {
                        if let Some(renderer) = widget.view_mut().renderer_mut() {
                            renderer.print_error(&format!("Input error: {err}"));
                        }
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Run `request` on its own task and post the outcome back to the loop.
fn spawn_request(
    client: &Arc<ChatClient>,
    request: Request,
    outcomes: &mpsc::UnboundedSender<Outcome>,
) {
    let client = Arc::clone(client);
    let outcomes = outcomes.clone();
    tokio::spawn(async move {
        let outcome = dispatch(client.as_ref(), request).await;
        let _ = outcomes.send(outcome);
    });
}

/// Read lines on a dedicated thread; a new prompt is shown per signal.
fn spawn_line_reader(lines: mpsc::UnboundedSender<LineEvent>, prompts: std_mpsc::Receiver<()>) {
    thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(err) => {
                let _ = lines.send(LineEvent::Failed(err.to_string()));
                return;
            }
        };
        while prompts.recv().is_ok() {
            loop {
                match rl.readline("> ") {
                    Ok(line) => {
                        if !line.trim().is_empty() {
                            let _ = rl.add_history_entry(line.as_str());
                        }
                        if lines.send(LineEvent::Line(line)).is_err() {
                            return;
                        }
                        break;
                    }
                    // Ctrl+C at the prompt is ignored.
                    Err(ReadlineError::Interrupted) => continue,
                    Err(ReadlineError::Eof) => {
                        let _ = lines.send(LineEvent::Eof);
                        return;
                    }
                    Err(err) => {
                        let _ = lines.send(LineEvent::Failed(err.to_string()));
                        return;
                    }
                }
            }
        }
    });
}

fn info(widget: &mut Widget, message: &str) {
    if let Some(renderer) = widget.view_mut().renderer_mut() {
        renderer.print_info(message);
    }
}

fn print_status(widget: &mut Widget) {
    let started = widget.is_started();
    let user_id = widget
        .state()
        .user_id()
        .unwrap_or("(none)")
        .to_string();
    let incarnation = widget.incarnation();
    let messages = widget.view().len();
    let mode = widget.preference_mode().unwrap_or("(none)").to_string();
    let state_file = widget.state().store().path().display().to_string();
    info(widget, "    Session Status:");
    info(widget, &format!("      Started: {}", if started { "yes" } else { "no" }));
    info(widget, &format!("      User id: {user_id}"));
    info(widget, &format!("      Incarnation: {incarnation}"));
    info(widget, &format!("      Messages shown: {messages}"));
    info(widget, &format!("      Preference mode: {mode}"));
    info(widget, &format!("      State file: {state_file}"));
}
