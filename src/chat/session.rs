//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns conversation
//! state for the lifetime of an interactive session, and `run_session`,
//! the read-eval loop that drives it.

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::chat::commands::{ChatCommand, help_text, parse_command};
use crate::chat::config::ChatConfig;
use crate::client::Client;
use crate::error::{Error, Result};
use crate::render::{self, RenderResult, StreamRenderer};
use crate::types::{ChatMessage, Role};

/// Maximum characters of message content shown by `/history`.
const HISTORY_PREVIEW_CHARS: usize = 100;

/// Truncates text to `max` characters, marking the cut with an ellipsis.
pub(crate) fn preview(text: &str, max: usize) -> String {
    let mut out: String = text.chars().take(max).collect();
    if text.chars().count() > max {
        out.push_str("...");
    }
    out
}

/// A chat session owning conversation state and the configured client.
///
/// The session maintains message history across turns and streams
/// responses from the completion endpoint. All mutation happens from
/// the single-threaded loop in [`run_session`]; no turn begins until
/// the previous turn's state change has committed.
pub struct ChatSession {
    client: Client,
    config: ChatConfig,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    /// Creates a new chat session, seeding history with the configured
    /// system prompt if one is present.
    pub fn new(mut client: Client, config: ChatConfig) -> Self {
        client.set_model(config.model.clone());
        let mut messages = Vec::new();
        if let Some(prompt) = &config.system_prompt {
            messages.push(ChatMessage::system(prompt.clone()));
        }
        Self {
            client,
            config,
            messages,
        }
    }

    /// Returns the conversation so far, in order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Returns the number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Returns the current model identifier.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Changes the model and reconfigures the client to target it.
    pub fn set_model(&mut self, model: impl Into<String>) {
        let model = model.into();
        self.client.set_model(model.clone());
        self.config.model = model;
    }

    /// Clears the conversation history.
    ///
    /// A leading system message survives the clear; everything else is
    /// discarded.
    pub fn clear(&mut self) {
        let system = match self.messages.first() {
            Some(message) if message.role == Role::System => Some(message.clone()),
            _ => None,
        };
        self.messages.clear();
        self.messages.extend(system);
    }

    /// Releases the client's connection pool.
    pub fn shutdown(self) {
        self.client.shutdown();
    }

    /// Sends a user message and streams the response.
    ///
    /// The user message is appended before the call and stays in history
    /// whether or not the call succeeds. A successful stream that yields
    /// no text appends nothing and prints a warning naming the chunk
    /// count; a non-empty reply is appended as an assistant message.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request or the stream fails.
    pub async fn send_streaming(&mut self, user_input: &str) -> Result<()> {
        self.messages.push(ChatMessage::user(user_input));
        tracing::trace!(
            messages = self.messages.len(),
            preview = %preview(user_input, HISTORY_PREVIEW_CHARS),
            "issuing completion request"
        );

        let stream = self
            .client
            .stream_chat(&self.messages, self.config.options)
            .await?;

        let result = if self.config.raw {
            StreamRenderer::raw().consume(stream).await?
        } else {
            StreamRenderer::styled(self.config.wrap_width)
                .consume(stream)
                .await?
        };
        tracing::debug!(
            chunks = result.chunks,
            bytes = result.text.len(),
            "stream complete"
        );

        self.record_reply(result);
        Ok(())
    }

    /// Commits a completed turn's result to history.
    ///
    /// An empty reply is suppressed so history never carries a phantom
    /// assistant message; the tentative user message stays either way.
    fn record_reply(&mut self, result: RenderResult) {
        if result.text.is_empty() {
            render::print_warning(&format!(
                "model returned an empty reply ({} chunks); nothing recorded",
                result.chunks
            ));
        } else {
            self.messages.push(ChatMessage::assistant(result.text));
            println!();
        }
    }

    /// Applies one parsed command, returning true if the session should exit.
    ///
    /// Commands mutate session state and write to the terminal; they
    /// never perform network I/O.
    pub fn apply_command(&mut self, command: &ChatCommand) -> bool {
        match command {
            ChatCommand::Quit => {
                return true;
            }
            ChatCommand::Clear => {
                self.clear();
                render::print_info("Conversation cleared.");
            }
            ChatCommand::Model(Some(model)) => {
                self.set_model(model.clone());
                render::print_info(&format!("Model changed to: {}", model));
            }
            ChatCommand::Model(None) => {
                render::print_info(&format!("Current model: {}", self.model()));
            }
            ChatCommand::History => {
                for message in &self.messages {
                    println!(
                        "[{}] {}",
                        message.role,
                        preview(&message.content, HISTORY_PREVIEW_CHARS)
                    );
                }
            }
            ChatCommand::Help => {
                for line in help_text().lines() {
                    println!("    {}", line);
                }
            }
            ChatCommand::Invalid(message) => {
                render::print_warning(message);
            }
        }
        false
    }
}

/// Drives the interactive read-eval loop over a session.
///
/// Each line of input is either a slash command or a chat turn. A
/// failed turn is reported and the loop continues; end-of-input exits
/// like `/quit`.
///
/// # Errors
///
/// Returns an error only if the line editor cannot be initialized.
pub async fn run_session(session: &mut ChatSession) -> Result<()> {
    let mut rl = DefaultEditor::new()
        .map_err(|e| Error::configuration(format!("failed to initialize line editor: {e}")))?;

    tracing::info!(model = session.model(), "session start");
    println!("palaver (model: {})", session.model());
    println!("Type /help for commands, /quit to exit\n");

    loop {
        match rl.readline("You: ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if let Some(command) = parse_command(line) {
                    if session.apply_command(&command) {
                        println!("Goodbye!");
                        break;
                    }
                    continue;
                }

                println!("Assistant:");
                if let Err(e) = session.send_streaming(line).await {
                    tracing::error!(error = %e, "turn failed");
                    render::print_error(&e.to_string());
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at the prompt abandons the current line.
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D exits like /quit.
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                render::print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    tracing::info!(messages = session.message_count(), "session end");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_session(config: ChatConfig) -> ChatSession {
        let client = Client::with_options(Some("test-key".to_string()), None, None).unwrap();
        ChatSession::new(client, config)
    }

    #[test]
    fn new_session_empty() {
        let session = test_session(ChatConfig::new());
        assert_eq!(session.message_count(), 0);
    }

    #[test]
    fn new_session_seeds_system_prompt() {
        let session = test_session(ChatConfig::new().with_system_prompt("Be helpful"));
        assert_eq!(session.message_count(), 1);
        assert_eq!(session.messages()[0].role, Role::System);
        assert_eq!(session.messages()[0].content, "Be helpful");
    }

    #[test]
    fn clear_keeps_leading_system_message() {
        let mut session = test_session(ChatConfig::new().with_system_prompt("Be helpful"));
        session.messages.push(ChatMessage::user("one"));
        session.messages.push(ChatMessage::assistant("two"));

        session.clear();
        assert_eq!(session.message_count(), 1);
        assert_eq!(session.messages()[0].role, Role::System);
    }

    #[test]
    fn clear_without_system_empties_history() {
        let mut session = test_session(ChatConfig::new());
        session.messages.push(ChatMessage::user("one"));
        session.messages.push(ChatMessage::assistant("two"));

        session.clear();
        assert_eq!(session.message_count(), 0);
    }

    #[test]
    fn set_model_updates_session_and_client() {
        let mut session = test_session(ChatConfig::new());
        session.set_model("little-teapot");
        assert_eq!(session.model(), "little-teapot");
        assert_eq!(session.client.model(), "little-teapot");
    }

    #[test]
    fn model_command_with_argument_mutates() {
        let mut session = test_session(ChatConfig::new());
        let exit = session.apply_command(&ChatCommand::Model(Some("little-teapot".to_string())));
        assert!(!exit);
        assert_eq!(session.model(), "little-teapot");
    }

    #[test]
    fn model_command_without_argument_is_a_query() {
        let mut session = test_session(ChatConfig::new());
        let before = session.model().to_string();
        let exit = session.apply_command(&ChatCommand::Model(None));
        assert!(!exit);
        assert_eq!(session.model(), before);
    }

    #[test]
    fn quit_command_requests_exit() {
        let mut session = test_session(ChatConfig::new());
        assert!(session.apply_command(&ChatCommand::Quit));
        assert!(!session.apply_command(&ChatCommand::Help));
        assert!(!session.apply_command(&ChatCommand::Invalid("nope".to_string())));
    }

    #[test]
    fn empty_reply_is_not_recorded() {
        let mut session = test_session(ChatConfig::new());
        session.messages.push(ChatMessage::user("anyone there?"));

        session.record_reply(RenderResult {
            text: String::new(),
            chunks: 3,
        });

        // The user turn stays; no phantom assistant message follows it.
        assert_eq!(session.message_count(), 1);
        assert_eq!(session.messages().last().unwrap().role, Role::User);
    }

    #[test]
    fn non_empty_reply_is_appended() {
        let mut session = test_session(ChatConfig::new());
        session.messages.push(ChatMessage::user("hello"));

        session.record_reply(RenderResult {
            text: "hi yourself".to_string(),
            chunks: 2,
        });

        assert_eq!(session.message_count(), 2);
        let last = session.messages().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, "hi yourself");
    }

    #[tokio::test]
    async fn failed_turn_keeps_user_message() {
        // Nothing listens on port 1; the connect fails immediately.
        let client = Client::with_options(
            Some("test-key".to_string()),
            Some("http://127.0.0.1:1/".to_string()),
            None,
        )
        .unwrap();
        let mut session = ChatSession::new(client, ChatConfig::new());

        let err = session.send_streaming("hello?").await.unwrap_err();
        assert!(!err.is_configuration());
        assert_eq!(session.message_count(), 1);
        assert_eq!(session.messages()[0].role, Role::User);
        assert_eq!(session.messages()[0].content, "hello?");
    }

    #[test]
    fn preview_truncates_at_limit() {
        let long = "x".repeat(150);
        let shown = preview(&long, 100);
        assert_eq!(shown.chars().count(), 103);
        assert!(shown.ends_with("..."));

        let exact = "y".repeat(100);
        assert_eq!(preview(&exact, 100), exact);

        assert_eq!(preview("short", 100), "short");
    }
}
