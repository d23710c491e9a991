//! Chat application module for interactive and one-shot conversations.
//!
//! This module provides a streaming REPL chat interface built on top of
//! the palaver client library. It supports:
//!
//! - Streaming responses with real-time token display
//! - Styled markdown output with optional column wrapping
//! - Slash commands for session control
//! - A stateless single-turn mode for scripted use
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Conversation state and the interactive loop
//! - [`commands`]: Slash command parsing and handling
//! - [`oneshot`]: The non-interactive single-turn runner

mod commands;
mod config;
mod oneshot;
mod session;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use oneshot::{build_messages, run_single_turn};
pub use session::{ChatSession, run_session};
