//! palaver: a streaming terminal chat client library.
//!
//! The crate provides the pieces of an interactive chat client for
//! OpenAI-compatible completion endpoints: a streaming HTTP [`Client`],
//! a [`StreamRenderer`] that turns chunked responses into live terminal
//! output, incremental markdown and line-wrap transforms, and the
//! [`chat`] module with the interactive session loop and single-turn
//! runner used by the `palaver` binary.

// Public modules
pub mod chat;
pub mod client;
pub mod error;
pub mod markdown;
pub mod render;
pub mod types;
pub mod wrap;

// Re-exports
pub use client::Client;
pub use error::{Error, Result};
pub use markdown::MarkdownStyler;
pub use render::{RenderResult, StreamRenderer, StreamTransform};
pub use types::*;
pub use wrap::LineWrapper;
