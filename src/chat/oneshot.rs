//! Single-turn runner: one prompt, one streamed response, no state.

use crate::chat::config::ChatConfig;
use crate::chat::session::preview;
use crate::client::Client;
use crate::error::Result;
use crate::render::StreamRenderer;
use crate::types::ChatMessage;

/// Builds the one-shot message list: an optional system prompt and one
/// user turn.
pub fn build_messages(system_prompt: Option<&str>, prompt: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system_prompt {
        messages.push(ChatMessage::system(system));
    }
    messages.push(ChatMessage::user(prompt));
    messages
}

/// Issues one completion call and renders its stream.
///
/// An empty reply is accepted as-is; there is no history to protect.
///
/// # Errors
///
/// Returns an error if the API request or the stream fails.
pub async fn run_single_turn(client: &Client, config: &ChatConfig, prompt: &str) -> Result<()> {
    let messages = build_messages(config.system_prompt.as_deref(), prompt);
    tracing::trace!(
        messages = messages.len(),
        preview = %preview(prompt, 100),
        "single-turn request"
    );

    let stream = client.stream_chat(&messages, config.options).await?;

    let result = if config.raw {
        StreamRenderer::raw().consume(stream).await?
    } else {
        StreamRenderer::styled(config.wrap_width)
            .consume(stream)
            .await?
    };
    tracing::debug!(
        chunks = result.chunks,
        bytes = result.text.len(),
        "stream complete"
    );

    println!();
    Ok(())
}
