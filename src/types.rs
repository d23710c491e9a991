//! Wire and value types for the chat completion protocol.
//!
//! These types mirror the OpenAI-compatible `/chat/completions` request
//! and streaming-response shapes, plus the conversation values the rest
//! of the crate passes around.

use serde::{Deserialize, Serialize};

/// Role type for a chat message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System role.
    System,

    /// User role.
    User,

    /// Assistant role.
    Assistant,

    /// Tool role.
    Tool,

    /// Developer role.
    Developer,
}

impl Role {
    /// Returns the lowercase tag used on the wire and in `/history` output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
            Role::Developer => "developer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message.
    pub role: Role,

    /// The text content of the message.
    pub content: String,
}

impl ChatMessage {
    /// Create a new `ChatMessage` with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new system `ChatMessage`.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a new user `ChatMessage`.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant `ChatMessage`.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

impl From<&str> for ChatMessage {
    fn from(content: &str) -> Self {
        Self::user(content)
    }
}

impl From<String> for ChatMessage {
    fn from(content: String) -> Self {
        Self::user(content)
    }
}

/// Optional sampling parameters forwarded on every completion request.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChatOptions {
    /// Optional sampling temperature.
    pub temperature: Option<f32>,

    /// Optional cap on generated tokens.
    pub max_tokens: Option<u32>,
}

impl ChatOptions {
    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the max-tokens cap.
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// The body of a `/chat/completions` request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// The model identifier to complete with.
    pub model: String,

    /// The conversation so far, in order.
    pub messages: Vec<ChatMessage>,

    /// Whether to stream the response.
    pub stream: bool,

    /// Optional sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Optional cap on generated tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Builds a streaming request for the given model and messages.
    pub fn streaming(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: true,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Applies optional sampling parameters.
    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.temperature = options.temperature;
        self.max_tokens = options.max_tokens;
        self
    }
}

/// The incremental delta carried by one streamed choice.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChunkDelta {
    /// The role, present only on the first chunk of a response.
    #[serde(default)]
    pub role: Option<Role>,

    /// The text fragment, if this chunk carries one.
    #[serde(default)]
    pub content: Option<String>,
}

/// One streamed choice within a chunk.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChunkChoice {
    /// The incremental delta for this choice.
    #[serde(default)]
    pub delta: ChunkDelta,

    /// Why generation stopped, present on the final content chunk.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// One unit of a streamed completion response.
///
/// A chunk with no text fragment is valid (metadata-only chunks occur
/// at stream start and end) and must not be treated as termination.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StreamChunk {
    /// The choices in this chunk; we only ever request one.
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

impl StreamChunk {
    /// Builds a chunk carrying a single text fragment.
    pub fn of_text(text: impl Into<String>) -> Self {
        Self {
            choices: vec![ChunkChoice {
                delta: ChunkDelta {
                    role: None,
                    content: Some(text.into()),
                },
                finish_reason: None,
            }],
        }
    }

    /// Returns the text fragment carried by this chunk, if any.
    ///
    /// Empty fragments are reported as absent.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
            .filter(|text| !text.is_empty())
    }
}

/// One entry in the models listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelInfo {
    /// The model identifier.
    pub id: String,
}

/// The response body of the `/models` listing call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelList {
    /// The available models.
    #[serde(default)]
    pub data: Vec<ModelInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_lowercase() {
        for (role, tag) in [
            (Role::System, "\"system\""),
            (Role::User, "\"user\""),
            (Role::Assistant, "\"assistant\""),
            (Role::Tool, "\"tool\""),
            (Role::Developer, "\"developer\""),
        ] {
            assert_eq!(serde_json::to_string(&role).unwrap(), tag);
            assert_eq!(serde_json::from_str::<Role>(tag).unwrap(), role);
        }
    }

    #[test]
    fn chunk_text_present() {
        let chunk: StreamChunk = serde_json::from_str(
            r#"{"choices":[{"delta":{"content":"Hel"},"finish_reason":null}]}"#,
        )
        .unwrap();
        assert_eq!(chunk.text(), Some("Hel"));
    }

    #[test]
    fn chunk_without_fragment() {
        // Role-only first chunk and finish-reason last chunk both carry no text.
        let first: StreamChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#).unwrap();
        assert_eq!(first.text(), None);

        let last: StreamChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#).unwrap();
        assert_eq!(last.text(), None);
    }

    #[test]
    fn chunk_empty_fragment_is_absent() {
        let chunk: StreamChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"content":""}}]}"#).unwrap();
        assert_eq!(chunk.text(), None);
    }

    #[test]
    fn request_skips_unset_options() {
        let request = ChatRequest::streaming("little-teapot", vec![ChatMessage::user("hi")]);
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("temperature"));
        assert!(!json.contains("max_tokens"));

        let request = request.with_options(
            ChatOptions::default()
                .with_temperature(Some(0.7))
                .with_max_tokens(Some(256)),
        );
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"temperature\":0.7"));
        assert!(json.contains("\"max_tokens\":256"));
    }

    #[test]
    fn message_constructors() {
        assert_eq!(ChatMessage::system("s").role, Role::System);
        assert_eq!(ChatMessage::user("u").role, Role::User);
        assert_eq!(ChatMessage::assistant("a").role, Role::Assistant);
        assert_eq!(ChatMessage::from("hello").role, Role::User);
    }
}
