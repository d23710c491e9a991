//! Configuration for the chat client.
//!
//! CLI argument parsing via `arrrg` plus the resolved configuration
//! value shared by the session loop and the single-turn runner.

use arrrg_derive::CommandLine;

use crate::types::ChatOptions;

/// Default model identifier when none is selected.
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Command-line arguments for the palaver binary.
#[derive(CommandLine, Debug, Default, Eq, PartialEq)]
pub struct ChatArgs {
    /// Model to use.
    #[arrrg(optional, "Model to use (default: gpt-4o-mini)", "MODEL")]
    pub model: Option<String>,

    /// System prompt to set context for the conversation.
    #[arrrg(optional, "System prompt for the conversation", "PROMPT")]
    pub system: Option<String>,

    /// Maximum tokens per response.
    #[arrrg(optional, "Max tokens per response", "TOKENS")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature, parsed during config resolution.
    #[arrrg(optional, "Sampling temperature", "TEMP")]
    pub temperature: Option<String>,

    /// Emit raw text instead of styled markdown.
    #[arrrg(flag, "Emit raw text instead of styled markdown")]
    pub raw: bool,

    /// Wrap output to a column width.
    #[arrrg(optional, "Wrap output at this many columns", "COLUMNS")]
    pub wrap: Option<usize>,

    /// Log file path.
    #[arrrg(optional, "Write leveled logs to this file", "PATH")]
    pub log_file: Option<String>,

    /// Log level filter.
    #[arrrg(optional, "Log level filter (default: info)", "LEVEL")]
    pub log_level: Option<String>,

    /// Run an interactive session instead of a single turn.
    #[arrrg(flag, "Run an interactive chat session")]
    pub interactive: bool,

    /// List the models the endpoint offers and exit.
    #[arrrg(flag, "List available models and exit")]
    pub list_models: bool,
}

/// Resolved configuration for a chat session or single turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: String,

    /// Optional system prompt to seed the conversation.
    pub system_prompt: Option<String>,

    /// Sampling parameters forwarded on every request.
    pub options: ChatOptions,

    /// Whether to bypass the markdown/wrap pipeline.
    pub raw: bool,

    /// Optional column width for wrapping styled output.
    pub wrap_width: Option<usize>,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_prompt: None,
            options: ChatOptions::default(),
            raw: false,
            wrap_width: None,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets the sampling parameters.
    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    /// Selects raw output.
    pub fn raw_output(mut self) -> Self {
        self.raw = true;
        self
    }

    /// Sets the wrap width.
    pub fn with_wrap_width(mut self, width: Option<usize>) -> Self {
        self.wrap_width = width;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        ChatConfig {
            model: args.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            system_prompt: args.system,
            options: ChatOptions {
                // A value that does not parse as a float is ignored.
                temperature: args.temperature.as_deref().and_then(|t| t.parse().ok()),
                max_tokens: args.max_tokens,
            },
            raw: args.raw,
            wrap_width: args.wrap.filter(|width| *width > 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.system_prompt.is_none());
        assert!(config.options.temperature.is_none());
        assert!(config.options.max_tokens.is_none());
        assert!(!config.raw);
        assert!(config.wrap_width.is_none());
    }

    #[test]
    fn config_from_args_defaults() {
        let args = ChatArgs::default();
        let config = ChatConfig::from(args);
        assert_eq!(config, ChatConfig::new());
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            model: Some("little-teapot".to_string()),
            system: Some("You are helpful.".to_string()),
            max_tokens: Some(512),
            temperature: Some("0.4".to_string()),
            raw: true,
            wrap: Some(72),
            log_file: None,
            log_level: None,
            interactive: true,
            list_models: false,
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.model, "little-teapot");
        assert_eq!(config.system_prompt, Some("You are helpful.".to_string()));
        assert_eq!(config.options.max_tokens, Some(512));
        assert_eq!(config.options.temperature, Some(0.4));
        assert!(config.raw);
        assert_eq!(config.wrap_width, Some(72));
    }

    #[test]
    fn temperature_parses_from_argument_text() {
        let args = ChatArgs {
            temperature: Some("0.4".to_string()),
            ..ChatArgs::default()
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.options.temperature, Some(0.4));
    }

    #[test]
    fn unparseable_temperature_is_ignored() {
        let args = ChatArgs {
            temperature: Some("warm".to_string()),
            ..ChatArgs::default()
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.options.temperature, None);
    }

    #[test]
    fn zero_wrap_width_means_no_wrapping() {
        let args = ChatArgs {
            wrap: Some(0),
            ..ChatArgs::default()
        };
        let config = ChatConfig::from(args);
        assert!(config.wrap_width.is_none());
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_model("short-and-stout")
            .with_system_prompt("Test prompt")
            .with_options(ChatOptions::default().with_temperature(Some(0.6)))
            .raw_output()
            .with_wrap_width(Some(100));

        assert_eq!(config.model, "short-and-stout");
        assert_eq!(config.system_prompt, Some("Test prompt".to_string()));
        assert_eq!(config.options.temperature, Some(0.6));
        assert!(config.raw);
        assert_eq!(config.wrap_width, Some(100));
    }
}
