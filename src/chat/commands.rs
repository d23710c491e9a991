//! Slash command parsing for the chat session.
//!
//! Commands control the session and are never sent to the API. Dispatch
//! is on the first whitespace-delimited token, case-sensitive.

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Clear the conversation history, keeping a leading system message.
    Clear,

    /// Show the conversation history with truncated previews.
    History,

    /// Change the model, or with `None`, report the current one.
    Model(Option<String>),

    /// Display help information.
    Help,

    /// Exit the chat session.
    Quit,

    /// Report an unrecognized command back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command,
/// or `None` if it should be treated as a regular chat turn.
///
/// # Examples
///
/// ```
/// # use palaver::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/model little-teapot").is_some());
/// assert!(parse_command("Hello there!").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input.splitn(2, ' ');
    let command = parts.next()?;
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command {
        "/clear" => ChatCommand::Clear,
        "/history" => ChatCommand::History,
        "/model" => ChatCommand::Model(argument.map(|s| s.to_string())),
        "/help" | "/?" => ChatCommand::Help,
        "/quit" | "/exit" | "/q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: {}", command)),
    };

    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /clear                 Clear conversation history
  /model <name>          Change the model (no argument shows the current one)
  /history               Show the conversation so far
  /help, /?              Show this help message
  /quit, /exit, /q       Exit the chat"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quit_commands() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  /quit  "), Some(ChatCommand::Quit));
    }

    #[test]
    fn parse_clear_and_history() {
        assert_eq!(parse_command("/clear"), Some(ChatCommand::Clear));
        assert_eq!(parse_command("/history"), Some(ChatCommand::History));
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert!(matches!(
            parse_command("/CLEAR"),
            Some(ChatCommand::Invalid(_))
        ));
        assert!(matches!(
            parse_command("/Quit"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn parse_model() {
        assert_eq!(
            parse_command("/model little-teapot"),
            Some(ChatCommand::Model(Some("little-teapot".to_string())))
        );
        assert_eq!(
            parse_command("/model   short-and-stout  "),
            Some(ChatCommand::Model(Some("short-and-stout".to_string())))
        );
        // Bare /model is a query, not a mutation.
        assert_eq!(parse_command("/model"), Some(ChatCommand::Model(None)));
        assert_eq!(parse_command("/model   "), Some(ChatCommand::Model(None)));
    }

    #[test]
    fn parse_help() {
        assert_eq!(parse_command("/help"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/?"), Some(ChatCommand::Help));
    }

    #[test]
    fn unknown_command_names_itself() {
        assert_eq!(
            parse_command("/frobnicate now"),
            Some(ChatCommand::Invalid(
                "Unknown command: /frobnicate".to_string()
            ))
        );
    }

    #[test]
    fn non_commands() {
        assert_eq!(parse_command("Hello there!"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
    }

    #[test]
    fn help_text_not_empty() {
        let help = help_text();
        assert!(!help.is_empty());
        assert!(help.contains("/quit"));
        assert!(help.contains("/clear"));
        assert!(help.contains("/model"));
        assert!(help.contains("/history"));
    }
}
