//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the chat session without sending messages
//! to the API.

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the API.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Start a fresh conversation with a new server-issued session id.
    New,

    /// List the saved conversations belonging to the logged-in user.
    Sessions,

    /// Load the full history of a saved conversation.
    Load(String),

    /// Delete a saved conversation.
    Delete(String),

    /// Rate the most recent exchange, optionally with feedback text.
    Rate {
        rating: u8,
        feedback: Option<String>,
    },

    /// List the models the backend can serve.
    Models,

    /// Check backend and Ollama connectivity.
    Health,

    /// Show the logged-in user.
    User,

    /// Log out and return to the login prompt.
    Logout,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a valid command,
/// or `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use vietbot::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/load 3f2a1c").is_some());
/// assert!(parse_command("Xin chào!").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "new" => ChatCommand::New,
        "sessions" | "list" => ChatCommand::Sessions,
        "load" => match argument {
            Some(id) => ChatCommand::Load(id.to_string()),
            None => ChatCommand::Invalid("/load requires a session id".to_string()),
        },
        "delete" => match argument {
            Some(id) => ChatCommand::Delete(id.to_string()),
            None => ChatCommand::Invalid("/delete requires a session id".to_string()),
        },
        "rate" => parse_rate_command(argument),
        "models" => ChatCommand::Models,
        "health" | "status" => ChatCommand::Health,
        "user" | "whoami" => ChatCommand::User,
        "logout" => ChatCommand::Logout,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

fn parse_rate_command(argument: Option<&str>) -> ChatCommand {
    let Some(arg) = argument else {
        return ChatCommand::Invalid("/rate requires a rating between 1 and 5".to_string());
    };

    let mut parts = arg.splitn(2, ' ');
    let stars = parts.next().unwrap();
    let feedback = parts
        .next()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    match stars.parse::<u8>() {
        Ok(rating) if (1..=5).contains(&rating) => ChatCommand::Rate { rating, feedback },
        _ => ChatCommand::Invalid("/rate expects a whole number between 1 and 5".to_string()),
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /new                   Start a new conversation
  /sessions              List your saved conversations
  /load <id>             Load a conversation by session id
  /delete <id>           Delete a conversation
  /rate <1-5> [text]     Rate the latest answer, with optional feedback
  /models                List available models
  /health                Check backend and Ollama status
  /user                  Show the logged-in user
  /logout                Log out and return to the login prompt
  /help                  Show this help message
  /quit                  Exit the chat"#
}
