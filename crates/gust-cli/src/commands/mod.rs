//! Slash commands for interactive mode

mod export;
mod info;
mod search;

pub use export::ExportCommand;
pub use info::InfoCommand;
pub use search::SearchCommand;

use gust_chat::Conversation;

/// Result of executing a slash command
#[derive(Debug)]
pub enum CommandResult {
    /// Clear the conversation
    Clear,
    /// Show a message to the user (not sent to the agent)
    Message(String),
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Parse and execute a slash command
pub fn execute_command(
    input: &str,
    conversation: &Conversation,
    thread_id: &str,
) -> Option<CommandResult> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let parts: Vec<&str> = rest.splitn(2, ' ').collect();
    let command = parts[0].to_lowercase();
    let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),

        "clear" | "c" => CommandResult::Clear,

        "quit" | "exit" | "q" => CommandResult::Exit,

        "search" | "s" => SearchCommand::execute(args, conversation),

        "export" | "e" => ExportCommand::execute(args, conversation),

        "info" | "i" => InfoCommand::execute(conversation, thread_id),

        _ => CommandResult::Unknown(command),
    })
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?          Show this help message
  /search, /s <query>    List messages containing the query (case-insensitive)
  /export, /e [path]     Save the conversation as JSON
  /info, /i              Show thread id and message counts
  /clear, /c             Clear conversation history
  /quit, /exit, /q       Exit gust

Examples:
  /search rain           Find every message mentioning rain
  /export                Write weather-chat-<date>.json to the current directory
  /export chats/today.json
  /clear                 Start fresh conversation"#
        .to_string()
}
