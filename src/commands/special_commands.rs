//! Special commands parser for interactive chat
//!
//! Special commands stand in for the buttons and settings panel of the
//! chat screen. They let users:
//! - Clear the conversation
//! - Toggle the settings panel
//! - Set the API key
//! - Select a model
//! - Exit the session
//!
//! Commands are prefixed with `/`. Command names are case-insensitive;
//! the `/key` argument is kept verbatim.

use crate::model::ChatModel;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
///
/// These commands change session state or print information rather than
/// being sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Empty the conversation
    Clear,

    /// Open or close the settings panel
    ToggleSettings,

    /// Close the settings panel
    CloseSettings,

    /// Replace the stored API key
    SetKey(String),

    /// Select a different model
    SwitchModel(ChatModel),

    /// List selectable models
    ListModels,

    /// Show session status
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be sent as a chat message.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` if input starts with "/" but is
/// not a valid command, `CommandError::MissingArgument` if a required
/// argument is absent, and `CommandError::UnsupportedArgument` if an
/// argument is invalid.
///
/// # Examples
///
/// ```
/// use chatclone::commands::special_commands::{parse_special_command, SpecialCommand};
/// use chatclone::model::ChatModel;
///
/// let cmd = parse_special_command("/model advanced").unwrap();
/// assert_eq!(cmd, SpecialCommand::SwitchModel(ChatModel::Advanced));
///
/// let cmd = parse_special_command("/key sk-ABC").unwrap();
/// assert_eq!(cmd, SpecialCommand::SetKey("sk-ABC".to_string()));
///
/// let cmd = parse_special_command("hello there").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // If input doesn't start with "/", it's not a command (except exit/quit)
    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    // Only the command name is lowercased; the argument keeps its case
    let (name, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name.to_lowercase(), rest.trim()),
        None => (lower, ""),
    };

    match name.as_str() {
        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),
        "/clear" => Ok(SpecialCommand::Clear),
        "/settings" => Ok(SpecialCommand::ToggleSettings),
        "/close" => Ok(SpecialCommand::CloseSettings),
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/models" => Ok(SpecialCommand::ListModels),

        "/key" if arg.is_empty() => Err(CommandError::MissingArgument {
            command: "/key".to_string(),
            usage: "/key <api_key>".to_string(),
        }),
        "/key" => Ok(SpecialCommand::SetKey(arg.to_string())),

        "/model" if arg.is_empty() => Err(CommandError::MissingArgument {
            command: "/model".to_string(),
            usage: "/model <basic|advanced|advanced-fast>".to_string(),
        }),
        "/model" => ChatModel::parse_str(arg)
            .map(SpecialCommand::SwitchModel)
            .map_err(|_| CommandError::UnsupportedArgument {
                command: "/model".to_string(),
                arg: arg.to_string(),
            }),

        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Help text listing the special commands
pub fn help_text() -> &'static str {
    r#"
Special Commands for Interactive Chat
=====================================

CONVERSATION:
  /clear          - Clear the conversation
  /status         - Show model, key and message count

SETTINGS:
  /settings       - Open or close the settings panel
  /close          - Close the settings panel
  /key <value>    - Set the API key (saved for next time)
  /model <name>   - Select a model: basic, advanced, advanced-fast
  /models         - List the selectable models

OTHER:
  /help           - Show this help
  exit, quit      - Leave the session

Anything else is sent to the model. Press Alt+Enter, or end a line with
'\', to continue the message on a new line.

Commands still work while a reply is pending; a new message is not sent
until the previous reply arrives.
"#
}
