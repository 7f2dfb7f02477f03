//! chatclone - terminal chat client for a hosted completion API
//!
//! This library provides the chat session, the completion provider
//! abstraction, credential storage, and configuration used by the
//! `chatclone` binary.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Chat session state and the send flow
//! - `conversation`: Message records and the ordered thread
//! - `model`: The fixed set of selectable models
//! - `providers`: Completion provider abstraction and the OpenAI-compatible client
//! - `storage`: Credential persistence (keyring, file, memory)
//! - `render`: Terminal rendering of messages and panels
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//! - `commands`: Handlers for the CLI commands
//!
//! # Example
//!
//! ```no_run
//! use chatclone::{cli::Cli, commands, Config};
//! use clap::Parser;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cli = Cli::parse_from(["chatclone", "chat"]);
//!     let config = Config::load("config/config.yaml", &cli)?;
//!     config.validate()?;
//!
//!     let session = commands::build_session(&config)?;
//!     let outcome = session.send_message("Hello").await;
//!     println!("{:?}", outcome.reply());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod error;
pub mod model;
pub mod providers;
pub mod render;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use conversation::{ChatMessage, Conversation, Role};
pub use error::{ChatError, Result};
pub use model::ChatModel;
pub use session::{ChatSession, RejectReason, SendOutcome, SessionView};

#[cfg(test)]
pub mod test_utils;
