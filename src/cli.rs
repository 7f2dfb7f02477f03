//! Command-line interface definition for chatclone
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, credential management, and
//! listing the selectable models.

use clap::{Parser, Subcommand};

/// chatclone - chat with a hosted language model from the terminal
#[derive(Parser, Debug, Clone)]
#[command(name = "chatclone")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for chatclone
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Model to start with (basic, advanced, advanced-fast)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Manage the stored API key
    Key {
        /// Key management subcommand
        #[command(subcommand)]
        command: KeyCommand,
    },

    /// List the selectable models
    Models,
}

/// API key subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum KeyCommand {
    /// Store an API key
    Set {
        /// The API key value
        value: String,
    },

    /// Show whether an API key is stored (masked)
    Status,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
