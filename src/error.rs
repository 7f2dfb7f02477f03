//! Error types for chatclone
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for chatclone operations
///
/// These variants are for diagnostics only. The chat session never shows
/// them to the user; a failed exchange always renders the same fixed
/// assistant message.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider-related errors (non-success status, malformed body, etc.)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Authentication errors (e.g., 401 Unauthorized)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// No credential is configured
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Credential storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Result type alias for chatclone operations
///
/// Uses `anyhow::Error` so callers can attach context while still being
/// able to downcast to [`ChatError`].
pub type Result<T> = anyhow::Result<T>;
