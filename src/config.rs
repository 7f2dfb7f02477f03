//! Configuration management for chatclone
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::cli::{Cli, Commands};
use crate::error::{ChatError, Result};
use crate::model::ChatModel;
use crate::providers::CompletionSettings;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for chatclone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Completion endpoint settings
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Sampling settings applied to every request
    #[serde(default)]
    pub completion: CompletionConfig,
    /// Credential storage settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Completion endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the OpenAI-compatible API (without `/chat/completions`)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Model selected when a session starts
    #[serde(default)]
    pub model: ChatModel,
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: ChatModel::default(),
        }
    }
}

/// Sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens in a reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl CompletionConfig {
    /// Settings handed to the chat session
    pub fn settings(&self) -> CompletionSettings {
        CompletionSettings {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// Where the credential is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// OS credential store
    #[default]
    Keyring,
    /// JSON key-value file
    File,
    /// Process memory only; lost on exit
    Memory,
}

impl StorageBackend {
    /// Parse a backend name (case-insensitive)
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "keyring" => Some(Self::Keyring),
            "file" => Some(Self::File),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Credential storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage backend
    #[serde(default)]
    pub backend: StorageBackend,

    /// Location of the storage file (file backend only)
    ///
    /// Defaults to `storage.json` in the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file, environment, and CLI
    ///
    /// A missing file is not an error; defaults are used instead.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed, or if a CLI
    /// override is invalid
    pub fn load(path: &str, cli: &Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli)?;

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(ChatError::from)
            .with_context(|| format!("Failed to read config file {}", path))?;
        let config = serde_yaml::from_str(&contents)
            .map_err(ChatError::from)
            .with_context(|| format!("Failed to parse config {}", path))?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(api_base) = std::env::var("CHATCLONE_API_BASE") {
            self.provider.api_base = api_base;
        }

        if let Ok(model) = std::env::var("CHATCLONE_MODEL") {
            match ChatModel::parse_str(&model) {
                Ok(value) => self.provider.model = value,
                Err(e) => tracing::warn!("Invalid CHATCLONE_MODEL: {}", e),
            }
        }

        if let Ok(temperature) = std::env::var("CHATCLONE_TEMPERATURE") {
            if let Ok(value) = temperature.parse() {
                self.completion.temperature = value;
            } else {
                tracing::warn!("Invalid CHATCLONE_TEMPERATURE: {}", temperature);
            }
        }

        if let Ok(max_tokens) = std::env::var("CHATCLONE_MAX_TOKENS") {
            if let Ok(value) = max_tokens.parse() {
                self.completion.max_tokens = value;
            } else {
                tracing::warn!("Invalid CHATCLONE_MAX_TOKENS: {}", max_tokens);
            }
        }

        if let Ok(backend) = std::env::var("CHATCLONE_STORAGE_BACKEND") {
            match StorageBackend::parse_str(&backend) {
                Some(value) => self.storage.backend = value,
                None => tracing::warn!("Invalid storage backend: {}, keeping current", backend),
            }
        }

        if let Ok(path) = std::env::var("CHATCLONE_STORAGE_PATH") {
            self.storage.path = Some(PathBuf::from(path));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) -> Result<()> {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Commands::Chat {
            model: Some(model), ..
        } = &cli.command
        {
            self.provider.model = ChatModel::parse_str(model).map_err(ChatError::Config)?;
        }

        Ok(())
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let api_base = self.provider.api_base.trim();
        if api_base.is_empty() {
            return Err(ChatError::Config("provider.api_base cannot be empty".to_string()).into());
        }

        let parsed = url::Url::parse(api_base).map_err(|e| {
            ChatError::Config(format!("provider.api_base is not a valid URL: {}", e))
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ChatError::Config(format!(
                "provider.api_base must use http or https, got: {}",
                parsed.scheme()
            ))
            .into());
        }

        if !(0.0..=2.0).contains(&self.completion.temperature) {
            return Err(ChatError::Config(
                "completion.temperature must be between 0.0 and 2.0".to_string(),
            )
            .into());
        }

        if self.completion.max_tokens == 0 {
            return Err(ChatError::Config(
                "completion.max_tokens must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
