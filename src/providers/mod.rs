//! Provider module for chatclone
//!
//! This module contains the completion provider abstraction and the
//! OpenAI-compatible implementation.

pub mod base;
pub mod openai;

pub use base::{
    CompletionRequest, CompletionResponse, CompletionSettings, Message, Provider, TokenUsage,
};
pub use openai::OpenAiProvider;

use crate::config::ProviderConfig;
use crate::error::Result;
use std::sync::Arc;

/// Create a provider instance based on configuration
///
/// # Errors
///
/// Returns error if provider initialization fails
///
/// # Examples
///
/// ```
/// use chatclone::config::ProviderConfig;
/// use chatclone::providers::create_provider;
///
/// let provider = create_provider(&ProviderConfig::default());
/// assert!(provider.is_ok());
/// ```
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn Provider>> {
    Ok(Arc::new(OpenAiProvider::new(config.clone())?))
}
