//! Base provider trait and common types for chatclone
//!
//! This module defines the Provider trait that completion backends
//! implement, along with the request and response types exchanged with them.

use crate::error::Result;
use crate::model::ChatModel;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Message structure sent to the completion endpoint
///
/// A plain `{role, content}` pair. Record metadata (id, timestamp) stays
/// in the conversation and is never sent upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender (user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl Message {
    /// Creates a message with an explicit role
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use chatclone::providers::Message;
    ///
    /// let msg = Message::user("Hello, assistant!");
    /// assert_eq!(msg.role, "user");
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    /// Creates a new assistant message
    ///
    /// # Examples
    ///
    /// ```
    /// use chatclone::providers::Message;
    ///
    /// let msg = Message::assistant("Hello, user!");
    /// assert_eq!(msg.role, "assistant");
    /// ```
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

/// Sampling parameters applied to every request in a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionSettings {
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum number of tokens in the reply
    pub max_tokens: u32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

/// A single completion request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model to complete with
    pub model: ChatModel,
    /// Ordered conversation context, ending with the new user message
    pub messages: Vec<Message>,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum number of tokens in the reply
    pub max_tokens: u32,
    /// Credential authorizing the call
    pub api_key: String,
}

impl CompletionRequest {
    /// Builds a request from a message list and session settings
    pub fn new(
        model: ChatModel,
        messages: Vec<Message>,
        settings: CompletionSettings,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            model,
            messages,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            api_key: api_key.into(),
        }
    }
}

/// Token usage information from a completion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: usize,
    /// Number of tokens in the completion
    pub completion_tokens: usize,
    /// Total tokens used (prompt + completion)
    pub total_tokens: usize,
}

impl TokenUsage {
    /// Create a new TokenUsage instance
    ///
    /// # Examples
    ///
    /// ```
    /// use chatclone::providers::TokenUsage;
    ///
    /// let usage = TokenUsage::new(100, 50);
    /// assert_eq!(usage.total_tokens, 150);
    /// ```
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Result of a successful completion call
///
/// `content` is `None` when the endpoint answered without usable text
/// (no choices, or a choice with no content).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionResponse {
    /// Text of the first choice, if any
    pub content: Option<String>,
    /// Token usage, if reported
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    /// Creates a response carrying text
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            usage: None,
        }
    }

    /// Creates a response with no usable text
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attaches token usage
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Returns the text if it is present and non-empty
    ///
    /// Whitespace-only text is returned as is.
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref().filter(|content| !content.is_empty())
    }
}

/// Provider trait for completion backends
///
/// A provider turns one [`CompletionRequest`] into one
/// [`CompletionResponse`]. Implementations do not retry.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use chatclone::providers::{CompletionRequest, CompletionResponse, Provider};
///
/// struct EchoProvider;
///
/// #[async_trait]
/// impl Provider for EchoProvider {
///     async fn complete(
///         &self,
///         request: &CompletionRequest,
///     ) -> chatclone::error::Result<CompletionResponse> {
///         let last = request.messages.last().map(|m| m.content.clone());
///         Ok(CompletionResponse { content: last, usage: None })
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Completes a conversation
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, a non-success status, or a
    /// response body that cannot be parsed
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;
}
