//! OpenAI-compatible provider implementation for chatclone
//!
//! This module implements the Provider trait against the
//! `chat/completions` endpoint. One request is sent per call with the full
//! message history, the selected model, and the session's sampling settings.

use crate::config::ProviderConfig;
use crate::error::{ChatError, Result};
use crate::providers::{CompletionRequest, CompletionResponse, Message, Provider, TokenUsage};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// OpenAI-compatible chat completion provider
///
/// The HTTP client carries no request timeout: a call resolves whenever
/// the transport does.
///
/// # Examples
///
/// ```no_run
/// use chatclone::config::ProviderConfig;
/// use chatclone::model::ChatModel;
/// use chatclone::providers::{
///     CompletionRequest, CompletionSettings, Message, OpenAiProvider, Provider,
/// };
///
/// # async fn example() -> chatclone::error::Result<()> {
/// let provider = OpenAiProvider::new(ProviderConfig::default())?;
/// let request = CompletionRequest::new(
///     ChatModel::Basic,
///     vec![Message::user("Hello!")],
///     CompletionSettings::default(),
///     "sk-...",
/// );
/// let response = provider.complete(&request).await?;
/// # Ok(())
/// # }
/// ```
pub struct OpenAiProvider {
    client: Client,
    api_base: String,
}

/// Request body for `chat/completions`
#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
}

/// Response body from `chat/completions`
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

/// Choice in an OpenAI response
#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    #[serde(default)]
    message: Option<OpenAiMessage>,
}

/// Message inside a choice
#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Token usage information
#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

impl OpenAiProvider {
    /// Create a new provider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use chatclone::config::ProviderConfig;
    /// use chatclone::providers::OpenAiProvider;
    ///
    /// let provider = OpenAiProvider::new(ProviderConfig::default());
    /// assert!(provider.is_ok());
    /// ```
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("chatclone/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ChatError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        let api_base = config.api_base.trim_end_matches('/').to_string();
        tracing::info!("Initialized OpenAI provider: api_base={}", api_base);

        Ok(Self { client, api_base })
    }

    /// Base URL requests are sent to
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }

    /// Extract the first choice's text and usage from a parsed response
    fn convert_response(response: OpenAiResponse) -> CompletionResponse {
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content);

        let completion = CompletionResponse {
            content,
            usage: None,
        };

        match response.usage {
            Some(usage) => completion
                .with_usage(TokenUsage::new(usage.prompt_tokens, usage.completion_tokens)),
            None => completion,
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let body = OpenAiRequest {
            model: request.model.wire_id(),
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        tracing::debug!(
            "Sending completion request: model={}, {} messages",
            body.model,
            body.messages.len()
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&request.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Completion request failed: {}", e);
                ChatError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Completion endpoint returned {}: {}", status, error_text);
            let err = if status == StatusCode::UNAUTHORIZED {
                ChatError::Authentication(format!("Endpoint rejected credential: {}", error_text))
            } else {
                ChatError::Provider(format!("Endpoint returned {}: {}", status, error_text))
            };
            return Err(err.into());
        }

        let raw = response.text().await.map_err(ChatError::Http)?;
        let parsed: OpenAiResponse = serde_json::from_str(&raw)
            .map_err(|e| {
                tracing::error!("Failed to parse completion response: {}", e);
                ChatError::Serialization(e)
            })
            .context("Failed to parse completion response")?;

        let completion = Self::convert_response(parsed);
        if let Some(usage) = completion.usage {
            tracing::debug!(
                "Completion usage: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        Ok(completion)
    }
}
