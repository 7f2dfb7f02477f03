//! Chat session state and the send exchange
//!
//! [`ChatSession`] holds everything the chat screen needs: the message
//! list, the input buffer, the credential, the selected model, the
//! settings-panel flag and the in-flight flag. It is shared as
//! `Arc<ChatSession>` so the front end can keep handling commands while a
//! request is outstanding.
//!
//! A send produces exactly one of two visible results: the reply text, or
//! the fixed [`ERROR_REPLY`]. Failure details go to the log only.

use crate::conversation::{ChatMessage, Conversation};
use crate::model::ChatModel;
use crate::providers::{CompletionRequest, CompletionSettings, Provider};
use crate::storage::CredentialStore;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Assistant text used when the endpoint answers without usable text
pub const FALLBACK_REPLY: &str = "Sorry, I could not generate a response.";

/// Assistant text used for every failed exchange
pub const ERROR_REPLY: &str =
    "Sorry, there was an error processing your request. Please check your API key and try again.";

/// Why a send was refused before any request went out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Input buffer is empty after trimming
    EmptyInput,
    /// No credential is configured
    MissingCredential,
    /// Another request is still outstanding
    Busy,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "nothing to send"),
            Self::MissingCredential => write!(f, "no API key configured; use /key <value>"),
            Self::Busy => write!(f, "a request is already in progress"),
        }
    }
}

/// Result of [`ChatSession::send`]
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Nothing was appended and no request was made
    Rejected(RejectReason),
    /// The endpoint answered; carries the appended assistant record
    Replied(ChatMessage),
    /// The call failed; carries the appended error record
    Failed(ChatMessage),
}

impl SendOutcome {
    /// The assistant record appended by this send, if any
    pub fn reply(&self) -> Option<&ChatMessage> {
        match self {
            Self::Replied(message) | Self::Failed(message) => Some(message),
            Self::Rejected(_) => None,
        }
    }
}

/// Point-in-time copy of the session, for rendering
#[derive(Debug, Clone)]
pub struct SessionView {
    /// Message records in order
    pub messages: Vec<ChatMessage>,
    /// Current input buffer
    pub input: String,
    /// Selected model
    pub model: ChatModel,
    /// Current credential (may be empty)
    pub api_key: String,
    /// Whether a request is outstanding
    pub loading: bool,
    /// Whether the settings panel is open
    pub settings_visible: bool,
}

#[derive(Debug)]
struct SessionState {
    conversation: Conversation,
    input: String,
    api_key: String,
    model: ChatModel,
    settings_visible: bool,
}

/// Holds the in-flight flag for as long as it lives
///
/// The flag is released on drop, whichever way the send exits.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Interactive chat session
///
/// # Examples
///
/// ```no_run
/// use chatclone::config::ProviderConfig;
/// use chatclone::model::ChatModel;
/// use chatclone::providers::{create_provider, CompletionSettings};
/// use chatclone::session::{ChatSession, SendOutcome};
/// use chatclone::storage::MemoryStore;
///
/// # async fn example() -> chatclone::error::Result<()> {
/// let provider = create_provider(&ProviderConfig::default())?;
/// let store = Box::new(MemoryStore::with_value("sk-..."));
/// let session = ChatSession::new(provider, store, CompletionSettings::default(), ChatModel::Basic);
///
/// match session.send_message("Hello").await {
///     SendOutcome::Replied(reply) => println!("{}", reply.content),
///     other => println!("{:?}", other),
/// }
/// # Ok(())
/// # }
/// ```
pub struct ChatSession {
    provider: Arc<dyn Provider>,
    store: Box<dyn CredentialStore>,
    settings: CompletionSettings,
    state: Mutex<SessionState>,
    in_flight: AtomicBool,
}

impl ChatSession {
    /// Creates a session, reading the credential from `store` once
    ///
    /// A store read failure is logged and treated as "no credential". The
    /// settings panel starts open when no credential is found.
    pub fn new(
        provider: Arc<dyn Provider>,
        store: Box<dyn CredentialStore>,
        settings: CompletionSettings,
        model: ChatModel,
    ) -> Self {
        let api_key = match store.load() {
            Ok(Some(key)) => {
                tracing::debug!("Loaded stored API key");
                key
            }
            Ok(None) => {
                tracing::info!("No stored API key found");
                String::new()
            }
            Err(e) => {
                tracing::warn!("Failed to read stored API key: {:#}", e);
                String::new()
            }
        };

        let settings_visible = api_key.is_empty();

        Self {
            provider,
            store,
            settings,
            state: Mutex::new(SessionState {
                conversation: Conversation::new(),
                input: String::new(),
                api_key,
                model,
                settings_visible,
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        // State stays consistent even if a holder panicked: every mutation is a
        // single push, clear, or assignment.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replaces the input buffer
    pub fn set_input(&self, text: impl Into<String>) {
        self.state().input = text.into();
    }

    /// Current input buffer
    pub fn input(&self) -> String {
        self.state().input.clone()
    }

    /// Updates the credential and writes it to the store
    ///
    /// Empty values update the session but are not written, so the stored
    /// credential is never blanked.
    ///
    /// # Errors
    ///
    /// Returns the store error if persisting fails; the in-session value is
    /// updated regardless
    pub fn set_api_key(&self, value: impl Into<String>) -> crate::error::Result<()> {
        let value = value.into();
        self.state().api_key = value.clone();

        if value.is_empty() {
            return Ok(());
        }

        self.store.save(&value).map_err(|e| {
            tracing::warn!("Failed to persist API key: {:#}", e);
            e
        })
    }

    /// Whether a credential is configured
    pub fn has_api_key(&self) -> bool {
        !self.state().api_key.is_empty()
    }

    /// Selects the model used for subsequent requests
    pub fn set_model(&self, model: ChatModel) {
        tracing::debug!("Selected model {}", model);
        self.state().model = model;
    }

    /// Currently selected model
    pub fn model(&self) -> ChatModel {
        self.state().model
    }

    /// Opens the settings panel if closed, closes it if open
    ///
    /// Returns the new visibility.
    pub fn toggle_settings(&self) -> bool {
        let mut state = self.state();
        state.settings_visible = !state.settings_visible;
        state.settings_visible
    }

    /// Closes the settings panel
    pub fn close_settings(&self) {
        self.state().settings_visible = false;
    }

    /// Whether the settings panel is open
    pub fn settings_visible(&self) -> bool {
        self.state().settings_visible
    }

    /// Removes every message record
    pub fn clear_conversation(&self) {
        self.state().conversation.clear();
        tracing::debug!("Conversation cleared");
    }

    /// Snapshot of the message records
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state().conversation.messages().to_vec()
    }

    /// Whether a request is outstanding
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Whether [`send`](Self::send) would issue a request right now
    pub fn can_send(&self) -> bool {
        let state = self.state();
        !state.input.trim().is_empty() && !state.api_key.is_empty() && !self.is_loading()
    }

    /// Point-in-time copy of the whole session
    pub fn view(&self) -> SessionView {
        let state = self.state();
        SessionView {
            messages: state.conversation.messages().to_vec(),
            input: state.input.clone(),
            model: state.model,
            api_key: state.api_key.clone(),
            loading: self.is_loading(),
            settings_visible: state.settings_visible,
        }
    }

    /// Sets the input buffer to `text` and sends it
    pub async fn send_message(&self, text: impl Into<String>) -> SendOutcome {
        self.set_input(text);
        self.send().await
    }

    /// Sends the input buffer as a new user message
    ///
    /// Refused with no side effects when the trimmed input is empty, no
    /// credential is configured, or a request is already outstanding.
    /// Otherwise the trimmed text is appended as a user record, the input
    /// buffer is cleared, and the whole history goes to the provider. The
    /// outcome is always exactly one appended assistant record.
    pub async fn send(&self) -> SendOutcome {
        let (request, _guard) = {
            let mut state = self.state();

            let text = state.input.trim().to_string();
            if text.is_empty() {
                return SendOutcome::Rejected(RejectReason::EmptyInput);
            }
            if state.api_key.is_empty() {
                return SendOutcome::Rejected(RejectReason::MissingCredential);
            }
            let Some(guard) = InFlightGuard::acquire(&self.in_flight) else {
                tracing::debug!("Send rejected: request already in flight");
                return SendOutcome::Rejected(RejectReason::Busy);
            };

            state.conversation.push_user(text);
            state.input.clear();

            let request = CompletionRequest::new(
                state.model,
                state.conversation.history(),
                self.settings,
                state.api_key.clone(),
            );
            (request, guard)
        };

        tracing::info!(
            "Sending {} messages to model {}",
            request.messages.len(),
            request.model
        );

        let result = self.provider.complete(&request).await;

        let mut state = self.state();
        match result {
            Ok(response) => {
                let text = response.text().unwrap_or(FALLBACK_REPLY).to_string();
                if response.text().is_none() {
                    tracing::warn!("Completion returned no text; using fallback reply");
                }
                SendOutcome::Replied(state.conversation.push_assistant(text))
            }
            Err(e) => {
                tracing::error!("Error calling completion endpoint: {:#}", e);
                SendOutcome::Failed(state.conversation.push_assistant(ERROR_REPLY))
            }
        }
    }
}
