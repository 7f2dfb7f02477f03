/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `chat`   - Interactive chat session
- `key`    - Store or inspect the API key
- `models` - List the selectable models

The handlers are thin; the session, storage and provider modules do the
work.
*/

use crate::config::Config;
use crate::error::Result;
use crate::providers::create_provider;
use crate::session::ChatSession;
use crate::storage::open_store;

// Special commands parser for the chat loop
pub mod special_commands;

// Model listing command
pub mod models;

/// Build a chat session from configuration
///
/// Opens the configured credential store and provider; the stored API key
/// is read once here.
///
/// # Errors
///
/// Returns error if the store or provider cannot be created
pub fn build_session(config: &Config) -> Result<ChatSession> {
    let store = open_store(&config.storage)?;
    let provider = create_provider(&config.provider)?;
    Ok(ChatSession::new(
        provider,
        store,
        config.completion.settings(),
        config.provider.model,
    ))
}

// Chat command handler
pub mod chat {
    //! Interactive chat handler.
    //!
    //! Lines are read on a dedicated thread and delivered over a channel,
    //! so commands such as `/settings` keep working while a reply is
    //! pending.

    use super::*;
    use crate::commands::special_commands::{help_text, parse_special_command, SpecialCommand};
    use crate::render;
    use crate::session::{RejectReason, SendOutcome};
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::{Cmd, DefaultEditor, KeyCode, KeyEvent, Modifiers};
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use tokio::task::JoinHandle;

    /// What the chat loop should do with one line of input
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum LineAction {
        /// Print this text and keep reading
        Output(String),
        /// The line was placed in the input buffer; send it
        Send,
        /// Leave the session
        Exit,
    }

    /// Events from the line reader thread
    enum InputEvent {
        Line(String),
        Interrupted,
        Eof,
    }

    /// Start interactive chat mode
    ///
    /// # Errors
    ///
    /// Returns error if the session cannot be built
    pub async fn run_chat(config: Config) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let session = Arc::new(build_session(&config)?);
        let mut lines = spawn_line_reader();

        print_welcome_banner(&session);

        let mut pending: Option<JoinHandle<SendOutcome>> = None;

        loop {
            tokio::select! {
                joined = async {
                    match pending.as_mut() {
                        Some(handle) => handle.await,
                        None => std::future::pending().await,
                    }
                } => {
                    pending = None;
                    match joined {
                        Ok(outcome) => print_outcome(&outcome),
                        Err(e) => {
                            tracing::error!("Send task failed: {}", e);
                            println!("{}", "The request was interrupted.".red());
                        }
                    }
                }
                event = lines.recv() => {
                    match event {
                        Some(InputEvent::Line(line)) => match dispatch_line(&session, &line) {
                            LineAction::Output(text) => println!("{}", text),
                            LineAction::Send => {
                                println!("{}", render::typing_indicator());
                                let session = Arc::clone(&session);
                                pending = Some(tokio::spawn(async move { session.send().await }));
                            }
                            LineAction::Exit => break,
                        },
                        Some(InputEvent::Interrupted) => {
                            println!("CTRL-C");
                            break;
                        }
                        Some(InputEvent::Eof) | None => {
                            println!("CTRL-D");
                            break;
                        }
                    }
                }
            }
        }

        if let Some(handle) = pending {
            tracing::debug!("Leaving with a request still in flight");
            handle.abort();
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Handle one line of user input against the session
    ///
    /// Special commands are applied immediately. Plain text becomes the
    /// input buffer and yields [`LineAction::Send`], unless a request is
    /// already outstanding or no API key is set. Line breaks inside the
    /// text are kept.
    pub fn dispatch_line(session: &ChatSession, line: &str) -> LineAction {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return LineAction::Output(String::new());
        }

        let command = match parse_special_command(trimmed) {
            Ok(command) => command,
            Err(e) => return LineAction::Output(format!("{}", e.to_string().red())),
        };

        match command {
            SpecialCommand::Exit => LineAction::Exit,
            SpecialCommand::Clear => {
                session.clear_conversation();
                LineAction::Output(format!(
                    "{}\n{}",
                    "Conversation cleared.".green(),
                    render::render_welcome(session.has_api_key())
                ))
            }
            SpecialCommand::ToggleSettings => {
                if session.toggle_settings() {
                    LineAction::Output(render::render_settings(&session.view()))
                } else {
                    LineAction::Output("Settings closed.".to_string())
                }
            }
            SpecialCommand::CloseSettings => {
                session.close_settings();
                LineAction::Output("Settings closed.".to_string())
            }
            SpecialCommand::SetKey(value) => match session.set_api_key(value) {
                Ok(()) => LineAction::Output(format!("{}", "API key saved.".green())),
                Err(e) => LineAction::Output(format!(
                    "{}",
                    format!("API key set for this session but could not be saved: {}", e)
                        .yellow()
                )),
            },
            SpecialCommand::SwitchModel(model) => {
                session.set_model(model);
                LineAction::Output(format!(
                    "Model set to {} ({})",
                    model.display_name(),
                    model.wire_id()
                ))
            }
            SpecialCommand::ListModels => {
                LineAction::Output(render::render_models(session.model()))
            }
            SpecialCommand::ShowStatus => LineAction::Output(status_text(session)),
            SpecialCommand::Help => LineAction::Output(help_text().to_string()),
            SpecialCommand::None => {
                if session.is_loading() {
                    return LineAction::Output(reject_notice(RejectReason::Busy));
                }
                session.set_input(trimmed);
                if !session.has_api_key() {
                    return LineAction::Output(reject_notice(RejectReason::MissingCredential));
                }
                LineAction::Send
            }
        }
    }

    fn reject_notice(reason: RejectReason) -> String {
        format!("{}", format!("Not sent: {}", reason).yellow())
    }

    fn status_text(session: &ChatSession) -> String {
        let view = session.view();
        format!(
            "Model:        {} {}\nAPI key:      {}\nMessages:     {}\nWaiting:      {}",
            view.model.colored_tag(),
            view.model.display_name(),
            render::mask_key(&view.api_key),
            view.messages.len(),
            if view.loading { "yes" } else { "no" }
        )
    }

    fn print_outcome(outcome: &SendOutcome) {
        match outcome {
            SendOutcome::Replied(reply) | SendOutcome::Failed(reply) => {
                println!("{}", render::render_message(reply));
            }
            SendOutcome::Rejected(reason) => println!("{}", reject_notice(*reason)),
        }
    }

    fn print_welcome_banner(session: &ChatSession) {
        let view = session.view();
        println!("{}", render::render_thread(&view));
        if view.settings_visible {
            println!("{}", render::render_settings(&view));
        }
    }

    /// Folds a line ending in `\` into `buffer` and waits for more
    ///
    /// Returns the whole message once a line without the trailing `\`
    /// arrives; continued lines are joined with `\n`.
    fn join_continued(buffer: &mut String, line: &str) -> Option<String> {
        match line.strip_suffix('\\') {
            Some(head) => {
                buffer.push_str(head);
                buffer.push('\n');
                None
            }
            None => {
                buffer.push_str(line);
                Some(std::mem::take(buffer))
            }
        }
    }

    /// Reads lines on a blocking thread and forwards them to the chat loop
    ///
    /// Enter sends. Alt+Enter, or a trailing `\`, starts a new line in the
    /// same message.
    fn spawn_line_reader() -> mpsc::UnboundedReceiver<InputEvent> {
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::spawn(move || {
            let mut rl = match DefaultEditor::new() {
                Ok(rl) => rl,
                Err(e) => {
                    tracing::error!("Failed to initialize line editor: {}", e);
                    let _ = tx.send(InputEvent::Eof);
                    return;
                }
            };
            rl.bind_sequence(KeyEvent(KeyCode::Enter, Modifiers::ALT), Cmd::Newline);

            let mut continued = String::new();

            loop {
                let prompt = if continued.is_empty() { "> " } else { ".. " };
                let event = match rl.readline(prompt) {
                    Ok(line) => match join_continued(&mut continued, &line) {
                        Some(message) => {
                            if !message.trim().is_empty() {
                                if let Err(e) = rl.add_history_entry(message.as_str()) {
                                    tracing::debug!("Failed to add history entry: {}", e);
                                }
                            }
                            InputEvent::Line(message)
                        }
                        None => continue,
                    },
                    Err(ReadlineError::Interrupted) => InputEvent::Interrupted,
                    Err(ReadlineError::Eof) => InputEvent::Eof,
                    Err(err) => {
                        tracing::error!("Readline error: {:?}", err);
                        InputEvent::Eof
                    }
                };

                let done = !matches!(event, InputEvent::Line(_));
                if tx.send(event).is_err() || done {
                    break;
                }
            }
        });

        rx
    }

}

// API key command handlers
pub mod key {
    //! Store or inspect the API key outside a chat session.

    use super::*;
    use crate::error::ChatError;
    use crate::render::mask_key;

    /// Persist an API key to the configured store
    ///
    /// # Errors
    ///
    /// Returns error if the value is blank or the store write fails
    pub fn set_key(config: &Config, value: &str) -> Result<()> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ChatError::MissingCredentials("API key cannot be empty".to_string()).into());
        }

        let store = open_store(&config.storage)?;
        store.save(value)?;
        tracing::info!("Stored API key in {:?} backend", config.storage.backend);
        println!("API key saved: {}", mask_key(value));
        Ok(())
    }

    /// Report whether an API key is stored, masked
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be read
    pub fn key_status(config: &Config) -> Result<()> {
        let store = open_store(&config.storage)?;
        match store.load()? {
            Some(value) => println!("API key: {}", mask_key(&value)),
            None => println!("No API key stored. Use `chatclone key set <value>`."),
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::test_utils::{assert_error_contains, file_store_config, temp_dir};

        #[test]
        fn test_set_key_persists() {
            let dir = temp_dir();
            let config = file_store_config(&dir);

            set_key(&config, "  sk-trimmed  ").unwrap();

            let stored = open_store(&config.storage).unwrap().load().unwrap();
            assert_eq!(stored, Some("sk-trimmed".to_string()));
            assert!(key_status(&config).is_ok());
        }

        #[test]
        fn test_set_key_rejects_blank() {
            let dir = temp_dir();
            let config = file_store_config(&dir);
            assert_error_contains(set_key(&config, "   "), "cannot be empty");
            assert_eq!(open_store(&config.storage).unwrap().load().unwrap(), None);
        }
    }
}
