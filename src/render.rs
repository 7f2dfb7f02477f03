//! Terminal rendering for the chat screen
//!
//! Everything here returns `String`s; the caller decides where to print.

use crate::conversation::{ChatMessage, Role};
use crate::model::ChatModel;
use crate::session::SessionView;
use chrono::{DateTime, Local, Utc};
use colored::Colorize;

const CONTINUATION_INDENT: &str = "  ";

/// Local wall-clock time of a message, `HH:MM:SS`
pub fn format_time(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Renders one message record
///
/// The header line carries the role and time; every line of the content
/// follows on its own indented line so line breaks survive.
pub fn render_message(message: &ChatMessage) -> String {
    let label = match message.role {
        Role::User => "You".bold().blue(),
        Role::Assistant => "Assistant".bold().green(),
    };
    let mut out = format!("{} {}\n", label, format_time(message.timestamp).dimmed());
    for line in message.content.split('\n') {
        out.push_str(CONTINUATION_INDENT);
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Renders the whole thread, or the welcome banner when it is empty
pub fn render_thread(view: &SessionView) -> String {
    if view.messages.is_empty() {
        return render_welcome(!view.api_key.is_empty());
    }

    let mut out = String::new();
    for message in &view.messages {
        out.push_str(&render_message(message));
        out.push('\n');
    }
    if view.loading {
        out.push_str(&typing_indicator());
        out.push('\n');
    }
    out
}

/// Banner shown while the conversation is empty
pub fn render_welcome(has_api_key: bool) -> String {
    let mut out = format!(
        "{}\nStart a conversation by typing a message below.\nType /help for commands.\n",
        "Welcome to chatclone".bold()
    );
    if !has_api_key {
        out.push_str(&format!(
            "{}\n",
            "Please set your API key first: /key <value>".yellow()
        ));
    }
    out
}

/// Shown while a request is outstanding
pub fn typing_indicator() -> String {
    format!("{} {}", "Assistant".bold().green(), "...".dimmed())
}

/// Hides all but the last four characters of a credential
///
/// # Examples
///
/// ```
/// use chatclone::render::mask_key;
///
/// assert_eq!(mask_key("sk-abcdef1234"), "*********1234");
/// assert_eq!(mask_key("abc"), "***");
/// assert_eq!(mask_key(""), "(not set)");
/// ```
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    match chars.len() {
        0 => "(not set)".to_string(),
        n if n <= 4 => "*".repeat(n),
        n => {
            let visible: String = chars[n - 4..].iter().collect();
            format!("{}{}", "*".repeat(n - 4), visible)
        }
    }
}

/// Lists the selectable models, marking the current one
pub fn render_models(current: ChatModel) -> String {
    let mut out = String::new();
    for model in ChatModel::all() {
        let marker = if model == current { "*" } else { " " };
        out.push_str(&format!(
            "{} {:<14} {:<20} ({})\n",
            marker,
            model.short_name(),
            model.wire_id(),
            model.display_name()
        ));
    }
    out
}

/// The settings panel: masked API key and model selection
pub fn render_settings(view: &SessionView) -> String {
    format!(
        "{}\n  API key: {}\n  Model:\n{}  Change with /key <value> and /model <name>; /settings to close.\n",
        "Settings".bold(),
        mask_key(&view.api_key),
        render_models(view.model)
            .lines()
            .map(|line| format!("    {}\n", line))
            .collect::<String>()
    )
}
