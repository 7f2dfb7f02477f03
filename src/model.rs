//! Selectable chat models
//!
//! The client offers a fixed set of three models. Each variant has a short
//! name used in config and commands, the wire identifier sent to the
//! completion endpoint, and a display name for the settings panel.

use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Model used for chat completions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChatModel {
    /// Fast, inexpensive general model
    #[default]
    Basic,
    /// Most capable model
    Advanced,
    /// Capable model with lower latency
    AdvancedFast,
}

impl fmt::Display for ChatModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

impl ChatModel {
    /// All selectable models, in display order
    pub fn all() -> [ChatModel; 3] {
        [Self::Basic, Self::Advanced, Self::AdvancedFast]
    }

    /// Parse a model from its short name or wire identifier
    ///
    /// Matching is case-insensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatclone::model::ChatModel;
    ///
    /// assert_eq!(ChatModel::parse_str("advanced").unwrap(), ChatModel::Advanced);
    /// assert_eq!(ChatModel::parse_str("gpt-4").unwrap(), ChatModel::Advanced);
    /// assert!(ChatModel::parse_str("davinci").is_err());
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, String> {
        let lower = s.trim().to_lowercase();
        Self::all()
            .into_iter()
            .find(|m| m.short_name() == lower || m.wire_id() == lower)
            .ok_or_else(|| {
                format!(
                    "Unknown model: {}. Must be one of: basic, advanced, advanced-fast",
                    s.trim()
                )
            })
    }

    /// Short name used in config files and chat commands
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Advanced => "advanced",
            Self::AdvancedFast => "advanced-fast",
        }
    }

    /// Identifier sent to the completion endpoint
    pub fn wire_id(&self) -> &'static str {
        match self {
            Self::Basic => "gpt-3.5-turbo",
            Self::Advanced => "gpt-4",
            Self::AdvancedFast => "gpt-4-turbo-preview",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Basic => "GPT-3.5 Turbo",
            Self::Advanced => "GPT-4",
            Self::AdvancedFast => "GPT-4 Turbo",
        }
    }

    /// Colored tag for the prompt, e.g. `[basic]`
    pub fn colored_tag(&self) -> String {
        match self {
            Self::Basic => format!("[{}]", self.short_name().cyan()),
            Self::Advanced => format!("[{}]", self.short_name().purple()),
            Self::AdvancedFast => format!("[{}]", self.short_name().green()),
        }
    }
}
