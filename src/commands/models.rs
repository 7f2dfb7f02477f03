//! Model listing command
//!
//! The model set is fixed, so listing needs no network call.

use crate::config::Config;
use crate::render::render_models;

/// Print the selectable models, marking the configured default
pub fn list_models(config: &Config) {
    println!("Available models:\n");
    print!("{}", render_models(config.provider.model));
    println!("\nSelect with `chatclone chat --model <name>` or `/model <name>` in chat.");
}
