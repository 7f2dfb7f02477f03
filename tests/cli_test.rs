//! End-to-end tests for the chatclone binary
//!
//! These run the non-interactive commands against temporary configuration
//! and storage; none of them reach the network.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
mod common;

fn chatclone(config_path: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("chatclone").unwrap();
    cmd.env_remove("CHATCLONE_API_BASE")
        .env_remove("CHATCLONE_MODEL")
        .env_remove("CHATCLONE_TEMPERATURE")
        .env_remove("CHATCLONE_MAX_TOKENS")
        .env_remove("CHATCLONE_STORAGE_BACKEND")
        .env_remove("CHATCLONE_STORAGE_PATH")
        .arg("--config")
        .arg(config_path);
    cmd
}

/// `models` lists every selectable model and marks the configured one
#[test]
fn test_models_lists_all_models() {
    let (_temp_dir, config_path) = common::temp_config_file("provider:\n  model: advanced\n");

    chatclone(&config_path)
        .arg("models")
        .assert()
        .success()
        .stdout(predicate::str::contains("gpt-3.5-turbo"))
        .stdout(predicate::str::contains("gpt-4-turbo-preview"))
        .stdout(predicate::str::contains("* advanced "));
}

/// A missing config file falls back to defaults
#[test]
fn test_missing_config_uses_defaults() {
    let dir = TempDir::new().unwrap();

    chatclone(&dir.path().join("absent.yaml"))
        .arg("models")
        .assert()
        .success()
        .stdout(predicate::str::contains("* basic "));
}

/// `key set` persists to the file backend and `key status` reads it back masked
#[test]
fn test_key_set_then_status() {
    let (temp_dir, config_path) = common::temp_config_file("storage:\n  backend: file\n");
    let storage = temp_dir.path().join("storage.json");

    chatclone(&config_path)
        .env("CHATCLONE_STORAGE_PATH", &storage)
        .args(["key", "set", "sk-abcdef123456"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3456"))
        .stdout(predicate::str::contains("sk-abcdef123456").not());

    assert!(storage.exists());

    chatclone(&config_path)
        .env("CHATCLONE_STORAGE_PATH", &storage)
        .args(["key", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("API key: ***********3456"));
}

/// `key status` with nothing stored says so
#[test]
fn test_key_status_when_empty() {
    let (_temp_dir, config_path) = common::temp_config_file("storage:\n  backend: memory\n");

    chatclone(&config_path)
        .args(["key", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No API key stored"));
}

/// Invalid configuration is rejected before any command runs
#[test]
fn test_invalid_api_base_rejected() {
    let (_temp_dir, config_path) =
        common::temp_config_file("provider:\n  api_base: ftp://example.com\n");

    chatclone(&config_path)
        .arg("models")
        .assert()
        .failure()
        .stderr(predicate::str::contains("http or https"));
}

/// An unknown model on the command line is a configuration error
#[test]
fn test_chat_with_unknown_model_fails() {
    let (_temp_dir, config_path) = common::temp_config_file("storage:\n  backend: memory\n");

    chatclone(&config_path)
        .args(["chat", "--model", "davinci"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown model"));
}
