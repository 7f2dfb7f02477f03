//! Test utilities for chatclone
//!
//! Temporary directories, file-backed configurations, and assertion helpers
//! shared by the unit tests.

use crate::config::{Config, StorageBackend, StorageConfig};
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// The directory is removed when the returned `TempDir` is dropped.
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: anyhow::Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = format!("{:#}", e);
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Configuration whose credential store is a file inside `dir`
pub fn file_store_config(dir: &TempDir) -> Config {
    Config {
        storage: StorageConfig {
            backend: StorageBackend::File,
            path: Some(dir.path().join("storage.json")),
        },
        ..Default::default()
    }
}

/// A complete configuration file in YAML form
pub fn test_config_yaml() -> String {
    r#"
provider:
  api_base: http://localhost:8080/v1
  model: advanced
completion:
  temperature: 0.2
  max_tokens: 256
storage:
  backend: memory
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;
    use crate::model::ChatModel;

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", "content");
        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: anyhow::Result<()> =
            Err(ChatError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        assert_error_contains(Ok(()), "error");
    }

    #[test]
    fn test_file_store_config_points_into_dir() {
        let dir = temp_dir();
        let config = file_store_config(&dir);
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert!(config.storage.path.unwrap().starts_with(dir.path()));
    }

    #[test]
    fn test_test_config_yaml_parses() {
        let config: Config = serde_yaml::from_str(&test_config_yaml()).unwrap();
        assert_eq!(config.provider.model, ChatModel::Advanced);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(config.validate().is_ok());
    }
}
