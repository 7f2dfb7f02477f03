//! Credential storage
//!
//! The API key is the only state that outlives a session. It lives in a
//! small key-value store under a fixed key name. Three backends exist: the
//! OS keyring, a JSON file, and process memory.

use crate::config::{StorageBackend, StorageConfig};
use crate::error::{ChatError, Result};
use anyhow::Context;
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Fixed key the credential is stored under
pub const CREDENTIAL_KEY: &str = "openai-api-key";

/// Keyring service name
const KEYRING_SERVICE: &str = "chatclone";

/// Persistent key-value storage for the credential
///
/// The store exposes no delete operation.
pub trait CredentialStore: Send + Sync {
    /// Read the stored credential, if any
    fn load(&self) -> Result<Option<String>>;

    /// Persist the credential, replacing any previous value
    fn save(&self, value: &str) -> Result<()>;
}

/// Build the store selected by configuration
///
/// # Errors
///
/// Returns error if the file backend has no usable location
pub fn open_store(config: &StorageConfig) -> Result<Box<dyn CredentialStore>> {
    let store: Box<dyn CredentialStore> = match config.backend {
        StorageBackend::Keyring => Box::new(KeyringStore::new()),
        StorageBackend::File => match &config.path {
            Some(path) => Box::new(FileStore::new(path)),
            None => Box::new(FileStore::default_location()?),
        },
        StorageBackend::Memory => Box::new(MemoryStore::new()),
    };
    tracing::debug!("Opened {:?} credential store", config.backend);
    Ok(store)
}

/// Stores the credential in the OS credential store
pub struct KeyringStore {
    service: String,
    user: String,
}

impl KeyringStore {
    /// Keyring store using the default service and key name
    pub fn new() -> Self {
        Self {
            service: KEYRING_SERVICE.to_string(),
            user: CREDENTIAL_KEY.to_string(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry> {
        keyring::Entry::new(&self.service, &self.user).map_err(|e| ChatError::Keyring(e).into())
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringStore {
    fn load(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(value) if value.is_empty() => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(ChatError::Keyring(e).into()),
        }
    }

    fn save(&self, value: &str) -> Result<()> {
        self.entry()?
            .set_password(value)
            .map_err(ChatError::Keyring)?;
        Ok(())
    }
}

/// Stores the credential in a JSON object file
///
/// Other keys in the file are preserved on save.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// File store at an explicit path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File store at `storage.json` in the platform data directory
    ///
    /// # Errors
    ///
    /// Returns error if the data directory cannot be determined
    pub fn default_location() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("", "", "chatclone")
            .ok_or_else(|| ChatError::Storage("Could not determine data directory".into()))?;
        Ok(Self::new(proj_dirs.data_dir().join("storage.json")))
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .map_err(ChatError::from)
            .with_context(|| format!("Failed to read storage file {}", self.path.display()))?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        let map = serde_json::from_str(&contents)
            .map_err(ChatError::from)
            .with_context(|| format!("Malformed storage file {}", self.path.display()))?;
        Ok(map)
    }
}

impl CredentialStore for FileStore {
    fn load(&self) -> Result<Option<String>> {
        let map = self.read_map()?;
        Ok(map.get(CREDENTIAL_KEY).filter(|v| !v.is_empty()).cloned())
    }

    fn save(&self, value: &str) -> Result<()> {
        let mut map = self.read_map()?;
        map.insert(CREDENTIAL_KEY.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(ChatError::from)
                .context("Failed to create parent directory for storage file")?;
        }

        let json = serde_json::to_string_pretty(&map).map_err(ChatError::from)?;
        std::fs::write(&self.path, json)
            .map_err(ChatError::from)
            .with_context(|| format!("Failed to write storage file {}", self.path.display()))?;
        tracing::debug!("Saved credential to {}", self.path.display());
        Ok(())
    }
}

/// In-process store; nothing survives the process
#[derive(Default)]
pub struct MemoryStore {
    value: Mutex<Option<String>>,
}

impl MemoryStore {
    /// Empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Memory store seeded with a credential
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(value.into())),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Result<Option<String>> {
        let value = self
            .value
            .lock()
            .map_err(|_| ChatError::Storage("memory store lock poisoned".to_string()))?;
        Ok(value.clone().filter(|v| !v.is_empty()))
    }

    fn save(&self, value: &str) -> Result<()> {
        let mut slot = self
            .value
            .lock()
            .map_err(|_| ChatError::Storage("memory store lock poisoned".to_string()))?;
        *slot = Some(value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Helper: file store in a fresh temp directory.
    ///
    /// Returns the `TempDir` too so the directory outlives the store.
    fn create_test_store() -> (FileStore, tempfile::TempDir) {
        let dir = tempdir().expect("failed to create tempdir");
        let store = FileStore::new(dir.path().join("storage.json"));
        (store, dir)
    }

    #[test]
    fn test_file_store_empty_when_missing() {
        let (store, _dir) = create_test_store();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_file_store_round_trip() {
        let (store, _dir) = create_test_store();
        store.save("sk-first").unwrap();
        store.save("sk-second").unwrap();
        assert_eq!(store.load().unwrap(), Some("sk-second".to_string()));
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let (store, dir) = create_test_store();
        store.save("sk-persisted").unwrap();
        drop(store);

        let reopened = FileStore::new(dir.path().join("storage.json"));
        assert_eq!(reopened.load().unwrap(), Some("sk-persisted".to_string()));
    }

    #[test]
    fn test_file_store_uses_fixed_key_and_preserves_others() {
        let (store, _dir) = create_test_store();
        std::fs::write(store.path(), r#"{"theme":"dark"}"#).unwrap();

        store.save("sk-x").unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let map: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(map.get("theme"), Some(&"dark".to_string()));
        assert_eq!(map.get(CREDENTIAL_KEY), Some(&"sk-x".to_string()));
    }

    #[test]
    fn test_file_store_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("storage.json");
        let store = FileStore::new(&path);
        store.save("sk-nested").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_file_store_malformed_file_errors() {
        let (store, _dir) = create_test_store();
        std::fs::write(store.path(), "not json").unwrap();
        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("Malformed storage file"));
        assert!(matches!(
            err.downcast_ref::<ChatError>(),
            Some(ChatError::Serialization(_))
        ));
    }

    #[test]
    fn test_file_store_write_failure_is_io_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let store = FileStore::new(blocker.join("storage.json"));
        let err = store.save("sk-x").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChatError>(),
            Some(ChatError::Io(_))
        ));
    }

    #[test]
    fn test_file_store_empty_value_reads_as_none() {
        let (store, _dir) = create_test_store();
        std::fs::write(store.path(), r#"{"openai-api-key":""}"#).unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), None);
        store.save("sk-mem").unwrap();
        assert_eq!(store.load().unwrap(), Some("sk-mem".to_string()));

        let seeded = MemoryStore::with_value("sk-seed");
        assert_eq!(seeded.load().unwrap(), Some("sk-seed".to_string()));
    }

    #[test]
    fn test_open_store_file_backend_with_path() {
        let dir = tempdir().unwrap();
        let config = StorageConfig {
            backend: StorageBackend::File,
            path: Some(dir.path().join("s.json")),
        };
        let store = open_store(&config).unwrap();
        store.save("sk-open").unwrap();
        assert_eq!(store.load().unwrap(), Some("sk-open".to_string()));
    }

    #[test]
    fn test_open_store_memory_backend() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
            path: None,
        };
        let store = open_store(&config).unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_keyring_store_names() {
        let store = KeyringStore::new();
        assert_eq!(store.service, "chatclone");
        assert_eq!(store.user, "openai-api-key");
    }
}
