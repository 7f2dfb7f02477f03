use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use chatclone::config::ProviderConfig;
use chatclone::model::ChatModel;
use chatclone::providers::{CompletionSettings, OpenAiProvider};
use chatclone::session::ChatSession;
use chatclone::storage::FileStore;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

#[allow(dead_code)]
pub fn temp_file_store() -> (FileStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let store = FileStore::new(tmp.path().join("storage.json"));
    (store, tmp)
}

/// A provider pointed at `api_base` (usually a wiremock server URI)
#[allow(dead_code)]
pub fn provider_for(api_base: &str) -> OpenAiProvider {
    OpenAiProvider::new(ProviderConfig {
        api_base: api_base.to_string(),
        model: ChatModel::Basic,
    })
    .expect("failed to build provider")
}

/// A session talking to `api_base` and persisting into `dir/storage.json`
#[allow(dead_code)]
pub fn session_for(api_base: &str, dir: &TempDir) -> ChatSession {
    ChatSession::new(
        Arc::new(provider_for(api_base)),
        Box::new(FileStore::new(dir.path().join("storage.json"))),
        CompletionSettings::default(),
        ChatModel::Basic,
    )
}

/// A `chat/completions` response body with a single choice
#[allow(dead_code)]
pub fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 9, "completion_tokens": 12, "total_tokens": 21 }
    })
}
