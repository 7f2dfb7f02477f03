mod common;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chatclone::error::ChatError;
use chatclone::model::ChatModel;
use chatclone::providers::{CompletionRequest, CompletionSettings, Message, Provider};

use common::{completion_body, provider_for};

fn request(model: ChatModel, messages: Vec<Message>) -> CompletionRequest {
    CompletionRequest::new(model, messages, CompletionSettings::default(), "sk-test")
}

/// A successful call posts the whole history and returns the first choice
#[tokio::test]
async fn test_complete_posts_history_and_returns_first_choice() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "model": "gpt-4-turbo-preview",
            "temperature": 0.7,
            "max_tokens": 1000,
            "messages": [
                { "role": "user", "content": "Hi" },
                { "role": "assistant", "content": "Hello! How can I help?" },
                { "role": "user", "content": "Tell me a joke" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Why did...")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server.uri());
    let response = provider
        .complete(&request(
            ChatModel::AdvancedFast,
            vec![
                Message::user("Hi"),
                Message::assistant("Hello! How can I help?"),
                Message::user("Tell me a joke"),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.text(), Some("Why did..."));
    let usage = response.usage.expect("usage should be parsed");
    assert_eq!(usage.prompt_tokens, 9);
    assert_eq!(usage.completion_tokens, 12);
}

/// A trailing slash on the base URL does not produce a double slash
#[tokio::test]
async fn test_trailing_slash_in_api_base() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&format!("{}/", server.uri()));
    let response = provider
        .complete(&request(ChatModel::Basic, vec![Message::user("ping")]))
        .await
        .unwrap();
    assert_eq!(response.text(), Some("ok"));
}

/// 401 surfaces as an authentication error
#[tokio::test]
async fn test_unauthorized_maps_to_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server.uri());
    let err = provider
        .complete(&request(ChatModel::Basic, vec![Message::user("Hello")]))
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ChatError>(),
        Some(ChatError::Authentication(_))
    ));
}

/// Any other non-success status is a provider error carrying the status
#[tokio::test]
async fn test_server_error_maps_to_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let provider = provider_for(&server.uri());
    let err = provider
        .complete(&request(ChatModel::Basic, vec![Message::user("Hello")]))
        .await
        .unwrap_err();

    match err.downcast_ref::<ChatError>() {
        Some(ChatError::Provider(msg)) => {
            assert!(msg.contains("500"));
            assert!(msg.contains("upstream exploded"));
        }
        other => panic!("expected provider error, got {:?}", other),
    }
}

/// A body that is not JSON is a provider error
#[tokio::test]
async fn test_malformed_body_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let provider = provider_for(&server.uri());
    let err = provider
        .complete(&request(ChatModel::Basic, vec![Message::user("Hello")]))
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to parse completion response"));
    assert!(matches!(
        err.downcast_ref::<ChatError>(),
        Some(ChatError::Serialization(_))
    ));
}

/// An empty choice list yields no text rather than an error
#[tokio::test]
async fn test_no_choices_yields_no_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let provider = provider_for(&server.uri());
    let response = provider
        .complete(&request(ChatModel::Basic, vec![Message::user("Hello")]))
        .await
        .unwrap();
    assert_eq!(response.text(), None);
}

/// An unreachable endpoint is an error, not a hang or panic
#[tokio::test]
async fn test_unreachable_endpoint_is_error() {
    // Nothing listens on port 1
    let provider = provider_for("http://127.0.0.1:1");
    let err = provider
        .complete(&request(ChatModel::Basic, vec![Message::user("Hello")]))
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ChatError>(),
        Some(ChatError::Http(_))
    ));
}
