//! # Completion Client Tests
//!
//! Runs `OpenAiClient` against a local mockito server.

use mockito::{Matcher, Server};
use serde_json::json;

use data_alchemist::config::{LlmConfig, RecoveryConfig};
use data_alchemist::dialogue::CareerProfile;
use data_alchemist::llm::{generate_project_ideas, CompletionModel, LlmError, OpenAiClient};

fn test_config(base_url: &str, recovery: RecoveryConfig) -> LlmConfig {
    let mut config = LlmConfig::new("test-key", base_url);
    config.model = "gpt-test".to_string();
    config.recovery = recovery;
    config
}

fn fast_recovery(max_retries: u32) -> RecoveryConfig {
    RecoveryConfig {
        max_retries,
        base_retry_delay_ms: 1,
        max_retry_delay_ms: 5,
        operation_timeout_secs: 5,
        ..Default::default()
    }
}

fn completion_body(content: &str) -> String {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

#[tokio::test]
async fn test_completion_success() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-test",
            "messages": [{ "role": "user", "content": "hello" }]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body("hi there"))
        .create_async()
        .await;

    let client = OpenAiClient::new(test_config(&server.url(), fast_recovery(0))).unwrap();
    let text = client.complete("hello").await.unwrap();

    assert_eq!(text, "hi there");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_transient_errors_are_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(503)
        .with_body("overloaded")
        .expect(3)
        .create_async()
        .await;

    let client = OpenAiClient::new(test_config(&server.url(), fast_recovery(2))).unwrap();
    let err = client.complete("hello").await.unwrap_err();

    assert!(matches!(err, LlmError::Status { status: 503, .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(r#"{"error": {"message": "invalid api key"}}"#)
        .expect(1)
        .create_async()
        .await;

    let client = OpenAiClient::new(test_config(&server.url(), fast_recovery(3))).unwrap();
    let err = client.complete("hello").await.unwrap_err();

    match err {
        LlmError::Status { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid api key"));
        }
        other => panic!("unexpected error: {other}"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_circuit_breaker_fails_fast() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(400)
        .expect(1)
        .create_async()
        .await;

    let recovery = RecoveryConfig {
        circuit_breaker_threshold: 1,
        circuit_breaker_reset_secs: 60,
        ..fast_recovery(0)
    };
    let client = OpenAiClient::new(test_config(&server.url(), recovery)).unwrap();

    assert!(matches!(
        client.complete("hello").await,
        Err(LlmError::Status { status: 400, .. })
    ));
    assert!(matches!(client.complete("hello").await, Err(LlmError::CircuitOpen)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_completion_is_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "choices": [] }).to_string())
        .create_async()
        .await;

    let client = OpenAiClient::new(test_config(&server.url(), fast_recovery(0))).unwrap();
    assert!(matches!(client.complete("hello").await, Err(LlmError::EmptyResponse)));
}

#[tokio::test]
async fn test_generate_project_ideas_end_to_end() {
    let mut server = Server::new_async().await;
    let content = "```json\n{\"project_ideas\": [\"Feature store\", \"Data quality checks\", \"Cost dashboard\", \"Lineage graph\", \"Streaming ingestion\"]}\n```";
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::Regex(
            "List 5 recommended projects for Data Engineer, Senior, Logistics".to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body(content))
        .create_async()
        .await;

    let client = OpenAiClient::new(test_config(&server.url(), fast_recovery(0))).unwrap();
    let profile = CareerProfile {
        job_title: "Data Engineer".to_string(),
        level: "Senior".to_string(),
        industry: "Logistics".to_string(),
    };

    let ideas = generate_project_ideas(&client, &profile).await.unwrap();
    assert_eq!(ideas.len(), 5);
    assert_eq!(ideas[0], "Feature store");
    mock.assert_async().await;
}
