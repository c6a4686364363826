use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use notebook::config::{GeminiConfig, OllamaConfig};
use notebook::error::NotebookError;
use notebook::llm::{AiRequest, AiService, GeminiClient, OllamaClient};

fn gemini(base_url: String) -> GeminiClient {
    GeminiClient::new(&GeminiConfig {
        api_key: Some("test-key".to_string()),
        base_url,
        model: "gemini-2.0-flash".to_string(),
        timeout_secs: 5,
    })
    .unwrap()
}

fn ollama(base_url: String) -> OllamaClient {
    OllamaClient::new(&OllamaConfig {
        base_url,
        model: "llama3.2".to_string(),
        timeout_secs: 5,
    })
    .unwrap()
}

fn gemini_body(text: &str) -> serde_json::Value {
    json!({
        "candidates": [
            {
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }
        ],
        "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 8, "totalTokenCount": 20}
    })
}

fn ollama_body(text: &str) -> serde_json::Value {
    json!({
        "model": "llama3.2",
        "message": {"role": "assistant", "content": text},
        "done": true,
        "prompt_eval_count": 30,
        "eval_count": 12
    })
}

#[tokio::test]
async fn test_gemini_generate_sends_key_and_reads_first_part() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "systemInstruction": {"parts": [{"text": "Use the sources"}]},
            "contents": [{"role": "user", "parts": [{"text": "What is Rust?"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(
            "Rust is a systems language [intro.md].",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let request = AiRequest::new("What is Rust?").with_system_instruction("Use the sources");
    let response = gemini(server.uri())
        .generate(&request, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.text, "Rust is a systems language [intro.md].");
    assert_eq!(response.total_tokens, Some(20));
}

#[tokio::test]
async fn test_gemini_unauthorized_maps_to_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let err = gemini(server.uri())
        .generate(&AiRequest::new("q"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, NotebookError::AiAuth(_)));
}

#[tokio::test]
async fn test_gemini_invalid_key_body_maps_to_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT",
                      "details": [{"reason": "API_KEY_INVALID"}]}
        })))
        .mount(&server)
        .await;

    let err = gemini(server.uri())
        .generate(&AiRequest::new("q"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, NotebookError::AiAuth(_)));
}

#[tokio::test]
async fn test_gemini_server_error_carries_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&server)
        .await;

    let err = gemini(server.uri())
        .generate(&AiRequest::new("q"), &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        NotebookError::Ai(message) => {
            assert!(message.contains("500"));
            assert!(message.contains("backend exploded"));
        }
        other => panic!("expected Ai error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_gemini_lists_models_without_prefix() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{"name": "models/gemini-2.0-flash"}, {"name": "models/gemini-1.5-pro"}]
        })))
        .mount(&server)
        .await;

    let client = gemini(server.uri());
    assert_eq!(
        client.list_models(&CancellationToken::new()).await.unwrap(),
        vec!["gemini-2.0-flash", "gemini-1.5-pro"]
    );
    assert!(client.health_check(&CancellationToken::new()).await.is_ok());
}

#[tokio::test]
async fn test_ollama_generate_non_streaming() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "llama3.2",
            "stream": false,
            "messages": [
                {"role": "system", "content": "Use the sources"},
                {"role": "user", "content": "Summarize"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ollama_body("A summary.")))
        .expect(1)
        .mount(&server)
        .await;

    let request = AiRequest::new("Summarize").with_system_instruction("Use the sources");
    let response = ollama(server.uri())
        .generate(&request, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.text, "A summary.");
    assert_eq!(response.total_tokens, Some(42));
}

#[tokio::test]
async fn test_ollama_tags_back_health_and_models() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{"name": "llama3.2:latest"}, {"name": "mistral:7b"}]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = ollama(server.uri());
    client.health_check(&CancellationToken::new()).await.unwrap();
    assert_eq!(
        client.list_models(&CancellationToken::new()).await.unwrap(),
        vec!["llama3.2:latest", "mistral:7b"]
    );
}

#[tokio::test]
async fn test_ollama_unreachable_is_unavailable() {
    // Port 1 is reserved and refuses connections.
    let client = ollama("http://127.0.0.1:1".to_string());

    let err = client
        .generate(&AiRequest::new("q"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, NotebookError::AiUnavailable(_)));
    assert!(err.to_string().contains("Is the daemon running?"));
}

#[tokio::test]
async fn test_ollama_empty_content_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ollama_body("   ")))
        .mount(&server)
        .await;

    let err = ollama(server.uri())
        .generate(&AiRequest::new("q"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, NotebookError::Ai(_)));
}

#[tokio::test]
async fn test_cancellation_interrupts_slow_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ollama_body("too late"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = ollama(server.uri())
        .generate(&AiRequest::new("q"), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, NotebookError::Cancelled));
}

#[tokio::test]
async fn test_cancellation_interrupts_slow_model_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"models": [{"name": "llama3.2:latest"}]}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let client = ollama(server.uri());
    let err = client.list_models(&cancel).await.unwrap_err();
    assert!(matches!(err, NotebookError::Cancelled));

    // The token stays cancelled, so health checks stop immediately as well.
    let err = client.health_check(&cancel).await.unwrap_err();
    assert!(matches!(err, NotebookError::Cancelled));
}

#[tokio::test]
async fn test_gemini_model_listing_honours_cancellation() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"models": []}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = gemini(server.uri()).list_models(&cancel).await.unwrap_err();
    assert!(matches!(err, NotebookError::Cancelled));
}

#[tokio::test]
async fn test_blank_prompt_is_rejected_without_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ollama_body("x")))
        .expect(0)
        .mount(&server)
        .await;

    let err = ollama(server.uri())
        .generate(&AiRequest::new("  "), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, NotebookError::Validation(_)));
}
