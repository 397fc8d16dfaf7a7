//! HTTP-level tests for the OpenAI-compatible and Gemini providers,
//! using wiremock servers in place of the real APIs.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use routewise::config::{ApiKeys, ModelConfig};
use routewise::llm::providers::{self, gemini::GeminiProvider};
use routewise::llm::providers::openai_compatible::OpenAiCompatibleProvider;
use routewise::llm::{ChatMessage, LlmUsage, ProviderError};

fn openai(server: &MockServer, api_key: Option<&str>) -> OpenAiCompatibleProvider {
    OpenAiCompatibleProvider::new(
        format!("{}/v1/chat/completions", server.uri()),
        "gpt-4.1-mini".to_string(),
        None,
        Some(5),
        api_key.map(str::to_string),
    )
    .unwrap()
}

fn gemini(server: &MockServer) -> GeminiProvider {
    GeminiProvider::new(server.uri(), "gemini-pro".to_string(), None, Some(5), "g-key".to_string())
        .unwrap()
}

#[tokio::test]
async fn openai_sends_model_messages_and_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_json(json!({
            "model": "gpt-4.1-mini",
            "messages": [
                { "role": "system", "content": "ctx" },
                { "role": "user", "content": "2+2?" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "4" } }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 1 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = openai(&server, Some("sk-test"))
        .complete(&[ChatMessage::system("ctx"), ChatMessage::user("2+2?")])
        .await
        .unwrap();

    assert_eq!(reply.text, "4");
    assert_eq!(reply.usage.map(|u| u.input_tokens), Some(12));
}

#[tokio::test]
async fn openai_error_envelope_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided", "code": "invalid_api_key" }
        })))
        .mount(&server)
        .await;

    let err = openai(&server, None).complete(&[ChatMessage::user("hi")]).await.unwrap_err();

    let ProviderError::Request(msg) = err else { panic!("expected request error") };
    assert!(msg.contains("401"));
    assert!(msg.contains("invalid_api_key"));
    assert!(msg.contains("Incorrect API key provided"));
}

#[tokio::test]
async fn openai_plain_error_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = openai(&server, None).complete(&[ChatMessage::user("hi")]).await.unwrap_err();
    assert!(err.to_string().contains("HTTP 502"));
    assert!(err.to_string().contains("bad gateway"));
}

#[tokio::test]
async fn openai_empty_content_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "" } }]
        })))
        .mount(&server)
        .await;

    let reply = openai(&server, None).complete(&[ChatMessage::user("hi")]).await.unwrap();
    assert_eq!(reply.text, "");
}

#[tokio::test]
async fn openai_unparsable_body_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = openai(&server, None).complete(&[ChatMessage::user("hi")]).await.unwrap_err();
    assert!(err.to_string().contains("failed to parse response body"));
}

#[tokio::test]
async fn gemini_sends_key_as_query_param() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-pro:generateContent"))
        .and(query_param("key", "g-key"))
        .and(body_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "2+2?" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": "4" }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = gemini(&server).complete(&[ChatMessage::user("2+2?")]).await.unwrap();
    assert_eq!(reply.text, "4");
}

#[tokio::test]
async fn gemini_http_error_is_reported_without_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT" }
        })))
        .mount(&server)
        .await;

    let err = gemini(&server).complete(&[ChatMessage::user("hi")]).await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("HTTP 400 Bad Request [code=400]"));
    assert!(msg.contains("API key not valid"));
    assert!(!msg.contains("g-key"));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_request_error() {
    // nothing listens on port 1
    let provider = OpenAiCompatibleProvider::new(
        "http://127.0.0.1:1/v1/chat/completions".into(),
        "m".into(),
        None,
        Some(2),
        None,
    )
    .unwrap();
    let err = provider.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
    assert!(matches!(err, ProviderError::Request(_)));
}

#[tokio::test]
async fn usage_survives_enum_dispatch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "4" }] } }],
            "usageMetadata": { "promptTokenCount": 9, "candidatesTokenCount": 1 }
        })))
        .mount(&server)
        .await;

    let config = ModelConfig {
        provider: "gemini".into(),
        model: "gemini-pro".into(),
        api_base_url: server.uri(),
        temperature: None,
        timeout_seconds: Some(5),
    };
    let keys = ApiKeys { openai: None, google: Some("g-key".into()) };
    let provider = providers::build(&config, &keys).unwrap();

    let reply = provider.complete(&[ChatMessage::user("2+2?")]).await.unwrap();
    assert_eq!(reply.text, "4");
    assert_eq!(reply.usage, Some(LlmUsage { input_tokens: 9, output_tokens: 1 }));
}
