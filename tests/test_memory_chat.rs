//! Memory chat against a mocked mem0 server and a mocked chat model.

use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use routewise::config::{
    ApiKeys, GraphStoreConfig, Mem0Config, MemoryConfig, ModelConfig, VectorStoreConfig,
};
use routewise::llm::providers;
use routewise::subsystems::agents::memory_chat::MemoryChat;
use routewise::subsystems::comms::pty::{ConsoleExit, run_console};
use routewise::subsystems::memory::local::LocalMemory;
use routewise::subsystems::memory::{self, MemoryError, MemoryStore};

fn memory_config(mem0: &MockServer) -> MemoryConfig {
    MemoryConfig {
        backend: "mem0".into(),
        user_id: "vaibhav".into(),
        mem0: Mem0Config { api_base_url: mem0.uri(), timeout_seconds: Some(5) },
        graph_store: GraphStoreConfig::default(),
        vector_store: VectorStoreConfig { host: "localhost".into(), port: 6333 },
        embedding_model: "text-embedding-3-small".into(),
        extraction_model: "gpt-4.1".into(),
    }
}

fn chat_model(llm: &MockServer) -> ModelConfig {
    ModelConfig {
        provider: "openai".into(),
        model: "gpt-4.1-mini".into(),
        api_base_url: format!("{}/v1/chat/completions", llm.uri()),
        temperature: None,
        timeout_seconds: Some(5),
    }
}

fn keys() -> ApiKeys {
    ApiKeys { openai: Some("sk-test".into()), google: None }
}

async fn mount_configure(mem0: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/configure"))
        .and(body_partial_json(json!({ "version": "v1.1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(mem0)
        .await;
}

async fn mount_reply(llm: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": text } }]
        })))
        .mount(llm)
        .await;
}

async fn chat(mem0: &MockServer, llm: &MockServer) -> MemoryChat {
    let cfg = memory_config(mem0);
    let store = memory::build(&cfg, &keys()).await.unwrap();
    assert!(matches!(store, MemoryStore::Mem0(_)));
    let provider = providers::build(&chat_model(llm), &keys()).unwrap();
    MemoryChat::new(provider, store, cfg.user_id)
}

#[tokio::test]
async fn first_turn_with_no_memories() {
    let mem0 = MockServer::start().await;
    let llm = MockServer::start().await;
    mount_configure(&mem0).await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_json(json!({ "query": "Hi, my name is Vaibhav", "user_id": "vaibhav" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(1)
        .mount(&mem0)
        .await;
    Mock::given(method("POST"))
        .and(path("/memories"))
        .and(body_json(json!({
            "messages": [
                { "role": "user", "content": "Hi, my name is Vaibhav" },
                { "role": "assistant", "content": "Nice to meet you, Vaibhav!" }
            ],
            "user_id": "vaibhav"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(1)
        .mount(&mem0)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [
                { "role": "system", "content": "Here is the context about the user:\n[]" },
                { "role": "user", "content": "Hi, my name is Vaibhav" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "Nice to meet you, Vaibhav!" } }]
        })))
        .expect(1)
        .mount(&llm)
        .await;

    let reply = chat(&mem0, &llm).await.respond("Hi, my name is Vaibhav").await.unwrap();
    assert_eq!(reply, "Nice to meet you, Vaibhav!");
}

#[tokio::test]
async fn found_memories_reach_the_system_prompt() {
    let mem0 = MockServer::start().await;
    let llm = MockServer::start().await;
    mount_configure(&mem0).await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "id": "m1", "memory": "Name is Vaibhav", "score": 0.9 }]
        })))
        .mount(&mem0)
        .await;
    Mock::given(method("POST"))
        .and(path("/memories"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mem0)
        .await;
    let system = "Here is the context about the user:\n[\"ID: m1\\nMemory: Name is Vaibhav\"]";
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [{ "role": "system", "content": system }, { "role": "user", "content": "who am I?" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "You are Vaibhav." } }]
        })))
        .expect(1)
        .mount(&llm)
        .await;

    let reply = chat(&mem0, &llm).await.respond("who am I?").await.unwrap();
    assert_eq!(reply, "You are Vaibhav.");
}

#[tokio::test]
async fn search_failure_aborts_the_turn() {
    let mem0 = MockServer::start().await;
    let llm = MockServer::start().await;
    mount_configure(&mem0).await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("qdrant down"))
        .mount(&mem0)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&llm)
        .await;

    let err = chat(&mem0, &llm).await.respond("hello").await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("HTTP 503"));
    assert!(msg.contains("/search"));
}

#[tokio::test]
async fn configure_failure_is_reported_at_build() {
    let mem0 = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/configure"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mem0)
        .await;

    let err = memory::build(&memory_config(&mem0), &keys()).await.unwrap_err();
    assert!(matches!(err, MemoryError::Request(ref m) if m.contains("/configure")));
}

#[tokio::test]
async fn console_session_over_mocked_services() {
    let mem0 = MockServer::start().await;
    let llm = MockServer::start().await;
    mount_configure(&mem0).await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(2)
        .mount(&mem0)
        .await;
    Mock::given(method("POST"))
        .and(path("/memories"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&mem0)
        .await;
    mount_reply(&llm, "ok").await;

    let chat = chat(&mem0, &llm).await;
    let mut out = Vec::new();
    let exit = run_console(&chat, &b"one\ntwo\n"[..], &mut out, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(exit, ConsoleExit::EndOfInput);
    assert_eq!(String::from_utf8(out).unwrap(), "> ok\n> ok\n> \n");
}

#[tokio::test]
async fn shutdown_interrupts_a_hung_turn() {
    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(60))
                .set_body_json(json!({ "choices": [{ "message": { "content": "late" } }] })),
        )
        .mount(&llm)
        .await;

    let mut model = chat_model(&llm);
    model.timeout_seconds = None;
    let provider = providers::build(&model, &keys()).unwrap();
    let local = LocalMemory::default();
    let chat = MemoryChat::new(provider, MemoryStore::Local(local.clone()), "vaibhav");

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let mut out = Vec::new();
    let exit = tokio::time::timeout(
        Duration::from_secs(10),
        run_console(&chat, &b"hello\n"[..], &mut out, shutdown),
    )
    .await
    .expect("console must stop once shutdown is cancelled")
    .unwrap();

    assert_eq!(exit, ConsoleExit::Shutdown);
    assert!(local.is_empty());
    assert_eq!(String::from_utf8(out).unwrap(), "> \n");
}
