//! mem0 REST server client.
//!
//! The server does the heavy lifting (fact extraction, embeddings, qdrant,
//! neo4j). This client only speaks three endpoints:
//!
//! - `POST /configure`: push the store configuration once at startup
//! - `POST /search`: `{query, user_id}` → `{results: [...]}`
//! - `POST /memories`: `{messages, user_id}`

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, error, trace};

use super::{MemoryError, MemoryRecord};
use crate::config::{ApiKeys, MemoryConfig};
use crate::llm::ChatMessage;

/// mem0 config schema version sent to `/configure`.
const CONFIG_VERSION: &str = "v1.1";

#[derive(Debug, Clone)]
pub struct Mem0Client {
    client: Client,
    api_base_url: String,
}

impl Mem0Client {
    pub fn new(api_base_url: String, timeout_seconds: Option<u64>) -> Result<Self, MemoryError> {
        let mut builder = Client::builder();
        if let Some(secs) = timeout_seconds {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| MemoryError::Request(format!("failed to build HTTP client: {e}")))?;
        let api_base_url = api_base_url.trim_end_matches('/').to_string();
        Ok(Self { client, api_base_url })
    }

    pub async fn configure(&self, config: &Value) -> Result<(), MemoryError> {
        self.post("configure", config).await.map(|_| ())
    }

    pub async fn search(&self, query: &str, user_id: &str) -> Result<Vec<MemoryRecord>, MemoryError> {
        let body = self.post("search", &SearchRequest { query, user_id }).await?;
        let parsed: SearchResponse = serde_json::from_value(body).map_err(|e| {
            error!(error = %e, "unexpected mem0 search response");
            MemoryError::Request(format!("failed to parse search response: {e}"))
        })?;
        debug!(user_id, hits = parsed.results.len(), "mem0 search");
        Ok(parsed.results)
    }

    pub async fn add(&self, user_id: &str, messages: &[ChatMessage]) -> Result<(), MemoryError> {
        self.post("memories", &AddRequest { messages, user_id }).await?;
        debug!(user_id, messages = messages.len(), "mem0 memories added");
        Ok(())
    }

    async fn post<T: Serialize + ?Sized>(&self, endpoint: &str, payload: &T) -> Result<Value, MemoryError> {
        let url = format!("{}/{endpoint}", self.api_base_url);
        trace!(%url, "mem0 request");

        let response = self.client.post(&url).json(payload).send().await.map_err(|e| {
            error!(%url, error = %e, "mem0 HTTP request failed (transport)");
            MemoryError::Request(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%url, %status, "mem0 request returned HTTP error");
            return Err(MemoryError::Request(format!("HTTP {status} from /{endpoint}: {body}")));
        }

        // Some mem0 versions answer with an empty body on success.
        let text = response
            .text()
            .await
            .map_err(|e| MemoryError::Request(format!("failed to read /{endpoint} response: {e}")))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| MemoryError::Request(format!("invalid JSON from /{endpoint}: {e}")))
    }
}

/// Build the `/configure` payload: openai embedder and extraction model,
/// qdrant vector store, and neo4j graph store when a URL is configured.
pub fn server_config(config: &MemoryConfig, keys: &ApiKeys) -> Value {
    let mut payload = json!({
        "version": CONFIG_VERSION,
        "embedder": {
            "provider": "openai",
            "config": { "api_key": keys.openai, "model": config.embedding_model },
        },
        "llm": {
            "provider": "openai",
            "config": { "api_key": keys.openai, "model": config.extraction_model },
        },
        "vector_store": {
            "provider": "qdrant",
            "config": { "host": config.vector_store.host, "port": config.vector_store.port },
        },
    });

    let graph = &config.graph_store;
    if let Some(url) = &graph.url {
        payload["graph_store"] = json!({
            "provider": "neo4j",
            "config": { "url": url, "username": graph.username, "password": graph.password },
        });
    }
    payload
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    user_id: &'a str,
}

#[derive(Debug, Serialize)]
struct AddRequest<'a> {
    messages: &'a [ChatMessage],
    user_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<MemoryRecord>,
}
