//! Resolved configuration types: what the rest of the crate consumes.

use std::path::PathBuf;

/// One model endpoint: which backend, which model, and where to reach it.
///
/// Populated from `[flow.responder]`, `[flow.judge]`, `[flow.fallback]`
/// and `[chat]` in the TOML.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Backend name (`"openai"`, `"gemini"`, `"dummy"`).
    pub provider: String,
    /// Model identifier passed in the request.
    pub model: String,
    /// Chat completions URL for `openai`, API root for `gemini`.
    pub api_base_url: String,
    /// Sampling temperature. Omitted from requests when `None`.
    pub temperature: Option<f32>,
    /// Per-request HTTP timeout. `None` waits indefinitely.
    pub timeout_seconds: Option<u64>,
}

/// The three models wired into the routing flow.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowConfig {
    pub responder: ModelConfig,
    pub judge: ModelConfig,
    pub fallback: ModelConfig,
}

/// Neo4j connection for the mem0 graph store.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphStoreConfig {
    /// `None` disables the graph store entirely.
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Qdrant connection for the mem0 vector store.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorStoreConfig {
    pub host: String,
    pub port: u16,
}

/// mem0 REST server connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Mem0Config {
    /// Server root, e.g. `http://localhost:8888`.
    pub api_base_url: String,
    pub timeout_seconds: Option<u64>,
}

/// Memory subsystem configuration (`[memory]`).
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryConfig {
    /// `"mem0"` or `"local"`.
    pub backend: String,
    /// User the console loop reads and writes memories for.
    pub user_id: String,
    pub mem0: Mem0Config,
    pub graph_store: GraphStoreConfig,
    pub vector_store: VectorStoreConfig,
    /// Embedding model used by mem0.
    pub embedding_model: String,
    /// Model mem0 uses to extract facts from conversations.
    pub extraction_model: String,
}

/// Credentials sourced from the environment, never from TOML.
#[derive(Clone, Default, PartialEq)]
pub struct ApiKeys {
    /// `OPENAI_API_KEY`
    pub openai: Option<String>,
    /// `GOOGLE_API_KEY`
    pub google: Option<String>,
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |k: &Option<String>| if k.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("ApiKeys")
            .field("openai", &mask(&self.openai))
            .field("google", &mask(&self.google))
            .finish()
    }
}

/// Fully-resolved application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub log_level: String,
    /// Log destination (already expanded, no `~`). `None` logs to stderr.
    pub log_file: Option<PathBuf>,
    pub flow: FlowConfig,
    pub chat: ModelConfig,
    pub memory: MemoryConfig,
    pub api_keys: ApiKeys,
}
