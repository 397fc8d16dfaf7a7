//! Raw TOML shape, the `serde` target before resolution.
//!
//! Every section and field is optional. Model sections keep their keys as
//! `Option`s and are merged over that section's own default at resolve time,
//! so an empty file and no file at all resolve the same way, and a section
//! only needs the keys that differ.

use serde::Deserialize;

#[derive(Deserialize, Default)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub general: RawGeneral,
    #[serde(default)]
    pub flow: RawFlow,
    #[serde(default)]
    pub chat: RawModel,
    #[serde(default)]
    pub memory: RawMemory,
}

#[derive(Deserialize)]
pub(super) struct RawGeneral {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_file: Option<String>,
}

impl Default for RawGeneral {
    fn default() -> Self {
        Self { log_level: default_log_level(), log_file: None }
    }
}

#[derive(Deserialize, Default)]
pub(super) struct RawFlow {
    #[serde(default)]
    pub responder: RawModel,
    #[serde(default)]
    pub judge: RawModel,
    #[serde(default)]
    pub fallback: RawModel,
}

/// A model section exactly as written in the file.
#[derive(Deserialize, Default, Clone)]
pub(super) struct RawModel {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

/// Provider and model a section falls back to.
#[derive(Debug, Clone, Copy)]
pub(super) struct ModelDefault {
    pub provider: &'static str,
    pub model: &'static str,
}

pub(super) const RESPONDER: ModelDefault = ModelDefault { provider: "openai", model: "gpt-4.1-mini" };
pub(super) const JUDGE: ModelDefault = ModelDefault { provider: "openai", model: "gpt-4o-mini" };
pub(super) const FALLBACK: ModelDefault = ModelDefault { provider: "gemini", model: "gemini-pro" };
pub(super) const CHAT: ModelDefault = ModelDefault { provider: "openai", model: "gpt-4.1-mini" };

impl RawModel {
    /// Provider and model after merging over `section`.
    ///
    /// A section that switches provider without naming a model gets that
    /// provider's default model, not the section's.
    pub fn provider_and_model(&self, section: ModelDefault) -> (String, String) {
        let provider = self.provider.clone().unwrap_or_else(|| section.provider.to_string());
        let model = match &self.model {
            Some(model) => model.clone(),
            None if provider == section.provider => section.model.to_string(),
            None => default_model_for(&provider).to_string(),
        };
        (provider, model)
    }
}

#[derive(Deserialize)]
pub(super) struct RawMemory {
    #[serde(default = "default_memory_backend")]
    pub backend: String,
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default)]
    pub mem0: RawMem0,
    #[serde(default)]
    pub graph_store: RawGraphStore,
    #[serde(default)]
    pub vector_store: RawVectorStore,
    #[serde(default)]
    pub embedder: RawMemoryModel,
    #[serde(default)]
    pub llm: RawMemoryModel,
}

impl Default for RawMemory {
    fn default() -> Self {
        Self {
            backend: default_memory_backend(),
            user_id: default_user_id(),
            mem0: RawMem0::default(),
            graph_store: RawGraphStore::default(),
            vector_store: RawVectorStore::default(),
            embedder: RawMemoryModel::default(),
            llm: RawMemoryModel::default(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawMem0 {
    #[serde(default = "default_mem0_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl Default for RawMem0 {
    fn default() -> Self {
        Self { api_base_url: default_mem0_url(), timeout_seconds: None }
    }
}

#[derive(Deserialize, Default)]
pub(super) struct RawGraphStore {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct RawVectorStore {
    #[serde(default = "default_vector_host")]
    pub host: String,
    #[serde(default = "default_vector_port")]
    pub port: u16,
}

impl Default for RawVectorStore {
    fn default() -> Self {
        Self { host: default_vector_host(), port: default_vector_port() }
    }
}

/// `[memory.embedder]` / `[memory.llm]`; each resolves against its own default.
#[derive(Deserialize, Default)]
pub(super) struct RawMemoryModel {
    #[serde(default)]
    pub model: Option<String>,
}

pub(super) const EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub(super) const EXTRACTION_MODEL: &str = "gpt-4.1";

fn default_log_level() -> String { "info".to_string() }
fn default_memory_backend() -> String { "mem0".to_string() }
fn default_user_id() -> String { "default_user".to_string() }
fn default_mem0_url() -> String { "http://localhost:8888".to_string() }
fn default_vector_host() -> String { "localhost".to_string() }
fn default_vector_port() -> u16 { 6333 }

fn default_model_for(provider: &str) -> &'static str {
    match provider {
        "gemini" => FALLBACK.model,
        _ => RESPONDER.model,
    }
}

/// Endpoint used when a model section omits `api_base_url`.
pub(super) fn default_api_base_url(provider: &str) -> String {
    match provider {
        "gemini" => "https://generativelanguage.googleapis.com/v1beta".to_string(),
        _ => "https://api.openai.com/v1/chat/completions".to_string(),
    }
}
