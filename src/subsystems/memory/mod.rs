//! Memory subsystem: user-scoped conversational memory.
//!
//! `MemoryStore` is an enum over backends, mirroring [`LlmProvider`]:
//!
//! - **mem0**: REST client for a mem0 server, which owns embedding, the
//!   qdrant vector store and the neo4j graph store.
//! - **local**: in-process store with plain word-overlap search, for
//!   offline runs and tests.
//!
//! Records are owned by the backend; callers only search and append.
//!
//! [`LlmProvider`]: crate::llm::LlmProvider

pub mod local;
pub mod mem0;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::{ApiKeys, MemoryConfig};
use crate::llm::ChatMessage;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("unknown memory backend: {0}")]
    UnknownBackend(String),
    #[error("memory request failed: {0}")]
    Request(String),
}

// ── Types ─────────────────────────────────────────────────────────────────────

/// One stored memory, as returned by `search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: String,
    pub memory: String,
    #[serde(default)]
    pub user_id: String,
}

// ── Store enum ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum MemoryStore {
    Mem0(mem0::Mem0Client),
    Local(local::LocalMemory),
}

impl MemoryStore {
    /// Records relevant to `query` for `user_id`, most relevant first.
    pub async fn search(&self, query: &str, user_id: &str) -> Result<Vec<MemoryRecord>, MemoryError> {
        match self {
            MemoryStore::Mem0(m) => m.search(query, user_id).await,
            MemoryStore::Local(m) => Ok(m.search(query, user_id)),
        }
    }

    /// Append a conversation turn to `user_id`'s memory.
    pub async fn add(&self, user_id: &str, messages: &[ChatMessage]) -> Result<(), MemoryError> {
        match self {
            MemoryStore::Mem0(m) => m.add(user_id, messages).await,
            MemoryStore::Local(m) => {
                m.add(user_id, messages);
                Ok(())
            }
        }
    }
}

/// Construct the configured backend. For mem0 this pushes the store
/// configuration to the server before returning.
pub async fn build(config: &MemoryConfig, keys: &ApiKeys) -> Result<MemoryStore, MemoryError> {
    match config.backend.as_str() {
        "mem0" => {
            let client = mem0::Mem0Client::new(
                config.mem0.api_base_url.clone(),
                config.mem0.timeout_seconds,
            )?;
            client.configure(&mem0::server_config(config, keys)).await?;
            info!(url = %config.mem0.api_base_url, "mem0 memory store configured");
            Ok(MemoryStore::Mem0(client))
        }
        "local" => {
            info!("using in-process memory store");
            Ok(MemoryStore::Local(local::LocalMemory::default()))
        }
        other => Err(MemoryError::UnknownBackend(other.to_string())),
    }
}
