//! Memory-backed chat: every turn is grounded in what the memory store knows
//! about the user, and every turn is written back to it.
//!
//! One [`MemoryChat::respond`] call is one loop iteration:
//! search → system prompt → generate → append turn → reply.

use tracing::{debug, info};

use crate::error::AppError;
use crate::llm::{ChatMessage, LlmProvider};
use crate::subsystems::agents::core::prompt::memory_context_prompt;
use crate::subsystems::memory::MemoryStore;

#[derive(Debug, Clone)]
pub struct MemoryChat {
    provider: LlmProvider,
    memory: MemoryStore,
    user_id: String,
}

impl MemoryChat {
    pub fn new(provider: LlmProvider, memory: MemoryStore, user_id: impl Into<String>) -> Self {
        Self { provider, memory, user_id: user_id.into() }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub async fn respond(&self, query: &str) -> Result<String, AppError> {
        let found = self.memory.search(query, &self.user_id).await?;
        info!(user_id = %self.user_id, memories = found.len(), "memories found");
        debug!(?found, "memory search results");

        let system = memory_context_prompt(&found);
        let reply = self
            .provider
            .complete(&[ChatMessage::system(system), ChatMessage::user(query)])
            .await?
            .text;

        self.memory
            .add(&self.user_id, &[ChatMessage::user(query), ChatMessage::assistant(reply.as_str())])
            .await?;
        info!(user_id = %self.user_id, "memory saved");

        Ok(reply)
    }
}
