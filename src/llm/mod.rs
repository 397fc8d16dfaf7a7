//! LLM provider abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Provider instances are shared immutable capabilities; clone them freely.
//! Each `complete` call is exactly one round trip; nothing here retries.

pub mod providers;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("missing API key for provider '{provider}' (set {env_var})")]
    MissingApiKey { provider: String, env_var: &'static str },
    #[error("provider request failed: {0}")]
    Request(String),
}

// ── Messages ──────────────────────────────────────────────────────────────────

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One `{role, content}` entry of a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

// ── Response ──────────────────────────────────────────────────────────────────

/// Token counts reported by the provider, when it reports them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LlmUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Text of the first choice plus optional usage.
///
/// `text` is passed through untouched and may be empty.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmResponse {
    pub text: String,
    pub usage: Option<LlmUsage>,
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
///
/// Enum dispatch avoids `dyn` trait objects and the `async-trait` dependency.
/// Adding a backend = new module + new variant + new `complete` arm.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Dummy(providers::dummy::DummyProvider),
    OpenAiCompatible(providers::openai_compatible::OpenAiCompatibleProvider),
    Gemini(providers::gemini::GeminiProvider),
    /// Queued replies for tests; never built from config.
    #[cfg(any(test, feature = "testing"))]
    Scripted(providers::scripted::ScriptedProvider),
}

impl LlmProvider {
    /// Send the ordered `messages` to the provider and return its reply.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<LlmResponse, ProviderError> {
        let response = match self {
            LlmProvider::Dummy(p) => p.complete(messages).await,
            LlmProvider::OpenAiCompatible(p) => p.complete(messages).await,
            LlmProvider::Gemini(p) => p.complete(messages).await,
            #[cfg(any(test, feature = "testing"))]
            LlmProvider::Scripted(p) => p.complete(messages).await,
        }?;
        if let Some(usage) = response.usage {
            debug!(
                model = self.model(),
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "token usage"
            );
        }
        Ok(response)
    }

    /// Convenience for the single-prompt case: one user message, text only.
    pub async fn prompt(&self, content: &str) -> Result<String, ProviderError> {
        let reply = self.complete(&[ChatMessage::user(content)]).await?;
        Ok(reply.text)
    }

    /// Model identifier, for logging.
    pub fn model(&self) -> &str {
        match self {
            LlmProvider::Dummy(_) => "dummy",
            LlmProvider::OpenAiCompatible(p) => p.model(),
            LlmProvider::Gemini(p) => p.model(),
            #[cfg(any(test, feature = "testing"))]
            LlmProvider::Scripted(_) => "scripted",
        }
    }
}
