//! LLM provider implementations.
//!
//! `build(config, keys)` is the factory, called once at startup for each
//! configured model. Adding a new backend = new module + new match arm.

pub mod dummy;
pub mod gemini;
pub mod openai_compatible;
#[cfg(any(test, feature = "testing"))]
pub mod scripted;

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::error;

use crate::config::{ApiKeys, ModelConfig};
use crate::llm::{LlmProvider, ProviderError};

/// Construct a `LlmProvider` from a model section and the env-sourced keys.
///
/// `openai` may run keyless when pointed at a local endpoint; `gemini`
/// always needs `GOOGLE_API_KEY`.
pub fn build(config: &ModelConfig, keys: &ApiKeys) -> Result<LlmProvider, ProviderError> {
    match config.provider.as_str() {
        "dummy" => Ok(LlmProvider::Dummy(dummy::DummyProvider)),
        "openai" | "openai-compatible" => {
            let p = openai_compatible::OpenAiCompatibleProvider::new(
                config.api_base_url.clone(),
                config.model.clone(),
                config.temperature,
                config.timeout_seconds,
                keys.openai.clone(),
            )?;
            Ok(LlmProvider::OpenAiCompatible(p))
        }
        "gemini" => {
            let api_key = keys.google.clone().ok_or_else(|| ProviderError::MissingApiKey {
                provider: "gemini".into(),
                env_var: "GOOGLE_API_KEY",
            })?;
            let p = gemini::GeminiProvider::new(
                config.api_base_url.clone(),
                config.model.clone(),
                config.temperature,
                config.timeout_seconds,
                api_key,
            )?;
            Ok(LlmProvider::Gemini(p))
        }
        other => Err(ProviderError::UnknownProvider(other.to_string())),
    }
}

/// Build a `reqwest::Client`, with a per-request timeout only when configured.
pub(crate) fn http_client(timeout_seconds: Option<u64>) -> Result<Client, ProviderError> {
    let mut builder = Client::builder();
    if let Some(secs) = timeout_seconds {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))
}

// Error envelope shared by OpenAI, compatible servers and Gemini.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Consume the response and return it if successful, or a structured error.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(env) => {
            let code = env
                .error
                .code
                .map(|v| match v {
                    serde_json::Value::String(s) => format!(" [code={s}]"),
                    other => format!(" [code={other}]"),
                })
                .unwrap_or_default();
            format!("HTTP {status}{code}: {}", env.error.message)
        }
        Err(_) => format!("HTTP {status}: {body}"),
    };

    error!(%status, %message, "LLM request returned HTTP error");
    Err(ProviderError::Request(message))
}
