//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory,
//! then applies environment overrides. Credentials only ever come from the
//! environment.
//!
//! # Module layout
//!
//! - **types**: Public configuration structs consumed by the flow, the
//!   providers and the memory store (`Config`, `ModelConfig`, …).
//! - **raw**: Raw TOML deserialization types. These mirror the file shape
//!   and carry the serde defaults; kept private.
//! - **load**: Loading logic: `load`, `load_from`, `expand_home`.

mod load;
mod raw;
mod types;

pub use load::{expand_home, load, load_from, EnvOverrides};
pub use types::*;

#[cfg(test)]
impl Config {
    /// Safe `Config` for unit tests: dummy LLMs, local memory, no API keys.
    pub fn test_default() -> Self {
        let dummy = |model: &str| ModelConfig {
            provider: "dummy".into(),
            model: model.into(),
            api_base_url: "http://localhost:0/v1/chat/completions".into(),
            temperature: None,
            timeout_seconds: Some(1),
        };
        let mut cfg = load::builtin();
        cfg.flow = FlowConfig {
            responder: dummy("responder"),
            judge: dummy("judge"),
            fallback: dummy("fallback"),
        };
        cfg.chat = dummy("chat");
        cfg.memory.backend = "local".into();
        cfg.memory.user_id = "test-user".into();
        cfg
    }
}
