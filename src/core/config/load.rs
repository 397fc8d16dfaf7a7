//! Configuration loading with env-var overrides.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::logger::parse_level;

use super::raw::{self, ModelDefault, RawConfig, RawModel};
use super::types::*;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Values taken from the process environment.
///
/// Captured once by [`load`]; tests build one by hand and call
/// [`load_from`] instead of mutating env vars.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    /// `ROUTEWISE_LOG_LEVEL`
    pub log_level: Option<String>,
    /// `OPENAI_API_KEY`
    pub openai_api_key: Option<String>,
    /// `GOOGLE_API_KEY`
    pub google_api_key: Option<String>,
    /// `NEO_CONNECTION_URL`
    pub neo_url: Option<String>,
    /// `NEO_USERNAME`
    pub neo_username: Option<String>,
    /// `NEO_PASSWORD`
    pub neo_password: Option<String>,
}

impl EnvOverrides {
    /// Snapshot the relevant variables from the process environment.
    pub fn from_env() -> Self {
        let get = |key: &str| env::var(key).ok().filter(|v| !v.is_empty());
        Self {
            log_level: get("ROUTEWISE_LOG_LEVEL"),
            openai_api_key: get("OPENAI_API_KEY"),
            google_api_key: get("GOOGLE_API_KEY"),
            neo_url: get("NEO_CONNECTION_URL"),
            neo_username: get("NEO_USERNAME"),
            neo_password: get("NEO_PASSWORD"),
        }
    }
}

/// Load config from the given path, or `config/default.toml`, then apply
/// env-var overrides. Without an explicit path and without the default file,
/// the built-in defaults are used.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let overrides = EnvOverrides::from_env();

    if let Some(path) = config_path {
        return load_from(Path::new(path), &overrides);
    }

    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        load_from(default_path, &overrides)
    } else {
        validated(resolve(RawConfig::default(), &overrides))
    }
}

/// Load from an explicit path with explicit overrides.
pub fn load_from(path: &Path, overrides: &EnvOverrides) -> Result<Config, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&text)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    validated(resolve(parsed, overrides))
}

/// `log_level` must be a plain level; filter directives belong in `RUST_LOG`.
fn validated(config: Config) -> Result<Config, AppError> {
    parse_level(&config.log_level)
        .map_err(|e| AppError::Config(format!("log_level: {e}")))?;
    Ok(config)
}

fn resolve(parsed: RawConfig, overrides: &EnvOverrides) -> Config {
    let s = parsed.general;
    let m = parsed.memory;

    let graph_store = GraphStoreConfig {
        url: overrides.neo_url.clone().or(m.graph_store.url),
        username: overrides.neo_username.clone().or(m.graph_store.username),
        password: overrides.neo_password.clone().or(m.graph_store.password),
    };

    Config {
        log_level: overrides.log_level.clone().unwrap_or(s.log_level),
        log_file: s.log_file.as_deref().map(expand_home),
        flow: FlowConfig {
            responder: model_config(parsed.flow.responder, raw::RESPONDER),
            judge: model_config(parsed.flow.judge, raw::JUDGE),
            fallback: model_config(parsed.flow.fallback, raw::FALLBACK),
        },
        chat: model_config(parsed.chat, raw::CHAT),
        memory: MemoryConfig {
            backend: m.backend,
            user_id: m.user_id,
            mem0: Mem0Config {
                api_base_url: m.mem0.api_base_url,
                timeout_seconds: m.mem0.timeout_seconds,
            },
            graph_store,
            vector_store: VectorStoreConfig {
                host: m.vector_store.host,
                port: m.vector_store.port,
            },
            embedding_model: m.embedder.model.unwrap_or_else(|| raw::EMBEDDING_MODEL.to_string()),
            extraction_model: m.llm.model.unwrap_or_else(|| raw::EXTRACTION_MODEL.to_string()),
        },
        api_keys: ApiKeys {
            openai: overrides.openai_api_key.clone(),
            google: overrides.google_api_key.clone(),
        },
    }
}

/// Merge a model section over its own default.
fn model_config(file: RawModel, section: ModelDefault) -> ModelConfig {
    let (provider, model) = file.provider_and_model(section);
    let api_base_url = file
        .api_base_url
        .unwrap_or_else(|| raw::default_api_base_url(&provider));
    ModelConfig {
        provider,
        model,
        api_base_url,
        temperature: file.temperature,
        timeout_seconds: file.timeout_seconds,
    }
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Built-in defaults with no file and no environment.
pub(super) fn builtin() -> Config {
    resolve(RawConfig::default(), &EnvOverrides::default())
}
