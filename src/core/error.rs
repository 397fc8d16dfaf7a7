//! Application-wide error types.

use thiserror::Error;

use crate::llm::ProviderError;
use crate::subsystems::memory::MemoryError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("llm error: {0}")]
    Provider(#[from] ProviderError),

    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
