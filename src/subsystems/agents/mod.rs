//! Agents: the orchestration logic that sits between the user and the
//! models.
//!
//! - **routing**: respond → evaluate → optional fallback flow.
//! - **memory_chat**: memory-grounded chat turn.
//! - **core**: prompt templates shared by both.

pub mod core;
pub mod memory_chat;
pub mod routing;
