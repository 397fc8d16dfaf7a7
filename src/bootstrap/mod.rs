//! Bootstrap layer: modules that run before the flow or the console start.
//!
//! - **logger**: tracing-subscriber initialisation.

pub mod logger;
