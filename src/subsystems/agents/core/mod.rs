//! Building blocks shared by the agents.
//!
//! - **prompt**: compiled-in templates and the `{{var}}` prompt builder.

pub mod prompt;
