//! Prompt templates and a small builder to render them.
//!
//! Templates live under `config/prompts/` and are compiled into the binary,
//! so the judge prompt cannot drift at runtime. Variables use `{{key}}`
//! syntax and are substituted in a single left-to-right pass: text that a
//! substituted value happens to contain is never re-scanned.

use std::collections::HashMap;

use crate::subsystems::memory::MemoryRecord;

/// Judge prompt. Variables: `{{user_query}}`, `{{llm_output}}`.
pub const EVALUATE_TEMPLATE: &str = include_str!("../../../../config/prompts/evaluate.txt");

/// System prompt for the memory console. Variable: `{{memories}}`.
pub const MEMORY_CONTEXT_TEMPLATE: &str =
    include_str!("../../../../config/prompts/memory_context.txt");

const SEPARATOR: &str = "\n\n";

/// Fluent builder that joins text fragments and fills `{{key}}` placeholders.
///
/// ```rust
/// use routewise::subsystems::agents::core::prompt::PromptBuilder;
///
/// let prompt = PromptBuilder::new()
///     .append("Summarize: {{items}}")
///     .var("items", "item 1, item 2")
///     .build();
/// assert_eq!(prompt, "Summarize: item 1, item 2");
/// ```
#[derive(Debug, Default)]
pub struct PromptBuilder {
    parts: Vec<String>,
    vars: HashMap<String, String>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text fragment. Blank fragments are dropped.
    pub fn append(mut self, text: impl Into<String>) -> Self {
        let s = text.into();
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            self.parts.push(trimmed.to_string());
        }
        self
    }

    /// Register `{{key}}` → `value` substitution pairs applied at build time.
    pub fn with_vars<'a, I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (k, v) in vars {
            self.vars.insert(k.to_string(), v.to_string());
        }
        self
    }

    /// Register a single variable.
    pub fn var(mut self, key: &str, value: impl Into<String>) -> Self {
        self.vars.insert(key.to_string(), value.into());
        self
    }

    /// Join all fragments with blank lines and substitute variables.
    /// Placeholders without a registered value are left as-is.
    pub fn build(self) -> String {
        let joined = self.parts.join(SEPARATOR);
        let mut out = String::with_capacity(joined.len());
        let mut rest = joined.as_str();

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => match self.vars.get(&after[..end]) {
                    Some(value) => {
                        out.push_str(value);
                        rest = &after[end + 2..];
                    }
                    None => {
                        out.push_str("{{");
                        rest = after;
                    }
                },
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Render the judge prompt for one (query, response) pair.
pub fn evaluation_prompt(user_query: &str, llm_output: &str) -> String {
    PromptBuilder::new()
        .append(EVALUATE_TEMPLATE)
        .with_vars([("user_query", user_query), ("llm_output", llm_output)])
        .build()
}

/// Serialize search results the way the system prompt embeds them: a JSON
/// array of `"ID: <id>\nMemory: <memory>"` strings, `[]` when empty.
pub fn serialize_memories(records: &[MemoryRecord]) -> String {
    let entries: Vec<String> = records
        .iter()
        .map(|r| format!("ID: {}\nMemory: {}", r.id, r.memory))
        .collect();
    // Vec<String> always serializes
    serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_string())
}

/// Render the memory console's system prompt.
pub fn memory_context_prompt(records: &[MemoryRecord]) -> String {
    PromptBuilder::new()
        .append(MEMORY_CONTEXT_TEMPLATE)
        .var("memories", serialize_memories(records))
        .build()
}
