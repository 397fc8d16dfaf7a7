//! State threaded through the routing flow, and the flow's vocabulary.

use std::fmt;

use serde::Serialize;

/// Per-query state. Created with only `user_query` set, mutated in place by
/// each node, dropped when the flow ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationState {
    pub user_query: String,
    pub llm_output: Option<String>,
    pub is_good: Option<bool>,
}

impl ConversationState {
    pub fn new(user_query: impl Into<String>) -> Self {
        Self { user_query: user_query.into(), llm_output: None, is_good: None }
    }
}

/// Decision returned by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The primary answer stands; go straight to the end.
    Terminal,
    /// The primary answer was rejected; ask the fallback model once.
    Retry,
}

/// Positions in the flow graph.
///
/// ```text
/// Start → Respond → Evaluate ─┬─(Terminal)──────────────────→ End
///                             └─(Retry)─→ FallbackRespond ──→ End
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Start,
    Respond,
    Evaluate,
    FallbackRespond,
    End,
}

impl Step {
    /// The step after `self`. Only `Evaluate` consults `route`; it is
    /// ignored everywhere else. `End` is absorbing.
    pub fn next(self, route: Option<Route>) -> Step {
        match (self, route) {
            (Step::Start, _) => Step::Respond,
            (Step::Respond, _) => Step::Evaluate,
            (Step::Evaluate, Some(Route::Terminal)) => Step::End,
            (Step::Evaluate, Some(Route::Retry) | None) => Step::FallbackRespond,
            (Step::FallbackRespond, _) => Step::End,
            (Step::End, _) => Step::End,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Start => "start",
            Step::Respond => "respond",
            Step::Evaluate => "evaluate",
            Step::FallbackRespond => "fallback_respond",
            Step::End => "end",
        };
        f.write_str(name)
    }
}
