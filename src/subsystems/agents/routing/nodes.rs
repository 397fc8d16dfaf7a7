//! The three working nodes of the routing flow.
//!
//! Each node owns one provider and makes exactly one call per run. Errors
//! are returned as-is; nothing here retries.

use tracing::{debug, info};

use super::state::{ConversationState, Route};
use crate::llm::{LlmProvider, ProviderError};
use crate::subsystems::agents::core::prompt::evaluation_prompt;

/// The only judge reply that accepts a response.
const GOOD_VERDICT: &str = "GOOD";

/// `true` iff `reply`, trimmed and upper-cased, is exactly `GOOD`.
///
/// `"good"`, `" GOOD "` and `"Good"` pass. `"GOOD."` and `"GOOD RESPONSE"`
/// do not; there is no fuzzy matching.
pub fn is_good_verdict(reply: &str) -> bool {
    reply.trim().to_uppercase() == GOOD_VERDICT
}

/// Answers the raw query with the primary model.
#[derive(Debug, Clone)]
pub struct Responder {
    provider: LlmProvider,
}

impl Responder {
    pub fn new(provider: LlmProvider) -> Self {
        Self { provider }
    }

    pub async fn run(&self, state: &mut ConversationState) -> Result<(), ProviderError> {
        debug!(?state, model = self.provider.model(), "respond node");
        let text = self.provider.prompt(&state.user_query).await?;
        state.llm_output = Some(text);
        Ok(())
    }
}

/// Asks the judge model whether the current answer is good enough.
#[derive(Debug, Clone)]
pub struct Evaluator {
    provider: LlmProvider,
}

impl Evaluator {
    pub fn new(provider: LlmProvider) -> Self {
        Self { provider }
    }

    /// Sets `is_good` and returns where the flow goes next.
    pub async fn run(&self, state: &mut ConversationState) -> Result<Route, ProviderError> {
        debug!(?state, model = self.provider.model(), "evaluate node");
        let output = state.llm_output.as_deref().unwrap_or_default();
        let prompt = evaluation_prompt(&state.user_query, output);

        let verdict = self.provider.prompt(&prompt).await?;
        let is_good = is_good_verdict(&verdict);
        state.is_good = Some(is_good);

        let route = if is_good { Route::Terminal } else { Route::Retry };
        info!(verdict = %verdict.trim(), ?route, "judge verdict");
        Ok(route)
    }
}

/// Answers the original query again with the secondary model.
///
/// The rejected answer and the verdict are not shown to the fallback model.
#[derive(Debug, Clone)]
pub struct FallbackResponder {
    provider: LlmProvider,
}

impl FallbackResponder {
    pub fn new(provider: LlmProvider) -> Self {
        Self { provider }
    }

    pub async fn run(&self, state: &mut ConversationState) -> Result<(), ProviderError> {
        debug!(?state, model = self.provider.model(), "fallback respond node");
        let text = self.provider.prompt(&state.user_query).await?;
        state.llm_output = Some(text);
        Ok(())
    }
}
