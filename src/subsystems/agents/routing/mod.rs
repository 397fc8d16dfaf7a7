//! Quality-gated routing flow.
//!
//! ```text
//! Start → Respond → Evaluate ─┬─ GOOD ─────────────────────→ End
//!                             └─ anything else → Fallback ─→ End
//! ```
//!
//! The primary model answers, a judge model grades the answer, and only a
//! rejected answer is replaced by one call to the fallback model. The
//! fallback's answer is final; it is never graded.

pub mod nodes;
pub mod state;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{ApiKeys, FlowConfig};
use crate::llm::{ProviderError, providers};

pub use nodes::{Evaluator, FallbackResponder, Responder, is_good_verdict};
pub use state::{ConversationState, Route, Step};

/// Final state plus the steps visited, `Start` first and `End` last.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowOutcome {
    pub state: ConversationState,
    pub path: Vec<Step>,
}

impl FlowOutcome {
    pub fn fell_back(&self) -> bool {
        self.path.contains(&Step::FallbackRespond)
    }
}

/// The flow controller. Owns its three nodes; runs one query at a time.
#[derive(Debug, Clone)]
pub struct RoutingFlow {
    responder: Responder,
    evaluator: Evaluator,
    fallback: FallbackResponder,
}

impl RoutingFlow {
    pub fn new(responder: Responder, evaluator: Evaluator, fallback: FallbackResponder) -> Self {
        Self { responder, evaluator, fallback }
    }

    /// Build all three nodes from config.
    pub fn from_config(config: &FlowConfig, keys: &ApiKeys) -> Result<Self, ProviderError> {
        Ok(Self::new(
            Responder::new(providers::build(&config.responder, keys)?),
            Evaluator::new(providers::build(&config.judge, keys)?),
            FallbackResponder::new(providers::build(&config.fallback, keys)?),
        ))
    }

    /// Drive one query from `Start` to `End`.
    ///
    /// Any provider error aborts the run and is returned unchanged.
    pub async fn run(&self, user_query: impl Into<String>) -> Result<FlowOutcome, ProviderError> {
        let mut state = ConversationState::new(user_query);
        let mut step = Step::Start;
        let mut path = vec![step];

        while step != Step::End {
            let route = match step {
                Step::Start | Step::End => None,
                Step::Respond => {
                    self.responder.run(&mut state).await?;
                    None
                }
                Step::Evaluate => Some(self.evaluator.run(&mut state).await?),
                Step::FallbackRespond => {
                    self.fallback.run(&mut state).await?;
                    None
                }
            };
            let next = step.next(route);
            debug!(from = %step, to = %next, "flow transition");
            step = next;
            path.push(step);
        }

        info!(
            is_good = ?state.is_good,
            fell_back = path.contains(&Step::FallbackRespond),
            "flow finished"
        );
        debug!(?state, "end node");
        Ok(FlowOutcome { state, path })
    }
}
