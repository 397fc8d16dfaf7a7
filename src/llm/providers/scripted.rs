//! Scripted LLM provider. Replays queued replies in order and records every
//! request it receives. Drives the routing flow and the console with fakes.
//!
//! Clones share the same queue and request log, so a test can keep one clone
//! for assertions and hand the other to the code under test.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::llm::{ChatMessage, LlmResponse, ProviderError};

#[derive(Debug, Clone, Default)]
pub struct ScriptedProvider {
    inner: Arc<Mutex<Script>>,
}

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<Result<String, String>>,
    requests: Vec<Vec<ChatMessage>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let script = Script {
            replies: replies.into_iter().map(|r| Ok(r.into())).collect(),
            requests: Vec::new(),
        };
        Self { inner: Arc::new(Mutex::new(script)) }
    }

    /// Queue one more successful reply.
    pub fn push_reply(&self, reply: impl Into<String>) {
        self.lock().replies.push_back(Ok(reply.into()));
    }

    /// Queue a failure; the matching call returns `ProviderError::Request`.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.lock().replies.push_back(Err(message.into()));
    }

    /// Every request seen so far, oldest first.
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.lock().requests.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().requests.len()
    }

    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<LlmResponse, ProviderError> {
        let mut script = self.lock();
        script.requests.push(messages.to_vec());
        match script.replies.pop_front() {
            Some(Ok(text)) => Ok(LlmResponse { text, usage: None }),
            Some(Err(message)) => Err(ProviderError::Request(message)),
            None => Err(ProviderError::Request("scripted provider has no replies left".into())),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        // a panicking test thread must not poison the script for the others
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_in_order_then_runs_dry() {
        let p = ScriptedProvider::new(["one", "two"]);
        let msg = [ChatMessage::user("q")];
        assert_eq!(p.complete(&msg).await.unwrap().text, "one");
        assert_eq!(p.complete(&msg).await.unwrap().text, "two");
        assert!(p.complete(&msg).await.is_err());
        assert_eq!(p.call_count(), 3);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let p = ScriptedProvider::default();
        let handle = p.clone();
        handle.push_reply("shared");
        assert_eq!(p.complete(&[ChatMessage::user("x")]).await.unwrap().text, "shared");
        assert_eq!(handle.requests(), vec![vec![ChatMessage::user("x")]]);
    }

    #[tokio::test]
    async fn queued_failure_is_returned() {
        let p = ScriptedProvider::default();
        p.push_failure("HTTP 503");
        let err = p.complete(&[]).await.unwrap_err();
        assert!(err.to_string().contains("HTTP 503"));
    }
}
