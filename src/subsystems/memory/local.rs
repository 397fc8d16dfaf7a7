//! In-process memory store.
//!
//! Each appended message becomes one record. Search keeps the user's records
//! that share at least one word with the query, ranked by how many words
//! they share and then by recency. Nothing is persisted.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::debug;
use uuid::Uuid;

use super::MemoryRecord;
use crate::llm::ChatMessage;

#[derive(Debug, Clone, Default)]
pub struct LocalMemory {
    records: Arc<Mutex<Vec<MemoryRecord>>>,
}

impl LocalMemory {
    pub fn search(&self, query: &str, user_id: &str) -> Vec<MemoryRecord> {
        let terms = words(query);
        if terms.is_empty() {
            return Vec::new();
        }

        let records = self.lock();
        // (overlap, insertion index, record); later index is more recent
        let mut scored: Vec<(usize, usize, &MemoryRecord)> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.user_id == user_id)
            .map(|(i, r)| (words(&r.memory).intersection(&terms).count(), i, r))
            .filter(|(overlap, _, _)| *overlap > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

        debug!(user_id, hits = scored.len(), "local memory search");
        scored.into_iter().map(|(_, _, r)| r.clone()).collect()
    }

    pub fn add(&self, user_id: &str, messages: &[ChatMessage]) {
        let mut records = self.lock();
        for m in messages.iter().filter(|m| !m.content.trim().is_empty()) {
            records.push(MemoryRecord {
                id: Uuid::new_v4().to_string(),
                memory: m.content.clone(),
                user_id: user_id.to_string(),
            });
        }
        debug!(user_id, total = records.len(), "local memory appended");
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<MemoryRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}
