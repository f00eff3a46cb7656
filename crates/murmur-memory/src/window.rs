use std::sync::Arc;

use murmur_core::{ConversationKey, HistoryStore};

/// Default character budget for history handed to the suggestion engine.
pub const DEFAULT_PROMPT_CHAR_BUDGET: usize = 5000;

/// Drop the oldest lines until the total character count fits in `budget`.
pub fn trim_to_char_budget(mut lines: Vec<String>, budget: usize) -> Vec<String> {
    let mut total: usize = lines.iter().map(|line| line.chars().count()).sum();
    let mut cut = 0;
    while total > budget && cut < lines.len() {
        total -= lines[cut].chars().count();
        cut += 1;
    }
    lines.drain(..cut);
    lines
}

/// A [`HistoryStore`] view that keeps reads within a character budget.
///
/// Writes go straight to the wrapped store; `snapshot` returns only the
/// newest lines whose combined length fits in `max_chars`.
pub struct ContextWindowHistory {
    store: Arc<dyn HistoryStore>,
    max_chars: usize,
}

impl ContextWindowHistory {
    pub fn new(store: Arc<dyn HistoryStore>, max_chars: usize) -> Self {
        Self { store, max_chars }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }
}

impl HistoryStore for ContextWindowHistory {
    fn append(&self, key: &ConversationKey, message: String) {
        self.store.append(key, message)
    }

    fn snapshot(&self, key: &ConversationKey) -> Vec<String> {
        trim_to_char_budget(self.store.snapshot(key), self.max_chars)
    }

    fn merge(&self, key: &ConversationKey, external: &[String]) {
        self.store.merge(key, external)
    }

    fn clear(&self, key: &ConversationKey) {
        self.store.clear(key)
    }
}
