use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use murmur_core::{ConversationKey, HistoryStore};

use crate::merge::merge_external;

/// Default number of lines kept per conversation.
pub const DEFAULT_MAX_HISTORY: usize = 99;

type Buffer = Arc<Mutex<VecDeque<String>>>;

/// In-memory [`HistoryStore`] with one lock per conversation.
///
/// The map only hands out the per-key buffer; all reads and writes of a
/// buffer happen under that buffer's own mutex, so traffic in one
/// conversation never waits on another.
#[derive(Debug)]
pub struct ChatHistoryStore {
    buffers: DashMap<ConversationKey, Buffer>,
    capacity: usize,
}

impl ChatHistoryStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_HISTORY)
    }

    /// Store keeping at most `capacity` lines per conversation (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffers: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of lines currently held for `key`.
    pub fn len(&self, key: &ConversationKey) -> usize {
        self.existing(key).map(|b| lock(&b).len()).unwrap_or(0)
    }

    /// Conversations that have a buffer, in no particular order.
    pub fn keys(&self) -> Vec<ConversationKey> {
        self.buffers.iter().map(|entry| *entry.key()).collect()
    }

    fn existing(&self, key: &ConversationKey) -> Option<Buffer> {
        self.buffers.get(key).map(|entry| Arc::clone(entry.value()))
    }

    fn buffer(&self, key: &ConversationKey) -> Buffer {
        if let Some(buffer) = self.existing(key) {
            return buffer;
        }
        Arc::clone(self.buffers.entry(*key).or_default().value())
    }
}

impl Default for ChatHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore for ChatHistoryStore {
    fn append(&self, key: &ConversationKey, message: String) {
        let buffer = self.buffer(key);
        let mut lines = lock(&buffer);
        lines.push_back(message);
        let evicted = evict_to(&mut lines, self.capacity);
        tracing::debug!(key = %key, len = lines.len(), evicted, "appended history line");
    }

    fn snapshot(&self, key: &ConversationKey) -> Vec<String> {
        match self.existing(key) {
            Some(buffer) => lock(&buffer).iter().cloned().collect(),
            None => Vec::new(),
        }
    }

    fn merge(&self, key: &ConversationKey, external: &[String]) {
        if external.is_empty() {
            return;
        }
        let buffer = self.buffer(key);
        let mut lines = lock(&buffer);
        let before = lines.len();
        let merged = merge_external(&lines, external, self.capacity);
        *lines = merged;
        tracing::info!(
            key = %key,
            external = external.len(),
            before,
            after = lines.len(),
            "merged external history"
        );
    }

    fn clear(&self, key: &ConversationKey) {
        if let Some(buffer) = self.existing(key) {
            lock(&buffer).clear();
        }
    }
}

fn lock(buffer: &Mutex<VecDeque<String>>) -> MutexGuard<'_, VecDeque<String>> {
    buffer.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drop lines from the head until at most `capacity` remain.
pub(crate) fn evict_to(lines: &mut VecDeque<String>, capacity: usize) -> usize {
    let mut evicted = 0;
    while lines.len() > capacity {
        lines.pop_front();
        evicted += 1;
    }
    evicted
}
