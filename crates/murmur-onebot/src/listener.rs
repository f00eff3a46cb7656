use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

use lru::LruCache;
use murmur_core::MurmurError;
use murmur_memory::ChatMemory;
use serde_json::Value;

use crate::event::OneBotMessageEvent;

const DEFAULT_DEDUP_CAPACITY: usize = 512;

/// Routes pushed OneBot events into a [`ChatMemory`].
///
/// Message events are recorded once per `message_id`; redelivered events
/// are skipped. Meta events (heartbeats, lifecycle) and notices are ignored.
pub struct OneBotEventListener {
    memory: Arc<ChatMemory>,
    dedup_capacity: usize,
    dedup: Mutex<LruCache<i64, ()>>,
}

impl OneBotEventListener {
    pub fn new(memory: Arc<ChatMemory>) -> Self {
        Self {
            memory,
            dedup_capacity: DEFAULT_DEDUP_CAPACITY,
            dedup: Mutex::new(LruCache::new(dedup_size(DEFAULT_DEDUP_CAPACITY))),
        }
    }

    /// How many recent message ids are remembered for dedup (minimum 1).
    pub fn with_dedup_capacity(mut self, cap: usize) -> Self {
        self.dedup_capacity = cap.max(1);
        self.dedup = Mutex::new(LruCache::new(dedup_size(cap)));
        self
    }

    pub fn dedup_capacity(&self) -> usize {
        self.dedup_capacity
    }

    pub fn memory(&self) -> &Arc<ChatMemory> {
        &self.memory
    }

    /// Handle one decoded event. Returns the stored line, if any.
    pub fn handle_payload(&self, payload: &Value) -> Result<Option<String>, MurmurError> {
        match payload["post_type"].as_str().unwrap_or("") {
            "message" => {
                let event = OneBotMessageEvent::from_payload(payload)?;
                if self.is_duplicate(event.message_id) {
                    tracing::debug!(message_id = event.message_id, "dedup skip");
                    return Ok(None);
                }
                Ok(self.memory.record_inbound(&event.to_inbound()))
            }
            "meta_event" => {
                tracing::trace!(
                    kind = payload["meta_event_type"].as_str().unwrap_or(""),
                    "meta event"
                );
                Ok(None)
            }
            other => {
                tracing::debug!(post_type = other, "ignoring event");
                Ok(None)
            }
        }
    }

    /// Decode a websocket text frame and handle it.
    pub fn handle_text(&self, text: &str) -> Result<Option<String>, MurmurError> {
        let payload: Value = serde_json::from_str(text)
            .map_err(|e| MurmurError::Parsing(format!("invalid event JSON: {e}")))?;
        self.handle_payload(&payload)
    }

    fn is_duplicate(&self, message_id: i64) -> bool {
        if message_id == 0 {
            return false;
        }
        let mut cache = self.dedup.lock().unwrap_or_else(PoisonError::into_inner);
        cache.put(message_id, ()).is_some()
    }
}

impl std::fmt::Debug for OneBotEventListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OneBotEventListener")
            .field("dedup_capacity", &self.dedup_capacity)
            .finish()
    }
}

fn dedup_size(cap: usize) -> NonZeroUsize {
    NonZeroUsize::new(cap).unwrap_or(NonZeroUsize::MIN)
}
