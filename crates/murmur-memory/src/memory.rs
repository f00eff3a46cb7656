use std::sync::Arc;

use chrono::Local;
use murmur_callbacks::{NotificationBus, SubscriptionId};
use murmur_core::{
    format_line, ActiveConversation, ActiveGroupsUpdated, ConversationKey, HistoryStore,
    InboundMessage, MessageEvent, Observer,
};
use murmur_sanitize::Sanitizer;

use crate::config::MemoryConfig;
use crate::recency::RecencyIndex;
use crate::store::ChatHistoryStore;
use crate::window::trim_to_char_budget;

/// The chat memory used by the bot and its front-ends.
///
/// Live traffic goes through [`record_inbound`](Self::record_inbound) and
/// [`add_sent_message`](Self::add_sent_message), which store the line and
/// notify message observers. Bulk history goes through
/// [`merge_external_history`](Self::merge_external_history), which neither
/// sanitizes nor notifies.
///
/// All methods take `&self`; share it as `Arc<ChatMemory>`.
#[derive(Debug)]
pub struct ChatMemory {
    config: MemoryConfig,
    sanitizer: Sanitizer,
    store: ChatHistoryStore,
    recency: RecencyIndex,
    messages: NotificationBus<MessageEvent>,
}

impl ChatMemory {
    pub fn new() -> Self {
        Self::with_config(MemoryConfig::default())
    }

    pub fn with_config(config: MemoryConfig) -> Self {
        Self {
            store: ChatHistoryStore::with_capacity(config.max_history),
            recency: RecencyIndex::with_capacity(config.max_active_groups),
            sanitizer: Sanitizer::new(),
            messages: NotificationBus::new(),
            config,
        }
    }

    /// Replace the sanitizer applied to inbound messages.
    pub fn with_sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    pub fn store(&self) -> &ChatHistoryStore {
        &self.store
    }

    /// Normalize and store a message observed on the platform.
    ///
    /// Returns the stored line, or `None` when nothing is left after
    /// sanitizing (e.g. a bare reply marker).
    pub fn record_inbound(&self, inbound: &InboundMessage) -> Option<String> {
        let content = self.sanitizer.sanitize(&inbound.raw_content);
        if content.is_empty() {
            tracing::debug!(key = %inbound.key, "dropping message with no readable content");
            return None;
        }

        let line = format_line(&inbound.sender_name, &content);
        tracing::info!(
            key = %inbound.key,
            conversation = %inbound.conversation_display_name(),
            line = %line,
            "received message"
        );

        self.store.append(&inbound.key, line.clone());
        if inbound.key.is_group() {
            self.recency
                .touch(&inbound.key, inbound.conversation_display_name(), Local::now());
        }
        self.notify(inbound.key, &line);
        Some(line)
    }

    /// Record a message the bot itself sent. `formatted` is stored verbatim.
    pub fn add_sent_message(&self, key: &ConversationKey, formatted: impl Into<String>) {
        let line = formatted.into();
        if line.trim().is_empty() {
            tracing::debug!(key = %key, "ignoring blank sent message");
            return;
        }
        tracing::info!(key = %key, line = %line, "recorded sent message");
        self.store.append(key, line.clone());
        self.notify(*key, &line);
    }

    /// Oldest-first copy of a conversation's history; empty if unknown.
    pub fn get_history(&self, key: &ConversationKey) -> Vec<String> {
        self.store.snapshot(key)
    }

    pub fn group_history(&self, group_id: u64) -> Vec<String> {
        self.get_history(&ConversationKey::group(group_id))
    }

    pub fn friend_history(&self, friend_id: u64) -> Vec<String> {
        self.get_history(&ConversationKey::direct(friend_id))
    }

    /// History trimmed from the oldest end to the configured character budget.
    pub fn history_for_prompt(&self, key: &ConversationKey) -> Vec<String> {
        trim_to_char_budget(self.get_history(key), self.config.prompt_char_budget)
    }

    /// Merge already-formatted lines fetched from the platform, oldest first.
    pub fn merge_external_history(&self, key: &ConversationKey, messages: &[String]) {
        self.store.merge(key, messages);
    }

    pub fn clear_history(&self, key: &ConversationKey) {
        self.store.clear(key);
    }

    /// Observe every newly stored live message. Keep the returned id and
    /// pass it to [`unregister_message_callback`](Self::unregister_message_callback)
    /// when the observer goes away.
    pub fn register_message_callback<O>(&self, observer: O) -> SubscriptionId
    where
        O: Observer<MessageEvent> + 'static,
    {
        self.messages.subscribe(observer)
    }

    /// Observe messages for as long as `observer` is alive elsewhere.
    pub fn register_message_callback_weak<O>(&self, observer: &Arc<O>) -> SubscriptionId
    where
        O: Observer<MessageEvent> + 'static,
    {
        self.messages.subscribe_weak(observer)
    }

    pub fn unregister_message_callback(&self, id: SubscriptionId) -> bool {
        self.messages.unsubscribe(id)
    }

    /// Observe changes to the recently-active group list.
    pub fn subscribe_active_groups<O>(&self, observer: O) -> SubscriptionId
    where
        O: Observer<ActiveGroupsUpdated> + 'static,
    {
        self.recency.subscribe(observer)
    }

    pub fn unsubscribe_active_groups(&self, id: SubscriptionId) -> bool {
        self.recency.unsubscribe(id)
    }

    /// Recently active groups, most recent first.
    pub fn get_recent_groups_snapshot(&self) -> Vec<ActiveConversation> {
        self.recency.list()
    }

    fn notify(&self, key: ConversationKey, line: &str) {
        self.messages.publish(&MessageEvent {
            key,
            message: line.to_string(),
        });
    }
}

impl Default for ChatMemory {
    fn default() -> Self {
        Self::new()
    }
}
