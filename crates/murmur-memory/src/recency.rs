use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};
use murmur_callbacks::{NotificationBus, SubscriptionId};
use murmur_core::{ActiveConversation, ActiveGroupsUpdated, ConversationKey, Observer};

/// Default number of groups tracked as recently active.
pub const DEFAULT_MAX_ACTIVE_GROUPS: usize = 10;

/// Most-recently-active group conversations, most recent first.
///
/// Every change publishes the complete list on [`RecencyIndex::updates`].
#[derive(Debug)]
pub struct RecencyIndex {
    entries: Mutex<VecDeque<ActiveConversation>>,
    capacity: usize,
    updates: NotificationBus<ActiveGroupsUpdated>,
}

impl RecencyIndex {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ACTIVE_GROUPS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
            updates: NotificationBus::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Mark a group as active at `now`, moving it to the front.
    ///
    /// Returns `false` without touching the list when `key` is not a group.
    pub fn touch(&self, key: &ConversationKey, name: impl Into<String>, now: DateTime<Local>) -> bool {
        if !key.is_group() {
            tracing::debug!(key = %key, "recency index only tracks groups");
            return false;
        }

        let groups = {
            let mut entries = self.lock();
            entries.retain(|record| record.key != *key);
            entries.push_front(ActiveConversation::new(*key, name, now));
            entries.truncate(self.capacity);
            entries.iter().cloned().collect::<Vec<_>>()
        };

        tracing::debug!(key = %key, active = groups.len(), "active groups updated");
        self.updates.publish(&ActiveGroupsUpdated { groups });
        true
    }

    /// Copy of the list, most recent first.
    pub fn list(&self) -> Vec<ActiveConversation> {
        self.lock().iter().cloned().collect()
    }

    pub fn updates(&self) -> &NotificationBus<ActiveGroupsUpdated> {
        &self.updates
    }

    pub fn subscribe<O>(&self, observer: O) -> SubscriptionId
    where
        O: Observer<ActiveGroupsUpdated> + 'static,
    {
        self.updates.subscribe(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.updates.unsubscribe(id)
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<ActiveConversation>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RecencyIndex {
    fn default() -> Self {
        Self::new()
    }
}
