use std::sync::Arc;

use murmur_core::{ConversationKey, HistorySource, MurmurError};
use murmur_memory::ChatMemory;
use tokio::task::JoinHandle;

use crate::history::OneBotHistoryClient;

const DEFAULT_FETCH_COUNT: usize = 30;

/// Pulls platform history and merges it into a [`ChatMemory`].
///
/// Merging never notifies message observers, so a refresh does not
/// replay old messages to the UI.
pub struct HistoryRefresher {
    source: Arc<dyn HistorySource>,
    memory: Arc<ChatMemory>,
    count: usize,
}

impl HistoryRefresher {
    pub fn new(source: Arc<dyn HistorySource>, memory: Arc<ChatMemory>) -> Self {
        Self {
            source,
            memory,
            count: DEFAULT_FETCH_COUNT,
        }
    }

    /// Refresher over a OneBot client, fetching its configured `fetch_count`.
    pub fn from_client(client: OneBotHistoryClient, memory: Arc<ChatMemory>) -> Self {
        let count = client.config().fetch_count;
        Self::new(Arc::new(client), memory).with_count(count)
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Fetch and merge. Returns how many lines the source produced.
    pub async fn refresh(&self, key: &ConversationKey) -> Result<usize, MurmurError> {
        let fetched = self.source.fetch(key, self.count).await?;
        self.memory.merge_external_history(key, &fetched);
        tracing::debug!(key = %key, fetched = fetched.len(), "history refreshed");
        Ok(fetched.len())
    }

    /// Run [`refresh`](Self::refresh) in the background. Failures are
    /// logged and yield `None`.
    pub fn spawn_refresh(self: &Arc<Self>, key: ConversationKey) -> JoinHandle<Option<usize>> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            match this.refresh(&key).await {
                Ok(n) => Some(n),
                Err(e) => {
                    tracing::error!(key = %key, error = %e, "history refresh failed");
                    None
                }
            }
        })
    }
}
