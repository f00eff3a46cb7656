use std::time::Duration;

use async_trait::async_trait;
use murmur_core::{ConversationKey, ConversationKind, HistorySource, MurmurError};
use serde_json::{json, Value};

use crate::config::OneBotConfig;
use crate::segments::format_history_message;

/// API action and request body for fetching `count` recent messages.
pub fn history_request(key: &ConversationKey, count: usize) -> (&'static str, Value) {
    match key.kind() {
        ConversationKind::Group => (
            "get_group_msg_history",
            json!({ "group_id": key.id(), "message_seq": 0, "count": count }),
        ),
        ConversationKind::Direct => (
            "get_friend_msg_history",
            json!({ "user_id": key.id(), "message_seq": 0, "count": count }),
        ),
    }
}

/// Turn a history response body into formatted lines, oldest first.
///
/// A non-zero `retcode` is an error. Messages that render empty are skipped.
pub fn parse_history_response(
    body: &Value,
    key: &ConversationKey,
) -> Result<Vec<String>, MurmurError> {
    let retcode = body["retcode"].as_i64().unwrap_or(-1);
    if retcode != 0 {
        let reason = body["wording"]
            .as_str()
            .or_else(|| body["message"].as_str())
            .unwrap_or("unknown error");
        tracing::warn!(key = %key, retcode, reason, "history request rejected");
        return Err(MurmurError::History(format!(
            "history for {key} failed (retcode={retcode}): {reason}"
        )));
    }
    Ok(body["data"]["messages"]
        .as_array()
        .map(|messages| {
            messages
                .iter()
                .filter_map(|m| format_history_message(m, key))
                .collect()
        })
        .unwrap_or_default())
}

/// [`HistorySource`] backed by the OneBot HTTP API.
pub struct OneBotHistoryClient {
    config: OneBotConfig,
    client: reqwest::Client,
}

impl OneBotHistoryClient {
    pub fn new(config: OneBotConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &OneBotConfig {
        &self.config
    }

    /// Request for the configured `fetch_count` most recent messages.
    pub fn request_for(&self, key: &ConversationKey) -> (&'static str, Value) {
        history_request(key, self.config.fetch_count)
    }

    /// Fetch `fetch_count` messages as set in the config.
    pub async fn fetch_recent(&self, key: &ConversationKey) -> Result<Vec<String>, MurmurError> {
        self.fetch(key, self.config.fetch_count).await
    }

    pub async fn fetch_group_history(
        &self,
        group_id: u64,
        count: usize,
    ) -> Result<Vec<String>, MurmurError> {
        self.fetch(&ConversationKey::group(group_id), count).await
    }

    pub async fn fetch_friend_history(
        &self,
        friend_id: u64,
        count: usize,
    ) -> Result<Vec<String>, MurmurError> {
        self.fetch(&ConversationKey::direct(friend_id), count).await
    }

    async fn call(&self, action: &str, body: &Value) -> Result<Value, MurmurError> {
        let mut request = self
            .client
            .post(self.config.endpoint(action))
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .json(body);
        if let Some(token) = &self.config.access_token {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| MurmurError::Http(format!("{action}: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(MurmurError::Http(format!("{action}: HTTP {status}")));
        }
        resp.json()
            .await
            .map_err(|e| MurmurError::Parsing(format!("{action} response: {e}")))
    }
}

#[async_trait]
impl HistorySource for OneBotHistoryClient {
    async fn fetch(
        &self,
        key: &ConversationKey,
        count: usize,
    ) -> Result<Vec<String>, MurmurError> {
        let (action, body) = history_request(key, count);
        tracing::debug!(key = %key, action, count, "fetching history");
        let response = self.call(action, &body).await?;
        let lines = parse_history_response(&response, key)?;
        tracing::info!(key = %key, fetched = lines.len(), "fetched history");
        Ok(lines)
    }
}
