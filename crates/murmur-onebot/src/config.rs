use murmur_core::MurmurError;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "http://localhost:6199";

/// Connection settings for a OneBot v11 HTTP endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OneBotConfig {
    pub base_url: String,
    pub access_token: Option<String>,
    /// Messages requested per history fetch.
    pub fetch_count: usize,
    pub timeout_secs: u64,
}

impl Default for OneBotConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: None,
            fetch_count: 30,
            timeout_secs: 15,
        }
    }
}

impl OneBotConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `ONEBOT_BASE_URL` and `ONEBOT_ACCESS_TOKEN` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("ONEBOT_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(token) = std::env::var("ONEBOT_ACCESS_TOKEN") {
            if !token.trim().is_empty() {
                config.access_token = Some(token);
            }
        }
        config
    }

    pub fn from_json(json: &str) -> Result<Self, MurmurError> {
        serde_json::from_str(json).map_err(|e| MurmurError::Config(format!("onebot config: {e}")))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_fetch_count(mut self, count: usize) -> Self {
        self.fetch_count = count;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// URL for an API action, e.g. `get_group_msg_history`.
    pub fn endpoint(&self, action: &str) -> String {
        format!("{}/{action}", self.base_url.trim_end_matches('/'))
    }
}
