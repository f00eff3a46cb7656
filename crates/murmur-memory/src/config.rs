use murmur_core::MurmurError;
use serde::{Deserialize, Serialize};

use crate::recency::DEFAULT_MAX_ACTIVE_GROUPS;
use crate::store::DEFAULT_MAX_HISTORY;
use crate::window::DEFAULT_PROMPT_CHAR_BUDGET;

/// Limits for [`ChatMemory`](crate::ChatMemory).
///
/// Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Lines kept per conversation.
    pub max_history: usize,
    /// Groups kept in the recency index.
    pub max_active_groups: usize,
    /// Character budget for [`ChatMemory::history_for_prompt`](crate::ChatMemory::history_for_prompt).
    pub prompt_char_budget: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            max_active_groups: DEFAULT_MAX_ACTIVE_GROUPS,
            prompt_char_budget: DEFAULT_PROMPT_CHAR_BUDGET,
        }
    }
}

impl MemoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    pub fn with_max_active_groups(mut self, max_active_groups: usize) -> Self {
        self.max_active_groups = max_active_groups;
        self
    }

    pub fn with_prompt_char_budget(mut self, budget: usize) -> Self {
        self.prompt_char_budget = budget;
        self
    }

    /// Parse and validate a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, MurmurError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| MurmurError::Config(format!("memory config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Both caps must be non-zero.
    pub fn validate(&self) -> Result<(), MurmurError> {
        if self.max_history == 0 {
            return Err(MurmurError::Config("max_history must be at least 1".to_string()));
        }
        if self.max_active_groups == 0 {
            return Err(MurmurError::Config(
                "max_active_groups must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
