//! Short-term chat memory for a mediating chat bot.
//!
//! Live messages are sanitized, stored in a bounded per-conversation buffer
//! and fanned out to observers; history fetched from the platform is merged
//! in front of what was observed live. Everything lives in process memory
//! and is gone on restart.

mod config;
mod memory;
mod merge;
mod recency;
mod store;
mod window;

pub use config::MemoryConfig;
pub use memory::ChatMemory;
pub use merge::merge_external;
pub use recency::{RecencyIndex, DEFAULT_MAX_ACTIVE_GROUPS};
pub use store::{ChatHistoryStore, DEFAULT_MAX_HISTORY};
pub use window::{trim_to_char_budget, ContextWindowHistory, DEFAULT_PROMPT_CHAR_BUDGET};

pub use murmur_core::HistoryStore;
