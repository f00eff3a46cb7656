//! Murmur: short-term chat memory for a chat-copilot bot.
//!
//! This crate re-exports the Murmur sub-crates for single-import usage.
//! Enable features to control which modules are available.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `default` | `memory` |
//! | `sanitize` | CQ code sanitizer |
//! | `callbacks` | `NotificationBus` and stock observers |
//! | `memory` | `ChatMemory`, history store, recency index (pulls `sanitize` + `callbacks`) |
//! | `onebot` | OneBot v11 event listener, history client, refresh worker |
//! | `full` | All features enabled |
//!
//! # Quick Start
//!
//! ```rust
//! use murmur::core::{ConversationKey, InboundMessage};
//! use murmur::memory::ChatMemory;
//!
//! let memory = ChatMemory::new();
//! let inbound = InboundMessage::new(ConversationKey::group(42), "Alice", "hi[CQ:face,id=1]");
//! memory.record_inbound(&inbound);
//!
//! assert_eq!(memory.group_history(42), vec!["[Alice]: hi(表情)"]);
//! assert_eq!(memory.get_recent_groups_snapshot()[0].name, "群 42");
//! ```

/// Keys, events, observer and store traits, `MurmurError`. Always available.
pub use murmur_core as core;

/// CQ code sanitizer.
#[cfg(feature = "sanitize")]
pub use murmur_sanitize as sanitize;

/// Notification bus with failure isolation, plus recording and tracing observers.
#[cfg(feature = "callbacks")]
pub use murmur_callbacks as callbacks;

/// Chat history store, merge engine, recency index and the `ChatMemory` facade.
#[cfg(feature = "memory")]
pub use murmur_memory as memory;

/// OneBot v11 integration.
#[cfg(feature = "onebot")]
pub use murmur_onebot as onebot;
