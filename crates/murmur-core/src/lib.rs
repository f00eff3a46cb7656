use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// ConversationKey
// ---------------------------------------------------------------------------

/// Whether a conversation is a group chat or a one-to-one chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationKind {
    Group,
    Direct,
}

impl ConversationKind {
    /// Prefix used in the canonical string form of a key.
    pub fn prefix(&self) -> &'static str {
        match self {
            ConversationKind::Group => "group",
            ConversationKind::Direct => "friend",
        }
    }
}

/// Identifies one conversation. Group and direct chats share the numeric id
/// namespace of the platform, so the kind is part of the key.
///
/// The canonical string form is `group_<id>` or `friend_<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConversationKey {
    kind: ConversationKind,
    id: u64,
}

impl ConversationKey {
    pub fn new(kind: ConversationKind, id: u64) -> Self {
        Self { kind, id }
    }

    /// Key for a group chat.
    pub fn group(id: u64) -> Self {
        Self::new(ConversationKind::Group, id)
    }

    /// Key for a one-to-one chat with a friend.
    pub fn direct(id: u64) -> Self {
        Self::new(ConversationKind::Direct, id)
    }

    pub fn kind(&self) -> ConversationKind {
        self.kind
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_group(&self) -> bool {
        self.kind == ConversationKind::Group
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.kind.prefix(), self.id)
    }
}

impl FromStr for ConversationKey {
    type Err = MurmurError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, id) = s
            .split_once('_')
            .ok_or_else(|| MurmurError::Parsing(format!("conversation key without prefix: {s}")))?;
        let kind = match prefix {
            "group" => ConversationKind::Group,
            "friend" => ConversationKind::Direct,
            other => {
                return Err(MurmurError::Parsing(format!(
                    "unknown conversation kind '{other}' in key {s}"
                )))
            }
        };
        let id = id
            .parse::<u64>()
            .map_err(|e| MurmurError::Parsing(format!("conversation id in {s}: {e}")))?;
        Ok(Self { kind, id })
    }
}

/// Render a history line in the conventional `[<sender>]: <content>` shape.
pub fn format_line(sender: &str, content: &str) -> String {
    format!("[{sender}]: {content}")
}

// ---------------------------------------------------------------------------
// Conversation records
// ---------------------------------------------------------------------------

/// A group conversation that has seen traffic recently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveConversation {
    pub key: ConversationKey,
    pub name: String,
    pub last_active: DateTime<Local>,
}

impl ActiveConversation {
    pub fn new(key: ConversationKey, name: impl Into<String>, last_active: DateTime<Local>) -> Self {
        Self {
            key,
            name: name.into(),
            last_active,
        }
    }
}

impl fmt::Display for ActiveConversation {
    /// `[10:05:00] Group Name (123456)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({})",
            self.last_active.format("%H:%M:%S"),
            self.name,
            self.key.id()
        )
    }
}

/// A message observed live on the platform, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub key: ConversationKey,
    pub sender_name: String,
    /// Raw platform content, possibly containing CQ markup.
    pub raw_content: String,
    /// Display name of the conversation when the platform provides one.
    pub conversation_name: Option<String>,
}

impl InboundMessage {
    pub fn new(
        key: ConversationKey,
        sender_name: impl Into<String>,
        raw_content: impl Into<String>,
    ) -> Self {
        Self {
            key,
            sender_name: sender_name.into(),
            raw_content: raw_content.into(),
            conversation_name: None,
        }
    }

    pub fn with_conversation_name(mut self, name: impl Into<String>) -> Self {
        self.conversation_name = Some(name.into());
        self
    }

    /// The conversation name, falling back to `群 <id>` for groups and the
    /// bare id for direct chats.
    pub fn conversation_display_name(&self) -> String {
        match self.conversation_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ if self.key.is_group() => format!("群 {}", self.key.id()),
            _ => self.key.id().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A message that was just stored for a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub key: ConversationKey,
    pub message: String,
}

/// Full snapshot of the active-group list after a change, most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveGroupsUpdated {
    pub groups: Vec<ActiveConversation>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Unified error type for Murmur.
#[derive(Debug, Error)]
pub enum MurmurError {
    #[error("observer error: {0}")]
    Observer(String),
    #[error("history error: {0}")]
    History(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("parsing error: {0}")]
    Parsing(String),
    #[error("config error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Core traits
// ---------------------------------------------------------------------------

/// Receives events published on a notification bus.
///
/// Errors are reported back to the bus, which logs them and carries on with
/// the remaining observers.
pub trait Observer<E>: Send + Sync {
    fn notify(&self, event: &E) -> Result<(), MurmurError>;
}

/// Adapts a closure into an [`Observer`].
pub struct FnObserver<F>(F);

/// Wrap a closure as an observer.
pub fn observer_fn<F>(f: F) -> FnObserver<F> {
    FnObserver(f)
}

impl<E, F> Observer<E> for FnObserver<F>
where
    F: Fn(&E) -> Result<(), MurmurError> + Send + Sync,
{
    fn notify(&self, event: &E) -> Result<(), MurmurError> {
        (self.0)(event)
    }
}

/// Bounded per-conversation message log.
///
/// None of the operations fail: unknown keys read as empty and an empty
/// merge is a no-op.
pub trait HistoryStore: Send + Sync {
    fn append(&self, key: &ConversationKey, message: String);
    /// Owned copy of the buffer, oldest first.
    fn snapshot(&self, key: &ConversationKey) -> Vec<String>;
    /// Prepend an externally fetched batch (oldest first), skipping lines
    /// already in the buffer.
    fn merge(&self, key: &ConversationKey, external: &[String]);
    fn clear(&self, key: &ConversationKey);
}

/// Fetches already-formatted history lines from the chat platform, oldest first.
#[async_trait]
pub trait HistorySource: Send + Sync {
    async fn fetch(&self, key: &ConversationKey, count: usize) -> Result<Vec<String>, MurmurError>;
}
