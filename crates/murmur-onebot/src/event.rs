use murmur_core::{ConversationKey, InboundMessage, MurmurError};
use serde_json::Value;

use crate::segments::{as_id, plain};

/// A parsed OneBot v11 `message` event (group or private).
#[derive(Debug, Clone)]
pub struct OneBotMessageEvent {
    /// `0` when the implementation omits it.
    pub message_id: i64,
    pub key: ConversationKey,
    pub sender_id: u64,
    pub sender_name: String,
    pub group_name: Option<String>,
    /// CQ-string form of the message, unsanitized.
    pub raw_message: String,
    /// Full raw payload for advanced handlers.
    pub raw: Value,
}

impl OneBotMessageEvent {
    pub fn from_payload(payload: &Value) -> Result<Self, MurmurError> {
        let post_type = payload["post_type"].as_str().unwrap_or("");
        if post_type != "message" {
            return Err(MurmurError::Parsing(format!(
                "not a message event: post_type={post_type:?}"
            )));
        }

        let sender_id = as_id(&payload["user_id"])
            .ok_or_else(|| MurmurError::Parsing("message event without user_id".to_string()))?;

        let key = match payload["message_type"].as_str().unwrap_or("") {
            "group" => {
                let group_id = as_id(&payload["group_id"]).ok_or_else(|| {
                    MurmurError::Parsing("group message without group_id".to_string())
                })?;
                ConversationKey::group(group_id)
            }
            "private" => ConversationKey::direct(sender_id),
            other => {
                return Err(MurmurError::Parsing(format!(
                    "unsupported message_type: {other:?}"
                )))
            }
        };

        let sender_name = payload["sender"]["nickname"]
            .as_str()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| sender_id.to_string());

        let group_name = payload["group_name"]
            .as_str()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        Ok(Self {
            message_id: payload["message_id"].as_i64().unwrap_or(0),
            key,
            sender_id,
            sender_name,
            group_name,
            raw_message: raw_text(payload),
            raw: payload.clone(),
        })
    }

    pub fn is_group(&self) -> bool {
        self.key.is_group()
    }

    /// The event as input for [`ChatMemory::record_inbound`](murmur_memory::ChatMemory::record_inbound).
    pub fn to_inbound(&self) -> InboundMessage {
        let inbound = InboundMessage::new(self.key, &self.sender_name, &self.raw_message);
        match &self.group_name {
            Some(name) => inbound.with_conversation_name(name),
            None => inbound,
        }
    }
}

/// Prefer `raw_message`, then a string-format `message`, then the
/// concatenated text segments of an array-format `message`.
fn raw_text(payload: &Value) -> String {
    if let Some(raw) = payload["raw_message"].as_str() {
        return raw.to_string();
    }
    match &payload["message"] {
        Value::String(s) => s.clone(),
        Value::Array(segments) => segments
            .iter()
            .filter(|seg| seg["type"] == "text")
            .map(|seg| plain(&seg["data"]["text"]))
            .collect(),
        _ => String::new(),
    }
}
