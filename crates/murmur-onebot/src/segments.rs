use std::borrow::Cow;

use murmur_core::{format_line, ConversationKey, ConversationKind};
use serde_json::Value;

const UNKNOWN_SENDER: &str = "未知";
const SELF_SENDER: &str = "我";

/// Bracketed stand-in for a non-text segment type.
pub fn segment_placeholder(kind: &str) -> Cow<'static, str> {
    match kind {
        "image" => Cow::Borrowed("[图片]"),
        "face" => Cow::Borrowed("[表情]"),
        "reply" => Cow::Borrowed("[回复]"),
        "forward" => Cow::Borrowed("[合并转发]"),
        "record" => Cow::Borrowed("[语音]"),
        "video" => Cow::Borrowed("[视频]"),
        "file" => Cow::Borrowed("[文件]"),
        "mface" => Cow::Borrowed("[表情包]"),
        other => Cow::Owned(format!("[{other}]")),
    }
}

/// Render an array-format OneBot message as plain text.
///
/// Text segments are copied, mentions become `[@qq]` and every other
/// segment type becomes a placeholder. The result is trimmed.
pub fn format_segments(segments: &[Value]) -> String {
    let mut content = String::new();
    for segment in segments {
        let data = &segment["data"];
        match segment["type"].as_str().unwrap_or("") {
            "" => {}
            "text" => content.push_str(data["text"].as_str().unwrap_or("")),
            "at" => {
                content.push_str("[@");
                content.push_str(&plain(&data["qq"]));
                content.push(']');
            }
            other => content.push_str(&segment_placeholder(other)),
        }
    }
    content.trim().to_string()
}

/// Group card, then nickname, then a fixed fallback.
pub fn group_sender_name(sender: &Value) -> String {
    non_blank(&sender["card"])
        .or_else(|| non_blank(&sender["nickname"]))
        .unwrap_or(UNKNOWN_SENDER)
        .to_string()
}

/// In a private chat, anyone other than the friend is the bot itself,
/// including a sender with no `user_id`.
pub fn friend_sender_name(sender: &Value, friend_id: u64) -> String {
    if plain(&sender["user_id"]) != friend_id.to_string() {
        return SELF_SENDER.to_string();
    }
    non_blank(&sender["nickname"])
        .unwrap_or(UNKNOWN_SENDER)
        .to_string()
}

/// Format one message from a history response as a stored line.
///
/// Returns `None` when the message has no segments or renders empty.
pub fn format_history_message(message: &Value, key: &ConversationKey) -> Option<String> {
    let segments = message["message"].as_array()?;
    let content = format_segments(segments);
    if content.is_empty() {
        return None;
    }
    let sender = &message["sender"];
    let name = match key.kind() {
        ConversationKind::Group => group_sender_name(sender),
        ConversationKind::Direct => friend_sender_name(sender, key.id()),
    };
    Some(format_line(&name, &content))
}

fn non_blank(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.trim().is_empty())
}

/// Ids arrive as numbers or strings depending on the implementation.
pub(crate) fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

pub(crate) fn as_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_accept_numbers_and_strings() {
        assert_eq!(as_id(&json!(42)), Some(42));
        assert_eq!(as_id(&json!("42")), Some(42));
        assert_eq!(as_id(&json!("abc")), None);
        assert_eq!(as_id(&Value::Null), None);
    }

    #[test]
    fn plain_renders_scalars() {
        assert_eq!(plain(&json!(7)), "7");
        assert_eq!(plain(&json!("all")), "all");
        assert_eq!(plain(&json!(null)), "");
    }
}
