use std::sync::Arc;

use murmur_core::{ConversationKey, HistoryStore};
use murmur_memory::{trim_to_char_budget, ChatHistoryStore, ContextWindowHistory, MemoryConfig};

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn within_budget_is_untouched() {
    let input = lines(&["abc", "def"]);
    assert_eq!(trim_to_char_budget(input.clone(), 6), input);
}

#[test]
fn oldest_lines_go_first() {
    assert_eq!(
        trim_to_char_budget(lines(&["aaaa", "bb", "c"]), 3),
        lines(&["bb", "c"])
    );
}

#[test]
fn budget_counts_characters_not_bytes() {
    // Each line is 4 characters but 12 bytes.
    let input = lines(&["你好世界", "早上好呀"]);
    assert_eq!(trim_to_char_budget(input.clone(), 8), input);
}

#[test]
fn single_oversized_line_is_dropped() {
    assert!(trim_to_char_budget(lines(&["way too long"]), 3).is_empty());
}

#[test]
fn window_view_trims_reads_only() {
    let inner: Arc<ChatHistoryStore> = Arc::new(ChatHistoryStore::new());
    let window = ContextWindowHistory::new(inner.clone(), 10);
    let key = ConversationKey::group(1);

    window.append(&key, "[a]: 12345".to_string());
    window.append(&key, "[b]: 1".to_string());
    window.merge(&key, &lines(&["[z]: old"]));

    assert_eq!(window.snapshot(&key), lines(&["[b]: 1"]));
    assert_eq!(inner.snapshot(&key).len(), 3);
    assert_eq!(window.max_chars(), 10);

    window.clear(&key);
    assert!(inner.snapshot(&key).is_empty());
}

#[test]
fn config_defaults_and_partial_json() {
    let defaults = MemoryConfig::default();
    assert_eq!(defaults.max_history, 99);
    assert_eq!(defaults.max_active_groups, 10);
    assert_eq!(defaults.prompt_char_budget, 5000);

    let parsed = MemoryConfig::from_json(r#"{"max_history": 20}"#).unwrap();
    assert_eq!(parsed, MemoryConfig::new().with_max_history(20));
}

#[test]
fn config_rejects_zero_caps_and_bad_json() {
    let err = MemoryConfig::from_json(r#"{"max_history": 0}"#).unwrap_err();
    assert!(err.to_string().contains("max_history"));
    assert!(MemoryConfig::from_json(r#"{"max_active_groups": 0}"#).is_err());
    assert!(MemoryConfig::from_json("not json").is_err());
}
