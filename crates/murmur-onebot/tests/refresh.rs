use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use murmur_core::{observer_fn, ConversationKey, HistorySource, MessageEvent, MurmurError};
use murmur_memory::ChatMemory;
use murmur_onebot::HistoryRefresher;

/// Returns canned lines and records what it was asked for.
struct ScriptedSource {
    lines: Vec<String>,
    fail: bool,
    calls: Mutex<Vec<(ConversationKey, usize)>>,
}

impl ScriptedSource {
    fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }
}

#[async_trait]
impl HistorySource for ScriptedSource {
    async fn fetch(
        &self,
        key: &ConversationKey,
        count: usize,
    ) -> Result<Vec<String>, MurmurError> {
        self.calls.lock().unwrap().push((*key, count));
        if self.fail {
            return Err(MurmurError::Http("connection refused".to_string()));
        }
        Ok(self.lines.clone())
    }
}

#[tokio::test]
async fn refresh_merges_fetched_history_before_live_lines() {
    let memory = Arc::new(ChatMemory::new());
    let key = ConversationKey::group(5);
    memory.add_sent_message(&key, "[我]: live");

    let source = Arc::new(ScriptedSource::new(&["[a]: old", "[我]: live", "[b]: older"]));
    let refresher = HistoryRefresher::new(source.clone(), Arc::clone(&memory)).with_count(20);

    let fetched = refresher.refresh(&key).await.unwrap();

    assert_eq!(fetched, 3);
    assert_eq!(
        memory.get_history(&key),
        vec!["[a]: old", "[b]: older", "[我]: live"]
    );
    assert_eq!(*source.calls.lock().unwrap(), vec![(key, 20)]);
}

#[tokio::test]
async fn refresh_does_not_notify_observers() {
    let memory = Arc::new(ChatMemory::new());
    let seen = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&seen);
    memory.register_message_callback(observer_fn(move |_e: &MessageEvent| {
        *counter.lock().unwrap() += 1;
        Ok(())
    }));

    let source = Arc::new(ScriptedSource::new(&["[a]: 1", "[b]: 2"]));
    let refresher = HistoryRefresher::new(source, Arc::clone(&memory));
    refresher.refresh(&ConversationKey::direct(9)).await.unwrap();

    assert_eq!(memory.friend_history(9).len(), 2);
    assert_eq!(*seen.lock().unwrap(), 0);
}

#[tokio::test]
async fn failed_fetch_leaves_history_untouched() {
    let memory = Arc::new(ChatMemory::new());
    let key = ConversationKey::group(1);
    memory.add_sent_message(&key, "[我]: keep");

    let refresher = HistoryRefresher::new(Arc::new(ScriptedSource::failing()), Arc::clone(&memory));
    let err = refresher.refresh(&key).await.unwrap_err();

    assert!(matches!(err, MurmurError::Http(_)));
    assert_eq!(memory.get_history(&key), vec!["[我]: keep"]);
}

#[tokio::test]
async fn spawned_refresh_reports_outcome() {
    let memory = Arc::new(ChatMemory::new());
    let ok = Arc::new(HistoryRefresher::new(
        Arc::new(ScriptedSource::new(&["[a]: x"])),
        Arc::clone(&memory),
    ));
    let failing = Arc::new(HistoryRefresher::new(
        Arc::new(ScriptedSource::failing()),
        Arc::clone(&memory),
    ));

    let key = ConversationKey::group(2);
    let (a, b) = futures::join!(ok.spawn_refresh(key), failing.spawn_refresh(key));

    assert_eq!(a.unwrap(), Some(1));
    assert_eq!(b.unwrap(), None);
    assert_eq!(memory.get_history(&key), vec!["[a]: x"]);
}

#[test]
fn default_fetch_count() {
    let refresher = HistoryRefresher::new(
        Arc::new(ScriptedSource::new(&[])),
        Arc::new(ChatMemory::new()),
    );
    assert_eq!(refresher.count(), 30);
}
