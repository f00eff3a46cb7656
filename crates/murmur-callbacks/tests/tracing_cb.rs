use chrono::Local;
use murmur_callbacks::{NotificationBus, TracingObserver};
use murmur_core::{ActiveConversation, ActiveGroupsUpdated, ConversationKey, MessageEvent, Observer};

#[test]
fn tracing_observer_handles_message_events() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let observer = TracingObserver::new();
    let result = observer.notify(&MessageEvent {
        key: ConversationKey::direct(10),
        message: "[Bob]: hello".to_string(),
    });
    assert!(result.is_ok());
}

#[test]
fn tracing_observer_handles_group_updates() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let bus = NotificationBus::<ActiveGroupsUpdated>::new();
    bus.subscribe(TracingObserver::new());

    let update = ActiveGroupsUpdated {
        groups: vec![ActiveConversation::new(
            ConversationKey::group(1),
            "Rust CN",
            Local::now(),
        )],
    };
    assert_eq!(bus.publish(&update), 1);
    assert_eq!(bus.publish(&ActiveGroupsUpdated { groups: vec![] }), 1);
}
