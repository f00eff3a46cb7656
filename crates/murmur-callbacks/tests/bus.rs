use std::sync::{Arc, Mutex};

use murmur_callbacks::{NotificationBus, RecordingObserver};
use murmur_core::{observer_fn, ConversationKey, MessageEvent, MurmurError, Observer};

fn event(id: u64, message: &str) -> MessageEvent {
    MessageEvent {
        key: ConversationKey::group(id),
        message: message.to_string(),
    }
}

#[test]
fn publish_reaches_every_subscriber() {
    let bus = NotificationBus::new();
    let r1 = RecordingObserver::new();
    let r2 = RecordingObserver::new();
    bus.subscribe(r1.clone());
    bus.subscribe(r2.clone());

    let delivered = bus.publish(&event(1, "[a]: hi"));

    assert_eq!(delivered, 2);
    assert_eq!(r1.events(), vec![event(1, "[a]: hi")]);
    assert_eq!(r2.events(), vec![event(1, "[a]: hi")]);
}

#[test]
fn subscribers_run_in_subscription_order() {
    let bus = NotificationBus::<MessageEvent>::new();
    let order = Arc::new(Mutex::new(Vec::new()));
    for name in ["first", "second", "third"] {
        let order = Arc::clone(&order);
        bus.subscribe(observer_fn(move |_e: &MessageEvent| {
            order.lock().unwrap().push(name);
            Ok(())
        }));
    }

    bus.publish(&event(1, "x"));
    assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
}

#[test]
fn failing_observer_does_not_stop_delivery() {
    let bus = NotificationBus::new();
    let before = RecordingObserver::new();
    let after = RecordingObserver::new();
    bus.subscribe(before.clone());
    bus.subscribe(observer_fn(|_e: &MessageEvent| {
        Err(MurmurError::Observer("forced failure".to_string()))
    }));
    bus.subscribe(after.clone());

    let delivered = bus.publish(&event(2, "m"));

    assert_eq!(delivered, 2);
    assert_eq!(before.len(), 1);
    assert_eq!(after.len(), 1);
}

#[test]
fn panicking_observer_is_isolated() {
    let bus = NotificationBus::new();
    let survivor = RecordingObserver::new();
    bus.subscribe(observer_fn(|_e: &MessageEvent| -> Result<(), MurmurError> {
        panic!("observer blew up")
    }));
    bus.subscribe(survivor.clone());

    let delivered = bus.publish(&event(3, "m"));

    assert_eq!(delivered, 1);
    assert_eq!(survivor.len(), 1);
    // The bus is still usable afterwards.
    assert_eq!(bus.publish(&event(3, "n")), 1);
    assert_eq!(survivor.len(), 2);
}

#[test]
fn unsubscribe_stops_delivery() {
    let bus = NotificationBus::new();
    let recorder = RecordingObserver::new();
    let id = bus.subscribe(recorder.clone());

    bus.publish(&event(1, "a"));
    assert!(bus.unsubscribe(id));
    bus.publish(&event(1, "b"));

    assert_eq!(recorder.events(), vec![event(1, "a")]);
    assert!(bus.is_empty());
    assert!(!bus.unsubscribe(id));
}

#[test]
fn subscription_ids_are_unique() {
    let bus = NotificationBus::<MessageEvent>::new();
    let a = bus.subscribe(RecordingObserver::new());
    let b = bus.subscribe(RecordingObserver::new());
    assert_ne!(a, b);
    assert_ne!(a.to_string(), b.to_string());
    assert_eq!(bus.len(), 2);
}

#[test]
fn weak_subscription_is_dropped_with_its_observer() {
    let bus = NotificationBus::new();
    let recorder = Arc::new(RecordingObserver::new());
    bus.subscribe_weak(&recorder);

    assert_eq!(bus.publish(&event(1, "alive")), 1);
    assert_eq!(recorder.len(), 1);

    drop(recorder);
    assert_eq!(bus.publish(&event(1, "gone")), 0);
    assert!(bus.is_empty());
}

#[test]
fn observer_may_unsubscribe_itself_during_publish() {
    let bus = Arc::new(NotificationBus::<MessageEvent>::new());
    let calls = Arc::new(Mutex::new(0));
    let id_slot = Arc::new(Mutex::new(None));

    let id = {
        let inner_bus = Arc::clone(&bus);
        let calls = Arc::clone(&calls);
        let id_slot = Arc::clone(&id_slot);
        bus.subscribe(observer_fn(move |_e: &MessageEvent| {
            *calls.lock().unwrap() += 1;
            if let Some(id) = id_slot.lock().unwrap().take() {
                inner_bus.unsubscribe(id);
            }
            Ok(())
        }))
    };
    *id_slot.lock().unwrap() = Some(id);

    bus.publish(&event(1, "a"));
    bus.publish(&event(1, "b"));
    assert_eq!(*calls.lock().unwrap(), 1);
}

#[test]
fn shared_observer_can_be_registered_as_trait_object() {
    let bus = NotificationBus::new();
    let recorder = RecordingObserver::new();
    let shared: Arc<dyn Observer<MessageEvent>> = Arc::new(recorder.clone());
    bus.subscribe_arc(shared);
    bus.publish(&event(4, "dyn"));
    assert_eq!(recorder.len(), 1);
}
