use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use murmur_core::Observer;

/// Handle returned by [`NotificationBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

enum Subscriber<E> {
    Strong(Arc<dyn Observer<E>>),
    Weak(Weak<dyn Observer<E>>),
}

impl<E> Subscriber<E> {
    fn upgrade(&self) -> Option<Arc<dyn Observer<E>>> {
        match self {
            Subscriber::Strong(observer) => Some(Arc::clone(observer)),
            Subscriber::Weak(observer) => observer.upgrade(),
        }
    }

    fn is_alive(&self) -> bool {
        match self {
            Subscriber::Strong(_) => true,
            Subscriber::Weak(observer) => observer.strong_count() > 0,
        }
    }
}

/// In-process publish/subscribe fan-out.
///
/// Observers are invoked synchronously on the publishing thread, in
/// subscription order. The subscriber list is copied under the lock and the
/// observers run outside of it, so an observer may subscribe or unsubscribe
/// from inside `notify`.
///
/// Strong subscriptions live until [`unsubscribe`](Self::unsubscribe) is
/// called; forgetting to do so leaks the observer. Subscriptions made with
/// [`subscribe_weak`](Self::subscribe_weak) are dropped automatically once
/// the observer is gone.
pub struct NotificationBus<E> {
    next_id: AtomicU64,
    subscribers: RwLock<Vec<(SubscriptionId, Subscriber<E>)>>,
}

impl<E> NotificationBus<E> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Register an observer owned by the bus.
    pub fn subscribe<O>(&self, observer: O) -> SubscriptionId
    where
        O: Observer<E> + 'static,
    {
        self.subscribe_arc(Arc::new(observer))
    }

    /// Register a shared observer. The bus keeps it alive until unsubscribed.
    pub fn subscribe_arc(&self, observer: Arc<dyn Observer<E>>) -> SubscriptionId {
        self.insert(Subscriber::Strong(observer))
    }

    /// Register an observer without keeping it alive.
    pub fn subscribe_weak<O>(&self, observer: &Arc<O>) -> SubscriptionId
    where
        O: Observer<E> + 'static,
    {
        let weak: Weak<O> = Arc::downgrade(observer);
        self.insert(Subscriber::Weak(weak))
    }

    /// Remove a subscription. Returns `false` if the id was unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| *sub_id != id);
        before != subscribers.len()
    }

    /// Number of registered subscriptions, including weak ones whose
    /// observer has not been pruned yet.
    pub fn len(&self) -> usize {
        self.subscribers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to every live observer and return how many of them
    /// handled it without error.
    ///
    /// A failing or panicking observer is logged and skipped; it never stops
    /// delivery to the rest and never reaches the publisher.
    pub fn publish(&self, event: &E) -> usize {
        let (targets, has_dead) = {
            let subscribers = self.subscribers.read().unwrap_or_else(PoisonError::into_inner);
            let mut has_dead = false;
            let targets: Vec<_> = subscribers
                .iter()
                .filter_map(|(id, sub)| {
                    let observer = sub.upgrade();
                    has_dead |= observer.is_none();
                    observer.map(|o| (*id, o))
                })
                .collect();
            (targets, has_dead)
        };

        if has_dead {
            self.prune();
        }

        let mut delivered = 0;
        for (id, observer) in targets {
            match catch_unwind(AssertUnwindSafe(|| observer.notify(event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => {
                    tracing::warn!(subscription = %id, error = %e, "observer failed, continuing");
                }
                Err(payload) => {
                    tracing::warn!(
                        subscription = %id,
                        panic = panic_message(payload.as_ref()),
                        "observer panicked, continuing"
                    );
                }
            }
        }
        delivered
    }

    fn insert(&self, subscriber: Subscriber<E>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, subscriber));
        id
    }

    fn prune(&self) {
        let mut subscribers = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|(_, sub)| sub.is_alive());
        tracing::debug!(pruned = before - subscribers.len(), "dropped dead weak subscriptions");
    }
}

impl<E> Default for NotificationBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for NotificationBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationBus")
            .field("subscribers", &self.len())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
