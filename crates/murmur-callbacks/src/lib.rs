mod bus;
mod tracing_cb;

pub use bus::{NotificationBus, SubscriptionId};
pub use tracing_cb::TracingObserver;

use std::sync::{Arc, Mutex, PoisonError};

use murmur_core::{MurmurError, Observer};

/// An observer that records every event it receives, useful for testing.
#[derive(Debug)]
pub struct RecordingObserver<E> {
    events: Arc<Mutex<Vec<E>>>,
}

impl<E: Clone> RecordingObserver<E> {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn events(&self) -> Vec<E> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: Clone> Default for RecordingObserver<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for RecordingObserver<E> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }
}

impl<E> Observer<E> for RecordingObserver<E>
where
    E: Clone + Send + Sync,
{
    fn notify(&self, event: &E) -> Result<(), MurmurError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
        Ok(())
    }
}
