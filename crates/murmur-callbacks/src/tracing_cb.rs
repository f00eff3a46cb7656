use murmur_core::{ActiveGroupsUpdated, MessageEvent, MurmurError, Observer};

/// Logs every event it receives through `tracing`.
pub struct TracingObserver;

impl TracingObserver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer<MessageEvent> for TracingObserver {
    fn notify(&self, event: &MessageEvent) -> Result<(), MurmurError> {
        tracing::info!(key = %event.key, message = %event.message, "message stored");
        Ok(())
    }
}

impl Observer<ActiveGroupsUpdated> for TracingObserver {
    fn notify(&self, event: &ActiveGroupsUpdated) -> Result<(), MurmurError> {
        let most_recent = event.groups.first().map(|g| g.key.to_string());
        tracing::info!(
            groups = event.groups.len(),
            most_recent = most_recent.as_deref().unwrap_or("-"),
            "active groups updated"
        );
        Ok(())
    }
}
