//! User notification trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::UserId;

use super::ClientError;

/// Fire-and-forget user notifications.
///
/// Delivery failures never affect saga state; the orchestrator logs them
/// and moves on.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends a message to the user.
    async fn notify(&self, user_id: UserId, message: &str) -> Result<(), ClientError>;
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    async fn notify(&self, user_id: UserId, message: &str) -> Result<(), ClientError> {
        (**self).notify(user_id, message).await
    }
}

#[derive(Debug, Default)]
struct InMemoryNotifierState {
    messages: Vec<(UserId, String)>,
    fail_on_notify: bool,
}

/// In-memory notifier for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifier {
    state: Arc<RwLock<InMemoryNotifierState>>,
}

impl InMemoryNotifier {
    /// Creates a new in-memory notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the notifier to fail deliveries.
    pub fn set_fail_on_notify(&self, fail: bool) {
        self.state.write().unwrap().fail_on_notify = fail;
    }

    /// Returns all messages sent to the user.
    pub fn messages_for(&self, user_id: UserId) -> Vec<String> {
        self.state
            .read()
            .unwrap()
            .messages
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Returns the total number of messages sent.
    pub fn message_count(&self) -> usize {
        self.state.read().unwrap().messages.len()
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn notify(&self, user_id: UserId, message: &str) -> Result<(), ClientError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_notify {
            return Err(ClientError("notification service unreachable".to_string()));
        }
        state.messages.push((user_id, message.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_messages() {
        let notifier = InMemoryNotifier::new();
        let user = UserId::new();

        notifier.notify(user, "booking confirmed").await.unwrap();

        assert_eq!(notifier.message_count(), 1);
        assert_eq!(notifier.messages_for(user), vec!["booking confirmed"]);
        assert!(notifier.messages_for(UserId::new()).is_empty());
    }
}
