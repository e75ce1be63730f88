use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::DomainResult;
use crate::event::EventKind;
use crate::store::{StoredEvent, StoredEventProducer};

/// In-process notification channel: a registry of subscribers per
/// topic (event kind), with fan-out in registration order.
#[derive(Default)]
pub struct NotificationHub {
    subscribers: RwLock<HashMap<EventKind, Vec<UnboundedSender<StoredEvent>>>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber for one event kind. The returned
    /// receiver observes every stored event of that kind, in store
    /// order per publisher.
    pub async fn subscribe(&self, kind: EventKind) -> UnboundedReceiver<StoredEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers
            .write()
            .await
            .entry(kind)
            .or_default()
            .push(sender);
        receiver
    }
}

#[async_trait]
impl StoredEventProducer for NotificationHub {
    async fn publish(&self, event: &StoredEvent) -> DomainResult<()> {
        let mut subscribers = self.subscribers.write().await;

        if let Some(senders) = subscribers.get_mut(&event.kind) {
            // Dropped receivers are pruned as they are discovered.
            senders.retain(|sender| sender.send(event.clone()).is_ok());
            debug!(
                kind = %event.kind,
                store_id = event.store_id,
                subscriber_count = senders.len(),
                "published stored event"
            );
        }
        Ok(())
    }
}
