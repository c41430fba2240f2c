use std::collections::HashMap;
use std::sync::Arc;

use aquaferme_api::LiveMessage;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

/// Fan-out of live messages to every connected dashboard.
#[derive(Default)]
pub struct LiveRouter {
    subscribers: Arc<RwLock<HashMap<String, mpsc::UnboundedSender<LiveMessage>>>>,
}

impl LiveRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self) -> (String, mpsc::UnboundedReceiver<LiveMessage>) {
        let id = Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::unbounded_channel();

        self.subscribers.write().await.insert(id.clone(), tx);
        (id, rx)
    }

    pub async fn unsubscribe(&self, subscription_id: &str) {
        self.subscribers.write().await.remove(subscription_id);
    }

    pub async fn publish(&self, message: LiveMessage) {
        let mut closed = Vec::new();

        {
            let subscribers = self.subscribers.read().await;
            for (id, sender) in subscribers.iter() {
                if sender.send(message.clone()).is_err() {
                    tracing::warn!("Failed to send {} to subscriber: {}", message.kind(), id);
                    closed.push(id.clone());
                }
            }
        }

        if !closed.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for id in closed {
                subscribers.remove(&id);
            }
        }
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use aquaferme_api::models::DeviceStatus;

    use super::*;

    fn status() -> LiveMessage {
        LiveMessage::IotStatusUpdate(DeviceStatus {
            device_id: 1,
            nom: String::from("sonde"),
            bassin_id: None,
            online: true,
            last_seen: None,
        })
    }

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        let router = LiveRouter::new();
        let (_, mut first) = router.subscribe().await;
        let (_, mut second) = router.subscribe().await;

        router.publish(status()).await;

        assert_eq!(first.recv().await.unwrap().kind(), "iot_status_update");
        assert_eq!(second.recv().await.unwrap().kind(), "iot_status_update");
    }

    #[tokio::test]
    async fn test_unsubscribe_and_dropped_receivers() {
        let router = LiveRouter::new();
        let (kept_id, _kept) = router.subscribe().await;
        let (_, dropped) = router.subscribe().await;
        assert_eq!(router.subscriber_count().await, 2);

        drop(dropped);
        router.publish(status()).await;
        assert_eq!(router.subscriber_count().await, 1);

        router.unsubscribe(&kept_id).await;
        assert_eq!(router.subscriber_count().await, 0);
    }
}
