//! AsyncNotificationManager implementation
//!
//! Fan-out of events to named subscribers over unbounded channels. There is
//! no global instance: whoever builds the scan pipeline owns the manager and
//! hands it to the presentation side.

use crate::notifications::error::NotificationError;
use crate::notifications::event::{Event, EventFilter};
use crate::notifications::traits::SubscriberStatistics;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

struct SubscriberInfo {
    filter: EventFilter,
    source: String,
    sender: UnboundedSender<Event>,
    statistics: Arc<SubscriberStatistics>,
}

/// Receiving end of a subscription
pub struct EventReceiver {
    subscriber_id: String,
    receiver: UnboundedReceiver<Event>,
    statistics: Arc<SubscriberStatistics>,
}

impl EventReceiver {
    pub fn subscriber_id(&self) -> &str {
        &self.subscriber_id
    }

    /// Wait for the next event; `None` once the manager dropped this subscriber
    pub async fn recv(&mut self) -> Option<Event> {
        let event = self.receiver.recv().await?;
        self.statistics.record_message_processed();
        Some(event)
    }

    /// Non-blocking receive
    pub fn try_recv(&mut self) -> Option<Event> {
        let event = self.receiver.try_recv().ok()?;
        self.statistics.record_message_processed();
        Some(event)
    }
}

impl std::fmt::Debug for EventReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventReceiver")
            .field("subscriber_id", &self.subscriber_id)
            .field("queue_size", &self.statistics.queue_size())
            .finish()
    }
}

pub struct AsyncNotificationManager {
    subscribers: HashMap<String, SubscriberInfo>,
}

impl Default for AsyncNotificationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncNotificationManager {
    pub fn new() -> Self {
        Self {
            subscribers: HashMap::new(),
        }
    }

    pub fn subscribe(
        &mut self,
        subscriber_id: String,
        filter: EventFilter,
        source: String,
    ) -> EventReceiver {
        let (sender, receiver) = unbounded_channel();
        let statistics = Arc::new(SubscriberStatistics::new());

        let subscriber_info = SubscriberInfo {
            filter,
            source: source.clone(),
            sender,
            statistics: statistics.clone(),
        };

        if let Some(existing) = self
            .subscribers
            .insert(subscriber_id.clone(), subscriber_info)
        {
            log::warn!(
                "Subscriber '{}' replaced existing subscription (source: {} -> {})",
                subscriber_id,
                existing.source,
                source
            );
        }

        EventReceiver {
            subscriber_id,
            receiver,
            statistics,
        }
    }

    pub fn unsubscribe(&mut self, subscriber_id: &str) -> Result<(), NotificationError> {
        self.subscribers
            .remove(subscriber_id)
            .map(|_| ())
            .ok_or_else(|| NotificationError::UnknownSubscriber(subscriber_id.to_string()))
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn has_subscriber(&self, subscriber_id: &str) -> bool {
        self.subscribers.contains_key(subscriber_id)
    }

    pub fn get_subscriber_statistics(&self, subscriber_id: &str) -> Option<&SubscriberStatistics> {
        self.subscribers
            .get(subscriber_id)
            .map(|info| info.statistics.as_ref())
    }

    pub async fn publish(&mut self, event: Event) -> Result<(), NotificationError> {
        let mut failed_subscribers = Vec::new();

        for (subscriber_id, subscriber_info) in &self.subscribers {
            if !subscriber_info.filter.accepts(&event) {
                continue;
            }

            if subscriber_info.sender.send(event.clone()).is_ok() {
                subscriber_info.statistics.record_published();
            } else {
                failed_subscribers.push(subscriber_id.clone());
            }
        }

        for subscriber_id in &failed_subscribers {
            self.subscribers.remove(subscriber_id);
            log::trace!("Removed subscriber '{}' with closed channel", subscriber_id);
        }

        if !failed_subscribers.is_empty() {
            return Err(NotificationError::PublishFailed {
                event_type: event.kind().to_string(),
                failed_subscribers,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::event::{ScanEvent, ScanEventType, SystemEvent, SystemEventType};

    #[tokio::test]
    async fn test_subscriber_registration_with_source() {
        let mut manager = AsyncNotificationManager::new();

        let _receiver1 = manager.subscribe(
            "sheet".to_string(),
            EventFilter::OutcomeOnly,
            "presentation:sheet".to_string(),
        );
        let _receiver2 = manager.subscribe(
            "audit".to_string(),
            EventFilter::All,
            "logger:audit".to_string(),
        );

        assert_eq!(manager.subscriber_count(), 2);
        assert!(manager.has_subscriber("sheet"));
        assert!(manager.has_subscriber("audit"));
        assert!(!manager.has_subscriber("nonexistent"));
    }

    #[tokio::test]
    async fn test_publish_respects_filters() {
        let mut manager = AsyncNotificationManager::new();

        let mut scan_receiver = manager.subscribe(
            "spinner".to_string(),
            EventFilter::ScanOnly,
            "spinner:test".to_string(),
        );
        let mut all_receiver = manager.subscribe(
            "logger".to_string(),
            EventFilter::All,
            "logger:test".to_string(),
        );

        manager
            .publish(Event::Scan(ScanEvent::new(ScanEventType::Accepted, 1)))
            .await
            .unwrap();
        manager
            .publish(Event::System(SystemEvent::new(SystemEventType::Startup)))
            .await
            .unwrap();

        assert!(matches!(scan_receiver.recv().await, Some(Event::Scan(_))));
        assert!(scan_receiver.try_recv().is_none());

        assert!(matches!(all_receiver.recv().await, Some(Event::Scan(_))));
        assert!(matches!(all_receiver.recv().await, Some(Event::System(_))));
    }

    #[tokio::test]
    async fn test_automatic_subscriber_cleanup() {
        let mut manager = AsyncNotificationManager::new();

        let receiver1 = manager.subscribe(
            "subscriber1".to_string(),
            EventFilter::All,
            "test:cleanup1".to_string(),
        );
        let _receiver2 = manager.subscribe(
            "subscriber2".to_string(),
            EventFilter::All,
            "test:cleanup2".to_string(),
        );

        drop(receiver1);

        let result = manager
            .publish(Event::System(SystemEvent::new(SystemEventType::Startup)))
            .await;

        match result {
            Err(NotificationError::PublishFailed {
                event_type,
                failed_subscribers,
            }) => {
                assert_eq!(event_type, "System");
                assert_eq!(failed_subscribers, vec!["subscriber1".to_string()]);
            }
            other => panic!("Expected PublishFailed, got {:?}", other),
        }

        assert_eq!(manager.subscriber_count(), 1);
        assert!(manager.has_subscriber("subscriber2"));
    }

    #[tokio::test]
    async fn test_queue_size_follows_receiver() {
        let mut manager = AsyncNotificationManager::new();
        let mut receiver = manager.subscribe(
            "sheet".to_string(),
            EventFilter::All,
            "test:queue".to_string(),
        );

        for _ in 0..3 {
            manager
                .publish(Event::Scan(ScanEvent::new(ScanEventType::Rearmed, 1)))
                .await
                .unwrap();
        }
        assert_eq!(manager.get_subscriber_statistics("sheet").unwrap().queue_size(), 3);

        receiver.recv().await.unwrap();
        let stats = manager.get_subscriber_statistics("sheet").unwrap();
        assert_eq!(stats.queue_size(), 2);
        assert_eq!(stats.messages_processed(), 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_and_resubscribe() {
        let mut manager = AsyncNotificationManager::new();
        let _receiver = manager.subscribe(
            "sheet".to_string(),
            EventFilter::All,
            "test:first".to_string(),
        );

        assert!(manager.unsubscribe("sheet").is_ok());
        assert_eq!(
            manager.unsubscribe("sheet"),
            Err(NotificationError::UnknownSubscriber("sheet".to_string()))
        );

        let _receiver = manager.subscribe(
            "sheet".to_string(),
            EventFilter::All,
            "test:second".to_string(),
        );
        assert_eq!(manager.subscriber_count(), 1);
    }
}
