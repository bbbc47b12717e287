//! Public API for the notification system
//!
//! External modules should import from here rather than directly from
//! internal modules. The manager is shared as
//! `Arc<tokio::sync::Mutex<AsyncNotificationManager>>`, built by the caller
//! and passed to every component that publishes or subscribes.

use std::sync::Arc;
use tokio::sync::Mutex;

// Core event types and enums
pub use crate::notifications::event::{
    Event, EventFilter, OutcomeEvent, ScanEvent, ScanEventType, SystemEvent, SystemEventType,
};

// Manager and utilities
pub use crate::notifications::error::NotificationError;
pub use crate::notifications::manager::{AsyncNotificationManager, EventReceiver};

// Statistics
pub use crate::notifications::traits::SubscriberStatistics;

/// Shared handle to a notification manager
pub type SharedNotifier = Arc<Mutex<AsyncNotificationManager>>;

/// Create a fresh, empty notification manager ready to be shared
pub fn new_notifier() -> SharedNotifier {
    log::trace!("Initializing notification manager");
    Arc::new(Mutex::new(AsyncNotificationManager::new()))
}

/// Publish an event, logging instead of failing when subscribers went away
///
/// A closed subscriber is not an error for the publisher: the manager has
/// already dropped it.
pub async fn publish_logged(notifier: &SharedNotifier, event: Event) {
    let mut manager = notifier.lock().await;
    if let Err(e) = manager.publish(event).await {
        log::debug!("{}", e);
    }
}
