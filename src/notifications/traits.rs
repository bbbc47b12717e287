//! Subscriber bookkeeping for the notification system

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Instant;

/// Statistics tracking for a subscriber
#[derive(Debug)]
pub struct SubscriberStatistics {
    queue_size: AtomicUsize,
    messages_published: AtomicUsize,
    messages_processed: AtomicUsize,
    last_message_time: RwLock<Option<Instant>>,
}

impl Default for SubscriberStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriberStatistics {
    pub fn new() -> Self {
        Self {
            queue_size: AtomicUsize::new(0),
            messages_published: AtomicUsize::new(0),
            messages_processed: AtomicUsize::new(0),
            last_message_time: RwLock::new(None),
        }
    }

    /// Events sent but not yet received
    pub fn queue_size(&self) -> usize {
        self.queue_size.load(Ordering::Relaxed)
    }

    pub fn messages_published(&self) -> usize {
        self.messages_published.load(Ordering::Relaxed)
    }

    pub fn messages_processed(&self) -> usize {
        self.messages_processed.load(Ordering::Relaxed)
    }

    pub fn record_published(&self) {
        self.queue_size.fetch_add(1, Ordering::Relaxed);
        self.messages_published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_message_processed(&self) {
        self.queue_size
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some(current.saturating_sub(1))
            })
            .ok();
        self.messages_processed.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut time) = self.last_message_time.write() {
            *time = Some(Instant::now());
        }
    }

    pub fn last_message_time(&self) -> Option<Instant> {
        *self.last_message_time.read().ok()?
    }
}
