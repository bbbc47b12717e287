//! Error types for the notification system

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum NotificationError {
    /// Some subscribers dropped their receivers; they have been removed
    PublishFailed {
        event_type: String,
        failed_subscribers: Vec<String>,
    },
    /// No subscriber with this id
    UnknownSubscriber(String),
}

impl fmt::Display for NotificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationError::PublishFailed {
                event_type,
                failed_subscribers,
            } => {
                write!(
                    f,
                    "Failed to publish {} event to {} subscribers: {:?}",
                    event_type,
                    failed_subscribers.len(),
                    failed_subscribers
                )
            }
            NotificationError::UnknownSubscriber(id) => {
                write!(f, "Unknown subscriber: {id}")
            }
        }
    }
}

impl std::error::Error for NotificationError {}

impl crate::core::error_handling::ContextualError for NotificationError {
    fn is_user_actionable(&self) -> bool {
        false
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}
