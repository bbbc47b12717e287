//! Generic error handling utilities
//!
//! Lets each module keep its own error enum while startup and the terminal
//! front end decide uniformly how much of an error to show.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)` with something the user can act on (a bad config value, a
/// missing API key). System errors (network failures, closed channels) return
/// `false` and `None`.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error carries a message that should be shown directly
    fn is_user_actionable(&self) -> bool;

    /// The message to show when the error is user-actionable
    fn user_message(&self) -> Option<&str>;
}

/// Log a fatal error with the appropriate level of detail
///
/// User-actionable errors show their own message; system errors show the
/// operation context. Full details always go to the debug level.
///
/// # Examples
/// ```rust,no_run
/// # use barscan::core::error_handling::log_error_with_context;
/// # use barscan::core::validation::ValidationError;
/// let err = ValidationError::new("timeout-secs must be greater than 0");
/// log_error_with_context(&err, "Configuration loading");
/// // Logs: "FATAL: timeout-secs must be greater than 0"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => log::error!("FATAL: {}", user_msg),
        _ => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct TestUserError {
        message: String,
    }

    impl fmt::Display for TestUserError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "config: {}", self.message)
        }
    }

    impl std::error::Error for TestUserError {}

    impl ContextualError for TestUserError {
        fn is_user_actionable(&self) -> bool {
            true
        }

        fn user_message(&self) -> Option<&str> {
            Some(&self.message)
        }
    }

    #[derive(Debug)]
    struct TestSystemError {
        internal_details: String,
    }

    impl fmt::Display for TestSystemError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "System error: {}", self.internal_details)
        }
    }

    impl std::error::Error for TestSystemError {}

    impl ContextualError for TestSystemError {
        fn is_user_actionable(&self) -> bool {
            false
        }

        fn user_message(&self) -> Option<&str> {
            None
        }
    }

    #[test]
    fn test_user_actionable_error_shows_specific_message() {
        let error = TestUserError {
            message: "api-key is required".to_string(),
        };

        assert!(error.is_user_actionable());
        assert_eq!(error.user_message(), Some("api-key is required"));
        log_error_with_context(&error, "Configuration validation");
    }

    #[test]
    fn test_system_error_has_no_user_message() {
        let error = TestSystemError {
            internal_details: "Connection refused".to_string(),
        };

        assert!(!error.is_user_actionable());
        assert!(error.user_message().is_none());
        assert_eq!(error.to_string(), "System error: Connection refused");
        log_error_with_context(&error, "Lookup client setup");
    }
}
