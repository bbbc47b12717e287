//! Lookup Error Types

use std::time::Duration;

/// Failures a product lookup can end with
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LookupError {
    #[error("Invalid lookup URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Network error: {message}")]
    Transport { message: String },

    #[error("Server returned status code {status}")]
    Status { status: u16 },

    #[error("Could not decode product response: {message}")]
    Decode { message: String },

    #[error("Lookup timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Lookup cancelled")]
    Cancelled,

    #[error("Lookup client misconfigured: {message}")]
    Configuration { message: String },
}

impl LookupError {
    /// Failures worth another attempt at the client level
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LookupError::Transport { .. } | LookupError::Timeout { .. }
        )
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            LookupError::Status {
                status: status.as_u16(),
            }
        } else if error.is_builder() {
            LookupError::InvalidUrl {
                url: error.url().map(|u| u.to_string()).unwrap_or_default(),
                message: error.to_string(),
            }
        } else if error.is_decode() {
            LookupError::Decode {
                message: error.to_string(),
            }
        } else {
            LookupError::Transport {
                message: error.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(error: serde_json::Error) -> Self {
        LookupError::Decode {
            message: error.to_string(),
        }
    }
}

impl crate::core::error_handling::ContextualError for LookupError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            LookupError::Configuration { .. } | LookupError::InvalidUrl { .. }
        )
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            LookupError::Configuration { message } => Some(message),
            LookupError::InvalidUrl { message, .. } => Some(message),
            _ => None,
        }
    }
}

pub type LookupResult<T> = Result<T, LookupError>;
