//! Validation utilities for configuration values and scanner input

use std::fmt;

/// A configuration or input value failed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation error: {}", self.message)
    }
}

impl std::error::Error for ValidationError {}

impl crate::core::error_handling::ContextualError for ValidationError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        Some(&self.message)
    }
}

/// Validate positive integer value
pub fn validate_positive_int(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err("Value must be greater than 0".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{}' is not a valid positive integer", value)),
    }
}

/// Validate a lookup service base URL and strip any trailing slash
pub fn validate_base_url(url: &str) -> Result<String, ValidationError> {
    let trimmed = url.trim();
    let Some((scheme, rest)) = ["https://", "http://"]
        .iter()
        .find_map(|scheme| trimmed.strip_prefix(scheme).map(|rest| (*scheme, rest)))
    else {
        return Err(ValidationError::new(format!(
            "base-url '{}' must start with http:// or https://",
            url
        )));
    };

    let rest = rest.trim_end_matches('/');
    if rest.is_empty() || rest.starts_with('/') {
        return Err(ValidationError::new(format!(
            "base-url '{}' has no host",
            url
        )));
    }

    let normalized = format!("{scheme}{rest}");
    match reqwest::Url::parse(&normalized) {
        Ok(parsed) if parsed.host_str().is_some_and(|host| !host.is_empty()) => Ok(normalized),
        Ok(_) => Err(ValidationError::new(format!(
            "base-url '{}' has no host",
            url
        ))),
        Err(e) => Err(ValidationError::new(format!(
            "base-url '{}' is not a valid URL: {}",
            url, e
        ))),
    }
}

/// Clean a line of scanner input; `None` means there is nothing to scan
pub fn clean_scanner_input(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
