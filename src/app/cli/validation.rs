//! CLI argument validation and conversion into component settings

use super::args::Args;
use super::config::ConfigError;
use crate::core::retry::RetryPolicy;
use crate::core::validation::validate_base_url;
use crate::lookup::api::{BackendKind, LookupSettings, DEFAULT_TIMEOUT};
use crate::scanner::api::{PipelineConfig, DEFAULT_HISTORY_SIZE};
use std::str::FromStr;
use std::time::Duration;

/// Upper bound for `timeout-secs`
pub const MAX_TIMEOUT_SECS: usize = 600;
/// Upper bound for `retries`
pub const MAX_RETRIES: usize = 10;

/// Slack on top of the client's own budget before the pipeline gives up
const PIPELINE_MARGIN: Duration = Duration::from_secs(1);

impl Args {
    /// Validate arguments after the config file has been merged in
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backend_kind()?;
        if let Some(base_url) = &self.base_url {
            validate_base_url(base_url)?;
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::invalid(
                "timeout-secs",
                "timeout-secs must be greater than 0",
            ));
        }
        if self.timeout_secs.is_some_and(|secs| secs > MAX_TIMEOUT_SECS) {
            return Err(ConfigError::invalid(
                "timeout-secs",
                format!("timeout-secs must be at most {}", MAX_TIMEOUT_SECS),
            ));
        }
        if self.retries.is_some_and(|retries| retries > MAX_RETRIES) {
            return Err(ConfigError::invalid(
                "retries",
                format!("retries must be at most {}", MAX_RETRIES),
            ));
        }
        if self.history_size == Some(0) {
            return Err(ConfigError::invalid(
                "history-size",
                "history-size must be greater than 0",
            ));
        }
        if self.backend_kind()? == BackendKind::Gtin
            && self.api_key.as_deref().map_or(true, |k| k.trim().is_empty())
        {
            return Err(ConfigError::invalid(
                "api-key",
                "the gtin backend needs an api-key (--api-key or 'api-key' in the config file)",
            ));
        }
        Ok(())
    }

    pub fn backend_kind(&self) -> Result<BackendKind, ConfigError> {
        match &self.backend {
            None => Ok(BackendKind::default()),
            Some(name) => BackendKind::from_str(name).map_err(|_| {
                ConfigError::invalid(
                    "backend",
                    format!(
                        "unknown backend '{}', expected one of: {}",
                        name,
                        BackendKind::variants()
                    ),
                )
            }),
        }
    }

    fn lookup_timeout(&self) -> Duration {
        self.timeout_secs
            .map(|secs| Duration::from_secs(u64::try_from(secs).unwrap_or(u64::MAX)))
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn lookup_settings(&self) -> Result<LookupSettings, ConfigError> {
        let base_url = match &self.base_url {
            Some(url) => Some(validate_base_url(url)?),
            None => None,
        };

        Ok(LookupSettings {
            backend: self.backend_kind()?,
            base_url,
            api_key: self.api_key.clone(),
            api_host: self.api_host.clone(),
            timeout: self.lookup_timeout(),
            retries: self.retries.unwrap_or(0),
            dump_dir: self.dump_dir.clone(),
        })
    }

    /// The pipeline bound covers every client attempt, the delays between
    /// them and a small margin; it saturates instead of overflowing
    pub fn pipeline_config(&self) -> PipelineConfig {
        let retries = self.retries.unwrap_or(0);
        let retry_count = u32::try_from(retries).unwrap_or(u32::MAX);
        let attempts = self
            .lookup_timeout()
            .checked_mul(retry_count.saturating_add(1))
            .unwrap_or(Duration::MAX);
        let delays = RetryPolicy::with_retries(retries)
            .delay
            .checked_mul(retry_count)
            .unwrap_or(Duration::MAX);

        PipelineConfig {
            lookup_timeout: attempts
                .saturating_add(delays)
                .saturating_add(PIPELINE_MARGIN),
            history_size: self.history_size.unwrap_or(DEFAULT_HISTORY_SIZE),
        }
    }
}
