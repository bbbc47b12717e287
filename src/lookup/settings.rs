//! Lookup client settings

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_REVIEWS_BASE_URL: &str = "https://qrbackend-ghtk.onrender.com";
pub const DEFAULT_GTIN_BASE_URL: &str = "https://big-product-data.p.rapidapi.com";
pub const DEFAULT_GTIN_API_HOST: &str = "big-product-data.p.rapidapi.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Which product backend answers lookups
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BackendKind {
    /// Product and review-summary service
    #[default]
    Reviews,
    /// GTIN catalog behind RapidAPI
    Gtin,
    /// Built-in sample catalog, no network
    Fixtures,
}

impl BackendKind {
    /// Comma separated list of accepted names, for error messages
    pub fn variants() -> String {
        use strum::IntoEnumIterator;
        BackendKind::iter()
            .map(|b| b.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupSettings {
    pub backend: BackendKind,
    /// Overrides the backend's default base URL
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub api_host: Option<String>,
    pub timeout: Duration,
    /// Extra attempts after a transport failure
    pub retries: usize,
    /// Directory receiving raw response bodies
    pub dump_dir: Option<PathBuf>,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            base_url: None,
            api_key: None,
            api_host: None,
            timeout: DEFAULT_TIMEOUT,
            retries: 0,
            dump_dir: None,
        }
    }
}

impl LookupSettings {
    pub fn effective_base_url(&self) -> &str {
        match (&self.base_url, self.backend) {
            (Some(url), _) => url,
            (None, BackendKind::Gtin) => DEFAULT_GTIN_BASE_URL,
            (None, _) => DEFAULT_REVIEWS_BASE_URL,
        }
    }

    pub fn effective_api_host(&self) -> &str {
        self.api_host.as_deref().unwrap_or(DEFAULT_GTIN_API_HOST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!(BackendKind::from_str("reviews").unwrap(), BackendKind::Reviews);
        assert_eq!(BackendKind::from_str("GTIN").unwrap(), BackendKind::Gtin);
        assert_eq!(BackendKind::from_str("fixtures").unwrap(), BackendKind::Fixtures);
        assert!(BackendKind::from_str("carrier-pigeon").is_err());
        assert_eq!(BackendKind::variants(), "reviews, gtin, fixtures");
    }

    #[test]
    fn test_effective_base_url() {
        let mut settings = LookupSettings::default();
        assert_eq!(settings.effective_base_url(), DEFAULT_REVIEWS_BASE_URL);

        settings.backend = BackendKind::Gtin;
        assert_eq!(settings.effective_base_url(), DEFAULT_GTIN_BASE_URL);

        settings.base_url = Some("http://127.0.0.1:9000".to_string());
        assert_eq!(settings.effective_base_url(), "http://127.0.0.1:9000");
    }
}
