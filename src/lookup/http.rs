//! HTTP plumbing shared by the network backends

use crate::core::retry::{retry_async_when, RetryPolicy};
use crate::lookup::error::{LookupError, LookupResult};
use reqwest::{Client, StatusCode, Url};
use std::path::PathBuf;
use std::time::Duration;

/// GET requests with per-request timeout, transport retries and optional
/// dumping of raw bodies
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    retry: RetryPolicy,
    dump_dir: Option<PathBuf>,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, retries: usize, dump_dir: Option<PathBuf>) -> LookupResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("barscan/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LookupError::Configuration {
                message: format!("could not build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            retry: RetryPolicy::with_retries(retries),
            dump_dir,
        })
    }

    /// Fetch `url`; `Ok(None)` means the server answered 404
    pub async fn get(
        &self,
        url: Url,
        headers: &[(&str, &str)],
        barcode: &str,
    ) -> LookupResult<Option<Vec<u8>>> {
        log::debug!("GET {}", url);

        let response = retry_async_when(
            "product_lookup",
            self.retry.clone(),
            || {
                let mut request = self.client.get(url.clone());
                for (name, value) in headers {
                    request = request.header(*name, *value);
                }
                async move { request.send().await.map_err(LookupError::from) }
            },
            LookupError::is_transient,
        )
        .await?;

        let status = response.status();
        log::debug!("{} answered {}", url, status);

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(LookupError::from)?.to_vec();
        log::trace!("Raw response: {}", String::from_utf8_lossy(&body));
        self.dump(barcode, &body).await;

        Ok(Some(body))
    }

    async fn dump(&self, barcode: &str, body: &[u8]) {
        let Some(dir) = &self.dump_dir else {
            return;
        };
        let file_name = format!("api_response_{}.json", sanitize_file_component(barcode));
        let path = dir.join(file_name);

        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            log::warn!("Failed to create dump directory {}: {}", dir.display(), e);
            return;
        }
        match tokio::fs::write(&path, body).await {
            Ok(()) => log::debug!("API response saved to {}", path.display()),
            Err(e) => log::warn!("Failed to save API response to {}: {}", path.display(), e),
        }
    }
}

/// Build `base/seg1/seg2...`, percent-encoding each segment
pub fn endpoint(base: &str, segments: &[&str]) -> LookupResult<Url> {
    let invalid = |message: String| LookupError::InvalidUrl {
        url: base.to_string(),
        message,
    };

    let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| invalid("URL cannot be a base".to_string()))?;
        path.pop_if_empty().extend(segments);
    }
    Ok(url)
}

fn sanitize_file_component(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_segments() {
        let url = endpoint("https://qrbackend-ghtk.onrender.com", &["products", "887276069623"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://qrbackend-ghtk.onrender.com/products/887276069623"
        );

        let url = endpoint("http://127.0.0.1:8080/api/", &["gtin", "123"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/api/gtin/123");
    }

    #[test]
    fn test_endpoint_encodes_code128_payloads() {
        let url = endpoint("http://localhost", &["products", "AB/12 3"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost/products/AB%2F12%203");
    }

    #[test]
    fn test_endpoint_rejects_invalid_base() {
        let err = endpoint("not a url", &["products", "1"]).unwrap_err();
        assert!(matches!(err, LookupError::InvalidUrl { .. }));

        let err = endpoint("mailto:someone@example.com", &["products"]).unwrap_err();
        assert!(matches!(err, LookupError::InvalidUrl { .. }));
    }

    #[test]
    fn test_sanitize_file_component() {
        assert_eq!(sanitize_file_component("0123-ab"), "0123-ab");
        assert_eq!(sanitize_file_component("../etc"), "___etc");
    }
}
