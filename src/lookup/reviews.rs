//! Review backend client
//!
//! `GET {base}/products/{barcode}` answering with the product, an overall
//! rating and a review summary.

use crate::lookup::error::LookupResult;
use crate::lookup::http::{endpoint, HttpFetcher};
use crate::lookup::settings::LookupSettings;
use crate::lookup::traits::ProductLookup;
use crate::scanner::types::{NormalizedBarcode, ProductRecord};
use async_trait::async_trait;
use serde::Deserialize;

const DEFAULT_TRUST_LABEL: &str = "Trusted";
const CATEGORY_SEPARATOR: &str = " > ";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReviewResponse {
    product: ProductPayload,
    rating: f64,
    review_summary: ReviewSummary,
    trust: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProductPayload {
    name: String,
    brand: String,
    category: String,
    image_url: String,
    price: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReviewSummary {
    average_rating: Option<f64>,
    pros: Vec<String>,
    cons: Vec<String>,
    full_summary: String,
    review_count: Option<u64>,
}

impl ReviewResponse {
    fn into_record(self, barcode: &NormalizedBarcode) -> ProductRecord {
        let rating = if self.rating > 0.0 {
            self.rating
        } else {
            self.review_summary.average_rating.unwrap_or(0.0)
        };

        ProductRecord {
            barcode: barcode.to_string(),
            title: self.product.name,
            brand: self.product.brand,
            price: self.product.price,
            image_url: upgrade_to_https(&self.product.image_url),
            star_rating: clamp_rating(rating),
            review_count: self.review_summary.review_count.unwrap_or(0),
            description: self.review_summary.full_summary,
            pros: sorted_by_length(self.review_summary.pros),
            cons: sorted_by_length(self.review_summary.cons),
            company_genre: genre_from_category(&self.product.category),
            company_trust: self
                .trust
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TRUST_LABEL.to_string()),
        }
    }
}

/// Client for the review backend
#[derive(Debug, Clone)]
pub struct ReviewsLookup {
    base_url: String,
    http: HttpFetcher,
}

impl ReviewsLookup {
    pub fn new(settings: &LookupSettings) -> LookupResult<Self> {
        // Reject a bad base URL now rather than on the first scan
        endpoint(settings.effective_base_url(), &[])?;

        Ok(Self {
            base_url: settings.effective_base_url().to_string(),
            http: HttpFetcher::new(
                settings.timeout,
                settings.retries,
                settings.dump_dir.clone(),
            )?,
        })
    }
}

#[async_trait]
impl ProductLookup for ReviewsLookup {
    async fn fetch(&self, barcode: &NormalizedBarcode) -> LookupResult<ProductRecord> {
        let url = endpoint(&self.base_url, &["products", barcode.as_str()])?;

        let Some(body) = self
            .http
            .get(url, &[("Accept", "application/json")], barcode.as_str())
            .await?
        else {
            return Ok(ProductRecord::unknown(barcode));
        };

        let response: ReviewResponse = serde_json::from_slice(&body)?;
        Ok(response.into_record(barcode))
    }

    fn backend_name(&self) -> &str {
        "reviews"
    }
}

pub(crate) fn upgrade_to_https(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    }
}

pub(crate) fn clamp_rating(rating: f64) -> f64 {
    if rating.is_nan() {
        0.0
    } else {
        rating.clamp(0.0, 5.0)
    }
}

/// "Health & Beauty > Lip Care" -> "Health & Beauty"
pub(crate) fn genre_from_category(category: &str) -> String {
    category
        .split(CATEGORY_SEPARATOR)
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Shortest first; ties keep their original order
pub(crate) fn sorted_by_length(mut items: Vec<String>) -> Vec<String> {
    items.sort_by_key(|item| item.chars().count());
    items
}
