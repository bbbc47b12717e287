//! GTIN catalog client (RapidAPI "big product data")
//!
//! Catalog data only: no ratings or review summaries, so those fields stay
//! at their defaults.

use crate::lookup::error::{LookupError, LookupResult};
use crate::lookup::http::{endpoint, HttpFetcher};
use crate::lookup::reviews::{genre_from_category, upgrade_to_https};
use crate::lookup::settings::LookupSettings;
use crate::lookup::traits::ProductLookup;
use crate::scanner::types::{NormalizedBarcode, ProductRecord};
use async_trait::async_trait;
use serde::Deserialize;

const CATALOG_TRUST_LABEL: &str = "Unrated";

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    gtin: Option<String>,
    #[serde(default)]
    properties: Properties,
    #[serde(default)]
    stores: Vec<Store>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Properties {
    title: Vec<String>,
    brand: Vec<String>,
    description: Vec<String>,
    category: Vec<String>,
    manufacturer: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Store {
    store: Option<String>,
    price: Option<StorePrice>,
    image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StorePrice {
    currency: Option<String>,
    price: Option<PriceValue>,
    sale: Option<PriceValue>,
}

/// Prices come back either as strings or as numbers
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum PriceValue {
    Text(String),
    Number(f64),
}

impl PriceValue {
    fn render(&self) -> String {
        match self {
            PriceValue::Text(text) => text.trim().to_string(),
            PriceValue::Number(value) => format!("{:.2}", value),
        }
    }
}

impl StorePrice {
    /// "USD 4.99", preferring the sale price when there is one
    fn display(&self) -> Option<String> {
        let amount = self
            .sale
            .as_ref()
            .or(self.price.as_ref())
            .map(PriceValue::render)
            .filter(|a| !a.is_empty())?;

        Some(match self.currency.as_deref().map(str::trim) {
            Some(currency) if !currency.is_empty() => format!("{} {}", currency, amount),
            _ => amount,
        })
    }
}

fn first_non_empty(values: &[String]) -> Option<&str> {
    values
        .iter()
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
}

impl CatalogResponse {
    fn into_record(self, barcode: &NormalizedBarcode) -> ProductRecord {
        let props = &self.properties;
        let brand = first_non_empty(&props.brand).or_else(|| first_non_empty(&props.manufacturer));

        let image_url = self
            .stores
            .iter()
            .filter_map(|s| s.image.as_deref())
            .find(|img| !img.trim().is_empty())
            .map(upgrade_to_https)
            .unwrap_or_default();

        let price = self
            .stores
            .iter()
            .find_map(|s| {
                let display = s.price.as_ref()?.display()?;
                log::trace!("Price {} from store {:?}", display, s.store);
                Some(display)
            })
            .unwrap_or_default();

        ProductRecord {
            barcode: self.gtin.clone().unwrap_or_else(|| barcode.to_string()),
            title: first_non_empty(&props.title).unwrap_or_default().to_string(),
            brand: brand.unwrap_or_default().to_string(),
            price,
            image_url,
            star_rating: 0.0,
            review_count: 0,
            description: first_non_empty(&props.description)
                .unwrap_or_default()
                .to_string(),
            pros: Vec::new(),
            cons: Vec::new(),
            company_genre: first_non_empty(&props.category)
                .map(genre_from_category)
                .unwrap_or_default(),
            company_trust: CATALOG_TRUST_LABEL.to_string(),
        }
    }
}

/// Client for the GTIN catalog
#[derive(Debug, Clone)]
pub struct GtinLookup {
    base_url: String,
    api_key: String,
    api_host: String,
    http: HttpFetcher,
}

impl GtinLookup {
    pub fn new(settings: &LookupSettings) -> LookupResult<Self> {
        let api_key = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| LookupError::Configuration {
                message: "api-key is required for the gtin backend".to_string(),
            })?;

        endpoint(settings.effective_base_url(), &[])?;

        Ok(Self {
            base_url: settings.effective_base_url().to_string(),
            api_key: api_key.to_string(),
            api_host: settings.effective_api_host().to_string(),
            http: HttpFetcher::new(
                settings.timeout,
                settings.retries,
                settings.dump_dir.clone(),
            )?,
        })
    }
}

#[async_trait]
impl ProductLookup for GtinLookup {
    async fn fetch(&self, barcode: &NormalizedBarcode) -> LookupResult<ProductRecord> {
        let url = endpoint(&self.base_url, &["gtin", barcode.as_str()])?;
        let headers = [
            ("X-RapidAPI-Key", self.api_key.as_str()),
            ("X-RapidAPI-Host", self.api_host.as_str()),
            ("Accept", "application/json"),
        ];

        let Some(body) = self.http.get(url, &headers, barcode.as_str()).await? else {
            return Ok(ProductRecord::unknown(barcode));
        };

        let response: CatalogResponse = serde_json::from_slice(&body)?;
        Ok(response.into_record(barcode))
    }

    fn backend_name(&self) -> &str {
        "gtin"
    }
}
