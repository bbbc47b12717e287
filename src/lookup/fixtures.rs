//! Built-in sample catalog for offline runs and tests

use crate::lookup::error::LookupResult;
use crate::lookup::traits::ProductLookup;
use crate::scanner::types::{NormalizedBarcode, ProductRecord};
use async_trait::async_trait;
use std::collections::HashMap;

/// Barcode of the Vaseline Lip Therapy sample
pub const SAMPLE_BARCODE: &str = "887276069623";

/// In-memory catalog keyed by normalized barcode
#[derive(Debug, Clone, Default)]
pub struct FixtureLookup {
    catalog: HashMap<String, ProductRecord>,
}

impl FixtureLookup {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_samples() -> Self {
        let mut lookup = Self::empty();
        for record in sample_products() {
            lookup.insert(record);
        }
        lookup
    }

    /// Add or replace a product; its barcode must already be normalized
    pub fn insert(&mut self, record: ProductRecord) {
        self.catalog.insert(record.barcode.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }
}

#[async_trait]
impl ProductLookup for FixtureLookup {
    async fn fetch(&self, barcode: &NormalizedBarcode) -> LookupResult<ProductRecord> {
        Ok(self
            .catalog
            .get(barcode.as_str())
            .cloned()
            .unwrap_or_else(|| ProductRecord::unknown(barcode)))
    }

    fn backend_name(&self) -> &str {
        "fixtures"
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Sample products shown by the demo catalog
pub fn sample_products() -> Vec<ProductRecord> {
    vec![
        ProductRecord {
            barcode: SAMPLE_BARCODE.to_string(),
            title: "Vaseline Lip Therapy".to_string(),
            brand: "Vaseline".to_string(),
            price: "$4.99".to_string(),
            image_url: "https://pics.walgreens.com/prodimg/15848/450.jpg".to_string(),
            star_rating: 4.3,
            review_count: 1230,
            description: "Vaseline Lip Therapy provides effective healing and moisturizing for \
                          dry lips. While most users praise its long-lasting protection, some find \
                          the texture too thick and greasy for daily use."
                .to_string(),
            pros: strings(&["Moisturizing", "Long-lasting", "Healing properties"]),
            cons: strings(&["Greasy feel", "Sticky texture"]),
            company_genre: "Personal Care".to_string(),
            company_trust: "Trusted".to_string(),
        },
        ProductRecord {
            barcode: "027242923782".to_string(),
            title: "Sony WH-1000XM5".to_string(),
            brand: "Sony".to_string(),
            price: "$399.99".to_string(),
            image_url: String::new(),
            star_rating: 4.6,
            review_count: 8452,
            description: "Noise cancelling headphones with long battery life. Reviewers like \
                          the call quality; some miss the folding design of earlier models."
                .to_string(),
            pros: strings(&["Comfort", "Battery life", "Noise cancelling"]),
            cons: strings(&["Price", "Does not fold"]),
            company_genre: "Electronics".to_string(),
            company_trust: "Trusted".to_string(),
        },
        ProductRecord {
            barcode: "194253397168".to_string(),
            title: "AirPods Pro 2".to_string(),
            brand: "Apple".to_string(),
            price: "$249.00".to_string(),
            image_url: String::new(),
            star_rating: 4.7,
            review_count: 15210,
            description: "Wireless earbuds with active noise cancellation and adaptive audio."
                .to_string(),
            pros: strings(&["Fit", "Transparency mode", "Sound quality"]),
            cons: strings(&["Price", "Case scratches"]),
            company_genre: "Electronics".to_string(),
            company_trust: "Trusted".to_string(),
        },
    ]
}
