//! The lookup seam between the scan pipeline and product backends

use crate::lookup::error::LookupResult;
use crate::scanner::types::{NormalizedBarcode, ProductRecord};
use async_trait::async_trait;

/// A product backend.
///
/// `fetch` returns a record with an empty title when the backend has no
/// product for the barcode; errors are reserved for technical failures.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn fetch(&self, barcode: &NormalizedBarcode) -> LookupResult<ProductRecord>;

    /// Short name used in logs
    fn backend_name(&self) -> &str;
}
