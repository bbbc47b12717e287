//! Public API for the lookup clients

use std::sync::Arc;

pub use crate::lookup::error::{LookupError, LookupResult};
pub use crate::lookup::fixtures::{sample_products, FixtureLookup, SAMPLE_BARCODE};
pub use crate::lookup::gtin::GtinLookup;
pub use crate::lookup::reviews::ReviewsLookup;
pub use crate::lookup::settings::{
    BackendKind, LookupSettings, DEFAULT_GTIN_API_HOST, DEFAULT_GTIN_BASE_URL,
    DEFAULT_REVIEWS_BASE_URL, DEFAULT_TIMEOUT,
};
pub use crate::lookup::traits::ProductLookup;

/// Build the lookup client selected by `settings.backend`
pub fn build_lookup(settings: &LookupSettings) -> LookupResult<Arc<dyn ProductLookup>> {
    let lookup: Arc<dyn ProductLookup> = match settings.backend {
        BackendKind::Reviews => Arc::new(ReviewsLookup::new(settings)?),
        BackendKind::Gtin => Arc::new(GtinLookup::new(settings)?),
        BackendKind::Fixtures => Arc::new(FixtureLookup::with_samples()),
    };
    log::debug!(
        "Lookup backend '{}' ready ({})",
        lookup.backend_name(),
        settings.effective_base_url()
    );
    Ok(lookup)
}
