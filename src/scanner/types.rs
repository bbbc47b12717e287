//! Scanner data types
//!
//! Values that flow from the camera side (raw codes), through the lookup
//! client (normalized codes, product records) to the presentation side
//! (lookup results).

use std::fmt;

/// A barcode ready for lookup.
///
/// UPC-A codes arrive with a leading zero that GTIN-style backends do not
/// expect, so exactly one leading `'0'` is removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedBarcode(String);

impl NormalizedBarcode {
    pub fn from_raw(raw_code: &str) -> Self {
        let normalized = raw_code.strip_prefix('0').unwrap_or(raw_code);
        Self(normalized.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NormalizedBarcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedBarcode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Read-only product snapshot produced by a lookup client
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductRecord {
    pub barcode: String,
    pub title: String,
    pub brand: String,
    pub price: String,
    pub image_url: String,
    /// 0.0 to 5.0
    pub star_rating: f64,
    pub review_count: u64,
    pub description: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub company_genre: String,
    pub company_trust: String,
}

impl ProductRecord {
    /// A record with no title is a business-level "no match"
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Record returned when the backend knows nothing about a barcode
    pub fn unknown(barcode: &NormalizedBarcode) -> Self {
        Self {
            barcode: barcode.to_string(),
            ..Self::default()
        }
    }

    /// Star rating with one decimal place
    pub fn star_rating_formatted(&self) -> String {
        format!("{:.1}", self.star_rating)
    }

    /// Review count with thousands separators (1230 -> "1,230")
    pub fn review_count_formatted(&self) -> String {
        let digits = self.review_count.to_string();
        let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                formatted.push(',');
            }
            formatted.push(ch);
        }
        formatted
    }
}

/// Outcome of one accepted scan
#[derive(Debug, Clone, PartialEq)]
pub enum ProductLookupResult {
    Found(ProductRecord),
    NotFound,
    Error { reason: String },
}

impl ProductLookupResult {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            ProductLookupResult::Found(_) => OutcomeKind::Found,
            ProductLookupResult::NotFound => OutcomeKind::NotFound,
            ProductLookupResult::Error { .. } => OutcomeKind::Error,
        }
    }

    pub fn record(&self) -> Option<&ProductRecord> {
        match self {
            ProductLookupResult::Found(record) => Some(record),
            _ => None,
        }
    }
}

/// Discriminant of [`ProductLookupResult`], used by history and display
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum OutcomeKind {
    Found,
    NotFound,
    Error,
}

/// Mutable scanner state owned by the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSession {
    pub is_scanning: bool,
    pub last_raw_code: Option<String>,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self {
            is_scanning: true,
            last_raw_code: None,
        }
    }
}

/// What happened to one call into the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum ScanDisposition {
    /// Dropped by the guard (a lookup was already in flight) or empty input
    Dropped,
    /// The lookup settled and its outcome was published
    Completed {
        scan_id: u64,
        result: ProductLookupResult,
    },
    /// `reset()` ran while the lookup was in flight; nothing was published
    Superseded { scan_id: u64 },
}

impl ScanDisposition {
    pub fn result(&self) -> Option<&ProductLookupResult> {
        match self {
            ScanDisposition::Completed { result, .. } => Some(result),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_strips_one_leading_zero() {
        assert_eq!(
            NormalizedBarcode::from_raw("0123456789012").as_str(),
            "123456789012"
        );
        assert_eq!(
            NormalizedBarcode::from_raw("123456789012").as_str(),
            "123456789012"
        );
        assert_eq!(NormalizedBarcode::from_raw("00123").as_str(), "0123");
        assert!(NormalizedBarcode::from_raw("0").is_empty());
    }

    #[test]
    fn test_review_count_formatting() {
        let with_count = |review_count| ProductRecord {
            review_count,
            ..ProductRecord::default()
        };
        assert_eq!(with_count(0).review_count_formatted(), "0");
        assert_eq!(with_count(999).review_count_formatted(), "999");
        assert_eq!(with_count(1230).review_count_formatted(), "1,230");
        assert_eq!(with_count(1_234_567).review_count_formatted(), "1,234,567");
    }

    #[test]
    fn test_star_rating_has_one_decimal() {
        let record = ProductRecord {
            star_rating: 4.0,
            ..ProductRecord::default()
        };
        assert_eq!(record.star_rating_formatted(), "4.0");

        let record = ProductRecord {
            star_rating: 4.26,
            ..ProductRecord::default()
        };
        assert_eq!(record.star_rating_formatted(), "4.3");
    }

    #[test]
    fn test_blank_title_is_not_a_match() {
        let mut record = ProductRecord::unknown(&NormalizedBarcode::from_raw("0123"));
        assert_eq!(record.barcode, "123");
        assert!(!record.has_title());

        record.title = "   ".to_string();
        assert!(!record.has_title());

        record.title = "Lip balm".to_string();
        assert!(record.has_title());
    }

    #[test]
    fn test_outcome_kind_and_dispositions() {
        assert_eq!(OutcomeKind::NotFound.to_string(), "not-found");
        assert_eq!(ProductLookupResult::NotFound.kind(), OutcomeKind::NotFound);
        assert!(ProductLookupResult::NotFound.record().is_none());

        let completed = ScanDisposition::Completed {
            scan_id: 1,
            result: ProductLookupResult::NotFound,
        };
        assert_eq!(completed.result(), Some(&ProductLookupResult::NotFound));
        assert!(ScanDisposition::Superseded { scan_id: 2 }.result().is_none());
    }

    #[test]
    fn test_session_starts_armed() {
        let session = ScanSession::default();
        assert!(session.is_scanning);
        assert!(session.last_raw_code.is_none());
    }
}
