//! Scanner API
//!
//! Public interface of the scan pipeline, following the same pattern as the
//! `lookup::api` and `notifications::api` modules.

pub use crate::scanner::history::{ScanHistory, ScanHistoryEntry, DEFAULT_HISTORY_SIZE};
pub use crate::scanner::pipeline::{AcceptedScan, PipelineConfig, ScanPipeline};
pub use crate::scanner::types::{
    NormalizedBarcode, OutcomeKind, ProductLookupResult, ProductRecord, ScanDisposition,
    ScanSession,
};
