//! Scan Pipeline Component
//!
//! Turns decoded barcode strings into product lookup outcomes:
//!
//! - **ScanPipeline**: single-slot guard, normalization, lookup with timeout
//!   and cancellation, one outcome per accepted scan
//! - **Reset**: re-arms immediately; a superseded lookup never publishes
//! - **History**: bounded summary of recently settled scans
//!
//! Outcomes and lifecycle events go out through the notification manager
//! handed to the pipeline at construction.

pub(crate) mod history;
pub(crate) mod pipeline;
pub(crate) mod types;

pub mod api;

#[cfg(test)]
mod tests;
