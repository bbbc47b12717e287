//! Test modules for the scan pipeline

mod helpers;
