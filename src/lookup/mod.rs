//! Product lookup clients
//!
//! The scan pipeline only sees the [`traits::ProductLookup`] trait; this
//! module provides the network backends, the sample catalog and the factory
//! that picks one from configuration.

pub(crate) mod error;
pub(crate) mod fixtures;
pub(crate) mod gtin;
pub(crate) mod http;
pub(crate) mod reviews;
pub(crate) mod settings;
pub(crate) mod traits;

pub mod api;
