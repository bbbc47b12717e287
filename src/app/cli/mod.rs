//! CLI module containing argument parsing and related functionality

pub mod api;
pub mod args;
pub mod config;
pub mod display;
pub(crate) mod validation;

#[cfg(test)]
mod tests;
