//! Application module

pub mod cli;
pub mod feed;
pub mod spinner;
pub mod startup;
