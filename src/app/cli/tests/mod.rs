//! Tests for the CLI module
//!
//! Argument parsing and validation live in `args_tests`, config file
//! merging in `config_tests`.

pub mod args_tests;
