//! Core CLI arguments structure and basic functionality
//!
//! Configuration loading lives in `config`, validation and conversion into
//! component settings in `validation`.

use crate::core::validation::validate_positive_int;
use clap::{ArgAction, CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(name = "barscan")]
#[command(about = "Look up products for barcodes read from a scanner")]
#[command(version = crate::core::version::long_version())]
#[command(
    after_help = "Barcodes are read one per line from stdin unless --code is given.\n\
                  Input lines 'reset' and 'history' re-arm the scanner and list recent scans.\n \
                  * can be specified multiple times or as a comma-separated list"
)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Lookup backend (reviews, gtin, fixtures)
    #[arg(short = 'b', long = "backend", value_name = "NAME")]
    pub backend: Option<String>,

    /// Base URL of the lookup service
    #[arg(short = 'u', long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// API key for the gtin backend
    #[arg(long = "api-key", value_name = "KEY")]
    pub api_key: Option<String>,

    /// RapidAPI host header for the gtin backend
    #[arg(long = "api-host", value_name = "HOST")]
    pub api_host: Option<String>,

    /// Lookup timeout in seconds
    #[arg(short = 't', long = "timeout-secs", value_name = "SECONDS", value_parser = validate_positive_int)]
    pub timeout_secs: Option<usize>,

    /// Extra attempts after a network failure
    #[arg(long = "retries", value_name = "COUNT")]
    pub retries: Option<usize>,

    /// Number of settled scans kept for 'history'
    #[arg(long = "history-size", value_name = "COUNT", value_parser = validate_positive_int)]
    pub history_size: Option<usize>,

    /// Write raw lookup responses into this directory
    #[arg(long = "dump-dir", value_name = "DIR")]
    pub dump_dir: Option<PathBuf>,

    /// Show lookup errors as "no product found"
    #[arg(long = "merge-not-found", action = ArgAction::SetTrue)]
    pub merge_not_found: bool,

    /// Barcodes to look up instead of reading stdin*
    #[arg(short = 'k', long = "code", value_name = "CODES", action = ArgAction::Append)]
    pub codes: Vec<String>,

    /// Wait for each lookup before submitting the next barcode
    #[arg(short = 'w', long = "wait", action = ArgAction::SetTrue, conflicts_with = "no_wait")]
    pub wait: bool,

    /// Submit barcodes as they arrive, dropping those read during a lookup
    #[arg(long = "no-wait", action = ArgAction::SetTrue)]
    pub no_wait: bool,

    /// Force colored output
    #[arg(short = 'g', long = "color", action = ArgAction::SetTrue, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", action = ArgAction::SetTrue)]
    pub no_color: bool,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// More verbose logging (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Less verbose logging (repeatable)
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an argument list with help styled to match the output colours
    pub fn parse_styled<I, T>(args: I, use_color: bool) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut command = Self::command().styles(crate::core::styles::palette_to_clap(use_color));
        let matches = command.try_get_matches_from_mut(args)?;
        Self::from_arg_matches(&matches)
    }

    /// Barcodes given with `--code`, split on commas with blanks removed
    ///
    /// Repeats are kept: scanning the same item twice is two scans.
    pub fn normalized_codes(&self) -> Vec<String> {
        self.codes
            .iter()
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Whether each lookup is awaited before the next code is submitted
    ///
    /// Defaults to on for `--code` batches and off for interactive stdin.
    pub fn should_wait(&self) -> bool {
        if self.no_wait {
            false
        } else {
            self.wait || !self.codes.is_empty()
        }
    }

    /// `-v` minus `-q`
    pub fn verbosity(&self) -> i8 {
        self.verbose.min(i8::MAX as u8) as i8 - self.quiet.min(i8::MAX as u8) as i8
    }

    /// Colour decision: flags first, then terminal detection
    pub fn use_color(&self) -> bool {
        if self.no_color {
            false
        } else {
            self.color || std::io::IsTerminal::is_terminal(&std::io::stdout())
        }
    }
}
