//! Tests for CLI argument parsing and validation

use crate::app::cli::args::*;
use crate::app::cli::config::ConfigError;
use crate::lookup::api::BackendKind;
use std::path::PathBuf;
use std::time::Duration;

fn parse(args: &[&str]) -> Result<Args, clap::Error> {
    let mut full = vec!["barscan"];
    full.extend_from_slice(args);
    Args::parse_styled(full, false)
}

fn invalid_key(error: ConfigError) -> String {
    match error {
        ConfigError::InvalidValue { key, .. } => key,
        other => panic!("expected InvalidValue, got {:?}", other),
    }
}

#[test]
fn test_no_arguments_gives_defaults() {
    let args = parse(&[]).unwrap();
    assert_eq!(args, Args::new());
    assert!(!args.should_wait());
    assert_eq!(args.verbosity(), 0);
    assert!(args.validate().is_ok());
}

#[test]
fn test_codes_are_split_and_keep_repeats() {
    let args = parse(&["-k", "0123, 456", "--code", "0123", "--code", ","]).unwrap();
    assert_eq!(args.normalized_codes(), vec!["0123", "456", "0123"]);
    assert!(args.should_wait());
}

#[test]
fn test_wait_flags() {
    assert!(parse(&["--wait"]).unwrap().should_wait());
    assert!(!parse(&["-k", "1", "--no-wait"]).unwrap().should_wait());
    assert!(parse(&["--wait", "--no-wait"]).is_err());
}

#[test]
fn test_lookup_options() {
    let args = parse(&[
        "--backend",
        "gtin",
        "--base-url",
        "http://127.0.0.1:9000/",
        "--api-key",
        "secret",
        "--api-host",
        "example.test",
        "-t",
        "3",
        "--retries",
        "2",
        "--dump-dir",
        "/tmp/dumps",
    ])
    .unwrap();

    assert!(args.validate().is_ok());
    let settings = args.lookup_settings().unwrap();
    assert_eq!(settings.backend, BackendKind::Gtin);
    assert_eq!(settings.base_url.as_deref(), Some("http://127.0.0.1:9000"));
    assert_eq!(settings.api_key.as_deref(), Some("secret"));
    assert_eq!(settings.effective_api_host(), "example.test");
    assert_eq!(settings.timeout, Duration::from_secs(3));
    assert_eq!(settings.retries, 2);
    assert_eq!(settings.dump_dir, Some(PathBuf::from("/tmp/dumps")));
}

#[test]
fn test_pipeline_timeout_covers_every_attempt() {
    let args = parse(&["-t", "5", "--retries", "2", "--history-size", "7"]).unwrap();
    let config = args.pipeline_config();
    // Three 5s attempts, two 250ms retry delays, one second of slack
    assert_eq!(config.lookup_timeout, Duration::from_millis(16_500));
    assert_eq!(config.history_size, 7);

    let defaults = parse(&[]).unwrap().pipeline_config();
    assert_eq!(defaults.lookup_timeout, Duration::from_secs(11));
    assert_eq!(defaults.history_size, 50);
}

#[test]
fn test_oversized_timeout_and_retries_rejected() {
    let args = parse(&["--timeout-secs", "601"]).unwrap();
    assert_eq!(invalid_key(args.validate().unwrap_err()), "timeout-secs");
    let args = parse(&["--retries", "11"]).unwrap();
    assert_eq!(invalid_key(args.validate().unwrap_err()), "retries");

    let args = parse(&["--timeout-secs", "600", "--retries", "10"]).unwrap();
    assert!(args.validate().is_ok());
    assert_eq!(
        args.pipeline_config().lookup_timeout,
        Duration::from_millis(600_000 * 11 + 250 * 10 + 1000)
    );
}

#[test]
fn test_pipeline_timeout_saturates_for_huge_values() {
    let max = usize::MAX.to_string();
    let args = parse(&["--timeout-secs", &max, "--retries", &max]).unwrap();
    assert!(args.validate().is_err());
    assert_eq!(args.pipeline_config().lookup_timeout, Duration::MAX);
}

#[test]
fn test_zero_values_rejected_by_parser() {
    assert!(parse(&["--timeout-secs", "0"]).is_err());
    assert!(parse(&["--history-size", "0"]).is_err());
    assert!(parse(&["--timeout-secs", "soon"]).is_err());
}

#[test]
fn test_log_options() {
    let args = parse(&["-l", "debug", "-o", "json", "-f", "scan.log", "-vv"]).unwrap();
    assert_eq!(args.log_level.as_deref(), Some("debug"));
    assert_eq!(args.log_format.as_deref(), Some("json"));
    assert_eq!(args.log_file, Some(PathBuf::from("scan.log")));
    assert_eq!(args.verbosity(), 2);

    assert_eq!(parse(&["-qqq"]).unwrap().verbosity(), -3);
    assert!(parse(&["-v", "-q"]).is_err());
    assert!(parse(&["--log-level", "loud"]).is_err());
    assert!(parse(&["--log-format", "yaml"]).is_err());
}

#[test]
fn test_color_flags() {
    assert!(parse(&["--color"]).unwrap().use_color());
    assert!(!parse(&["--no-color"]).unwrap().use_color());
    assert!(parse(&["--color", "--no-color"]).is_err());
}

#[test]
fn test_version_flag() {
    let error = parse(&["--version"]).unwrap_err();
    assert_eq!(error.kind(), clap::error::ErrorKind::DisplayVersion);
    assert!(error.to_string().contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_backend_rejected() {
    let args = parse(&["--backend", "carrier-pigeon"]).unwrap();
    assert_eq!(invalid_key(args.validate().unwrap_err()), "backend");
    assert!(args.lookup_settings().is_err());
}

#[test]
fn test_backend_name_is_case_insensitive() {
    let args = parse(&["-b", "Fixtures"]).unwrap();
    assert_eq!(args.backend_kind().unwrap(), BackendKind::Fixtures);
}

#[test]
fn test_gtin_requires_api_key() {
    let args = parse(&["--backend", "gtin"]).unwrap();
    assert_eq!(invalid_key(args.validate().unwrap_err()), "api-key");

    let blank = parse(&["--backend", "gtin", "--api-key", "  "]).unwrap();
    assert_eq!(invalid_key(blank.validate().unwrap_err()), "api-key");
}

#[test]
fn test_bad_base_url_rejected() {
    let args = parse(&["--base-url", "qrbackend.example"]).unwrap();
    assert_eq!(invalid_key(args.validate().unwrap_err()), "base-url");
}
