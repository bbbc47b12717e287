//! Application startup
//!
//! Parses arguments, merges the config file, starts logging, builds the
//! lookup client and pipeline, then feeds scanner input until EOF or a
//! shutdown signal.

use super::cli::api::{Args, OutcomeRenderer};
use super::feed::{render_outcomes, ScanFeed};
use super::spinner::{run_spinner, should_show_spinner};
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::{adjusted_level, init_logging};
use crate::core::shutdown::ShutdownCoordinator;
use crate::lookup::api::build_lookup;
use crate::notifications::api::{
    new_notifier, publish_logged, Event, EventFilter, SystemEvent, SystemEventType,
};
use crate::scanner::api::ScanPipeline;
use std::time::Duration;
use tokio::io::BufReader;

/// Keeps the terminal quiet enough for the spinner unless `-v` is given
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Grace period for a cancelled lookup to publish its outcome
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Initialize application startup
pub fn startup() {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: could not start the async runtime: {}", e);
            std::process::exit(1);
        }
    };

    let exit_code = runtime.block_on(run());

    // A blocked stdin read would otherwise hold up runtime teardown
    runtime.shutdown_background();
    std::process::exit(exit_code);
}

async fn run() -> i32 {
    let help_color = !std::env::args_os().any(|arg| arg == "--no-color")
        && std::io::IsTerminal::is_terminal(&std::io::stdout());
    let mut args = match Args::parse_styled(std::env::args_os(), help_color) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    // Logging is not up yet, so config errors go straight to stderr
    let config_file = args.config_file.clone();
    let loaded_from = match Args::load_config_file(&mut args, config_file).await {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let use_color = args.use_color();
    colored::control::set_override(use_color);
    let level = adjusted_level(
        args.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL),
        args.verbosity(),
    );
    let log_file = args
        .log_file
        .as_ref()
        .map(|path| path.to_string_lossy().to_string());
    if let Err(e) = init_logging(
        Some(level),
        args.log_format.as_deref(),
        log_file.as_deref(),
        use_color,
    ) {
        eprintln!("Error: could not initialise logging: {}", e);
        return 1;
    }

    log::info!("barscan {} starting", crate::core::version::description());
    if let Some(path) = loaded_from {
        log::info!("Configuration loaded from {}", path.display());
    }
    log::debug!("Final arguments: {:?}", args);

    if let Err(e) = args.validate() {
        log_error_with_context(&e, "Configuration validation");
        return 1;
    }
    let settings = match args.lookup_settings() {
        Ok(settings) => settings,
        Err(e) => {
            log_error_with_context(&e, "Configuration validation");
            return 1;
        }
    };
    let lookup = match build_lookup(&settings) {
        Ok(lookup) => lookup,
        Err(e) => {
            log_error_with_context(&e, "Lookup client setup");
            return 1;
        }
    };

    let (coordinator, _shutdown_rx) = ShutdownCoordinator::new();
    coordinator.install_signal_handlers();

    let notifier = new_notifier();
    let renderer = OutcomeRenderer::new(use_color, args.merge_not_found);
    let receiver = notifier.lock().await.subscribe(
        "terminal".to_string(),
        EventFilter::All,
        "startup".to_string(),
    );
    let show_spinner = should_show_spinner();
    let printer = tokio::spawn(render_outcomes(
        receiver,
        renderer,
        std::io::stdout(),
        show_spinner,
    ));

    let pipeline = ScanPipeline::new(lookup, notifier.clone(), args.pipeline_config());
    let spinner = tokio::spawn(run_spinner(
        pipeline.scanning_watch(),
        coordinator.subscribe(),
    ));

    publish_logged(
        &notifier,
        Event::System(SystemEvent::with_message(
            SystemEventType::Startup,
            format!("backend {}", pipeline.backend_name()),
        )),
    )
    .await;
    log::info!("Scanning with the {} backend", pipeline.backend_name());

    let token = coordinator.token();
    let mut feed = ScanFeed::new(pipeline.clone(), renderer, args.should_wait());
    let mut out = std::io::stdout();
    let codes = args.normalized_codes();
    let fed = if codes.is_empty() {
        let stdin = BufReader::new(tokio::io::stdin());
        feed.feed_lines(stdin, &token, &mut out).await
    } else {
        feed.feed_codes(&codes, &token, &mut out).await
    };
    match fed {
        Ok(count) => log::debug!("Input finished after {} entries", count),
        Err(e) => log::warn!("Input stopped: {}", e),
    }

    if !token.is_cancelled() {
        tokio::select! {
            _ = feed.finish() => {}
            _ = token.cancelled() => {}
        }
    }

    pipeline.shutdown();
    if tokio::time::timeout(SHUTDOWN_GRACE, feed.finish()).await.is_err() {
        log::debug!("In-flight lookup did not settle before exit");
    }
    coordinator.trigger_shutdown();

    match spinner.await {
        Ok(Err(e)) => log::debug!("Spinner stopped: {}", e),
        Err(e) => log::debug!("Spinner task failed: {}", e),
        Ok(Ok(())) => {}
    }

    publish_logged(
        &notifier,
        Event::System(SystemEvent::new(SystemEventType::Shutdown)),
    )
    .await;
    if let Err(e) = printer.await {
        log::debug!("Outcome printer failed: {}", e);
    }

    let session = pipeline.session();
    log::info!(
        "Shutting down (last code: {})",
        session.last_raw_code.as_deref().unwrap_or("none")
    );
    0
}
