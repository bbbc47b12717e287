//! Scanner input feed and outcome printing
//!
//! Lines come from stdin (one barcode per line, as a keyboard-wedge scanner
//! types them) or from `--code`. Two words are commands rather than codes:
//! `reset` re-arms the scanner and `history` lists recent scans.

use super::cli::api::OutcomeRenderer;
use crate::notifications::api::{Event, EventReceiver, ScanEventType, SystemEventType};
use crate::scanner::api::{ScanDisposition, ScanPipeline};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedCommand<'a> {
    Scan(&'a str),
    Reset,
    History,
}

/// Classify one input line; blank lines yield `None`
pub fn parse_line(line: &str) -> Option<FeedCommand<'_>> {
    let text = crate::core::validation::clean_scanner_input(line)?;
    if text.eq_ignore_ascii_case("reset") {
        Some(FeedCommand::Reset)
    } else if text.eq_ignore_ascii_case("history") {
        Some(FeedCommand::History)
    } else {
        Some(FeedCommand::Scan(text))
    }
}

/// Drives a [`ScanPipeline`] from a stream of input lines
pub struct ScanFeed {
    pipeline: ScanPipeline,
    renderer: OutcomeRenderer,
    wait: bool,
    pending: Option<JoinHandle<ScanDisposition>>,
}

impl ScanFeed {
    /// With `wait` each accepted scan settles before the next line is read;
    /// without it codes read during a lookup are dropped by the guard.
    pub fn new(pipeline: ScanPipeline, renderer: OutcomeRenderer, wait: bool) -> Self {
        Self {
            pipeline,
            renderer,
            wait,
            pending: None,
        }
    }

    pub async fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> std::io::Result<()> {
        match parse_line(line) {
            None => Ok(()),
            Some(FeedCommand::Reset) => {
                self.pipeline.reset();
                log::info!("Scanner re-armed");
                Ok(())
            }
            Some(FeedCommand::History) => {
                write!(out, "{}", self.renderer.render_history(&self.pipeline.history()))?;
                out.flush()
            }
            Some(FeedCommand::Scan(code)) => {
                match self.pipeline.submit(code) {
                    Some(handle) => {
                        self.pending = Some(handle);
                        if self.wait {
                            self.finish().await;
                        }
                    }
                    None => log::info!("Lookup in flight, ignoring {}", code),
                }
                Ok(())
            }
        }
    }

    /// Wait for the most recent scan task to settle
    ///
    /// Cancel-safe: if this future is dropped the task keeps running and a
    /// later call waits for it again.
    pub async fn finish(&mut self) -> Option<ScanDisposition> {
        let handle = self.pending.as_mut()?;
        let joined = handle.await;
        self.pending = None;
        match joined {
            Ok(disposition) => Some(disposition),
            Err(e) => {
                log::warn!("Scan task failed: {}", e);
                None
            }
        }
    }

    /// Feed every line of `reader` until EOF or cancellation
    ///
    /// Returns the number of lines read.
    pub async fn feed_lines<R, W>(
        &mut self,
        reader: R,
        token: &CancellationToken,
        out: &mut W,
    ) -> std::io::Result<usize>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = reader.lines();
        let mut count = 0;
        loop {
            let line = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                line = lines.next_line() => line?,
            };
            let Some(line) = line else {
                log::debug!("End of input after {} lines", count);
                break;
            };
            count += 1;
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                result = self.handle_line(&line, out) => result?,
            }
        }
        Ok(count)
    }

    /// Feed codes given on the command line
    pub async fn feed_codes<W: Write>(
        &mut self,
        codes: &[String],
        token: &CancellationToken,
        out: &mut W,
    ) -> std::io::Result<usize> {
        let mut count = 0;
        for code in codes {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                result = self.handle_line(code, out) => result?,
            }
            count += 1;
        }
        Ok(count)
    }
}

/// Print outcomes as they are published until a shutdown event arrives
///
/// With `clear_spinner` set the spinner's line on stderr is wiped before
/// each card is printed.
pub async fn render_outcomes<W: Write>(
    mut receiver: EventReceiver,
    renderer: OutcomeRenderer,
    mut out: W,
    clear_spinner: bool,
) -> W {
    while let Some(event) = receiver.recv().await {
        match event {
            Event::Outcome(outcome) => {
                if clear_spinner {
                    super::spinner::clear_spinner_line();
                }
                let written = write!(out, "{}", renderer.render(&outcome)).and_then(|_| out.flush());
                if let Err(e) = written {
                    log::warn!("Could not write outcome for scan {}: {}", outcome.scan_id, e);
                    break;
                }
            }
            Event::Scan(scan) => {
                if scan.event_type == ScanEventType::Superseded {
                    log::debug!(
                        "Scan {} superseded: {}",
                        scan.scan_id,
                        scan.message.as_deref().unwrap_or("")
                    );
                }
            }
            Event::System(system) => {
                if system.event_type == SystemEventType::Shutdown {
                    break;
                }
            }
        }
    }
    log::trace!("Outcome printer stopped");
    out
}
