//! Simple progress spinner for terminal feedback while a lookup is in flight

use std::io::Write;
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Module-local result type for spinner operations
type Result<T> = std::result::Result<T, SpinnerError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpinnerError {
    /// The pipeline went away without a shutdown signal
    #[error("Scanning state channel closed")]
    StateClosed,
}

impl crate::core::error_handling::ContextualError for SpinnerError {
    fn is_user_actionable(&self) -> bool {
        false
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}

const BRAILLE_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Check if spinner should be displayed
pub fn should_show_spinner() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stderr()) && !log::log_enabled!(log::Level::Info)
}

/// Wipe the spinner frame from the current stderr line
pub fn clear_spinner_line() {
    eprint!("\r \r");
    let _ = std::io::stderr().flush();
}

pub struct ProgressSpinner {
    frame_index: usize,
    ticks: usize,
}

impl Default for ProgressSpinner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSpinner {
    pub fn new() -> Self {
        Self {
            frame_index: 0,
            ticks: 0,
        }
    }

    pub fn tick(&mut self) {
        let frame = BRAILLE_FRAMES[self.frame_index];
        self.frame_index = (self.frame_index + 1) % BRAILLE_FRAMES.len();
        self.ticks += 1;

        eprint!("\r{frame}");
        let _ = std::io::stderr().flush();
    }

    pub fn finish(&self) {
        clear_spinner_line();
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }
}

/// Run the spinner task
///
/// `scanning` is the pipeline's scanning flag; the spinner animates while it
/// is `false`.
pub async fn run_spinner(
    scanning: watch::Receiver<bool>,
    shutdown_rx: broadcast::Receiver<()>,
) -> Result<()> {
    if !should_show_spinner() {
        return Ok(());
    }

    let mut spinner = ProgressSpinner::new();
    spin_while_busy(scanning, shutdown_rx, &mut spinner).await
}

async fn spin_while_busy(
    mut scanning: watch::Receiver<bool>,
    mut shutdown_rx: broadcast::Receiver<()>,
    spinner: &mut ProgressSpinner,
) -> Result<()> {
    let mut busy = !*scanning.borrow_and_update();
    let mut update_interval = interval(Duration::from_millis(100)); // 10Hz
    update_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                if busy {
                    spinner.finish();
                }
                return Ok(());
            }

            changed = scanning.changed() => {
                if changed.is_err() {
                    if busy {
                        spinner.finish();
                    }
                    return Err(SpinnerError::StateClosed);
                }
                let now_busy = !*scanning.borrow_and_update();
                if busy && !now_busy {
                    spinner.finish();
                } else if !busy && now_busy {
                    update_interval.reset();
                }
                busy = now_busy;
            }

            _ = update_interval.tick(), if busy => {
                spinner.tick();
            }
        }
    }
}
