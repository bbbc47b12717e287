//! Shutdown coordination
//!
//! Turns process signals into a broadcast notification and a cancellation
//! token that long-running tasks (stdin feed, spinner, in-flight lookups)
//! can watch.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Coordinates graceful shutdown across the application
pub struct ShutdownCoordinator {
    shutdown_tx: broadcast::Sender<()>,
    shutdown_requested: Arc<AtomicBool>,
    token: CancellationToken,
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator
    pub fn new() -> (Self, broadcast::Receiver<()>) {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(8);

        let coordinator = Self {
            shutdown_tx,
            shutdown_requested: Arc::new(AtomicBool::new(false)),
            token: CancellationToken::new(),
        };

        (coordinator, shutdown_rx)
    }

    /// Subscribe to shutdown notifications
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Token cancelled when shutdown is triggered
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Trigger shutdown
    pub fn trigger_shutdown(&self) {
        trigger(&self.shutdown_tx, &self.shutdown_requested, &self.token);
    }

    /// Check if shutdown has been requested
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Acquire)
    }

    /// Install signal handlers that trigger this coordinator.
    ///
    /// The first signal requests a graceful shutdown; a second one exits the
    /// process immediately with status 130.
    pub fn install_signal_handlers(&self) {
        let signal_count = Arc::new(AtomicUsize::new(0));

        #[cfg(unix)]
        {
            unsafe {
                libc::signal(libc::SIGPIPE, libc::SIG_DFL);
            }

            use tokio::signal::unix::{signal, SignalKind};
            let signals = [
                SignalKind::interrupt(),
                SignalKind::terminate(),
                SignalKind::hangup(),
            ];

            for kind in signals {
                let tx = self.shutdown_tx.clone();
                let requested = self.shutdown_requested.clone();
                let token = self.token.clone();
                let sig_ctr = signal_count.clone();

                tokio::spawn(async move {
                    if let Ok(mut sig) = signal(kind) {
                        while sig.recv().await.is_some() {
                            if sig_ctr.fetch_add(1, Ordering::AcqRel) >= 1 {
                                std::process::exit(130);
                            }
                            log::info!("Shutdown requested by signal");
                            trigger(&tx, &requested, &token);
                        }
                    }
                });
            }
        }

        #[cfg(not(unix))]
        {
            let tx = self.shutdown_tx.clone();
            let requested = self.shutdown_requested.clone();
            let token = self.token.clone();
            tokio::spawn(async move {
                while tokio::signal::ctrl_c().await.is_ok() {
                    if signal_count.fetch_add(1, Ordering::AcqRel) >= 1 {
                        std::process::exit(130);
                    }
                    log::info!("Shutdown requested by Ctrl-C");
                    trigger(&tx, &requested, &token);
                }
            });
        }
    }
}

fn trigger(
    shutdown_tx: &broadcast::Sender<()>,
    shutdown_requested: &AtomicBool,
    token: &CancellationToken,
) {
    // Release pairs with the Acquire load in is_shutdown_requested()
    shutdown_requested.store(true, Ordering::Release);
    token.cancel();
    let _ = shutdown_tx.send(());
}
