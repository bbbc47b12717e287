//! Scan Pipeline
//!
//! Receives decoded barcode strings, admits at most one lookup at a time and
//! turns every admitted scan into exactly one outcome on the notification
//! stream.
//!
//! Admission is a compare-and-swap on the `armed` flag, done synchronously on
//! the caller's thread. The lookup then runs as an async task bounded by a
//! timeout and a cancellation token. Every admission and every `reset()` bumps
//! the generation; a lookup that finishes after its generation went stale is
//! reported as superseded and leaves the guard alone. An accepted scan that is
//! dropped or panics before settling re-arms the guard on drop.

use crate::lookup::api::{LookupError, ProductLookup, DEFAULT_TIMEOUT};
use crate::notifications::api::{
    publish_logged, Event, OutcomeEvent, ScanEvent, ScanEventType, SharedNotifier,
};
use crate::scanner::history::{ScanHistory, ScanHistoryEntry, DEFAULT_HISTORY_SIZE};
use crate::scanner::types::{
    NormalizedBarcode, ProductLookupResult, ProductRecord, ScanDisposition, ScanSession,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Tunables for a [`ScanPipeline`]
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Upper bound for one lookup, on top of any client-side timeout
    pub lookup_timeout: Duration,
    pub history_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            lookup_timeout: DEFAULT_TIMEOUT,
            history_size: DEFAULT_HISTORY_SIZE,
        }
    }
}

/// Outcome reason for a scan whose lookup never settled
const ABANDONED_REASON: &str = "Lookup abandoned before it settled";

/// Bookkeeping guarded by one lock; never held across an await
#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    last_raw_code: Option<String>,
    in_flight: Option<CancellationToken>,
}

struct PipelineInner {
    lookup: Arc<dyn ProductLookup>,
    notifier: SharedNotifier,
    config: PipelineConfig,
    /// `true` while a new scan may be admitted
    armed: AtomicBool,
    slot: Mutex<Slot>,
    scanning_tx: watch::Sender<bool>,
    history: Mutex<ScanHistory>,
    /// Tail of the chain of detached publishes
    detached: Mutex<Option<JoinHandle<()>>>,
    shutdown: CancellationToken,
}

/// The scan-debounce-and-fetch pipeline
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct ScanPipeline {
    inner: Arc<PipelineInner>,
}

/// A scan that won the guard and still has to run its lookup
#[must_use = "an accepted scan holds the guard until it is run"]
pub struct AcceptedScan {
    guard: SettleGuard,
    token: CancellationToken,
}

/// Settles an accepted scan that is dropped before `run()` completes
struct SettleGuard {
    pipeline: ScanPipeline,
    scan_id: u64,
    raw_code: String,
    barcode: NormalizedBarcode,
    recorded: bool,
    published: bool,
    settled: bool,
}

impl ScanPipeline {
    pub fn new(
        lookup: Arc<dyn ProductLookup>,
        notifier: SharedNotifier,
        config: PipelineConfig,
    ) -> Self {
        let (scanning_tx, _) = watch::channel(true);
        let history = ScanHistory::new(config.history_size);
        log::debug!(
            "Scan pipeline created (backend: {}, timeout: {:?}, history: {})",
            lookup.backend_name(),
            config.lookup_timeout,
            config.history_size
        );

        Self {
            inner: Arc::new(PipelineInner {
                lookup,
                notifier,
                config,
                armed: AtomicBool::new(true),
                slot: Mutex::new(Slot::default()),
                scanning_tx,
                history: Mutex::new(history),
                detached: Mutex::new(None),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Claim the guard for `raw_code`, or `None` when the scan is dropped
    ///
    /// Empty input and detections arriving while a lookup is in flight are
    /// dropped without side effects on the session.
    pub fn try_accept(&self, raw_code: &str) -> Option<AcceptedScan> {
        if raw_code.is_empty() {
            log::warn!("Ignoring empty barcode detection");
            return None;
        }
        if self.inner.shutdown.is_cancelled() {
            log::debug!("Pipeline shut down, dropping '{}'", raw_code);
            return None;
        }

        let accepted = {
            let mut slot = self.lock_slot();
            if self
                .inner
                .armed
                .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                Err(slot.generation)
            } else {
                slot.generation += 1;
                slot.last_raw_code = Some(raw_code.to_string());
                let token = self.inner.shutdown.child_token();
                if let Some(previous) = slot.in_flight.replace(token.clone()) {
                    previous.cancel();
                }
                self.inner.scanning_tx.send_replace(false);
                Ok((slot.generation, token))
            }
        };

        let (scan_id, token) = match accepted {
            Ok(accepted) => accepted,
            Err(in_flight) => {
                log::trace!("Lookup {} in flight, dropping '{}'", in_flight, raw_code);
                self.publish_detached(Event::Scan(ScanEvent::with_code(
                    ScanEventType::Dropped,
                    in_flight,
                    raw_code,
                )));
                return None;
            }
        };

        let barcode = NormalizedBarcode::from_raw(raw_code);
        log::debug!("Scan {} accepted: '{}' -> '{}'", scan_id, raw_code, barcode);

        Some(AcceptedScan {
            guard: SettleGuard {
                pipeline: self.clone(),
                scan_id,
                raw_code: raw_code.to_string(),
                barcode,
                recorded: false,
                published: false,
                settled: false,
            },
            token,
        })
    }

    /// Handle one detection from the camera side and wait for it to settle
    pub async fn on_barcode_detected(&self, raw_code: &str) -> ScanDisposition {
        match self.try_accept(raw_code) {
            Some(accepted) => accepted.run().await,
            None => ScanDisposition::Dropped,
        }
    }

    /// Like [`on_barcode_detected`](Self::on_barcode_detected) but runs the
    /// lookup on a spawned task; `None` when the detection was dropped
    pub fn submit(&self, raw_code: &str) -> Option<JoinHandle<ScanDisposition>> {
        let accepted = self.try_accept(raw_code)?;
        Some(tokio::spawn(accepted.run()))
    }

    /// Re-arm immediately and abandon any in-flight lookup
    ///
    /// The `Reset` event carries the new generation and is delivered before
    /// any event of a scan accepted afterwards.
    pub fn reset(&self) {
        let (generation, superseded) = {
            let mut slot = self.lock_slot();
            slot.generation += 1;
            slot.last_raw_code = None;
            let in_flight = slot.in_flight.take();
            if let Some(token) = &in_flight {
                token.cancel();
            }
            self.inner.armed.store(true, Ordering::Release);
            self.inner.scanning_tx.send_replace(true);
            (slot.generation, in_flight.is_some())
        };

        log::debug!(
            "Pipeline reset{}",
            if superseded {
                " (in-flight lookup cancelled)"
            } else {
                ""
            }
        );
        self.publish_detached(Event::Scan(ScanEvent::new(
            ScanEventType::Reset,
            generation,
        )));
    }

    /// Cancel any in-flight lookup and refuse further scans
    pub fn shutdown(&self) {
        log::debug!("Scan pipeline shutting down");
        self.inner.shutdown.cancel();
    }

    pub fn is_scanning(&self) -> bool {
        self.inner.armed.load(Ordering::Acquire)
    }

    /// Observe the scanning flag; `false` while a lookup is in flight
    pub fn scanning_watch(&self) -> watch::Receiver<bool> {
        self.inner.scanning_tx.subscribe()
    }

    pub fn session(&self) -> ScanSession {
        let slot = self.lock_slot();
        ScanSession {
            is_scanning: self.is_scanning(),
            last_raw_code: slot.last_raw_code.clone(),
        }
    }

    /// Recently settled scans, newest first
    pub fn history(&self) -> Vec<ScanHistoryEntry> {
        self.lock_history().entries()
    }

    pub fn backend_name(&self) -> &str {
        self.inner.lookup.backend_name()
    }

    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        self.inner
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_history(&self) -> MutexGuard<'_, ScanHistory> {
        self.inner
            .history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_detached(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.inner
            .detached
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Publish from synchronous code; skipped outside a tokio runtime
    ///
    /// Detached publishes are chained, and [`publish`](Self::publish) waits
    /// for the chain, so pipeline events keep the order they were issued in.
    fn publish_detached(&self, event: Event) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                log::trace!("No runtime, {} event not published", event.kind());
                return;
            }
        };
        let notifier = self.inner.notifier.clone();
        let mut pending = self.lock_detached();
        let previous = pending.take();
        *pending = Some(handle.spawn(async move {
            if let Some(previous) = previous {
                let _ = previous.await;
            }
            publish_logged(&notifier, event).await;
        }));
    }

    async fn publish(&self, event: Event) {
        let previous = self.lock_detached().take();
        if let Some(previous) = previous {
            if let Err(e) = previous.await {
                log::debug!("Detached publish failed: {}", e);
            }
        }
        publish_logged(&self.inner.notifier, event).await;
    }
}

impl AcceptedScan {
    pub fn scan_id(&self) -> u64 {
        self.guard.scan_id
    }

    pub fn barcode(&self) -> &NormalizedBarcode {
        &self.guard.barcode
    }

    /// Run the lookup and settle the scan
    ///
    /// Dropping the returned future before it completes still re-arms the
    /// pipeline and settles the scan as an error.
    pub async fn run(self) -> ScanDisposition {
        let AcceptedScan { mut guard, token } = self;
        let pipeline = guard.pipeline.clone();
        let inner = &pipeline.inner;
        let scan_id = guard.scan_id;

        pipeline
            .publish(Event::Scan(ScanEvent::with_code(
                ScanEventType::Accepted,
                scan_id,
                &guard.raw_code,
            )))
            .await;

        let fetched = if guard.barcode.is_empty() {
            log::debug!("Scan {}: nothing left after normalization", scan_id);
            Ok(None)
        } else {
            let timeout = inner.config.lookup_timeout;
            tokio::select! {
                _ = token.cancelled() => Err(LookupError::Cancelled),
                result = tokio::time::timeout(timeout, inner.lookup.fetch(&guard.barcode)) => {
                    match result {
                        Ok(fetched) => fetched.map(Some),
                        Err(_) => Err(LookupError::Timeout { timeout }),
                    }
                }
            }
        };

        // Settle only if no reset or newer scan happened meanwhile
        let current = {
            let mut slot = pipeline.lock_slot();
            let current = slot.generation == scan_id;
            if current {
                slot.in_flight = None;
            }
            current
        };
        if !current {
            guard.settled = true;
            log::debug!("Scan {} superseded, result discarded", scan_id);
            pipeline
                .publish(Event::Scan(ScanEvent::with_message(
                    ScanEventType::Superseded,
                    scan_id,
                    describe(&fetched),
                )))
                .await;
            return ScanDisposition::Superseded { scan_id };
        }

        let result = match fetched {
            Ok(Some(record)) if record.has_title() => ProductLookupResult::Found(record),
            Ok(_) => ProductLookupResult::NotFound,
            Err(e) => {
                log::warn!("Lookup for '{}' failed: {}", guard.barcode, e);
                let reason = e.to_string();
                ProductLookupResult::Error {
                    reason: if reason.trim().is_empty() {
                        "Unknown lookup failure".to_string()
                    } else {
                        reason
                    },
                }
            }
        };
        log::info!("Scan {} ({}): {}", scan_id, guard.barcode, result.kind());

        pipeline.lock_history().record(ScanHistoryEntry::new(
            scan_id,
            &guard.raw_code,
            &guard.barcode,
            &result,
        ));
        guard.recorded = true;

        pipeline
            .publish(Event::Outcome(OutcomeEvent::new(
                scan_id,
                guard.raw_code.clone(),
                guard.barcode.clone(),
                result.clone(),
            )))
            .await;
        guard.published = true;

        // A reset during publishing has already re-armed
        let rearmed = guard.rearm();
        guard.settled = true;
        if rearmed {
            pipeline
                .publish(Event::Scan(ScanEvent::new(ScanEventType::Rearmed, scan_id)))
                .await;
        }

        ScanDisposition::Completed { scan_id, result }
    }
}

impl SettleGuard {
    /// Clear the in-flight slot and re-arm, unless the scan went stale
    fn rearm(&self) -> bool {
        let inner = &self.pipeline.inner;
        let mut slot = self.pipeline.lock_slot();
        if slot.generation != self.scan_id {
            return false;
        }
        slot.in_flight = None;
        inner.armed.store(true, Ordering::Release);
        inner.scanning_tx.send_replace(true);
        true
    }
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        if self.settled || !self.rearm() {
            return;
        }
        log::warn!("Scan {} abandoned before its lookup settled", self.scan_id);

        if !self.published {
            let result = ProductLookupResult::Error {
                reason: ABANDONED_REASON.to_string(),
            };
            if !self.recorded {
                self.pipeline.lock_history().record(ScanHistoryEntry::new(
                    self.scan_id,
                    &self.raw_code,
                    &self.barcode,
                    &result,
                ));
            }
            self.pipeline.publish_detached(Event::Outcome(OutcomeEvent::new(
                self.scan_id,
                std::mem::take(&mut self.raw_code),
                self.barcode.clone(),
                result,
            )));
        }
        self.pipeline.publish_detached(Event::Scan(ScanEvent::new(
            ScanEventType::Rearmed,
            self.scan_id,
        )));
    }
}

impl std::fmt::Debug for ScanPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanPipeline")
            .field("backend", &self.backend_name())
            .field("is_scanning", &self.is_scanning())
            .finish()
    }
}

impl std::fmt::Debug for AcceptedScan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcceptedScan")
            .field("scan_id", &self.guard.scan_id)
            .field("raw_code", &self.guard.raw_code)
            .field("barcode", &self.guard.barcode)
            .finish()
    }
}

fn describe(fetched: &Result<Option<ProductRecord>, LookupError>) -> String {
    match fetched {
        Ok(Some(record)) if record.has_title() => format!("late result: {}", record.title.trim()),
        Ok(_) => "late result: no match".to_string(),
        Err(e) => format!("late result: {e}"),
    }
}

#[cfg(test)]
impl ScanPipeline {
    pub(crate) fn generation(&self) -> u64 {
        self.lock_slot().generation
    }
}
