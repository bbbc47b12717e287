//! Test helpers for scan pipeline unit tests
//!
//! A scripted [`ProductLookup`] that records the barcodes it was asked for
//! and can be held open until the test releases it.

use crate::lookup::api::{LookupError, LookupResult, ProductLookup};
use crate::notifications::api::{
    new_notifier, Event, EventFilter, EventReceiver, OutcomeEvent, SharedNotifier,
};
use crate::scanner::pipeline::{PipelineConfig, ScanPipeline};
use crate::scanner::types::{NormalizedBarcode, ProductRecord};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Notify, Semaphore};

#[derive(Clone)]
pub struct ScriptedLookup {
    response: Result<ProductRecord, LookupError>,
    gate: Option<Arc<Semaphore>>,
    calls: Arc<Mutex<Vec<String>>>,
    started: Arc<Notify>,
}

impl ScriptedLookup {
    pub fn found(title: &str) -> Self {
        Self::responding(Ok(ProductRecord {
            title: title.to_string(),
            brand: "Test Brand".to_string(),
            star_rating: 4.5,
            review_count: 12,
            ..ProductRecord::default()
        }))
    }

    pub fn failing(error: LookupError) -> Self {
        Self::responding(Err(error))
    }

    pub fn responding(response: Result<ProductRecord, LookupError>) -> Self {
        Self {
            response,
            gate: None,
            calls: Arc::new(Mutex::new(Vec::new())),
            started: Arc::new(Notify::new()),
        }
    }

    /// Hold every fetch until a permit is added to the returned semaphore
    pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Resolves once a fetch has started
    pub async fn wait_started(&self) {
        tokio::time::timeout(Duration::from_secs(5), self.started.notified())
            .await
            .expect("lookup never started");
    }
}

#[async_trait]
impl ProductLookup for ScriptedLookup {
    async fn fetch(&self, barcode: &NormalizedBarcode) -> LookupResult<ProductRecord> {
        self.calls.lock().unwrap().push(barcode.to_string());
        self.started.notify_one();

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        self.response.clone().map(|record| ProductRecord {
            barcode: barcode.to_string(),
            ..record
        })
    }

    fn backend_name(&self) -> &str {
        "scripted"
    }
}

/// A backend whose fetch panics
pub struct PanickingLookup;

#[async_trait]
impl ProductLookup for PanickingLookup {
    async fn fetch(&self, barcode: &NormalizedBarcode) -> LookupResult<ProductRecord> {
        panic!("backend crashed while fetching {}", barcode);
    }

    fn backend_name(&self) -> &str {
        "panicking"
    }
}

pub async fn pipeline_with(
    lookup: &ScriptedLookup,
    config: PipelineConfig,
) -> (ScanPipeline, EventReceiver, SharedNotifier) {
    pipeline_with_lookup(Arc::new(lookup.clone()), config).await
}

pub async fn pipeline_with_lookup(
    lookup: Arc<dyn ProductLookup>,
    config: PipelineConfig,
) -> (ScanPipeline, EventReceiver, SharedNotifier) {
    let notifier = new_notifier();
    let receiver = notifier.lock().await.subscribe(
        "test".to_string(),
        EventFilter::All,
        "test:pipeline".to_string(),
    );
    let pipeline = ScanPipeline::new(lookup, notifier.clone(), config);
    (pipeline, receiver, notifier)
}

/// Outcome events currently queued, skipping lifecycle events
pub fn queued_outcomes(receiver: &mut EventReceiver) -> Vec<OutcomeEvent> {
    let mut outcomes = Vec::new();
    while let Some(event) = receiver.try_recv() {
        if let Event::Outcome(outcome) = event {
            outcomes.push(outcome);
        }
    }
    outcomes
}

/// Wait for the next outcome event, skipping lifecycle events
pub async fn next_outcome(receiver: &mut EventReceiver) -> OutcomeEvent {
    let waited = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Some(Event::Outcome(outcome)) = receiver.recv().await {
                return outcome;
            }
        }
    })
    .await;
    waited.expect("no outcome published")
}
