//! Event types for the notification system

use crate::scanner::types::{NormalizedBarcode, ProductLookupResult};
use std::time::SystemTime;

/// Lifecycle of a scan inside the pipeline
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanEventType {
    /// Guard claimed, lookup about to start (scanning disabled)
    Accepted,
    /// Detection ignored because a lookup was already in flight
    Dropped,
    /// Guard released after the lookup settled (scanning enabled)
    Rearmed,
    /// Lookup finished after `reset()`; its result was discarded
    Superseded,
    /// `reset()` called by the presentation layer
    Reset,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SystemEventType {
    Startup,
    Shutdown,
}

#[derive(Clone, Debug)]
pub struct ScanEvent {
    pub event_type: ScanEventType,
    pub timestamp: SystemTime,
    /// Generation the event belongs to: the scan in flight for `Dropped`,
    /// the generation a `reset()` moved to for `Reset`
    pub scan_id: u64,
    pub raw_code: Option<String>,
    pub message: Option<String>,
}

impl ScanEvent {
    pub fn new(event_type: ScanEventType, scan_id: u64) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            scan_id,
            raw_code: None,
            message: None,
        }
    }

    pub fn with_code(event_type: ScanEventType, scan_id: u64, raw_code: &str) -> Self {
        Self {
            raw_code: Some(raw_code.to_string()),
            ..Self::new(event_type, scan_id)
        }
    }

    pub fn with_message(event_type: ScanEventType, scan_id: u64, message: String) -> Self {
        Self {
            message: Some(message),
            ..Self::new(event_type, scan_id)
        }
    }
}

/// The terminal outcome of one accepted scan
#[derive(Clone, Debug)]
pub struct OutcomeEvent {
    pub timestamp: SystemTime,
    pub scan_id: u64,
    pub raw_code: String,
    pub barcode: NormalizedBarcode,
    pub result: ProductLookupResult,
}

impl OutcomeEvent {
    pub fn new(
        scan_id: u64,
        raw_code: String,
        barcode: NormalizedBarcode,
        result: ProductLookupResult,
    ) -> Self {
        Self {
            timestamp: SystemTime::now(),
            scan_id,
            raw_code,
            barcode,
            result,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SystemEvent {
    pub event_type: SystemEventType,
    pub timestamp: SystemTime,
    pub message: Option<String>,
}

impl SystemEvent {
    pub fn new(event_type: SystemEventType) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            message: None,
        }
    }

    pub fn with_message(event_type: SystemEventType, message: String) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            message: Some(message),
        }
    }
}

/// Unified event enum that encompasses all event types
#[derive(Clone, Debug)]
pub enum Event {
    Outcome(OutcomeEvent),
    Scan(ScanEvent),
    System(SystemEvent),
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Outcome(_) => "Outcome",
            Event::Scan(_) => "Scan",
            Event::System(_) => "System",
        }
    }
}

/// Event filtering options for subscribers
#[derive(Clone, Debug, PartialEq)]
pub enum EventFilter {
    OutcomeOnly,
    ScanOnly,
    SystemOnly,
    OutcomeAndScan,
    All,
}

impl EventFilter {
    /// Check if an event should be accepted by this filter
    pub fn accepts(&self, event: &Event) -> bool {
        matches!(
            (self, event),
            (EventFilter::OutcomeOnly, Event::Outcome(_))
                | (EventFilter::ScanOnly, Event::Scan(_))
                | (EventFilter::SystemOnly, Event::System(_))
                | (EventFilter::OutcomeAndScan, Event::Outcome(_))
                | (EventFilter::OutcomeAndScan, Event::Scan(_))
                | (EventFilter::All, _)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome() -> Event {
        Event::Outcome(OutcomeEvent::new(
            1,
            "0123".to_string(),
            NormalizedBarcode::from_raw("0123"),
            ProductLookupResult::NotFound,
        ))
    }

    #[test]
    fn test_event_filter_accepts_logic() {
        let scan = Event::Scan(ScanEvent::new(ScanEventType::Accepted, 1));
        let system = Event::System(SystemEvent::new(SystemEventType::Startup));
        let outcome = outcome();

        assert!(EventFilter::OutcomeOnly.accepts(&outcome));
        assert!(!EventFilter::OutcomeOnly.accepts(&scan));
        assert!(!EventFilter::OutcomeOnly.accepts(&system));

        assert!(EventFilter::ScanOnly.accepts(&scan));
        assert!(!EventFilter::ScanOnly.accepts(&outcome));

        assert!(EventFilter::SystemOnly.accepts(&system));

        assert!(EventFilter::OutcomeAndScan.accepts(&outcome));
        assert!(EventFilter::OutcomeAndScan.accepts(&scan));
        assert!(!EventFilter::OutcomeAndScan.accepts(&system));

        for event in [&scan, &system, &outcome] {
            assert!(EventFilter::All.accepts(event));
        }
    }

    #[test]
    fn test_scan_event_constructors() {
        let event = ScanEvent::with_code(ScanEventType::Dropped, 0, "0123");
        assert_eq!(event.raw_code.as_deref(), Some("0123"));
        assert!(event.message.is_none());

        let event = ScanEvent::with_message(ScanEventType::Superseded, 7, "reset".to_string());
        assert_eq!(event.scan_id, 7);
        assert_eq!(event.message.as_deref(), Some("reset"));
    }

    #[test]
    fn test_event_kind_names() {
        assert_eq!(outcome().kind(), "Outcome");
        assert_eq!(
            Event::System(SystemEvent::new(SystemEventType::Shutdown)).kind(),
            "System"
        );
    }
}
