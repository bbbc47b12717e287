//! Bounded record of recently settled scans

use crate::scanner::types::{NormalizedBarcode, OutcomeKind, ProductLookupResult};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_SIZE: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct ScanHistoryEntry {
    pub scan_id: u64,
    pub raw_code: String,
    pub normalized: String,
    pub kind: OutcomeKind,
    /// Product title, only for `Found`
    pub title: Option<String>,
    pub settled_at: DateTime<Utc>,
}

impl ScanHistoryEntry {
    pub fn new(
        scan_id: u64,
        raw_code: &str,
        barcode: &NormalizedBarcode,
        result: &ProductLookupResult,
    ) -> Self {
        Self {
            scan_id,
            raw_code: raw_code.to_string(),
            normalized: barcode.to_string(),
            kind: result.kind(),
            title: result.record().map(|record| record.title.trim().to_string()),
            settled_at: Utc::now(),
        }
    }
}

/// Ring of the most recent entries; the oldest is evicted when full
#[derive(Debug, Clone)]
pub struct ScanHistory {
    entries: VecDeque<ScanHistoryEntry>,
    capacity: usize,
}

impl Default for ScanHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}

impl ScanHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, entry: ScanHistoryEntry) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(entry);
    }

    /// Entries, newest first
    pub fn entries(&self) -> Vec<ScanHistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::types::ProductRecord;

    fn entry(scan_id: u64, result: &ProductLookupResult) -> ScanHistoryEntry {
        let raw = format!("0{scan_id:012}");
        ScanHistoryEntry::new(scan_id, &raw, &NormalizedBarcode::from_raw(&raw), result)
    }

    #[test]
    fn test_entry_summarises_outcome() {
        let found = ProductLookupResult::Found(ProductRecord {
            title: " Vaseline Lip Therapy ".to_string(),
            ..ProductRecord::default()
        });
        let e = entry(1, &found);
        assert_eq!(e.kind, OutcomeKind::Found);
        assert_eq!(e.title.as_deref(), Some("Vaseline Lip Therapy"));
        assert_eq!(e.raw_code, "0000000000001");
        assert_eq!(e.normalized, "000000000001");

        let failed = entry(
            2,
            &ProductLookupResult::Error {
                reason: "timeout".to_string(),
            },
        );
        assert_eq!(failed.kind, OutcomeKind::Error);
        assert!(failed.title.is_none());
    }

    #[test]
    fn test_newest_first_and_bounded() {
        let mut history = ScanHistory::new(3);
        for id in 1..=5 {
            history.record(entry(id, &ProductLookupResult::NotFound));
        }

        let ids: Vec<u64> = history.entries().iter().map(|e| e.scan_id).collect();
        assert_eq!(ids, vec![5, 4, 3]);
        assert_eq!(history.len(), 3);
        assert_eq!(history.capacity(), 3);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut history = ScanHistory::new(0);
        history.record(entry(1, &ProductLookupResult::NotFound));
        assert!(history.is_empty());
    }
}
