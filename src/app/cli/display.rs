//! CLI display utilities for formatting scan outcomes and history

use crate::core::styles::StyleRole;
use crate::notifications::api::OutcomeEvent;
use crate::scanner::api::{OutcomeKind, ProductLookupResult, ProductRecord, ScanHistoryEntry};
use std::fmt::Write;

const LABEL_WIDTH: usize = 9;
const NO_PRODUCT_MESSAGE: &str = "No product found";

/// Renders outcome events as terminal text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeRenderer {
    use_color: bool,
    merge_not_found: bool,
}

impl OutcomeRenderer {
    pub fn new(use_color: bool, merge_not_found: bool) -> Self {
        Self {
            use_color,
            merge_not_found,
        }
    }

    fn paint(&self, role: StyleRole, text: &str) -> String {
        role.paint(text, self.use_color)
    }

    pub fn render(&self, outcome: &OutcomeEvent) -> String {
        match &outcome.result {
            ProductLookupResult::Found(record) => self.render_card(record),
            ProductLookupResult::NotFound => self.render_not_found(&outcome.raw_code),
            ProductLookupResult::Error { reason } if self.merge_not_found => {
                log::debug!("Showing lookup error as not found: {}", reason);
                self.render_not_found(&outcome.raw_code)
            }
            ProductLookupResult::Error { reason } => {
                format!(
                    "{} {}: {}\n",
                    self.paint(StyleRole::Error, "Lookup failed for"),
                    outcome.raw_code,
                    reason
                )
            }
        }
    }

    fn render_not_found(&self, raw_code: &str) -> String {
        format!(
            "{} for {}\n",
            self.paint(StyleRole::NotFound, NO_PRODUCT_MESSAGE),
            raw_code
        )
    }

    fn field(&self, out: &mut String, label: &str, value: &str, role: StyleRole) {
        if value.trim().is_empty() {
            return;
        }
        let _ = writeln!(
            out,
            "  {} {}",
            self.paint(StyleRole::Label, &format!("{:<LABEL_WIDTH$}", label)),
            self.paint(role, value)
        );
    }

    pub fn render_card(&self, record: &ProductRecord) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.paint(StyleRole::Title, record.title.trim()));

        self.field(&mut out, "Brand", &record.brand, StyleRole::Value);
        self.field(&mut out, "Price", &record.price, StyleRole::Price);
        let rating = format!(
            "{} ({} reviews)",
            record.star_rating_formatted(),
            record.review_count_formatted()
        );
        self.field(&mut out, "Rating", &rating, StyleRole::Rating);
        self.field(&mut out, "Genre", &record.company_genre, StyleRole::Value);
        self.field(&mut out, "Trust", &record.company_trust, StyleRole::Accent);
        self.field(&mut out, "Barcode", &record.barcode, StyleRole::Value);
        self.field(&mut out, "Image", &record.image_url, StyleRole::Literal);

        if !record.description.trim().is_empty() {
            let _ = writeln!(out, "  {}", record.description.trim());
        }
        for pro in &record.pros {
            let _ = writeln!(out, "  {} {}", self.paint(StyleRole::Pro, "+"), pro);
        }
        for con in &record.cons {
            let _ = writeln!(out, "  {} {}", self.paint(StyleRole::Con, "-"), con);
        }
        out
    }

    pub fn render_history(&self, entries: &[ScanHistoryEntry]) -> String {
        if entries.is_empty() {
            return "No scans yet\n".to_string();
        }

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{}",
            self.paint(
                StyleRole::Header,
                &format!(
                    "{:>4}  {:<8}  {:<15}  {:<9}  {}",
                    "#", "Time", "Barcode", "Outcome", "Title"
                )
            )
        );
        for entry in entries {
            let kind = entry.kind.to_string();
            let role = match entry.kind {
                OutcomeKind::Found => StyleRole::Pro,
                OutcomeKind::NotFound => StyleRole::NotFound,
                OutcomeKind::Error => StyleRole::Error,
            };
            let _ = writeln!(
                out,
                "{:>4}  {:<8}  {:<15}  {}  {}",
                entry.scan_id,
                entry
                    .settled_at
                    .with_timezone(&chrono::Local)
                    .format("%H:%M:%S")
                    .to_string(),
                entry.raw_code,
                self.paint(role, &format!("{:<9}", kind)),
                entry.title.as_deref().unwrap_or("")
            );
        }
        out
    }
}
