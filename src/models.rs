//! Core data structures for order ingestion.
//!
//! Defines the typed order record, the skip taxonomy of the line transform
//! and the statistics reported by the ingestion driver.

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use std::path::PathBuf;
use thiserror::Error;

/// A validated order, ready for serialization to the destination store.
///
/// Field order matches both the raw line layout and the destination table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub client_id: i64,
    pub product_id: i64,
    pub country: String,
    /// Passed through verbatim; expected to already be `YYYY-MM-DD`
    pub order_date: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub status: String,
}

/// Why a line produced no record.
///
/// Side-channel only. The primary transform contract collapses every
/// variant into "no output".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("header row")]
    HeaderRow,

    #[error("expected 8 fields, found {found}")]
    ArityMismatch { found: usize },

    #[error("field '{field}' is not a valid number: '{value}'")]
    NumericCoercionFailure { field: &'static str, value: String },

    #[error("order_date is not a YYYY-MM-DD date: '{value}'")]
    InvalidOrderDate { value: String },

    #[error("status '{value}' is not an accepted order status")]
    UnknownStatus { value: String },
}

/// Per-reason skip counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    pub header_rows: usize,
    pub arity_mismatches: usize,
    pub numeric_failures: usize,
    pub invalid_dates: usize,
    pub unknown_statuses: usize,
}

impl SkipCounts {
    pub fn record(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::HeaderRow => self.header_rows += 1,
            SkipReason::ArityMismatch { .. } => self.arity_mismatches += 1,
            SkipReason::NumericCoercionFailure { .. } => self.numeric_failures += 1,
            SkipReason::InvalidOrderDate { .. } => self.invalid_dates += 1,
            SkipReason::UnknownStatus { .. } => self.unknown_statuses += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.header_rows
            + self.arity_mismatches
            + self.numeric_failures
            + self.invalid_dates
            + self.unknown_statuses
    }
}

impl AddAssign for SkipCounts {
    fn add_assign(&mut self, other: Self) {
        self.header_rows += other.header_rows;
        self.arity_mismatches += other.arity_mismatches;
        self.numeric_failures += other.numeric_failures;
        self.invalid_dates += other.invalid_dates;
        self.unknown_statuses += other.unknown_statuses;
    }
}

/// Result of streaming one input file through the transform
#[derive(Debug, Default)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub records: Vec<OrderRecord>,
    pub lines_read: usize,
    pub skips: SkipCounts,
}

/// Processing statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub files_processed: usize,
    pub files_failed: usize,
    pub lines_read: usize,
    pub records_emitted: usize,
    pub skips: SkipCounts,
    /// `None` for dry runs
    pub output_path: Option<PathBuf>,
    pub processing_time_ms: u128,
}

impl ProcessingStats {
    /// Fold a finished file into the running totals
    pub fn absorb(&mut self, outcome: &FileOutcome) {
        self.files_processed += 1;
        self.lines_read += outcome.lines_read;
        self.records_emitted += outcome.records.len();
        self.skips += outcome.skips;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_counts_record_and_total() {
        let mut counts = SkipCounts::default();
        counts.record(&SkipReason::HeaderRow);
        counts.record(&SkipReason::ArityMismatch { found: 7 });
        counts.record(&SkipReason::ArityMismatch { found: 9 });
        counts.record(&SkipReason::NumericCoercionFailure {
            field: "client_id",
            value: "abc".to_string(),
        });

        assert_eq!(counts.header_rows, 1);
        assert_eq!(counts.arity_mismatches, 2);
        assert_eq!(counts.numeric_failures, 1);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_processing_stats_absorb() {
        let mut stats = ProcessingStats::default();
        let mut skips = SkipCounts::default();
        skips.record(&SkipReason::HeaderRow);

        let outcome = FileOutcome {
            path: PathBuf::from("2025-04-01/WEB_orders.csv"),
            records: Vec::new(),
            lines_read: 1,
            skips,
        };
        stats.absorb(&outcome);
        stats.absorb(&outcome);

        assert_eq!(stats.files_processed, 2);
        assert_eq!(stats.lines_read, 2);
        assert_eq!(stats.records_emitted, 0);
        assert_eq!(stats.skips.header_rows, 2);
    }

    #[test]
    fn test_skip_reason_messages() {
        let reason = SkipReason::NumericCoercionFailure {
            field: "unit_price",
            value: "$19.99".to_string(),
        };
        assert_eq!(
            reason.to_string(),
            "field 'unit_price' is not a valid number: '$19.99'"
        );
        assert_eq!(
            SkipReason::ArityMismatch { found: 9 }.to_string(),
            "expected 8 fields, found 9"
        );
    }
}
