//! Trailing reporting window and the per-record derived columns.

use crate::types::{CustomerRecord, CustomerTier, WindowedRecord};
use crate::util::days_between;
use chrono::{Duration, NaiveDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    /// Latest purchase seen anywhere in the input.
    pub reference: NaiveDateTime,
    pub start: NaiveDateTime,
    pub days: i64,
}

impl ReportWindow {
    pub fn ending_at(reference: NaiveDateTime, days: i64) -> Self {
        ReportWindow {
            reference,
            start: reference - Duration::days(days),
            days,
        }
    }

    /// Build the window from the full dataset. `None` when there is nothing
    /// to take a maximum over.
    pub fn from_records(records: &[CustomerRecord], days: i64) -> Option<Self> {
        reference_date(records).map(|reference| ReportWindow::ending_at(reference, days))
    }

    /// Both ends inclusive.
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        ts >= self.start && ts <= self.reference
    }
}

pub fn reference_date(records: &[CustomerRecord]) -> Option<NaiveDateTime> {
    records.iter().map(|r| r.last_purchase).max()
}

pub fn derive(record: &CustomerRecord, window: &ReportWindow) -> WindowedRecord {
    WindowedRecord {
        record: record.clone(),
        days_since_purchase: days_between(record.last_purchase, window.reference),
        tier: CustomerTier::from_optional_score(record.spending_score),
    }
}

/// Records inside the window, input order preserved, with derived columns.
pub fn select_window(records: &[CustomerRecord], window: &ReportWindow) -> Vec<WindowedRecord> {
    records
        .iter()
        .filter(|r| window.contains(r.last_purchase))
        .map(|r| derive(r, window))
        .collect()
}
