use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::tracker::TrackerId;

/// A completion mark: this tracker was performed on this day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CompletionRecord {
    pub tracker: TrackerId,
    pub date: NaiveDate,
}

/// Day-granular completion marks, at most one per tracker and day.
///
/// Rebuilt from the store on every refresh; the set itself enforces the
/// one-record-per-pair invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionLedger {
    records: HashSet<CompletionRecord>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionStats {
    /// Marks across all trackers and all time.
    pub total_marks: usize,
    /// Distinct trackers with at least one mark.
    pub trackers_with_marks: usize,
}

impl CompletionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = CompletionRecord>) -> Self {
        Self {
            records: records.into_iter().collect(),
        }
    }

    /// Flips the mark for (tracker, date) and returns the new state,
    /// true meaning the day is now marked complete.
    pub fn toggle(&mut self, tracker: TrackerId, date: NaiveDate) -> bool {
        let record = CompletionRecord { tracker, date };
        if self.records.remove(&record) {
            false
        } else {
            self.records.insert(record);
            true
        }
    }

    pub fn is_complete(&self, tracker: TrackerId, date: NaiveDate) -> bool {
        self.records.contains(&CompletionRecord { tracker, date })
    }

    /// Days ever marked complete for `tracker`, across all time.
    pub fn count(&self, tracker: TrackerId) -> usize {
        self.records
            .iter()
            .filter(|record| record.tracker == tracker)
            .count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &CompletionRecord> {
        self.records.iter()
    }

    pub fn stats(&self) -> CompletionStats {
        let trackers: HashSet<TrackerId> =
            self.records.iter().map(|record| record.tracker).collect();
        CompletionStats {
            total_marks: self.records.len(),
            trackers_with_marks: trackers.len(),
        }
    }
}
