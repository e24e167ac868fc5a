use chrono::NaiveDate;
use thiserror::Error;

use crate::ledger::CompletionRecord;
use crate::tracker::{Category, Tracker, TrackerId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("tracker {0} not found")]
    TrackerNotFound(TrackerId),
    #[error("category `{0}` not found")]
    CategoryNotFound(String),
    #[error("category `{0}` already exists")]
    CategoryExists(String),
    #[error("storage unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage corrupted: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// CRUD boundary the service talks to. Implementations own the persisted
/// categories, trackers and completion records; the service keeps only
/// read-derived snapshots and re-reads after every write.
pub trait TrackerStore: Send + Sync {
    /// All categories in stored order, each carrying its trackers.
    fn load_categories(&self) -> Result<Vec<Category>, StoreError>;

    /// All completion records, in no particular order.
    fn load_records(&self) -> Result<Vec<CompletionRecord>, StoreError>;

    fn create_category(&self, title: &str) -> Result<Category, StoreError>;

    /// Files a new tracker under an existing category.
    fn create_tracker(&self, tracker: &Tracker, category_title: &str) -> Result<(), StoreError>;

    /// Replaces a stored tracker wholesale. A changed `category_title` moves
    /// it to the end of the target category.
    fn update_tracker(&self, tracker: &Tracker) -> Result<(), StoreError>;

    /// Removes a tracker together with its completion records.
    fn delete_tracker(&self, id: TrackerId) -> Result<(), StoreError>;

    fn set_pinned(&self, id: TrackerId, pinned: bool) -> Result<(), StoreError>;

    /// Marks (tracker, date) complete. Re-adding an existing pair is a no-op;
    /// an unknown tracker is an error.
    fn create_record(&self, id: TrackerId, date: NaiveDate) -> Result<(), StoreError>;

    /// Removes the mark for (tracker, date). Absent pairs are a no-op.
    fn delete_record(&self, id: TrackerId, date: NaiveDate) -> Result<(), StoreError>;
}
