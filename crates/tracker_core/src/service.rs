use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::events::{ChangeEvent, ChangeSink};
use crate::ledger::{CompletionLedger, CompletionStats};
use crate::store::TrackerStore;
use crate::tracker::{Category, Tracker, TrackerId, DEFAULT_CATEGORY_TITLE};
use crate::visibility::{visible_groups, TrackerGroup};

#[derive(Default)]
struct State {
    categories: Vec<Category>,
    ledger: CompletionLedger,
}

/// Façade over the storage boundary. Owns a read-derived snapshot of the
/// categories and the completion ledger; every write goes to the store first
/// and is followed by a full re-read, so memory never drifts from storage.
pub struct TrackerService {
    store: Box<dyn TrackerStore>,
    state: RwLock<State>,
    sinks: Vec<Box<dyn ChangeSink>>,
    default_category: String,
}

pub struct TrackerServiceBuilder {
    store: Option<Box<dyn TrackerStore>>,
    sinks: Vec<Box<dyn ChangeSink>>,
    default_category: String,
}

impl TrackerServiceBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            sinks: Vec::new(),
            default_category: DEFAULT_CATEGORY_TITLE.to_string(),
        }
    }

    pub fn with_store(mut self, store: Box<dyn TrackerStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_change_sink(mut self, sink: Box<dyn ChangeSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn default_category_title(mut self, title: impl Into<String>) -> Self {
        self.default_category = title.into();
        self
    }

    pub fn build(self) -> Result<TrackerService> {
        let store = self
            .store
            .ok_or_else(|| anyhow!("a storage backend is required"))?;
        let service = TrackerService {
            store,
            state: RwLock::new(State::default()),
            sinks: self.sinks,
            default_category: self.default_category,
        };
        service.refresh()?;
        Ok(service)
    }
}

impl Default for TrackerServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackerService {
    pub fn builder() -> TrackerServiceBuilder {
        TrackerServiceBuilder::new()
    }

    /// Re-reads categories and records and swaps the snapshot wholesale.
    fn refresh(&self) -> Result<()> {
        let categories = self
            .store
            .load_categories()
            .context("load categories from the store")?;
        let records = self
            .store
            .load_records()
            .context("load completion records from the store")?;
        debug!(
            categories = categories.len(),
            records = records.len(),
            "refreshed tracker snapshot"
        );
        *self.state.write() = State {
            categories,
            ledger: CompletionLedger::from_records(records),
        };
        Ok(())
    }

    pub fn reload(&self) -> Result<()> {
        self.refresh()?;
        self.publish(&ChangeEvent::Reloaded);
        Ok(())
    }

    pub fn categories(&self) -> Vec<Category> {
        self.state.read().categories.clone()
    }

    pub fn tracker(&self, id: TrackerId) -> Option<Tracker> {
        self.state
            .read()
            .categories
            .iter()
            .flat_map(|category| category.trackers.iter())
            .find(|tracker| tracker.id == id)
            .cloned()
    }

    /// The grouped list the tracker screen renders for `date`.
    pub fn visible_groups(&self, date: NaiveDate) -> Vec<TrackerGroup> {
        visible_groups(&self.state.read().categories, date)
    }

    pub fn is_completed(&self, id: TrackerId, date: NaiveDate) -> bool {
        self.state.read().ledger.is_complete(id, date)
    }

    pub fn completion_count(&self, id: TrackerId) -> usize {
        self.state.read().ledger.count(id)
    }

    pub fn stats(&self) -> CompletionStats {
        self.state.read().ledger.stats()
    }

    pub fn create_category(&self, title: &str) -> Result<Category> {
        let category = self
            .store
            .create_category(title)
            .with_context(|| format!("create category `{title}`"))?;
        self.refresh()?;
        self.publish(&ChangeEvent::CategoryCreated {
            title: title.to_string(),
        });
        Ok(category)
    }

    /// Files a new tracker. An empty category title falls back to the default
    /// category; a category missing from the store is created on the fly.
    pub fn create_tracker(&self, tracker: Tracker) -> Result<()> {
        let category_title = if tracker.category_title.is_empty() {
            self.default_category.clone()
        } else {
            tracker.category_title.clone()
        };
        self.ensure_category(&category_title)?;
        let id = tracker.id;
        self.store
            .create_tracker(&tracker, &category_title)
            .with_context(|| format!("create tracker `{}`", tracker.name))?;
        self.refresh()?;
        self.publish(&ChangeEvent::TrackerCreated { id });
        Ok(())
    }

    pub fn update_tracker(&self, tracker: Tracker) -> Result<()> {
        self.ensure_category(&tracker.category_title)?;
        let id = tracker.id;
        self.store
            .update_tracker(&tracker)
            .with_context(|| format!("update tracker {id}"))?;
        self.refresh()?;
        self.publish(&ChangeEvent::TrackerUpdated { id });
        Ok(())
    }

    pub fn delete_tracker(&self, id: TrackerId) -> Result<()> {
        self.store
            .delete_tracker(id)
            .with_context(|| format!("delete tracker {id}"))?;
        self.refresh()?;
        self.publish(&ChangeEvent::TrackerDeleted { id });
        Ok(())
    }

    pub fn set_pinned(&self, id: TrackerId, pinned: bool) -> Result<()> {
        self.store
            .set_pinned(id, pinned)
            .with_context(|| format!("pin tracker {id}"))?;
        self.refresh()?;
        self.publish(&ChangeEvent::PinChanged { id, pinned });
        Ok(())
    }

    /// Flips the completion mark for (tracker, date) and returns the new
    /// state. Dates after `today` are rejected: a habit cannot be marked done
    /// ahead of time. The store is written before the snapshot is refreshed,
    /// so a failed write leaves the in-memory state untouched.
    pub fn toggle_completion(
        &self,
        id: TrackerId,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<bool> {
        if date > today {
            bail!("cannot mark a tracker complete on a future date");
        }
        if self.tracker(id).is_none() {
            bail!("tracker {id} is not loaded");
        }
        let completed = !self.state.read().ledger.is_complete(id, date);
        if completed {
            self.store
                .create_record(id, date)
                .with_context(|| format!("record completion for tracker {id}"))?;
        } else {
            self.store
                .delete_record(id, date)
                .with_context(|| format!("remove completion for tracker {id}"))?;
        }
        self.refresh()?;
        info!(%id, %date, completed, "toggled completion");
        self.publish(&ChangeEvent::CompletionToggled {
            id,
            date,
            completed,
        });
        Ok(completed)
    }

    fn ensure_category(&self, title: &str) -> Result<()> {
        let exists = self
            .state
            .read()
            .categories
            .iter()
            .any(|category| category.title == title);
        if exists {
            return Ok(());
        }
        info!(title, "creating missing category");
        self.store
            .create_category(title)
            .with_context(|| format!("create category `{title}`"))?;
        Ok(())
    }

    fn publish(&self, event: &ChangeEvent) {
        for sink in &self.sinks {
            sink.publish(event);
        }
    }
}
