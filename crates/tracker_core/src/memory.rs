use chrono::NaiveDate;
use parking_lot::RwLock;

use crate::ledger::CompletionRecord;
use crate::store::{StoreError, TrackerStore};
use crate::tracker::{Category, Tracker, TrackerId};

/// Plain record state shared by the store implementations. Mutations keep the
/// invariants the boundary promises: category titles unique, one completion
/// record per (tracker, day), records dropped with their tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StoreData {
    pub(crate) categories: Vec<Category>,
    pub(crate) records: Vec<CompletionRecord>,
}

impl StoreData {
    fn locate_tracker(&self, id: TrackerId) -> Option<(usize, usize)> {
        self.categories
            .iter()
            .enumerate()
            .find_map(|(cat_idx, category)| {
                category
                    .trackers
                    .iter()
                    .position(|tracker| tracker.id == id)
                    .map(|item_idx| (cat_idx, item_idx))
            })
    }

    pub(crate) fn create_category(&mut self, title: &str) -> Result<Category, StoreError> {
        if self.categories.iter().any(|c| c.title == title) {
            return Err(StoreError::CategoryExists(title.to_string()));
        }
        let category = Category::empty(title);
        self.categories.push(category.clone());
        Ok(category)
    }

    pub(crate) fn create_tracker(
        &mut self,
        tracker: &Tracker,
        category_title: &str,
    ) -> Result<(), StoreError> {
        let category = self
            .categories
            .iter_mut()
            .find(|c| c.title == category_title)
            .ok_or_else(|| StoreError::CategoryNotFound(category_title.to_string()))?;
        let mut tracker = tracker.clone();
        tracker.category_title = category_title.to_string();
        category.trackers.push(tracker);
        Ok(())
    }

    pub(crate) fn update_tracker(&mut self, tracker: &Tracker) -> Result<(), StoreError> {
        let (cat_idx, item_idx) = self
            .locate_tracker(tracker.id)
            .ok_or(StoreError::TrackerNotFound(tracker.id))?;
        if self.categories[cat_idx].title == tracker.category_title {
            self.categories[cat_idx].trackers[item_idx] = tracker.clone();
            return Ok(());
        }
        let target = self
            .categories
            .iter()
            .position(|c| c.title == tracker.category_title)
            .ok_or_else(|| StoreError::CategoryNotFound(tracker.category_title.clone()))?;
        self.categories[cat_idx].trackers.remove(item_idx);
        self.categories[target].trackers.push(tracker.clone());
        Ok(())
    }

    pub(crate) fn delete_tracker(&mut self, id: TrackerId) -> Result<(), StoreError> {
        let (cat_idx, item_idx) = self
            .locate_tracker(id)
            .ok_or(StoreError::TrackerNotFound(id))?;
        self.categories[cat_idx].trackers.remove(item_idx);
        self.records.retain(|record| record.tracker != id);
        Ok(())
    }

    pub(crate) fn set_pinned(&mut self, id: TrackerId, pinned: bool) -> Result<(), StoreError> {
        let (cat_idx, item_idx) = self
            .locate_tracker(id)
            .ok_or(StoreError::TrackerNotFound(id))?;
        self.categories[cat_idx].trackers[item_idx].pinned = pinned;
        Ok(())
    }

    pub(crate) fn create_record(
        &mut self,
        id: TrackerId,
        date: NaiveDate,
    ) -> Result<(), StoreError> {
        if self.locate_tracker(id).is_none() {
            return Err(StoreError::TrackerNotFound(id));
        }
        let record = CompletionRecord { tracker: id, date };
        if !self.records.contains(&record) {
            self.records.push(record);
        }
        Ok(())
    }

    pub(crate) fn delete_record(
        &mut self,
        id: TrackerId,
        date: NaiveDate,
    ) -> Result<(), StoreError> {
        self.records
            .retain(|record| !(record.tracker == id && record.date == date));
        Ok(())
    }
}

/// In-memory store, used by tests and as an ephemeral backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<StoreData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(categories: Vec<Category>, records: Vec<CompletionRecord>) -> Self {
        Self {
            data: RwLock::new(StoreData {
                categories,
                records,
            }),
        }
    }
}

impl TrackerStore for MemoryStore {
    fn load_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.data.read().categories.clone())
    }

    fn load_records(&self) -> Result<Vec<CompletionRecord>, StoreError> {
        Ok(self.data.read().records.clone())
    }

    fn create_category(&self, title: &str) -> Result<Category, StoreError> {
        self.data.write().create_category(title)
    }

    fn create_tracker(&self, tracker: &Tracker, category_title: &str) -> Result<(), StoreError> {
        self.data.write().create_tracker(tracker, category_title)
    }

    fn update_tracker(&self, tracker: &Tracker) -> Result<(), StoreError> {
        self.data.write().update_tracker(tracker)
    }

    fn delete_tracker(&self, id: TrackerId) -> Result<(), StoreError> {
        self.data.write().delete_tracker(id)
    }

    fn set_pinned(&self, id: TrackerId, pinned: bool) -> Result<(), StoreError> {
        self.data.write().set_pinned(id, pinned)
    }

    fn create_record(&self, id: TrackerId, date: NaiveDate) -> Result<(), StoreError> {
        self.data.write().create_record(id, date)
    }

    fn delete_record(&self, id: TrackerId, date: NaiveDate) -> Result<(), StoreError> {
        self.data.write().delete_record(id, date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::WeekdaySet;
    use crate::tracker::TrackerKind;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn tracker(name: &str, category: &str) -> Tracker {
        Tracker {
            id: TrackerId::new(),
            name: name.to_string(),
            emoji: "🌺".to_string(),
            color: "#FD4C49".to_string(),
            kind: TrackerKind::Habit,
            schedule: Some(WeekdaySet::from_indices([0, 2])),
            created: date(1),
            category_title: category.to_string(),
            pinned: false,
        }
    }

    #[test]
    fn duplicate_category_title_is_rejected() {
        let store = MemoryStore::new();
        store.create_category("A").unwrap();
        assert!(matches!(
            store.create_category("A"),
            Err(StoreError::CategoryExists(title)) if title == "A"
        ));
    }

    #[test]
    fn create_tracker_requires_the_category() {
        let store = MemoryStore::new();
        let t = tracker("Бег", "A");
        assert!(matches!(
            store.create_tracker(&t, "A"),
            Err(StoreError::CategoryNotFound(_))
        ));
    }

    #[test]
    fn update_moves_tracker_between_categories() {
        let store = MemoryStore::new();
        store.create_category("A").unwrap();
        store.create_category("B").unwrap();
        let mut t = tracker("Бег", "A");
        store.create_tracker(&t, "A").unwrap();

        t.category_title = "B".to_string();
        t.name = "Бег по утрам".to_string();
        store.update_tracker(&t).unwrap();

        let categories = store.load_categories().unwrap();
        assert!(categories[0].trackers.is_empty());
        assert_eq!(categories[1].trackers.len(), 1);
        assert_eq!(categories[1].trackers[0].name, "Бег по утрам");
    }

    #[test]
    fn deleting_a_tracker_drops_its_records() {
        let store = MemoryStore::new();
        store.create_category("A").unwrap();
        let t = tracker("Бег", "A");
        store.create_tracker(&t, "A").unwrap();
        store.create_record(t.id, date(10)).unwrap();
        store.create_record(t.id, date(11)).unwrap();

        store.delete_tracker(t.id).unwrap();
        assert!(store.load_records().unwrap().is_empty());
        assert!(matches!(
            store.delete_tracker(t.id),
            Err(StoreError::TrackerNotFound(_))
        ));
    }

    #[test]
    fn record_for_unknown_tracker_is_an_error() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.create_record(TrackerId::new(), date(10)),
            Err(StoreError::TrackerNotFound(_))
        ));
    }

    #[test]
    fn readding_an_existing_record_is_a_no_op() {
        let store = MemoryStore::new();
        store.create_category("A").unwrap();
        let t = tracker("Бег", "A");
        store.create_tracker(&t, "A").unwrap();

        store.create_record(t.id, date(10)).unwrap();
        store.create_record(t.id, date(10)).unwrap();
        assert_eq!(store.load_records().unwrap().len(), 1);

        store.delete_record(t.id, date(10)).unwrap();
        // Deleting an absent pair stays silent.
        store.delete_record(t.id, date(10)).unwrap();
        assert!(store.load_records().unwrap().is_empty());
    }
}
