use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ledger::CompletionRecord;
use crate::memory::StoreData;
use crate::schedule::WeekdaySet;
use crate::store::{StoreError, TrackerStore};
use crate::tracker::{Category, Tracker, TrackerId, TrackerKind};

const KIND_HABIT: &str = "habit";
const KIND_IRREGULAR: &str = "irregular";

/// Store backed by a single JSON file. The file is read once on open and
/// rewritten after every mutation; a missing file opens as an empty store.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    data: RwLock<StoreData>,
}

impl JsonStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let file: TrackerFile = serde_json::from_str(&raw)?;
            file.into_data()
        } else {
            StoreData::default()
        };
        debug!(path = %path.display(), "opened tracker store");
        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, data: &StoreData) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(&TrackerFile::from_data(data))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl TrackerStore for JsonStore {
    fn load_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.data.read().categories.clone())
    }

    fn load_records(&self) -> Result<Vec<CompletionRecord>, StoreError> {
        Ok(self.data.read().records.clone())
    }

    fn create_category(&self, title: &str) -> Result<Category, StoreError> {
        let mut data = self.data.write();
        let category = data.create_category(title)?;
        self.persist(&data)?;
        Ok(category)
    }

    fn create_tracker(&self, tracker: &Tracker, category_title: &str) -> Result<(), StoreError> {
        let mut data = self.data.write();
        data.create_tracker(tracker, category_title)?;
        self.persist(&data)
    }

    fn update_tracker(&self, tracker: &Tracker) -> Result<(), StoreError> {
        let mut data = self.data.write();
        data.update_tracker(tracker)?;
        self.persist(&data)
    }

    fn delete_tracker(&self, id: TrackerId) -> Result<(), StoreError> {
        let mut data = self.data.write();
        data.delete_tracker(id)?;
        self.persist(&data)
    }

    fn set_pinned(&self, id: TrackerId, pinned: bool) -> Result<(), StoreError> {
        let mut data = self.data.write();
        data.set_pinned(id, pinned)?;
        self.persist(&data)
    }

    fn create_record(&self, id: TrackerId, date: NaiveDate) -> Result<(), StoreError> {
        let mut data = self.data.write();
        data.create_record(id, date)?;
        self.persist(&data)
    }

    fn delete_record(&self, id: TrackerId, date: NaiveDate) -> Result<(), StoreError> {
        let mut data = self.data.write();
        data.delete_record(id, date)?;
        self.persist(&data)
    }
}

/// On-disk layout. Schedules are stored as comma-joined index strings and
/// kinds as "habit"/"irregular", matching the original storage conventions.
#[derive(Debug, Default, Serialize, Deserialize)]
struct TrackerFile {
    categories: Vec<RawCategory>,
    records: Vec<RawRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawCategory {
    title: String,
    trackers: Vec<RawTracker>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawTracker {
    id: TrackerId,
    name: String,
    emoji: String,
    color: String,
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    schedule: Option<String>,
    created: NaiveDate,
    #[serde(default)]
    pinned: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawRecord {
    tracker: TrackerId,
    date: NaiveDate,
}

impl TrackerFile {
    fn from_data(data: &StoreData) -> Self {
        Self {
            categories: data
                .categories
                .iter()
                .map(|category| RawCategory {
                    title: category.title.clone(),
                    trackers: category.trackers.iter().map(RawTracker::from_tracker).collect(),
                })
                .collect(),
            records: data
                .records
                .iter()
                .map(|record| RawRecord {
                    tracker: record.tracker,
                    date: record.date,
                })
                .collect(),
        }
    }

    fn into_data(self) -> StoreData {
        StoreData {
            categories: self
                .categories
                .into_iter()
                .map(|category| {
                    let title = category.title;
                    let trackers = category
                        .trackers
                        .into_iter()
                        .map(|raw| raw.into_tracker(&title))
                        .collect();
                    Category { title, trackers }
                })
                .collect(),
            records: self
                .records
                .into_iter()
                .map(|record| CompletionRecord {
                    tracker: record.tracker,
                    date: record.date,
                })
                .collect(),
        }
    }
}

impl RawTracker {
    fn from_tracker(tracker: &Tracker) -> Self {
        Self {
            id: tracker.id,
            name: tracker.name.clone(),
            emoji: tracker.emoji.clone(),
            color: tracker.color.clone(),
            kind: match tracker.kind {
                TrackerKind::Habit => KIND_HABIT.to_string(),
                TrackerKind::IrregularEvent => KIND_IRREGULAR.to_string(),
            },
            schedule: tracker.schedule.as_ref().map(encode_schedule),
            created: tracker.created,
            pinned: tracker.pinned,
        }
    }

    fn into_tracker(self, category_title: &str) -> Tracker {
        Tracker {
            id: self.id,
            name: self.name,
            emoji: self.emoji,
            color: self.color,
            kind: if self.kind == KIND_HABIT {
                TrackerKind::Habit
            } else {
                TrackerKind::IrregularEvent
            },
            schedule: self.schedule.as_deref().map(decode_schedule),
            created: self.created,
            category_title: category_title.to_string(),
            pinned: self.pinned,
        }
    }
}

fn encode_schedule(schedule: &WeekdaySet) -> String {
    schedule
        .indices()
        .map(|idx| idx.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn decode_schedule(raw: &str) -> WeekdaySet {
    raw.split(',')
        .filter_map(|token| token.trim().parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn tracker(kind: TrackerKind, schedule: Option<WeekdaySet>) -> Tracker {
        Tracker {
            id: TrackerId::new(),
            name: "Поливать растения".to_string(),
            emoji: "❤️".to_string(),
            color: "#33CF69".to_string(),
            kind,
            schedule,
            created: date(1),
            category_title: "Домашний уют".to_string(),
            pinned: false,
        }
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempdir().unwrap();
        let store = JsonStore::open(dir.path().join("tracker.json")).unwrap();
        assert!(store.load_categories().unwrap().is_empty());
        assert!(store.load_records().unwrap().is_empty());
    }

    #[test]
    fn state_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tracker.json");

        let habit = tracker(TrackerKind::Habit, Some(WeekdaySet::from_indices([0, 2, 4])));
        {
            let store = JsonStore::open(&path).unwrap();
            store.create_category("Домашний уют").unwrap();
            store.create_tracker(&habit, "Домашний уют").unwrap();
            store.create_record(habit.id, date(10)).unwrap();
            store.set_pinned(habit.id, true).unwrap();
        }

        let reopened = JsonStore::open(&path).unwrap();
        let categories = reopened.load_categories().unwrap();
        assert_eq!(categories.len(), 1);
        let loaded = &categories[0].trackers[0];
        assert_eq!(loaded.id, habit.id);
        assert_eq!(loaded.schedule, habit.schedule);
        assert_eq!(loaded.category_title, "Домашний уют");
        assert!(loaded.pinned);
        assert_eq!(
            reopened.load_records().unwrap(),
            vec![CompletionRecord {
                tracker: habit.id,
                date: date(10),
            }]
        );
    }

    #[test]
    fn schedule_round_trips_through_the_csv_encoding() {
        let set = WeekdaySet::from_indices([0, 2, 4]);
        assert_eq!(encode_schedule(&set), "0,2,4");
        assert_eq!(decode_schedule("0,2,4"), set);
        assert_eq!(decode_schedule(""), WeekdaySet::new());
        assert_eq!(decode_schedule("1, 6"), WeekdaySet::from_indices([1, 6]));
    }

    #[test]
    fn unknown_kind_string_falls_back_to_irregular() {
        let raw = RawTracker {
            id: TrackerId::new(),
            name: "x".to_string(),
            emoji: "x".to_string(),
            color: "#FFFFFF".to_string(),
            kind: "something-else".to_string(),
            schedule: None,
            created: date(1),
            pinned: false,
        };
        assert_eq!(
            raw.into_tracker("A").kind,
            TrackerKind::IrregularEvent
        );
    }

    #[test]
    fn corrupt_file_is_reported_as_such() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tracker.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JsonStore::open(&path),
            Err(StoreError::Corrupt(_))
        ));
    }
}
