use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schedule::{iso_weekday_index, WeekdaySet};

/// Category a tracker is filed under when the user never picked one.
pub const DEFAULT_CATEGORY_TITLE: &str = "По умолчанию";

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(transparent)]
pub struct TrackerId(Uuid);

impl TrackerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TrackerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TrackerKind {
    /// Repeats on the weekdays listed in the schedule.
    Habit,
    /// Due exactly once, on its creation day.
    IrregularEvent,
}

/// A single tracked habit or event. Immutable value; edits replace it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tracker {
    pub id: TrackerId,
    pub name: String,
    pub emoji: String,
    pub color: String,
    pub kind: TrackerKind,
    pub schedule: Option<WeekdaySet>,
    pub created: NaiveDate,
    pub category_title: String,
    pub pinned: bool,
}

impl Tracker {
    /// Whether this tracker belongs in the list rendered for `date`.
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        match self.kind {
            TrackerKind::Habit => self
                .schedule
                .as_ref()
                .map(|days| days.contains(iso_weekday_index(date)))
                .unwrap_or(false),
            TrackerKind::IrregularEvent => date == self.created,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub title: String,
    pub trackers: Vec<Tracker>,
}

impl Category {
    pub fn empty(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            trackers: Vec::new(),
        }
    }
}
