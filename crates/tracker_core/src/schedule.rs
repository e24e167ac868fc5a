use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DAY_NAMES_FULL: [&str; 7] = [
    "Понедельник",
    "Вторник",
    "Среда",
    "Четверг",
    "Пятница",
    "Суббота",
    "Воскресенье",
];

pub const DAY_NAMES_SHORT: [&str; 7] = ["Пн", "Вт", "Ср", "Чт", "Пт", "Сб", "Вс"];

/// Weekdays a habit repeats on, stored as Monday-first indices 0..=6.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct WeekdaySet(BTreeSet<u8>);

impl WeekdaySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from raw indices. Values outside 0..=6 are dropped.
    pub fn from_indices(indices: impl IntoIterator<Item = u8>) -> Self {
        Self(indices.into_iter().filter(|idx| *idx <= 6).collect())
    }

    pub fn contains(&self, index: u8) -> bool {
        self.0.contains(&index)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Indices in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }

    /// Human-readable schedule summary: "Будние дни" for exactly Mon..Fri,
    /// "Каждый день" for all seven days, otherwise the short day names.
    pub fn label(&self) -> String {
        let weekdays: BTreeSet<u8> = (0..5).collect();
        if self.0 == weekdays {
            return "Будние дни".to_string();
        }
        if self.0.len() == 7 {
            return "Каждый день".to_string();
        }
        self.0
            .iter()
            .map(|&idx| DAY_NAMES_SHORT[idx as usize])
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromIterator<u8> for WeekdaySet {
    fn from_iter<T: IntoIterator<Item = u8>>(iter: T) -> Self {
        Self::from_indices(iter)
    }
}

/// Remaps the 1=Sunday..7=Saturday weekday numbering onto the Monday-first
/// 0..=6 indices the schedule is stored in.
pub fn iso_weekday_index(date: NaiveDate) -> u8 {
    ((date.weekday().number_from_sunday() + 5) % 7) as u8
}
