use chrono::NaiveDate;
use serde::Serialize;

use crate::tracker::{Category, Tracker};

/// Label of the synthetic group pinned trackers are pulled into.
pub const PINNED_GROUP_TITLE: &str = "Закреплённые";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TrackerGroup {
    pub title: String,
    pub trackers: Vec<Tracker>,
}

/// Computes the sections the tracker list renders for `date`.
///
/// Pinned trackers that are due come first under their own group, then each
/// category in input order with its due, unpinned trackers. A category left
/// empty after filtering produces no group at all; within a group the incoming
/// relative order is preserved. An empty result means the caller shows the
/// empty-state placeholder.
pub fn visible_groups(categories: &[Category], date: NaiveDate) -> Vec<TrackerGroup> {
    let mut pinned: Vec<Tracker> = Vec::new();
    let mut groups: Vec<TrackerGroup> = Vec::new();

    for category in categories {
        let mut due: Vec<Tracker> = Vec::new();
        for tracker in &category.trackers {
            if !tracker.is_due_on(date) {
                continue;
            }
            if tracker.pinned {
                pinned.push(tracker.clone());
            } else {
                due.push(tracker.clone());
            }
        }
        if !due.is_empty() {
            groups.push(TrackerGroup {
                title: category.title.clone(),
                trackers: due,
            });
        }
    }

    if !pinned.is_empty() {
        groups.insert(
            0,
            TrackerGroup {
                title: PINNED_GROUP_TITLE.to_string(),
                trackers: pinned,
            },
        );
    }

    groups
}
