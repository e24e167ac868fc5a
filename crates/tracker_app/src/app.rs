use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tracing::info;

use tracker_core::json_store::JsonStore;
use tracker_core::plural::day_count_label;
use tracker_core::service::TrackerService;
use tracker_core::visibility::TrackerGroup;

const EMPTY_STATE_PLACEHOLDER: &str = "Что будем отслеживать?";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: PathBuf,
    pub date: Option<NaiveDate>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("TRACKER_STORAGE") {
            config.storage_path = PathBuf::from(path);
        }
        if let Ok(raw) = std::env::var("TRACKER_DATE") {
            let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .with_context(|| format!("TRACKER_DATE `{raw}` is not a YYYY-MM-DD date"))?;
            config.date = Some(date);
        }
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("tracker.json"),
            date: None,
        }
    }
}

pub fn run(config: AppConfig) -> Result<()> {
    let date = config.date.unwrap_or_else(|| Local::now().date_naive());
    let store = JsonStore::open(&config.storage_path)
        .with_context(|| format!("open tracker store at {}", config.storage_path.display()))?;
    let service = TrackerService::builder()
        .with_store(Box::new(store))
        .build()?;
    info!(%date, "rendering tracker list");

    let groups = service.visible_groups(date);
    print!("{}", render_groups(&service, &groups, date));
    Ok(())
}

/// Text rendition of the tracker screen: date header, one section per group,
/// a completion mark and the all-time day counter per tracker.
fn render_groups(service: &TrackerService, groups: &[TrackerGroup], date: NaiveDate) -> String {
    let mut out = String::new();
    writeln!(out, "Трекеры — {}", date.format("%d.%m.%y")).unwrap();

    if groups.is_empty() {
        writeln!(out, "\n{EMPTY_STATE_PLACEHOLDER}").unwrap();
        return out;
    }

    for group in groups {
        writeln!(out, "\n{}", group.title).unwrap();
        for tracker in &group.trackers {
            let mark = if service.is_completed(tracker.id, date) {
                "[x]"
            } else {
                "[ ]"
            };
            let count = service.completion_count(tracker.id) as u32;
            writeln!(
                out,
                "  {} {} {} — {}",
                mark,
                tracker.emoji,
                tracker.name,
                day_count_label(count)
            )
            .unwrap();
        }
    }
    out
}
