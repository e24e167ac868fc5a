pub mod events;
pub mod json_store;
pub mod ledger;
pub mod memory;
pub mod plural;
pub mod schedule;
pub mod service;
pub mod store;
pub mod tracker;
pub mod visibility;

pub use crate::service::{TrackerService, TrackerServiceBuilder};
