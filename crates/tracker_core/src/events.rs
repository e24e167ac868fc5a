use chrono::NaiveDate;

use crate::tracker::TrackerId;

/// Published by the service after each successful mutation, and after an
/// explicit reload. Screen layers use these to know when to re-render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Reloaded,
    CategoryCreated {
        title: String,
    },
    TrackerCreated {
        id: TrackerId,
    },
    TrackerUpdated {
        id: TrackerId,
    },
    TrackerDeleted {
        id: TrackerId,
    },
    PinChanged {
        id: TrackerId,
        pinned: bool,
    },
    CompletionToggled {
        id: TrackerId,
        date: NaiveDate,
        completed: bool,
    },
}

/// Subscribers register one of these with the service builder. Publication is
/// synchronous, on the mutating thread, in registration order.
pub trait ChangeSink: Send + Sync {
    fn publish(&self, event: &ChangeEvent);
}
