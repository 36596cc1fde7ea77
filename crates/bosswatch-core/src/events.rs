use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every observable change in the tracker produces an Event.
/// The presentation layer subscribes to them; channels are zero-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SlotKilled {
        entity: String,
        channel: usize,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    /// Countdown restored from the snapshot at startup.
    SlotResumed {
        entity: String,
        channel: usize,
        remaining_secs: u32,
        alerted: bool,
        at: DateTime<Utc>,
    },
    SlotTicked {
        entity: String,
        channel: usize,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    ThresholdAlert {
        entity: String,
        channel: usize,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    SlotExpired {
        entity: String,
        channel: usize,
        at: DateTime<Utc>,
    },
    HistoryAppended {
        text: String,
        at: DateTime<Utc>,
    },
    HistoryCleared {
        at: DateTime<Utc>,
    },
    /// Snapshot could not be read or written; the tracker keeps running.
    PersistenceWarning {
        message: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::SlotKilled { at, .. }
            | Event::SlotResumed { at, .. }
            | Event::SlotTicked { at, .. }
            | Event::ThresholdAlert { at, .. }
            | Event::SlotExpired { at, .. }
            | Event::HistoryAppended { at, .. }
            | Event::HistoryCleared { at }
            | Event::PersistenceWarning { at, .. } => *at,
        }
    }
}
