//! Transient, newest-first history of timer transitions.
//!
//! Nothing here is persisted; a restarted tracker starts with an empty log.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub at: DateTime<Utc>,
    pub text: String,
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let local = self.at.with_timezone(&Local);
        write!(f, "[{}] {}", local.format("%H:%M:%S"), self.text)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: VecDeque<HistoryEntry>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `text` as the newest entry and return it.
    pub fn append(&mut self, text: impl Into<String>) -> HistoryEntry {
        let entry = HistoryEntry {
            at: Utc::now(),
            text: text.into(),
        };
        self.entries.push_front(entry.clone());
        entry
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entry texts, newest first.
    pub fn snapshot(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.text.clone()).collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_entry_comes_first() {
        let mut log = EventLog::new();
        log.append("first");
        log.append("second");
        log.append("third");
        assert_eq!(log.snapshot(), vec!["third", "second", "first"]);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut log = EventLog::new();
        log.append("Subora killed");
        log.clear();
        assert!(log.is_empty());
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.snapshot(), Vec::<String>::new());
    }

    #[test]
    fn display_prefixes_time() {
        let mut log = EventLog::new();
        let entry = log.append("Nazrudin on channel 1 is live again");
        let rendered = entry.to_string();
        assert!(rendered.starts_with('['));
        assert!(rendered.ends_with("Nazrudin on channel 1 is live again"));
    }
}
