//! Plain-text rendering for the terminal.

use bosswatch_core::{format_remaining, Event, SlotView};
use std::fmt::Write;

const NAME_WIDTH: usize = 12;
const CELL_WIDTH: usize = 9;

/// One row per boss, one column per channel. Countdowns inside the alert
/// window are marked with `*`.
pub fn status_table(slots: &[SlotView], channel_count: usize) -> String {
    let mut out = String::new();
    let _ = write!(out, "{:<NAME_WIDTH$}", "Boss");
    for channel in 1..=channel_count {
        let _ = write!(out, "{:>CELL_WIDTH$}", format!("Ch{channel}"));
    }
    out.push('\n');

    for row in slots.chunks(channel_count.max(1)) {
        let Some(first) = row.first() else { continue };
        let _ = write!(out, "{:<NAME_WIDTH$}", first.entity);
        for slot in row {
            let mut cell = slot.label();
            if slot.is_alerting() {
                cell.push('*');
            }
            let _ = write!(out, "{cell:>CELL_WIDTH$}");
        }
        out.push('\n');
    }
    out
}

/// Human-readable line for an event, or `None` for events not worth a line.
///
/// Kills, alerts and respawns are shown through their history entries, so
/// their state events print nothing of their own.
pub fn event_line(event: &Event) -> Option<String> {
    match event {
        Event::HistoryAppended { text, .. } => Some(text.clone()),
        Event::SlotResumed {
            entity,
            channel,
            remaining_secs,
            ..
        } => Some(format!(
            "{entity} channel {} resumed at {}",
            channel + 1,
            format_remaining(*remaining_secs)
        )),
        Event::HistoryCleared { .. } => Some("history cleared".to_string()),
        Event::PersistenceWarning { message, .. } => Some(format!("warning: {message}")),
        Event::SlotKilled { .. }
        | Event::SlotTicked { .. }
        | Event::ThresholdAlert { .. }
        | Event::SlotExpired { .. } => None,
    }
}
