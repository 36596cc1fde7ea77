//! Timer slot state machine.
//!
//! A slot is one respawn countdown for one (entity, channel) pair. It holds no
//! clock: every call to [`TimerSlot::tick`] is exactly one second.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Counting -> Expired
//!           ^  |         |
//!           +--+---------+   (fresh arm only)
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotState {
    /// Never armed since startup. Remaining time is meaningless.
    Idle,
    Counting,
    /// Countdown reached zero; the boss is up.
    Expired,
}

/// What a single tick did to a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Remaining time went down by one, nothing else happened.
    Advanced,
    /// Remaining time crossed the alert threshold for this cycle.
    Alerted,
    /// Remaining time hit zero.
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSlot {
    remaining_secs: u32,
    state: SlotState,
    alerted: bool,
    /// Remaining time when the current cycle was armed or resumed.
    cycle_secs: u32,
}

impl Default for TimerSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerSlot {
    pub fn new() -> Self {
        Self {
            remaining_secs: 0,
            state: SlotState::Idle,
            alerted: false,
            cycle_secs: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SlotState {
        self.state
    }

    pub fn alerted(&self) -> bool {
        self.alerted
    }

    /// Seconds left on the countdown, 0 unless counting.
    pub fn remaining_secs(&self) -> u32 {
        match self.state {
            SlotState::Counting => self.remaining_secs,
            SlotState::Idle | SlotState::Expired => 0,
        }
    }

    pub fn is_counting(&self) -> bool {
        self.state == SlotState::Counting
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a fresh cycle of `duration_secs`, discarding any countdown in
    /// progress. A zero duration leaves the slot expired.
    pub fn arm(&mut self, duration_secs: u32) {
        self.alerted = false;
        self.start_cycle(duration_secs);
    }

    /// Continue a countdown restored from a snapshot.
    ///
    /// `alerted` is re-derived from the remaining time since it is not
    /// persisted.
    pub fn resume(&mut self, remaining_secs: u32, alert_threshold_secs: u32) {
        self.alerted = remaining_secs < alert_threshold_secs;
        self.start_cycle(remaining_secs);
    }

    /// Advance the countdown by one second.
    ///
    /// Returns `None` when the slot is not counting.
    pub fn tick(&mut self, alert_threshold_secs: u32) -> Option<TickOutcome> {
        if self.state != SlotState::Counting {
            return None;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.state = SlotState::Expired;
            return Some(TickOutcome::Expired);
        }

        if !self.alerted
            && self.cycle_secs > alert_threshold_secs
            && self.remaining_secs <= alert_threshold_secs
        {
            self.alerted = true;
            return Some(TickOutcome::Alerted);
        }

        Some(TickOutcome::Advanced)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn start_cycle(&mut self, secs: u32) {
        self.remaining_secs = secs;
        self.cycle_secs = secs;
        self.state = if secs > 0 {
            SlotState::Counting
        } else {
            SlotState::Expired
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: u32 = 300;

    #[test]
    fn new_slot_is_idle() {
        let slot = TimerSlot::new();
        assert_eq!(slot.state(), SlotState::Idle);
        assert_eq!(slot.remaining_secs(), 0);
        assert!(!slot.alerted());
    }

    #[test]
    fn idle_slot_ignores_ticks() {
        let mut slot = TimerSlot::new();
        assert_eq!(slot.tick(THRESHOLD), None);
        assert_eq!(slot.state(), SlotState::Idle);
    }

    #[test]
    fn arm_then_tick_decrements() {
        let mut slot = TimerSlot::new();
        slot.arm(3600);
        assert_eq!(slot.remaining_secs(), 3600);
        assert_eq!(slot.tick(THRESHOLD), Some(TickOutcome::Advanced));
        assert_eq!(slot.remaining_secs(), 3599);
    }

    #[test]
    fn reaching_zero_expires() {
        let mut slot = TimerSlot::new();
        slot.arm(2);
        assert_eq!(slot.tick(THRESHOLD), Some(TickOutcome::Advanced));
        assert_eq!(slot.tick(THRESHOLD), Some(TickOutcome::Expired));
        assert_eq!(slot.state(), SlotState::Expired);
        assert_eq!(slot.remaining_secs(), 0);
        assert_eq!(slot.tick(THRESHOLD), None);
    }

    #[test]
    fn alert_fires_once_when_crossing_threshold() {
        let mut slot = TimerSlot::new();
        slot.arm(302);
        assert_eq!(slot.tick(THRESHOLD), Some(TickOutcome::Advanced));
        assert_eq!(slot.tick(THRESHOLD), Some(TickOutcome::Alerted));
        assert_eq!(slot.remaining_secs(), 300);
        assert!(slot.alerted());
        assert_eq!(slot.tick(THRESHOLD), Some(TickOutcome::Advanced));
    }

    #[test]
    fn short_cycle_never_alerts() {
        let mut slot = TimerSlot::new();
        slot.arm(10);
        for _ in 0..9 {
            assert_eq!(slot.tick(THRESHOLD), Some(TickOutcome::Advanced));
        }
        assert_eq!(slot.tick(THRESHOLD), Some(TickOutcome::Expired));
        assert!(!slot.alerted());
    }

    #[test]
    fn rearm_resets_alert_and_duration() {
        let mut slot = TimerSlot::new();
        slot.arm(301);
        slot.tick(THRESHOLD);
        assert!(slot.alerted());

        slot.arm(3600);
        assert!(!slot.alerted());
        assert_eq!(slot.remaining_secs(), 3600);
        assert_eq!(slot.state(), SlotState::Counting);
    }

    #[test]
    fn expired_slot_can_be_rearmed() {
        let mut slot = TimerSlot::new();
        slot.arm(1);
        assert_eq!(slot.tick(THRESHOLD), Some(TickOutcome::Expired));
        slot.arm(5);
        assert_eq!(slot.state(), SlotState::Counting);
        assert_eq!(slot.remaining_secs(), 5);
    }

    #[test]
    fn resume_below_threshold_is_already_alerted() {
        let mut slot = TimerSlot::new();
        slot.resume(120, THRESHOLD);
        assert_eq!(slot.state(), SlotState::Counting);
        assert!(slot.alerted());
        assert_eq!(slot.tick(THRESHOLD), Some(TickOutcome::Advanced));
    }

    #[test]
    fn resume_above_threshold_alerts_later() {
        let mut slot = TimerSlot::new();
        slot.resume(301, THRESHOLD);
        assert!(!slot.alerted());
        assert_eq!(slot.tick(THRESHOLD), Some(TickOutcome::Alerted));
    }

    #[test]
    fn arm_with_zero_expires_immediately() {
        let mut slot = TimerSlot::new();
        slot.arm(0);
        assert_eq!(slot.state(), SlotState::Expired);
    }
}
