//! Tick scheduling.
//!
//! [`TickScheduler`] is the synchronous part: the set of armed slots and the
//! single pass that advances all of them by one second. [`TickDriver`] is the
//! async loop that runs one pass per tick interval against a shared tracker.

use std::collections::BTreeSet;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::timer::{SlotId, TickOutcome, TimerRegistry};
use crate::tracker::TrackerHandle;

/// Slots currently being driven, by id. The registry keeps ownership.
#[derive(Debug, Clone, Default)]
pub struct TickScheduler {
    armed: BTreeSet<SlotId>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include `id` in every pass from the next one on.
    pub fn arm(&mut self, id: SlotId) {
        self.armed.insert(id);
    }

    pub fn is_armed(&self, id: SlotId) -> bool {
        self.armed.contains(&id)
    }

    pub fn armed_count(&self) -> usize {
        self.armed.len()
    }

    /// Advance every armed slot by one second, in slot order.
    ///
    /// Slots that expire (or were never counting) are dropped from the armed
    /// set until re-armed.
    pub fn pass(
        &mut self,
        registry: &mut TimerRegistry,
        alert_threshold_secs: u32,
    ) -> Vec<(SlotId, TickOutcome)> {
        let mut outcomes = Vec::with_capacity(self.armed.len());
        self.armed.retain(|&id| match registry.slot_mut(id).tick(alert_threshold_secs) {
            Some(outcome) => {
                outcomes.push((id, outcome));
                outcome != TickOutcome::Expired
            }
            None => false,
        });
        outcomes
    }
}

/// Periodic driver running one tick pass per interval.
pub struct TickDriver {
    tracker: TrackerHandle,
    period: Duration,
}

impl TickDriver {
    pub fn new(tracker: TrackerHandle, period: Duration) -> Self {
        Self { tracker, period }
    }

    /// Run passes forever. The first pass happens one period after the call.
    ///
    /// Missed intervals (e.g. after system sleep) are replayed back to back so
    /// countdowns stay in step with elapsed time.
    pub async fn run(self) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            // The pass ends with an fsync'd snapshot write.
            let tracker = self.tracker.clone();
            let report = match tokio::task::spawn_blocking(move || tracker.tick()).await {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!(error = %e, "tick pass failed");
                    continue;
                }
            };
            if report.changed() {
                tracing::trace!(
                    advanced = report.advanced,
                    alerts = report.alerts,
                    expired = report.expired,
                    "tick pass"
                );
            }
        }
    }

    /// Spawn [`TickDriver::run`] on the current runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
